use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identifier of an object: `/<account>/<container>/<object>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath {
    pub account: String,
    pub container: String,
    pub obj: String,
}

impl ObjectPath {
    pub fn new(
        account: impl Into<String>,
        container: impl Into<String>,
        obj: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            container: container.into(),
            obj: obj.into(),
        }
    }

    /// The path segments in order, unencoded.
    pub fn segments(&self) -> [&str; 3] {
        [&self.account, &self.container, &self.obj]
    }

    /// BLAKE3 hash of the canonical path, hex-encoded.
    ///
    /// Pending records are named and bucketed by this hash.
    pub fn hash_hex(&self) -> String {
        hex::encode(blake3::hash(self.to_string().as_bytes()).as_bytes())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/{}", self.account, self.container, self.obj)
    }
}
