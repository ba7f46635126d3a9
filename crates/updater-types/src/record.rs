use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::path::ObjectPath;

/// The object operation a container must learn about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Object created or overwritten.
    #[serde(rename = "PUT")]
    Put,
    /// Object metadata changed.
    #[serde(rename = "POST")]
    Post,
    /// Object removed.
    #[serde(rename = "DELETE")]
    Delete,
}

impl Operation {
    /// HTTP method used to forward this operation to a container server.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

impl FromStr for Operation {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            _ => Err(TypeError::UnknownOperation(s.to_string())),
        }
    }
}

/// A pending container update, exactly as the producer persisted it.
///
/// Records are immutable: the updater decodes them and either deletes,
/// quarantines, or leaves them alone. It never rewrites one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub account: String,
    pub container: String,
    pub obj: String,
    pub op: Operation,
    /// Headers forwarded verbatim to every container replica.
    pub headers: BTreeMap<String, String>,
}

impl UpdateRecord {
    pub fn new(path: ObjectPath, op: Operation, headers: BTreeMap<String, String>) -> Self {
        Self {
            account: path.account,
            container: path.container,
            obj: path.obj,
            op,
            headers,
        }
    }

    pub fn object_path(&self) -> ObjectPath {
        ObjectPath::new(&self.account, &self.container, &self.obj)
    }

    /// Check the fields a delivery needs. A record that fails here can never
    /// be delivered and must not be retried.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.account.is_empty() {
            return Err(TypeError::MissingField("account"));
        }
        if self.container.is_empty() {
            return Err(TypeError::MissingField("container"));
        }
        if self.obj.is_empty() {
            return Err(TypeError::MissingField("obj"));
        }
        for (name, value) in &self.headers {
            if http::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(TypeError::InvalidHeader {
                    name: name.clone(),
                    reason: "not a header token".into(),
                });
            }
            if http::HeaderValue::from_str(value).is_err() {
                return Err(TypeError::InvalidHeader {
                    name: name.clone(),
                    reason: "value contains a control character".into(),
                });
            }
        }
        Ok(())
    }
}

/// Where a pending record lives on local disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLocation {
    /// Device root, e.g. `/srv/node/sdb1`.
    pub device: PathBuf,
    /// Bucket directory name under the pending root.
    pub bucket: String,
    /// Full path to the record file.
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UpdateRecord {
        let mut headers = BTreeMap::new();
        headers.insert("X-Size".to_string(), "12".to_string());
        headers.insert("X-Etag".to_string(), "d41d8cd98f00b204e9800998ecf8427e".to_string());
        UpdateRecord::new(ObjectPath::new("a", "c", "o"), Operation::Put, headers)
    }

    #[test]
    fn operation_parses_case_insensitively() {
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Delete);
        assert_eq!("POST".parse::<Operation>().unwrap(), Operation::Post);
        assert!(matches!(
            "PATCH".parse::<Operation>(),
            Err(TypeError::UnknownOperation(_))
        ));
    }

    #[test]
    fn valid_record_passes() {
        assert!(record().validate().is_ok());
        assert_eq!(record().object_path().to_string(), "/a/c/o");
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        let mut r = record();
        r.container.clear();
        assert_eq!(r.validate(), Err(TypeError::MissingField("container")));
    }

    #[test]
    fn header_injection_is_rejected() {
        let mut r = record();
        r.headers.insert("X-Bad".into(), "x\r\nHost: evil".into());
        assert!(matches!(r.validate(), Err(TypeError::InvalidHeader { .. })));

        let mut r = record();
        r.headers.insert("Bad Name".into(), "x".into());
        assert!(matches!(r.validate(), Err(TypeError::InvalidHeader { .. })));
    }

    #[test]
    fn header_names_must_be_tokens() {
        for bad in ["X(Bad)", "X@Y", "a,b", "path/like", "k=v", "[x]", "\"q\"", ""] {
            let mut r = record();
            r.headers.insert(bad.into(), "1".into());
            assert!(
                matches!(r.validate(), Err(TypeError::InvalidHeader { .. })),
                "{bad:?} should be rejected"
            );
        }
        let mut r = record();
        r.headers.insert("X-Object-Meta-Color_2".into(), "blue".into());
        r.headers.insert("x-lower".into(), "2".into());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn bincode_form_keeps_operation() {
        let r = record();
        let bytes = bincode::serialize(&r).unwrap();
        let back: UpdateRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.op, Operation::Put);
        assert_eq!(back.headers.len(), 2);
    }
}
