//! Container ring for the object updater.
//!
//! The ring maps an `(account, container)` pair to a partition and to the
//! ordered list of devices holding that partition's replicas.
//!
//! # Backends
//!
//! All backends implement [`RingSource`], which hands out an immutable
//! [`RingResolver`] snapshot once per sweep:
//!
//! - [`FileRing`] -- JSON ring file on disk, re-read when its mtime changes
//! - [`StaticRing`] -- fixed ring held in memory, for tests and embedding

pub mod data;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use data::{RingData, RingDevice};
pub use error::{RingError, RingResult};
pub use file::FileRing;
pub use memory::StaticRing;
pub use traits::{RingResolver, RingSource};
