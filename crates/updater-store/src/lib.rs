//! On-disk storage of pending container updates.
//!
//! When an object server cannot reach every container replica it writes the
//! update to local disk. This crate owns that layout:
//!
//! ```text
//! <devices>/<device>/async_pending/<bucket>/<hash>-<timestamp>
//! <devices>/<device>/quarantined/objects/<record name>
//! <devices>/<device>/tmp/
//! ```
//!
//! # Design Rules
//!
//! 1. A record file is written once, via a temp file and an atomic rename,
//!    so a reader sees either the whole record or nothing.
//! 2. A record is never rewritten. It is unlinked once delivered, or renamed
//!    into quarantine if it cannot be decoded.
//! 3. Buckets are disposable: removing one may fail because a producer just
//!    added a record, and that is not an error.

pub mod codec;
pub mod device;
pub mod error;
pub mod layout;
pub mod pending;

pub use codec::{decode_record, encode_record};
pub use device::{is_mount, list_devices, Device};
pub use error::{StoreError, StoreResult};
pub use layout::{ASYNC_DIR, QUARANTINE_DIR, QUARANTINE_OBJECTS_DIR, TMP_DIR};
pub use pending::PendingStore;
