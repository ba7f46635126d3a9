//! Foundation types for the object updater.
//!
//! The updater drains container updates that an object server could not
//! deliver inline. Every other updater crate depends on `updater-types`.
//!
//! # Key Types
//!
//! - [`UpdateRecord`]: one pending container-index update, as persisted on disk
//! - [`Operation`]: the object operation being announced to the container
//! - [`ObjectPath`]: canonical `/account/container/object` identifier
//! - [`ReplicaNode`] / [`Placement`]: where a container's replicas live
//! - [`SweepStats`]: per-sweep success and failure counters

pub mod error;
pub mod node;
pub mod path;
pub mod record;
pub mod stats;
pub mod status;

pub use error::TypeError;
pub use node::{Placement, ReplicaNode};
pub use path::ObjectPath;
pub use record::{Operation, RecordLocation, UpdateRecord};
pub use stats::SweepStats;
pub use status::{is_acceptable, SYNTHETIC_FAILURE_STATUS};
