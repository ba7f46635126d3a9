//! Delivery of pending updates to container replicas.
//!
//! A delivery is one request to one replica. It never retries and never
//! fails: every problem is logged and reported as
//! [`updater_types::SYNTHETIC_FAILURE_STATUS`], which the caller treats like
//! any other unacceptable status.

pub mod error;
pub mod transport;
pub mod traits;

pub use error::{ClientError, ClientResult};
pub use transport::{request_path, HttpReplicaClient};
pub use traits::ReplicaClient;
