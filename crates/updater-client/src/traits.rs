use std::collections::BTreeMap;

use async_trait::async_trait;
use updater_types::{ObjectPath, Operation, ReplicaNode};

/// Sends one update to one container replica.
#[async_trait]
pub trait ReplicaClient: Send + Sync {
    /// Deliver `op` on `path` to `node` and return the replica's status.
    ///
    /// Implementations must not fail: a delivery that produced no response
    /// returns [`updater_types::SYNTHETIC_FAILURE_STATUS`].
    async fn deliver(
        &self,
        node: &ReplicaNode,
        partition: u32,
        op: Operation,
        path: &ObjectPath,
        headers: &BTreeMap<String, String>,
    ) -> u16;
}
