use std::sync::Arc;

use updater_types::Placement;

use crate::error::RingResult;

/// Read-only view of a ring.
///
/// A resolver is a snapshot: its answers do not change while it is held,
/// so device workers can share one without locking.
pub trait RingResolver: Send + Sync {
    /// Partition and ordered replica nodes for a container.
    ///
    /// Returns `Err(RingError::NoReplicas)` rather than an empty placement.
    fn get_nodes(&self, account: &str, container: &str) -> RingResult<Placement>;
}

/// Something that can produce fresh ring snapshots.
pub trait RingSource: Send + Sync {
    /// Refresh the ring if it changed and return the current snapshot.
    fn reload(&self) -> RingResult<Arc<dyn RingResolver>>;
}
