use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// One container-server device holding a replica of a container's index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicaNode {
    /// Index of the device in the ring's device table.
    pub id: u32,
    /// Address of the container server.
    pub addr: SocketAddr,
    /// Device name on that server (e.g. `sdb1`).
    pub device: String,
}

impl ReplicaNode {
    pub fn new(id: u32, addr: SocketAddr, device: impl Into<String>) -> Self {
        Self {
            id,
            addr,
            device: device.into(),
        }
    }
}

impl fmt::Display for ReplicaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.device)
    }
}

/// A container's partition and the ordered replica nodes serving it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub partition: u32,
    pub nodes: Vec<ReplicaNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_display_shows_address_and_device() {
        let node = ReplicaNode::new(3, "10.0.0.1:6001".parse().unwrap(), "sdb1");
        assert_eq!(node.to_string(), "10.0.0.1:6001/sdb1");
    }
}
