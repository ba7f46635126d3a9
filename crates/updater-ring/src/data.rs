use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use updater_types::{Placement, ReplicaNode};

use crate::error::{RingError, RingResult};
use crate::traits::RingResolver;

/// Largest supported partition power.
pub const MAX_PART_POWER: u8 = 32;

/// A device entry in the ring's device table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingDevice {
    pub ip: IpAddr,
    pub port: u16,
    pub device: String,
    #[serde(default)]
    pub zone: u32,
}

/// Serialized ring: a device table plus, per replica, a partition → device
/// index assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingData {
    /// The ring has `2^part_power` partitions.
    pub part_power: u8,
    pub devs: Vec<RingDevice>,
    /// `replica2part2dev[r][p]` is the index into `devs` holding replica `r`
    /// of partition `p`.
    pub replica2part2dev: Vec<Vec<u32>>,
}

impl RingData {
    /// Check that every table row covers every partition and only names
    /// devices that exist.
    pub fn validate(&self) -> RingResult<()> {
        if self.part_power > MAX_PART_POWER {
            return Err(RingError::Invalid(format!(
                "part_power {} exceeds {MAX_PART_POWER}",
                self.part_power
            )));
        }
        let parts = self.partition_count();
        for (replica, row) in self.replica2part2dev.iter().enumerate() {
            if row.len() as u64 != parts {
                return Err(RingError::Invalid(format!(
                    "replica {replica} assigns {} partitions, expected {parts}",
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|&&d| d as usize >= self.devs.len()) {
                return Err(RingError::Invalid(format!(
                    "replica {replica} references unknown device {bad}"
                )));
            }
        }
        Ok(())
    }

    pub fn partition_count(&self) -> u64 {
        1u64 << self.part_power
    }

    pub fn replica_count(&self) -> usize {
        self.replica2part2dev.len()
    }

    /// Partition for a container: the top `part_power` bits of the BLAKE3
    /// hash of `/<account>/<container>`.
    pub fn get_part(&self, account: &str, container: &str) -> u32 {
        let key = format!("/{account}/{container}");
        let digest = blake3::hash(key.as_bytes());
        let b = digest.as_bytes();
        let top = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        (u64::from(top) >> (32 - u32::from(self.part_power))) as u32
    }

    /// Parse and validate ring JSON.
    pub fn from_json(bytes: &[u8], origin: &Path) -> RingResult<Self> {
        let data: RingData = serde_json::from_slice(bytes).map_err(|e| RingError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        data.validate()?;
        Ok(data)
    }

    /// Write the ring as JSON.
    pub fn write_to(&self, path: &Path) -> RingResult<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|e| RingError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|source| RingError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl RingResolver for RingData {
    fn get_nodes(&self, account: &str, container: &str) -> RingResult<Placement> {
        let partition = self.get_part(account, container);
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(self.replica_count());
        for row in &self.replica2part2dev {
            let id = row[partition as usize];
            if !seen.insert(id) {
                continue;
            }
            let dev = &self.devs[id as usize];
            nodes.push(ReplicaNode::new(
                id,
                SocketAddr::new(dev.ip, dev.port),
                dev.device.clone(),
            ));
        }
        if nodes.is_empty() {
            return Err(RingError::NoReplicas(partition));
        }
        Ok(Placement { partition, nodes })
    }
}
