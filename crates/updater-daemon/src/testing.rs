//! Fixtures shared by the daemon's unit tests.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use async_trait::async_trait;
use updater_client::ReplicaClient;
use updater_ring::{RingData, RingDevice, StaticRing};
use updater_store::PendingStore;
use updater_types::{ObjectPath, Operation, ReplicaNode, UpdateRecord};

#[derive(Clone, Debug)]
pub struct Call {
    pub node: u32,
    pub partition: u32,
    pub op: Operation,
    pub path: String,
    pub headers: BTreeMap<String, String>,
}

/// Replica client answering from a per-node script.
pub struct ScriptedClient {
    default: Mutex<u16>,
    overrides: Mutex<HashMap<u32, u16>>,
    panic_on: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn always(status: u16) -> Self {
        Self {
            default: Mutex::new(status),
            overrides: Mutex::new(HashMap::new()),
            panic_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Listed nodes get their status, everyone else 204.
    pub fn per_node(script: &[(u32, u16)]) -> Self {
        let client = Self::always(204);
        client.overrides.lock().unwrap().extend(script.iter().copied());
        client
    }

    /// Panic when asked to deliver an update for this object name.
    pub fn panicking_on(mut self, obj: &str) -> Self {
        self.panic_on = Some(obj.to_string());
        self
    }

    pub fn set_default(&self, status: u16) {
        *self.default.lock().unwrap() = status;
    }

    pub fn clear_overrides(&self) {
        self.overrides.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplicaClient for ScriptedClient {
    async fn deliver(
        &self,
        node: &ReplicaNode,
        partition: u32,
        op: Operation,
        path: &ObjectPath,
        headers: &BTreeMap<String, String>,
    ) -> u16 {
        if self.panic_on.as_deref() == Some(path.obj.as_str()) {
            panic!("scripted panic for {path}");
        }
        self.calls.lock().unwrap().push(Call {
            node: node.id,
            partition,
            op,
            path: path.to_string(),
            headers: headers.clone(),
        });
        let overridden = self.overrides.lock().unwrap().get(&node.id).copied();
        overridden.unwrap_or_else(|| *self.default.lock().unwrap())
    }
}

/// Single-partition ring whose replicas are the given addresses, in order.
pub fn ring_at(addrs: &[SocketAddr]) -> RingData {
    RingData {
        part_power: 0,
        devs: addrs
            .iter()
            .enumerate()
            .map(|(i, addr)| RingDevice {
                ip: addr.ip(),
                port: addr.port(),
                device: format!("sd{}", (b'b' + i as u8) as char),
                zone: i as u32,
            })
            .collect(),
        replica2part2dev: (0..addrs.len() as u32).map(|i| vec![i]).collect(),
    }
}

/// Ring with `replicas` devices on unused local ports.
pub fn ring_of(replicas: usize) -> StaticRing {
    let addrs: Vec<SocketAddr> = (0..replicas)
        .map(|i| SocketAddr::from(([127, 0, 0, 1], 6001 + i as u16)))
        .collect();
    StaticRing::new(ring_at(&addrs)).unwrap()
}

pub fn record(obj: &str) -> UpdateRecord {
    let mut headers = BTreeMap::new();
    headers.insert("X-Size".to_string(), "0".to_string());
    UpdateRecord::new(ObjectPath::new("a", "c", obj), Operation::Put, headers)
}

/// A device directory `sdb1` in a fresh temp dir.
pub fn pending_store() -> (tempfile::TempDir, PendingStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = device(dir.path(), "sdb1");
    (dir, store)
}

pub fn device(root: &Path, name: &str) -> PendingStore {
    let path = root.join(name);
    std::fs::create_dir_all(&path).unwrap();
    PendingStore::new(path)
}

pub fn persist(store: &PendingStore, obj: &str) -> PathBuf {
    store.persist(&record(obj), SystemTime::now()).unwrap()
}
