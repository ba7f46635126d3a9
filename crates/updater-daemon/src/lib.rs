//! Object updater daemon.
//!
//! Object servers write a pending record whenever they cannot tell every
//! container replica about an object change. This crate finds those records
//! and delivers them:
//!
//! - [`ObjectUpdater`] runs sweeps over all local devices, once or forever,
//!   with at most `concurrency` devices in flight.
//! - [`DeviceSweeper`] walks one device's buckets, pacing itself with a short
//!   pause after each record.
//! - [`RecordProcessor`] sends one record to every replica and deletes it only
//!   if all of them accepted.
//!
//! Delivery is at-least-once. A record that fails on any replica is sent to
//! all replicas again on the next sweep.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod processor;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use config::UpdaterConfig;
pub use coordinator::{ObjectUpdater, SweepReport};
pub use error::{DaemonError, DaemonResult};
pub use processor::{RecordOutcome, RecordProcessor};
pub use walker::DeviceSweeper;
