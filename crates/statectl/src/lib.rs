//! Operator tooling over orchestrator state snapshots.

pub mod config;
pub mod report;
pub mod slaves;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use mesos_state::Snapshot;

use crate::config::SlavesConfig;

/// Reads a snapshot file and fills in each task's slave addresses.
pub fn load_snapshot(path: &Path, slave_cfg: &SlavesConfig) -> Result<Snapshot> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut snap = Snapshot::from_reader(BufReader::new(file))
        .with_context(|| format!("decode {}", path.display()))?;
    snap.populate_slave_ips(|slave| slaves::slave_ips(slave, slave_cfg));
    tracing::debug!(
        frameworks = snap.frameworks.len(),
        slaves = snap.slaves.len(),
        tasks = snap.tasks().count(),
        "loaded snapshot"
    );
    Ok(snap)
}
