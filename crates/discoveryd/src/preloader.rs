//! One-shot bootstrap from the durable topology.

use crate::error::Result;
use std::sync::Arc;
use topo_discovery::{DiscoveryOptions, DiscoveryService, SwitchInit, TopologyRepository};
use tracing::info;

/// Runs the orchestrator's prepopulate step on the first tick it sees and
/// ignores every later one.
#[derive(Debug)]
pub struct SwitchPreloader {
    service: DiscoveryService,
    work_done: bool,
}

impl SwitchPreloader {
    pub fn new(repository: Arc<dyn TopologyRepository>) -> Self {
        Self {
            service: DiscoveryService::new(repository, DiscoveryOptions::default()),
            work_done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.work_done
    }

    /// Returns the per-switch snapshots on the first call, nothing afterwards.
    ///
    /// A failed load still counts as done; the daemon then starts from live
    /// events only.
    pub fn on_tick(&mut self) -> Result<Vec<SwitchInit>> {
        if self.work_done {
            return Ok(Vec::new());
        }
        self.work_done = true;

        let mut snapshots: Vec<SwitchInit> = Vec::new();
        self.service.prepopulate(&mut snapshots)?;
        info!(switches = snapshots.len(), "Loaded durable topology");
        Ok(snapshots)
    }
}
