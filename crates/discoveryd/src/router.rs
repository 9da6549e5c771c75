//! Partitioning of inbound events across discovery workers.
//!
//! Every event concerning one switch lands on the same worker, so a switch's
//! history is processed strictly in arrival order while different switches
//! proceed in parallel. The router itself holds no topology state.

use crate::error::{DaemonError, Result};
use crate::input::{Route, SpeakerEvent, WorkerInput};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::mpsc;
use topo_discovery::{SwitchId, SwitchInit};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EventRouter {
    workers: Vec<mpsc::Sender<WorkerInput>>,
}

impl EventRouter {
    pub fn new(workers: Vec<mpsc::Sender<WorkerInput>>) -> Result<Self> {
        if workers.is_empty() {
            return Err(DaemonError::Configuration(
                "event router needs at least one worker".to_string(),
            ));
        }
        Ok(Self { workers })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Index of the worker owning `switch_id`.
    pub fn worker_index(&self, switch_id: SwitchId) -> usize {
        let mut hasher = DefaultHasher::new();
        switch_id.as_u64().hash(&mut hasher);
        (hasher.finish() % self.workers.len() as u64) as usize
    }

    pub async fn route(&self, event: SpeakerEvent) -> Result<()> {
        match event.route() {
            Route::Switch(switch_id) => {
                debug!(%switch_id, kind = event.kind(), "Route speaker event");
                self.send_to(self.worker_index(switch_id), WorkerInput::Speaker(event))
                    .await
            }
            Route::Broadcast => {
                debug!(kind = event.kind(), "Broadcast speaker event");
                self.broadcast(|| WorkerInput::Speaker(event.clone())).await
            }
        }
    }

    pub async fn prepopulate(&self, init: SwitchInit) -> Result<()> {
        let index = self.worker_index(init.switch_id);
        self.send_to(index, WorkerInput::Prepopulate(init)).await
    }

    pub async fn tick(&self, now: u64) -> Result<()> {
        self.broadcast(|| WorkerInput::Tick(now)).await
    }

    async fn broadcast<F>(&self, make: F) -> Result<()>
    where
        F: Fn() -> WorkerInput,
    {
        for index in 0..self.workers.len() {
            self.send_to(index, make()).await?;
        }
        Ok(())
    }

    async fn send_to(&self, index: usize, input: WorkerInput) -> Result<()> {
        self.workers[index]
            .send(input)
            .await
            .map_err(|_| DaemonError::ChannelClosed(format!("worker {}", index)))
    }
}
