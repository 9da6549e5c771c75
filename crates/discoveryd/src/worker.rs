//! One discovery partition.
//!
//! A worker owns a [`DiscoveryService`] and processes its inputs one at a
//! time to completion. Commands emitted by switch controllers are fed straight
//! into the port layer of the same worker; port endpoints belong to the
//! switch that owns them, so both always live in the same partition.

use crate::error::{DaemonError, Result};
use crate::input::{OutboundEvent, SpeakerEvent, WorkerInput};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use topo_discovery::{
    DiscoveryError, DiscoveryService, Endpoint, IslFacts, IslReference, PortReply, SwitchCommand,
    SwitchInit,
};
use tracing::{debug, error, info, warn};

/// Collects what the port layer asks for while handling one input.
#[derive(Debug, Default)]
struct PortOutput {
    outbound: Vec<OutboundEvent>,
    postponed: Vec<PostponedSend>,
}

/// Discovery send waiting in the worker's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PostponedSend {
    endpoint: Endpoint,
    cycle: u64,
    delay_ms: u64,
}

impl PortReply for PortOutput {
    fn setup_isl_handler(&mut self, reference: &IslReference, facts: &IslFacts) {
        self.outbound.push(OutboundEvent::SetupIslHandler {
            reference: *reference,
            facts: facts.clone(),
        });
    }

    fn schedule_discovery_send(&mut self, endpoint: Endpoint, cycle: u64, delay_ms: u64) {
        self.postponed.push(PostponedSend {
            endpoint,
            cycle,
            delay_ms,
        });
    }

    fn send_discovery(&mut self, endpoint: Endpoint) {
        self.outbound.push(OutboundEvent::DiscoveryRequest { endpoint });
    }
}

pub struct DiscoveryWorker {
    id: usize,
    service: DiscoveryService,
    /// Discovery sends (endpoint, cycle) keyed by due time
    postponed: BTreeMap<u64, Vec<(Endpoint, u64)>>,
    now: u64,
}

impl DiscoveryWorker {
    pub fn new(id: usize, service: DiscoveryService) -> Self {
        Self {
            id,
            service,
            postponed: BTreeMap::new(),
            now: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn service(&self) -> &DiscoveryService {
        &self.service
    }

    /// Number of discovery sends waiting for their due time.
    pub fn postponed_count(&self) -> usize {
        self.postponed.values().map(Vec::len).sum()
    }

    /// Processes inputs until the channel closes.
    pub async fn run(
        mut self,
        mut inputs: mpsc::Receiver<WorkerInput>,
        outbound: mpsc::Sender<OutboundEvent>,
    ) -> Result<()> {
        info!(worker = self.id, "Discovery worker started");

        while let Some(input) = inputs.recv().await {
            for event in self.handle(input) {
                outbound
                    .send(event)
                    .await
                    .map_err(|_| DaemonError::ChannelClosed("outbound".to_string()))?;
            }
        }

        info!(worker = self.id, "Discovery worker stopped");
        Ok(())
    }

    /// Handles one input and returns the outbound events it produced.
    ///
    /// Failures are logged here; the worker keeps going with the next input.
    pub fn handle(&mut self, input: WorkerInput) -> Vec<OutboundEvent> {
        let mut output = PortOutput::default();

        let result = match input {
            WorkerInput::Speaker(event) => self.handle_speaker(event, &mut output),
            WorkerInput::Prepopulate(init) => self.handle_prepopulate(init, &mut output),
            WorkerInput::Tick(now) => {
                self.on_tick(now, &mut output);
                Ok(())
            }
        };

        if let Err(e) = result {
            self.report(e);
        }

        for send in output.postponed {
            let due = self.now.saturating_add(send.delay_ms);
            self.postponed
                .entry(due)
                .or_default()
                .push((send.endpoint, send.cycle));
        }
        output.outbound
    }

    fn handle_prepopulate(&mut self, init: SwitchInit, output: &mut PortOutput) -> topo_discovery::Result<()> {
        let mut commands: Vec<SwitchCommand> = Vec::new();
        self.service.switch_prepopulate(init, &mut commands)?;
        self.dispatch_port_commands(commands, output);
        Ok(())
    }

    fn handle_speaker(&mut self, event: SpeakerEvent, output: &mut PortOutput) -> topo_discovery::Result<()> {
        let mut commands: Vec<SwitchCommand> = Vec::new();
        let result = match &event {
            SpeakerEvent::Switch(payload) => self.service.switch_event(payload, &mut commands),
            SpeakerEvent::Port(payload) => self.service.switch_port_event(payload, &mut commands),
            SpeakerEvent::Isl(payload) => self.service.switch_isl_discovery(payload, &mut commands),
            SpeakerEvent::RestoreManagement(view) => {
                self.service.switch_restore_management(view, &mut commands)
            }
            SpeakerEvent::SharedSync(sync) => self.service.switch_shared_sync(sync, &mut commands),
        };
        if let Err(e) = result {
            debug!(worker = self.id, kind = event.kind(), "Speaker event rejected");
            return Err(e);
        }

        self.dispatch_port_commands(commands, output);
        Ok(())
    }

    /// Applies switch controller commands to the port layer.
    fn dispatch_port_commands(&mut self, commands: Vec<SwitchCommand>, output: &mut PortOutput) {
        for command in commands {
            let endpoint = command.endpoint();
            let result = match command {
                SwitchCommand::SetupPort { switch_id, facts } => {
                    self.service.port_setup(switch_id, &facts, output)
                }
                SwitchCommand::RemovePort { endpoint } => self.service.port_remove(endpoint),
                SwitchCommand::OnlineStatus { endpoint, online } => {
                    self.service.port_online_status(endpoint, online, output)
                }
                SwitchCommand::ManagementStatus { endpoint, managed } => {
                    self.service.port_management_status(endpoint, managed, output)
                }
                SwitchCommand::LinkStatusSync { endpoint, status } => {
                    self.service.port_link_status_sync(endpoint, status, output)
                }
                SwitchCommand::PortDiscovery { endpoint, facts } => {
                    self.service.port_discovery(endpoint, &facts, output)
                }
            };
            if let Err(e) = result {
                debug!(worker = self.id, %endpoint, "Port command failed");
                self.report(e);
            }
        }
    }

    fn on_tick(&mut self, now: u64, output: &mut PortOutput) {
        self.now = self.now.max(now);

        let later = self.postponed.split_off(&self.now.saturating_add(1));
        let due = std::mem::replace(&mut self.postponed, later);
        for (endpoint, cycle) in due.into_values().flatten() {
            if let Err(e) = self.service.port_send_discovery(endpoint, cycle, output) {
                self.report(e);
            }
        }
    }

    fn report(&self, e: DiscoveryError) {
        if e.is_structural() {
            error!(worker = self.id, error = %e, "Structural violation, event dropped");
        } else {
            warn!(worker = self.id, error = %e, "Event processing failed");
        }
    }
}

impl std::fmt::Debug for DiscoveryWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryWorker")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("postponed", &self.postponed_count())
            .field("now", &self.now)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use topo_discovery::{
        DiscoveryOptions, PortAdminState, SnapshotRepository, SwitchChangeType, SwitchEvent,
        SwitchId, SwitchPortView, SwitchView,
    };

    fn worker() -> DiscoveryWorker {
        let options = DiscoveryOptions {
            discovery_interval_ms: 100,
        };
        DiscoveryWorker::new(0, DiscoveryService::new(Arc::new(SnapshotRepository::new()), options))
    }

    fn activated(id: u64, ports: &[u32]) -> WorkerInput {
        let switch_id = SwitchId::new(id);
        WorkerInput::Speaker(SpeakerEvent::Switch(SwitchEvent {
            switch_id,
            state: SwitchChangeType::Activated,
            switch_view: Some(SwitchView::new(
                switch_id,
                ports
                    .iter()
                    .map(|number| SwitchPortView::new(*number, PortAdminState::Up))
                    .collect(),
            )),
        }))
    }

    #[test]
    fn test_activation_creates_port_controllers_and_schedules_discovery() {
        let mut worker = worker();

        let outbound = worker.handle(activated(1, &[1, 2]));

        assert!(outbound.is_empty());
        assert_eq!(worker.service().port_count(), 2);
        assert_eq!(worker.postponed_count(), 2);
    }

    #[test]
    fn test_tick_fires_due_discovery() {
        let mut worker = worker();
        worker.handle(activated(1, &[1]));

        assert!(worker.handle(WorkerInput::Tick(50)).is_empty());

        let outbound = worker.handle(WorkerInput::Tick(100));
        assert_eq!(
            outbound,
            vec![OutboundEvent::DiscoveryRequest {
                endpoint: Endpoint::new(SwitchId::new(1), 1)
            }]
        );
        // rescheduled for the next interval
        assert_eq!(worker.postponed_count(), 1);
    }

    fn port(id: u64, number: u32, state: topo_discovery::PortChangeType) -> WorkerInput {
        WorkerInput::Speaker(SpeakerEvent::Port(topo_discovery::PortEvent {
            switch_id: SwitchId::new(id),
            port_number: number,
            state,
        }))
    }

    #[test]
    fn test_recreated_port_probes_once_per_interval() {
        use topo_discovery::PortChangeType;

        let mut worker = worker();
        worker.handle(activated(1, &[1]));
        worker.handle(WorkerInput::Tick(10));
        worker.handle(port(1, 1, PortChangeType::Delete));
        worker.handle(port(1, 1, PortChangeType::Add));
        worker.handle(port(1, 1, PortChangeType::Up));

        let mut probes = Vec::new();
        for now in [100, 200, 300, 400, 500] {
            let outbound = worker.handle(WorkerInput::Tick(now));
            assert!(outbound.len() <= 1, "tick {} emitted {:?}", now, outbound);
            probes.extend(outbound);
        }

        // the old cycle dies with its controller; the new one starts at 110
        assert_eq!(probes.len(), 4);
        assert_eq!(worker.postponed_count(), 1);
    }

    #[test]
    fn test_structural_error_does_not_stop_worker() {
        let mut worker = worker();
        let orphan = WorkerInput::Speaker(SpeakerEvent::Port(topo_discovery::PortEvent {
            switch_id: SwitchId::new(9),
            port_number: 1,
            state: topo_discovery::PortChangeType::Up,
        }));

        assert!(worker.handle(orphan).is_empty());
        worker.handle(activated(9, &[1]));
        assert_eq!(worker.service().switch_count(), 1);
    }
}
