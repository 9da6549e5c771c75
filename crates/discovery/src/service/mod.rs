//! Discovery orchestrator.
//!
//! [`DiscoveryService`] owns every switch and port controller of one
//! partition. Each public operation converts one inbound event into
//! controller transitions and pushes the resulting commands into the reply
//! passed by the caller.
//!
//! Lookups follow two rules. Switch online and management paths use
//! get-or-create, since a switch may become known through several channels.
//! Port and ISL level events require the switch controller to exist already
//! and fail with a structural error otherwise.

mod reply;

pub use reply::{PortReply, SwitchPrepopulateReply, SwitchReply};

use crate::audit::{AuditCategory, AuditOutcome, AuditRecord};
use crate::audit_log;
use crate::bootstrap;
use crate::error::{DiscoveryError, Result};
use crate::fsm::{PortFsm, PortFsmEvent, Roster, SwitchFsm, SwitchFsmEvent, SwitchFsmState};
use crate::model::{
    Endpoint, IslFacts, IslInfo, LinkStatus, OperationMode, PortChangeType, PortEvent, PortFacts,
    SharedSync, SwitchChangeType, SwitchEvent, SwitchId, SwitchInit, SwitchView,
};
use crate::registry::Registry;
use crate::store::TopologyRepository;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

const AUDIT_SOURCE: &str = "DiscoveryService";

/// Default delay between discovery probes on an active port.
pub const DEFAULT_DISCOVERY_INTERVAL_MS: u64 = 3000;

/// Tunables of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Delay between two discovery sends on the same active port
    pub discovery_interval_ms: u64,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            discovery_interval_ms: DEFAULT_DISCOVERY_INTERVAL_MS,
        }
    }
}

pub struct DiscoveryService {
    repository: Arc<dyn TopologyRepository>,
    options: DiscoveryOptions,
    switch_controller: Registry<SwitchId, SwitchFsm>,
    port_controller: Registry<Endpoint, PortFsm>,
    /// Identity handed to the next discovery cycle
    next_discovery_cycle: u64,
}

impl DiscoveryService {
    pub fn new(repository: Arc<dyn TopologyRepository>, options: DiscoveryOptions) -> Self {
        Self {
            repository,
            options,
            switch_controller: Registry::new(),
            port_controller: Registry::new(),
            next_discovery_cycle: 0,
        }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    // -- preloader --

    /// Loads the durable topology and hands one snapshot per switch to `reply`.
    pub fn prepopulate(&self, reply: &mut dyn SwitchPrepopulateReply) -> Result<()> {
        let snapshots = match bootstrap::load_persistent(self.repository.as_ref()) {
            Ok(snapshots) => snapshots,
            Err(e) => {
                audit_log!(AuditRecord::new(AuditCategory::Bootstrap, AUDIT_SOURCE, "prepopulate")
                    .with_error(e.to_string()));
                return Err(e);
            }
        };

        audit_log!(AuditRecord::new(AuditCategory::Bootstrap, AUDIT_SOURCE, "prepopulate")
            .with_outcome(AuditOutcome::Success)
            .with_details(serde_json::json!({ "switches": snapshots.len() })));

        for init in snapshots {
            reply.prepopulate_switch(init);
        }
        Ok(())
    }

    // -- switch layer --

    /// Replays a durable snapshot into the switch controller.
    ///
    /// The controller is created if absent. A controller that already went
    /// live ignores the snapshot.
    pub fn switch_prepopulate(&mut self, init: SwitchInit, reply: &mut dyn SwitchReply) -> Result<()> {
        let switch_id = init.switch_id;
        self.fire_switch_create_if_absent(switch_id, SwitchFsmEvent::History(init), reply);
        Ok(())
    }

    /// Management of a switch was restored and the switch is reachable.
    pub fn switch_restore_management(
        &mut self,
        view: &SwitchView,
        reply: &mut dyn SwitchReply,
    ) -> Result<()> {
        let roster = Roster::from_view(view)?;
        self.fire_switch_create_if_absent(view.switch_id, SwitchFsmEvent::Managed(Some(roster)), reply);
        Ok(())
    }

    /// The device-control layer changed its management mode.
    pub fn switch_shared_sync(&mut self, sync: &SharedSync, reply: &mut dyn SwitchReply) -> Result<()> {
        match &sync.mode {
            // Still connected switches come back through switch_restore_management
            OperationMode::Managed => self.detect_offline_switches(sync, reply),
            OperationMode::Unmanaged => self.set_all_switches_unmanaged(reply),
            OperationMode::Unsupported(raw) => {
                return Err(DiscoveryError::UnsupportedOperationMode(raw.clone()))
            }
        }
        Ok(())
    }

    pub fn switch_event(&mut self, event: &SwitchEvent, reply: &mut dyn SwitchReply) -> Result<()> {
        let fsm_event = match event.state {
            SwitchChangeType::Activated => {
                let view = event
                    .switch_view
                    .as_ref()
                    .ok_or(DiscoveryError::MissingSwitchView(event.switch_id))?;
                SwitchFsmEvent::Online(Roster::from_view(view)?)
            }
            SwitchChangeType::Deactivated => SwitchFsmEvent::Offline,
            other => {
                info!(switch_id = %event.switch_id, state = ?other, "Ignore switch event (no need to handle it)");
                return Ok(());
            }
        };

        self.fire_switch_create_if_absent(event.switch_id, fsm_event, reply);
        Ok(())
    }

    pub fn switch_port_event(&mut self, event: &PortEvent, reply: &mut dyn SwitchReply) -> Result<()> {
        let fsm = self.locate_switch_fsm(event.switch_id)?;
        let number = event.port_number;

        let fsm_event = match event.state {
            PortChangeType::Add => SwitchFsmEvent::PortAdd(number),
            PortChangeType::Delete => SwitchFsmEvent::PortDel(number),
            PortChangeType::Up => SwitchFsmEvent::PortUp(number),
            PortChangeType::Down => SwitchFsmEvent::PortDown(number),
            PortChangeType::OtherUpdate | PortChangeType::Cached => {
                error!(
                    switch_id = %event.switch_id,
                    port = number,
                    state = ?event.state,
                    "Invalid port event - incomplete or deprecated"
                );
                return Ok(());
            }
            PortChangeType::Other => {
                info!(switch_id = %event.switch_id, port = number, "Ignore port event (no need to handle it)");
                return Ok(());
            }
        };

        Self::apply(fsm.fire(fsm_event), reply);
        Ok(())
    }

    /// Routes an ISL discovery report to the switch that received the probe.
    pub fn switch_isl_discovery(&mut self, info: &IslInfo, reply: &mut dyn SwitchReply) -> Result<()> {
        let facts = IslFacts::from(info);
        let fsm = self.locate_switch_fsm(facts.dest.switch_id)?;

        Self::apply(fsm.fire(SwitchFsmEvent::IslDiscovery(facts)), reply);
        Ok(())
    }

    // -- port layer --

    /// Creates (or replaces) the controller of one port.
    pub fn port_setup(
        &mut self,
        switch_id: SwitchId,
        facts: &PortFacts,
        reply: &mut dyn PortReply,
    ) -> Result<()> {
        let endpoint = facts.endpoint(switch_id);
        let mut fsm = PortFsm::new(endpoint);
        fsm.set_enabled(!facts.disabled);
        fsm.set_link_status(facts.link_status);
        if let Some(remote) = facts.remote {
            fsm.fire(PortFsmEvent::History(remote));
        }

        if let Some(replaced) = self.port_controller.insert(endpoint, fsm) {
            debug!(%endpoint, "Replace port FSM");
            if let Some(fsm) = self.port_controller.locate_mut(&endpoint) {
                fsm.set_discovery_cycle(replaced.discovery_cycle());
            }
        }

        audit_log!(AuditRecord::new(AuditCategory::ResourceCreate, AUDIT_SOURCE, "setup_port_fsm")
            .with_outcome(AuditOutcome::Success)
            .with_object_id(endpoint.to_string())
            .with_object_type("port")
            .with_details(serde_json::json!({
                "remote": facts.remote.map(|remote| remote.to_string()),
                "link_status": facts.link_status.map(|status| status.as_str()),
            })));

        self.port_update(endpoint, reply, |_| {})
    }

    pub fn port_remove(&mut self, endpoint: Endpoint) -> Result<()> {
        self.port_controller
            .remove(&endpoint)
            .ok_or(DiscoveryError::PortNotFound(endpoint))?;

        audit_log!(AuditRecord::new(AuditCategory::ResourceDelete, AUDIT_SOURCE, "remove_port_fsm")
            .with_outcome(AuditOutcome::Success)
            .with_object_id(endpoint.to_string())
            .with_object_type("port"));
        Ok(())
    }

    pub fn port_online_status(
        &mut self,
        endpoint: Endpoint,
        online: bool,
        reply: &mut dyn PortReply,
    ) -> Result<()> {
        self.port_update(endpoint, reply, |fsm| fsm.set_online(online))
    }

    pub fn port_management_status(
        &mut self,
        endpoint: Endpoint,
        managed: bool,
        reply: &mut dyn PortReply,
    ) -> Result<()> {
        self.port_update(endpoint, reply, |fsm| fsm.set_managed(managed))
    }

    pub fn port_link_status_sync(
        &mut self,
        endpoint: Endpoint,
        status: LinkStatus,
        reply: &mut dyn PortReply,
    ) -> Result<()> {
        self.port_update(endpoint, reply, |fsm| fsm.set_link_status(Some(status)))
    }

    /// A link terminating at `endpoint` was discovered.
    pub fn port_discovery(
        &mut self,
        endpoint: Endpoint,
        facts: &IslFacts,
        reply: &mut dyn PortReply,
    ) -> Result<()> {
        let fsm = self
            .port_controller
            .locate_mut(&endpoint)
            .ok_or(DiscoveryError::PortNotFound(endpoint))?;

        let remote = if facts.dest == endpoint {
            facts.source
        } else {
            facts.dest
        };
        fsm.set_remote(remote);

        reply.setup_isl_handler(&facts.reference(), facts);
        Ok(())
    }

    /// A postponed discovery send of `cycle` for `endpoint` is due.
    ///
    /// An active port emits a probe and schedules the next one. An inactive
    /// port ends the cycle; it restarts when the port becomes active again.
    /// A send whose cycle is no longer the port's current one is dropped,
    /// which covers removed and re-created ports.
    pub fn port_send_discovery(
        &mut self,
        endpoint: Endpoint,
        cycle: u64,
        reply: &mut dyn PortReply,
    ) -> Result<()> {
        let interval = self.options.discovery_interval_ms;
        let Some(fsm) = self.port_controller.locate_mut(&endpoint) else {
            debug!(%endpoint, cycle, "Drop discovery send for removed port");
            return Ok(());
        };
        if fsm.discovery_cycle() != Some(cycle) {
            debug!(%endpoint, cycle, current = ?fsm.discovery_cycle(), "Drop stale discovery send");
            return Ok(());
        }

        if fsm.is_active() {
            reply.send_discovery(endpoint);
            reply.schedule_discovery_send(endpoint, cycle, interval);
        } else {
            debug!(%endpoint, cycle, "Port is not active, stop discovery");
            fsm.set_discovery_cycle(None);
        }
        Ok(())
    }

    // -- inspection --

    pub fn switch_count(&self) -> usize {
        self.switch_controller.len()
    }

    pub fn switch_ids(&self) -> Vec<SwitchId> {
        self.switch_controller.keys().copied().collect()
    }

    pub fn switch_state(&self, switch_id: SwitchId) -> Option<SwitchFsmState> {
        self.switch_controller.locate(&switch_id).map(SwitchFsm::state)
    }

    pub fn switch_ports(&self, switch_id: SwitchId) -> Option<&BTreeMap<u32, PortFacts>> {
        self.switch_controller.locate(&switch_id).map(SwitchFsm::ports)
    }

    pub fn port(&self, endpoint: Endpoint) -> Option<&PortFsm> {
        self.port_controller.locate(&endpoint)
    }

    pub fn port_count(&self) -> usize {
        self.port_controller.len()
    }

    // -- private --

    fn detect_offline_switches(&mut self, sync: &SharedSync, reply: &mut dyn SwitchReply) {
        let extra: Vec<SwitchId> = self
            .switch_controller
            .keys()
            .filter(|switch_id| !sync.known_switches.contains(*switch_id))
            .copied()
            .collect();

        for switch_id in extra {
            let Some(mut fsm) = self.switch_controller.remove(&switch_id) else {
                continue;
            };
            Self::apply(fsm.fire(SwitchFsmEvent::Managed(None)), reply);
            // a later controller for this switch does not know these ports
            for endpoint in fsm.ports().keys().map(|number| Endpoint::new(switch_id, *number)) {
                reply.remove_port_handler(endpoint);
            }

            audit_log!(AuditRecord::new(AuditCategory::ResourceDelete, AUDIT_SOURCE, "evict_switch_fsm")
                .with_outcome(AuditOutcome::Success)
                .with_object_id(switch_id.to_string())
                .with_object_type("switch")
                .with_details(serde_json::json!({ "ports": fsm.ports().len() })));
        }
    }

    fn set_all_switches_unmanaged(&mut self, reply: &mut dyn SwitchReply) {
        for fsm in self.switch_controller.values_mut() {
            let from = fsm.state();
            Self::apply(fsm.fire(SwitchFsmEvent::Unmanaged), reply);
            if fsm.state() == from {
                continue;
            }

            audit_log!(AuditRecord::new(AuditCategory::ResourceModify, AUDIT_SOURCE, "unmanage_switch")
                .with_outcome(AuditOutcome::Success)
                .with_object_id(fsm.switch_id().to_string())
                .with_object_type("switch")
                .with_details(serde_json::json!({ "from": from.as_str(), "to": fsm.state().as_str() })));
        }
    }

    fn fire_switch_create_if_absent(
        &mut self,
        switch_id: SwitchId,
        event: SwitchFsmEvent,
        reply: &mut dyn SwitchReply,
    ) {
        if !self.switch_controller.contains_key(&switch_id) {
            audit_log!(AuditRecord::new(AuditCategory::ResourceCreate, AUDIT_SOURCE, "create_switch_fsm")
                .with_outcome(AuditOutcome::Success)
                .with_object_id(switch_id.to_string())
                .with_object_type("switch")
                .with_details(serde_json::json!({ "event": event.name() })));
        }

        let fsm = self.switch_controller.locate_or_create(switch_id, SwitchFsm::new);
        Self::apply(fsm.fire(event), reply);
    }

    fn locate_switch_fsm(&mut self, switch_id: SwitchId) -> Result<&mut SwitchFsm> {
        self.switch_controller
            .locate_mut(&switch_id)
            .ok_or(DiscoveryError::SwitchNotFound(switch_id))
    }

    /// Applies `change` to a port controller and starts the discovery cycle
    /// if the port is now active and none is scheduled.
    fn port_update<F>(&mut self, endpoint: Endpoint, reply: &mut dyn PortReply, change: F) -> Result<()>
    where
        F: FnOnce(&mut PortFsm),
    {
        let interval = self.options.discovery_interval_ms;
        let cycle = self.next_discovery_cycle;
        let fsm = self
            .port_controller
            .locate_mut(&endpoint)
            .ok_or(DiscoveryError::PortNotFound(endpoint))?;

        change(fsm);

        if fsm.is_active() && !fsm.is_discovery_scheduled() {
            fsm.set_discovery_cycle(Some(cycle));
            self.next_discovery_cycle = cycle.wrapping_add(1);
            reply.schedule_discovery_send(endpoint, cycle, interval);
        }
        Ok(())
    }

    fn apply(commands: Vec<crate::fsm::SwitchCommand>, reply: &mut dyn SwitchReply) {
        for command in commands {
            command.apply(reply);
        }
    }
}

impl std::fmt::Debug for DiscoveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryService")
            .field("options", &self.options)
            .field("switches", &self.switch_controller.len())
            .field("ports", &self.port_controller.len())
            .finish()
    }
}
