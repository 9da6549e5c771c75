//! Per-port controller.
//!
//! The machine itself only knows INIT and a transient PREPOPULATE state that
//! captures a remembered remote endpoint. The rest of the struct carries the
//! flags the switch controller drives through the port layer.

use crate::model::{Endpoint, LinkStatus};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortFsmState {
    Init,
    Prepopulate,
}

impl fmt::Display for PortFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortFsmState::Init => write!(f, "INIT"),
            PortFsmState::Prepopulate => write!(f, "PREPOPULATE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortFsmEvent {
    /// Remote endpoint known from durable storage
    History(Endpoint),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortFsm {
    endpoint: Endpoint,
    state: PortFsmState,
    remote: Option<Endpoint>,
    link_status: Option<LinkStatus>,
    online: bool,
    enabled: bool,
    managed: bool,
    /// Identity of the running discovery cycle, if any
    discovery_cycle: Option<u64>,
}

impl PortFsm {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: PortFsmState::Init,
            remote: None,
            link_status: None,
            online: true,
            enabled: true,
            managed: true,
            discovery_cycle: None,
        }
    }

    /// Feeds one event through the machine.
    ///
    /// Returns `false` when the current state does not accept the event.
    pub fn fire(&mut self, event: PortFsmEvent) -> bool {
        match (self.state, event) {
            (PortFsmState::Init, PortFsmEvent::History(remote)) => {
                self.enter(PortFsmState::Prepopulate);
                self.remote = Some(remote);
                // PREPOPULATE completes immediately
                self.enter(PortFsmState::Init);
                true
            }
            (state, event) => {
                debug!(endpoint = %self.endpoint, %state, ?event, "Port FSM ignores event");
                false
            }
        }
    }

    fn enter(&mut self, next: PortFsmState) {
        debug!(endpoint = %self.endpoint, from = %self.state, to = %next, "Port FSM transition");
        self.state = next;
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn state(&self) -> PortFsmState {
        self.state
    }

    pub fn remote(&self) -> Option<Endpoint> {
        self.remote
    }

    pub fn set_remote(&mut self, remote: Endpoint) {
        self.remote = Some(remote);
    }

    pub fn link_status(&self) -> Option<LinkStatus> {
        self.link_status
    }

    pub fn set_link_status(&mut self, status: Option<LinkStatus>) {
        self.link_status = status;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn set_managed(&mut self, managed: bool) {
        self.managed = managed;
    }

    /// A port takes part in discovery only while every flag allows it and the
    /// link is up.
    pub fn is_active(&self) -> bool {
        self.online && self.enabled && self.managed && self.link_status == Some(LinkStatus::Up)
    }

    pub fn is_discovery_scheduled(&self) -> bool {
        self.discovery_cycle.is_some()
    }

    pub fn discovery_cycle(&self) -> Option<u64> {
        self.discovery_cycle
    }

    pub fn set_discovery_cycle(&mut self, cycle: Option<u64>) {
        self.discovery_cycle = cycle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SwitchId;

    fn endpoint(port: u32) -> Endpoint {
        Endpoint::new(SwitchId::new(1), port)
    }

    #[test]
    fn test_defaults() {
        let fsm = PortFsm::new(endpoint(1));
        assert_eq!(fsm.state(), PortFsmState::Init);
        assert!(fsm.is_online());
        assert!(fsm.is_enabled());
        assert!(fsm.is_managed());
        assert!(fsm.remote().is_none());
        assert!(!fsm.is_active());
    }

    #[test]
    fn test_history_records_remote_and_returns_to_init() {
        let mut fsm = PortFsm::new(endpoint(1));
        let remote = Endpoint::new(SwitchId::new(2), 7);

        assert!(fsm.fire(PortFsmEvent::History(remote)));
        assert_eq!(fsm.state(), PortFsmState::Init);
        assert_eq!(fsm.remote(), Some(remote));
    }

    #[test]
    fn test_activity_requires_all_flags() {
        let mut fsm = PortFsm::new(endpoint(1));
        fsm.set_link_status(Some(LinkStatus::Up));
        assert!(fsm.is_active());

        fsm.set_managed(false);
        assert!(!fsm.is_active());
        fsm.set_managed(true);

        fsm.set_online(false);
        assert!(!fsm.is_active());
        fsm.set_online(true);

        fsm.set_enabled(false);
        assert!(!fsm.is_active());
        fsm.set_enabled(true);

        fsm.set_link_status(Some(LinkStatus::Down));
        assert!(!fsm.is_active());
    }
}
