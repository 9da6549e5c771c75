//! Per-switch controller.
//!
//! Transitions are an explicit table: [`SwitchFsm::plan`] maps the current
//! state and an event onto a [`Step`] (or rejects the pair), and
//! [`SwitchFsm::fire`] runs the exit action of the old state, the entry action
//! of the new one, and the automatic completion transition that follows
//! transient states.
//!
//! ```text
//! INIT --HISTORY--> PREPOPULATE --(done)--> INIT
//! INIT --OFFLINE--> OFFLINE
//! INIT --ONLINE--> SETUP --(done)--> ONLINE_PENDING
//! ONLINE_PENDING --PORT_UP|PORT_DOWN--> PORT_PROXY --(done)--> ONLINE_PENDING
//! ONLINE_PENDING --PORT_ADD--> PORT_ADD --(done)--> ONLINE_PENDING
//! ONLINE_PENDING --PORT_DEL--> PORT_DEL --(done)--> ONLINE_PENDING
//! ONLINE_PENDING --ISL_DISCOVERY--> (internal)
//! ONLINE --UNMANAGED--> UNMANAGED
//! ONLINE --OFFLINE--> OFFLINE
//! UNMANAGED --MANAGED(reachable)--> SETUP
//! UNMANAGED --MANAGED(unreachable)--> OFFLINE
//! OFFLINE --ONLINE|MANAGED(reachable)--> SETUP
//! ```

use crate::error::Result;
use crate::model::{Endpoint, IslFacts, LinkStatus, PortFacts, SwitchId, SwitchInit, SwitchView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchFsmState {
    Init,
    Prepopulate,
    Setup,
    OnlinePending,
    PortProxy,
    PortAdd,
    PortDel,
    Unmanaged,
    Offline,
}

impl SwitchFsmState {
    /// True for the sub-states of the composite ONLINE state.
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            SwitchFsmState::OnlinePending
                | SwitchFsmState::PortProxy
                | SwitchFsmState::PortAdd
                | SwitchFsmState::PortDel
        )
    }

    /// State reached automatically once the entry action of `self` is done.
    fn completion(&self) -> Option<SwitchFsmState> {
        match self {
            SwitchFsmState::Prepopulate => Some(SwitchFsmState::Init),
            SwitchFsmState::Setup
            | SwitchFsmState::PortProxy
            | SwitchFsmState::PortAdd
            | SwitchFsmState::PortDel => Some(SwitchFsmState::OnlinePending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchFsmState::Init => "INIT",
            SwitchFsmState::Prepopulate => "PREPOPULATE",
            SwitchFsmState::Setup => "SETUP",
            SwitchFsmState::OnlinePending => "ONLINE_PENDING",
            SwitchFsmState::PortProxy => "PORT_PROXY",
            SwitchFsmState::PortAdd => "PORT_ADD",
            SwitchFsmState::PortDel => "PORT_DEL",
            SwitchFsmState::Unmanaged => "UNMANAGED",
            SwitchFsmState::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for SwitchFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live roster with every admin state already mapped onto a link status.
///
/// Building one is the only fallible part of handling an online or managed
/// signal, so it happens before a controller is looked up or touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    ports: Vec<(u32, LinkStatus)>,
}

impl Roster {
    pub fn from_view(view: &SwitchView) -> Result<Self> {
        let ports = view
            .ports
            .iter()
            .map(|port| Ok((port.number, port.link_status(view.switch_id)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { ports })
    }

    pub fn ports(&self) -> &[(u32, LinkStatus)] {
        &self.ports
    }
}

impl From<Vec<(u32, LinkStatus)>> for Roster {
    fn from(ports: Vec<(u32, LinkStatus)>) -> Self {
        Self { ports }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchFsmEvent {
    History(SwitchInit),
    Online(Roster),
    Offline,
    /// Management restored; carries the roster when the switch is reachable
    Managed(Option<Roster>),
    Unmanaged,
    PortAdd(u32),
    PortDel(u32),
    PortUp(u32),
    PortDown(u32),
    IslDiscovery(IslFacts),
}

impl SwitchFsmEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SwitchFsmEvent::History(_) => "HISTORY",
            SwitchFsmEvent::Online(_) => "ONLINE",
            SwitchFsmEvent::Offline => "OFFLINE",
            SwitchFsmEvent::Managed(_) => "MANAGED",
            SwitchFsmEvent::Unmanaged => "UNMANAGED",
            SwitchFsmEvent::PortAdd(_) => "PORT_ADD",
            SwitchFsmEvent::PortDel(_) => "PORT_DEL",
            SwitchFsmEvent::PortUp(_) => "PORT_UP",
            SwitchFsmEvent::PortDown(_) => "PORT_DOWN",
            SwitchFsmEvent::IslDiscovery(_) => "ISL_DISCOVERY",
        }
    }
}

/// Port-management command emitted by a switch controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SwitchCommand {
    SetupPort {
        switch_id: SwitchId,
        facts: PortFacts,
    },
    RemovePort {
        endpoint: Endpoint,
    },
    OnlineStatus {
        endpoint: Endpoint,
        online: bool,
    },
    ManagementStatus {
        endpoint: Endpoint,
        managed: bool,
    },
    LinkStatusSync {
        endpoint: Endpoint,
        status: LinkStatus,
    },
    PortDiscovery {
        endpoint: Endpoint,
        facts: IslFacts,
    },
}

impl SwitchCommand {
    /// Port the command is addressed to.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            SwitchCommand::SetupPort { switch_id, facts } => facts.endpoint(*switch_id),
            SwitchCommand::RemovePort { endpoint }
            | SwitchCommand::OnlineStatus { endpoint, .. }
            | SwitchCommand::ManagementStatus { endpoint, .. }
            | SwitchCommand::LinkStatusSync { endpoint, .. }
            | SwitchCommand::PortDiscovery { endpoint, .. } => *endpoint,
        }
    }
}

/// Resolved transition with the context its entry action needs.
#[derive(Debug)]
enum Step {
    Prepopulate(SwitchInit),
    Setup(Roster),
    PortAdd(u32),
    PortDel(u32),
    PortProxy(u32, LinkStatus),
    Unmanaged,
    Offline,
    IslDiscovery(IslFacts),
}

impl Step {
    /// Target state, `None` for internal transitions.
    fn target(&self) -> Option<SwitchFsmState> {
        match self {
            Step::Prepopulate(_) => Some(SwitchFsmState::Prepopulate),
            Step::Setup(_) => Some(SwitchFsmState::Setup),
            Step::PortAdd(_) => Some(SwitchFsmState::PortAdd),
            Step::PortDel(_) => Some(SwitchFsmState::PortDel),
            Step::PortProxy(..) => Some(SwitchFsmState::PortProxy),
            Step::Unmanaged => Some(SwitchFsmState::Unmanaged),
            Step::Offline => Some(SwitchFsmState::Offline),
            Step::IslDiscovery(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwitchFsm {
    switch_id: SwitchId,
    state: SwitchFsmState,
    port_by_number: BTreeMap<u32, PortFacts>,
}

impl SwitchFsm {
    pub fn new(switch_id: SwitchId) -> Self {
        Self {
            switch_id,
            state: SwitchFsmState::Init,
            port_by_number: BTreeMap::new(),
        }
    }

    pub fn switch_id(&self) -> SwitchId {
        self.switch_id
    }

    pub fn state(&self) -> SwitchFsmState {
        self.state
    }

    /// Known ports, ordered by port number.
    pub fn ports(&self) -> &BTreeMap<u32, PortFacts> {
        &self.port_by_number
    }

    /// Feeds one event through the machine and returns the commands emitted
    /// by every action it triggered, in emission order.
    ///
    /// Events the current state does not accept leave the machine untouched.
    pub fn fire(&mut self, event: SwitchFsmEvent) -> Vec<SwitchCommand> {
        let name = event.name();
        let Some(step) = self.plan(event) else {
            debug!(
                switch_id = %self.switch_id,
                state = %self.state,
                event = name,
                "Switch FSM ignores event"
            );
            return Vec::new();
        };

        let mut commands = Vec::new();
        match step.target() {
            None => self.internal(step, &mut commands),
            Some(next) => {
                if self.state == SwitchFsmState::Unmanaged && next != SwitchFsmState::Unmanaged {
                    self.unmanaged_exit(&mut commands);
                }
                self.switch_to(next, name);
                self.enter(step, &mut commands);
                if let Some(after) = next.completion() {
                    self.switch_to(after, "NEXT");
                }
            }
        }
        commands
    }

    /// The transition table.
    fn plan(&self, event: SwitchFsmEvent) -> Option<Step> {
        use SwitchFsmEvent as E;
        use SwitchFsmState as S;

        let online = self.state.is_online();
        let step = match (self.state, event) {
            (S::Init, E::History(init)) => Step::Prepopulate(init),
            (S::Init, E::Offline) => Step::Offline,
            (S::Init | S::Offline, E::Online(roster)) => Step::Setup(roster),

            (S::Init | S::Unmanaged | S::Offline, E::Managed(Some(roster))) => Step::Setup(roster),
            (S::Init | S::Unmanaged, E::Managed(None)) => Step::Offline,
            (_, E::Managed(Some(roster))) if online => Step::Setup(roster),
            (_, E::Managed(None)) if online => Step::Offline,

            (_, E::Unmanaged) if online => Step::Unmanaged,
            (_, E::Offline) if online => Step::Offline,

            (S::OnlinePending, E::PortAdd(number)) => Step::PortAdd(number),
            (S::OnlinePending, E::PortDel(number)) => Step::PortDel(number),
            (S::OnlinePending, E::PortUp(number)) => Step::PortProxy(number, LinkStatus::Up),
            (S::OnlinePending, E::PortDown(number)) => Step::PortProxy(number, LinkStatus::Down),
            (S::OnlinePending, E::IslDiscovery(facts)) => Step::IslDiscovery(facts),

            _ => return None,
        };
        Some(step)
    }

    fn switch_to(&mut self, next: SwitchFsmState, event: &'static str) {
        debug!(
            switch_id = %self.switch_id,
            from = %self.state,
            to = %next,
            event,
            "Switch FSM transition"
        );
        self.state = next;
    }

    fn enter(&mut self, step: Step, commands: &mut Vec<SwitchCommand>) {
        match step {
            Step::Prepopulate(init) => self.prepopulate_enter(init, commands),
            Step::Setup(roster) => self.setup_enter(roster, commands),
            Step::PortAdd(number) => self.port_add(PortFacts::new(number), commands),
            Step::PortDel(number) => self.port_del_enter(number, commands),
            Step::PortProxy(number, status) => self.port_proxy_enter(number, status, commands),
            Step::Unmanaged => self.all_ports_management_status(false, commands),
            Step::Offline => self.offline_enter(commands),
            Step::IslDiscovery(_) => {}
        }
    }

    fn internal(&mut self, step: Step, commands: &mut Vec<SwitchCommand>) {
        if let Step::IslDiscovery(facts) = step {
            self.isl_discovery(facts, commands);
        }
    }

    fn prepopulate_enter(&mut self, init: SwitchInit, commands: &mut Vec<SwitchCommand>) {
        for port in init.ports {
            self.port_add(port, commands);
        }
    }

    /// Reconciles the known ports against a fresh live roster.
    ///
    /// Order of emitted commands: setup of new ports (roster order), teardown
    /// of vanished ports, `online = true` for every remaining port, DOWN
    /// syncs, then UP syncs.
    fn setup_enter(&mut self, roster: Roster, commands: &mut Vec<SwitchCommand>) {
        let mut removed: Vec<u32> = self.port_by_number.keys().copied().collect();
        let mut become_up = Vec::new();
        let mut become_down = Vec::new();

        for &(number, status) in roster.ports() {
            removed.retain(|known| *known != number);

            let Some(stored) = self.port_by_number.get(&number) else {
                self.port_add(PortFacts::new(number).with_link_status(status), commands);
                continue;
            };
            if stored.link_status == Some(status) {
                continue;
            }
            match status {
                LinkStatus::Up => become_up.push(number),
                LinkStatus::Down => become_down.push(number),
            }
        }

        for number in removed {
            self.port_del(number, commands);
        }

        for port in self.port_by_number.values() {
            commands.push(SwitchCommand::OnlineStatus {
                endpoint: port.endpoint(self.switch_id),
                online: true,
            });
        }

        for number in become_down {
            self.sync_link_status(number, LinkStatus::Down, commands);
        }
        for number in become_up {
            self.sync_link_status(number, LinkStatus::Up, commands);
        }
    }

    fn port_del_enter(&mut self, number: u32, commands: &mut Vec<SwitchCommand>) {
        if !self.port_by_number.contains_key(&number) {
            info!(switch_id = %self.switch_id, port = number, "Ignore removal of unknown port");
            return;
        }
        self.port_del(number, commands);
    }

    fn port_proxy_enter(&mut self, number: u32, status: LinkStatus, commands: &mut Vec<SwitchCommand>) {
        if !self.port_by_number.contains_key(&number) {
            error!(switch_id = %self.switch_id, port = number, "Port is not listed into switch");
            return;
        }
        self.sync_link_status(number, status, commands);
    }

    fn unmanaged_exit(&mut self, commands: &mut Vec<SwitchCommand>) {
        self.all_ports_management_status(true, commands);
    }

    fn offline_enter(&mut self, commands: &mut Vec<SwitchCommand>) {
        for port in self.port_by_number.values() {
            commands.push(SwitchCommand::OnlineStatus {
                endpoint: port.endpoint(self.switch_id),
                online: false,
            });
        }
    }

    fn isl_discovery(&mut self, facts: IslFacts, commands: &mut Vec<SwitchCommand>) {
        let endpoint = facts.dest;
        let Some(port) = self.port_by_number.get_mut(&endpoint.port_number) else {
            warn!(
                switch_id = %self.switch_id,
                port = endpoint.port_number,
                "ISL discovered on port unknown to switch"
            );
            return;
        };
        port.remote = Some(facts.source);
        commands.push(SwitchCommand::PortDiscovery { endpoint, facts });
    }

    fn port_add(&mut self, facts: PortFacts, commands: &mut Vec<SwitchCommand>) {
        commands.push(SwitchCommand::SetupPort {
            switch_id: self.switch_id,
            facts: facts.clone(),
        });
        self.port_by_number.insert(facts.port_number, facts);
    }

    fn port_del(&mut self, number: u32, commands: &mut Vec<SwitchCommand>) {
        commands.push(SwitchCommand::RemovePort {
            endpoint: Endpoint::new(self.switch_id, number),
        });
        self.port_by_number.remove(&number);
    }

    fn sync_link_status(&mut self, number: u32, status: LinkStatus, commands: &mut Vec<SwitchCommand>) {
        if let Some(port) = self.port_by_number.get_mut(&number) {
            port.link_status = Some(status);
            commands.push(SwitchCommand::LinkStatusSync {
                endpoint: Endpoint::new(self.switch_id, number),
                status,
            });
        }
    }

    fn all_ports_management_status(&self, managed: bool, commands: &mut Vec<SwitchCommand>) {
        for port in self.port_by_number.values() {
            commands.push(SwitchCommand::ManagementStatus {
                endpoint: port.endpoint(self.switch_id),
                managed,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::model::{PortAdminState, SwitchPortView};
    use pretty_assertions::assert_eq;

    const SW: SwitchId = SwitchId::new(1);

    fn ep(port: u32) -> Endpoint {
        Endpoint::new(SW, port)
    }

    fn roster(ports: &[(u32, LinkStatus)]) -> Roster {
        Roster::from(ports.to_vec())
    }

    fn online_fsm(ports: &[(u32, LinkStatus)]) -> SwitchFsm {
        let mut fsm = SwitchFsm::new(SW);
        fsm.fire(SwitchFsmEvent::Online(roster(ports)));
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
        fsm
    }

    #[test]
    fn test_history_returns_to_init() {
        let mut init = SwitchInit::new(SW);
        init.add_port(PortFacts::new(1).with_remote(Endpoint::new(SwitchId::new(2), 4)));
        init.add_port(PortFacts::new(2));

        let mut fsm = SwitchFsm::new(SW);
        let commands = fsm.fire(SwitchFsmEvent::History(init.clone()));

        assert_eq!(fsm.state(), SwitchFsmState::Init);
        assert_eq!(
            commands,
            init.ports
                .iter()
                .map(|facts| SwitchCommand::SetupPort { switch_id: SW, facts: facts.clone() })
                .collect::<Vec<_>>()
        );
        assert_eq!(fsm.ports().len(), 2);
    }

    #[test]
    fn test_history_ignored_once_live() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Up)]);
        let commands = fsm.fire(SwitchFsmEvent::History(SwitchInit::new(SW)));
        assert!(commands.is_empty());
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
    }

    #[test]
    fn test_reconciliation_ordering() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Up), (2, LinkStatus::Down), (3, LinkStatus::Up)]);
        fsm.fire(SwitchFsmEvent::Offline);
        assert_eq!(fsm.state(), SwitchFsmState::Offline);

        let commands = fsm.fire(SwitchFsmEvent::Online(roster(&[
            (1, LinkStatus::Down),
            (2, LinkStatus::Down),
            (4, LinkStatus::Up),
        ])));

        assert_eq!(
            commands,
            vec![
                SwitchCommand::SetupPort {
                    switch_id: SW,
                    facts: PortFacts::new(4).with_link_status(LinkStatus::Up),
                },
                SwitchCommand::RemovePort { endpoint: ep(3) },
                SwitchCommand::OnlineStatus { endpoint: ep(1), online: true },
                SwitchCommand::OnlineStatus { endpoint: ep(2), online: true },
                SwitchCommand::OnlineStatus { endpoint: ep(4), online: true },
                SwitchCommand::LinkStatusSync { endpoint: ep(1), status: LinkStatus::Down },
            ]
        );
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
        assert_eq!(fsm.ports().keys().copied().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(fsm.ports()[&1].link_status, Some(LinkStatus::Down));
    }

    #[test]
    fn test_down_syncs_precede_up_syncs() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Down), (2, LinkStatus::Up)]);
        fsm.fire(SwitchFsmEvent::Offline);

        let commands = fsm.fire(SwitchFsmEvent::Online(roster(&[(1, LinkStatus::Up), (2, LinkStatus::Down)])));
        let syncs: Vec<_> = commands
            .into_iter()
            .filter(|c| matches!(c, SwitchCommand::LinkStatusSync { .. }))
            .collect();

        assert_eq!(
            syncs,
            vec![
                SwitchCommand::LinkStatusSync { endpoint: ep(2), status: LinkStatus::Down },
                SwitchCommand::LinkStatusSync { endpoint: ep(1), status: LinkStatus::Up },
            ]
        );
    }

    #[test]
    fn test_offline_keeps_ports() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Up), (2, LinkStatus::Up)]);
        let commands = fsm.fire(SwitchFsmEvent::Offline);

        assert_eq!(
            commands,
            vec![
                SwitchCommand::OnlineStatus { endpoint: ep(1), online: false },
                SwitchCommand::OnlineStatus { endpoint: ep(2), online: false },
            ]
        );
        assert_eq!(fsm.ports().len(), 2);
    }

    #[test]
    fn test_unmanaged_round_trip() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Up), (2, LinkStatus::Down)]);

        let commands = fsm.fire(SwitchFsmEvent::Unmanaged);
        assert_eq!(fsm.state(), SwitchFsmState::Unmanaged);
        assert_eq!(
            commands,
            vec![
                SwitchCommand::ManagementStatus { endpoint: ep(1), managed: false },
                SwitchCommand::ManagementStatus { endpoint: ep(2), managed: false },
            ]
        );

        let commands = fsm.fire(SwitchFsmEvent::Managed(Some(roster(&[
            (1, LinkStatus::Up),
            (2, LinkStatus::Down),
        ]))));
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
        assert_eq!(
            commands,
            vec![
                SwitchCommand::ManagementStatus { endpoint: ep(1), managed: true },
                SwitchCommand::ManagementStatus { endpoint: ep(2), managed: true },
                SwitchCommand::OnlineStatus { endpoint: ep(1), online: true },
                SwitchCommand::OnlineStatus { endpoint: ep(2), online: true },
            ]
        );
    }

    #[test]
    fn test_managed_without_roster_goes_offline() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Up)]);
        fsm.fire(SwitchFsmEvent::Unmanaged);

        let commands = fsm.fire(SwitchFsmEvent::Managed(None));
        assert_eq!(fsm.state(), SwitchFsmState::Offline);
        assert_eq!(
            commands,
            vec![
                SwitchCommand::ManagementStatus { endpoint: ep(1), managed: true },
                SwitchCommand::OnlineStatus { endpoint: ep(1), online: false },
            ]
        );
    }

    #[test]
    fn test_offline_ignores_managed_without_roster() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Up)]);
        fsm.fire(SwitchFsmEvent::Offline);

        assert!(fsm.fire(SwitchFsmEvent::Managed(None)).is_empty());
        assert_eq!(fsm.state(), SwitchFsmState::Offline);
    }

    #[test]
    fn test_port_events_while_online() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Down)]);

        assert_eq!(
            fsm.fire(SwitchFsmEvent::PortAdd(5)),
            vec![SwitchCommand::SetupPort { switch_id: SW, facts: PortFacts::new(5) }]
        );
        assert_eq!(
            fsm.fire(SwitchFsmEvent::PortUp(1)),
            vec![SwitchCommand::LinkStatusSync { endpoint: ep(1), status: LinkStatus::Up }]
        );
        assert_eq!(
            fsm.fire(SwitchFsmEvent::PortDel(5)),
            vec![SwitchCommand::RemovePort { endpoint: ep(5) }]
        );
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
        assert_eq!(fsm.ports().keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_port_events_for_unknown_ports_emit_nothing() {
        let mut fsm = online_fsm(&[(1, LinkStatus::Down)]);

        assert!(fsm.fire(SwitchFsmEvent::PortDel(9)).is_empty());
        assert!(fsm.fire(SwitchFsmEvent::PortDown(9)).is_empty());
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
    }

    #[test]
    fn test_port_events_ignored_while_offline() {
        let mut fsm = SwitchFsm::new(SW);
        fsm.fire(SwitchFsmEvent::Offline);

        assert!(fsm.fire(SwitchFsmEvent::PortAdd(1)).is_empty());
        assert!(fsm.ports().is_empty());
    }

    #[test]
    fn test_isl_discovery_records_remote() {
        let mut fsm = online_fsm(&[(3, LinkStatus::Up)]);
        let source = Endpoint::new(SwitchId::new(2), 8);
        let facts = IslFacts::new(source, ep(3), 10_000, 9_000);

        let commands = fsm.fire(SwitchFsmEvent::IslDiscovery(facts.clone()));

        assert_eq!(commands, vec![SwitchCommand::PortDiscovery { endpoint: ep(3), facts }]);
        assert_eq!(fsm.ports()[&3].remote, Some(source));
        assert_eq!(fsm.state(), SwitchFsmState::OnlinePending);
    }

    #[test]
    fn test_roster_rejects_unsupported_admin_state() {
        let view = SwitchView::new(
            SW,
            vec![
                SwitchPortView::new(1, PortAdminState::Up),
                SwitchPortView::new(2, PortAdminState::Unsupported("TESTING".into())),
            ],
        );

        let err = Roster::from_view(&view).unwrap_err();
        assert!(matches!(err, DiscoveryError::UnsupportedAdminState { port_number: 2, .. }));
    }

    #[test]
    fn test_command_endpoint() {
        let command = SwitchCommand::SetupPort { switch_id: SW, facts: PortFacts::new(6) };
        assert_eq!(command.endpoint(), ep(6));
    }
}
