//! Output capabilities handed to the orchestrator with every call.
//!
//! The orchestrator never performs I/O. Everything it wants done outside its
//! own maps goes through one of these traits, implemented by whatever owns
//! the orchestrator (a worker, a test recorder).

use crate::fsm::SwitchCommand;
use crate::model::{Endpoint, IslFacts, IslReference, LinkStatus, PortFacts, SwitchId, SwitchInit};

/// Receives bootstrap snapshots produced by [`super::DiscoveryService::prepopulate`].
pub trait SwitchPrepopulateReply {
    fn prepopulate_switch(&mut self, init: SwitchInit);
}

/// Receives port-management commands emitted by switch controllers.
pub trait SwitchReply {
    /// Spawn a port controller for a newly introduced port.
    fn setup_port_handler(&mut self, switch_id: SwitchId, facts: &PortFacts);

    /// Tear down the port controller of a vanished port.
    fn remove_port_handler(&mut self, endpoint: Endpoint);

    fn set_online_status(&mut self, endpoint: Endpoint, online: bool);

    fn set_management_status(&mut self, endpoint: Endpoint, managed: bool);

    fn sync_port_link_status(&mut self, endpoint: Endpoint, status: LinkStatus);

    /// A link was discovered terminating at `endpoint`.
    fn notify_port_discovery(&mut self, endpoint: Endpoint, facts: &IslFacts);
}

/// Receives requests emitted by the port layer.
pub trait PortReply {
    /// Ask the link layer to track the link identified by `reference`.
    fn setup_isl_handler(&mut self, reference: &IslReference, facts: &IslFacts);

    /// Postpone a discovery send of `cycle` for `endpoint` by `delay_ms`.
    ///
    /// The cycle is handed back to `port_send_discovery` when the send is due.
    fn schedule_discovery_send(&mut self, endpoint: Endpoint, cycle: u64, delay_ms: u64);

    /// Emit a discovery probe out of `endpoint`.
    fn send_discovery(&mut self, endpoint: Endpoint);
}

impl SwitchCommand {
    /// Delivers the command to the matching reply call.
    pub fn apply(self, reply: &mut dyn SwitchReply) {
        match self {
            SwitchCommand::SetupPort { switch_id, facts } => reply.setup_port_handler(switch_id, &facts),
            SwitchCommand::RemovePort { endpoint } => reply.remove_port_handler(endpoint),
            SwitchCommand::OnlineStatus { endpoint, online } => reply.set_online_status(endpoint, online),
            SwitchCommand::ManagementStatus { endpoint, managed } => {
                reply.set_management_status(endpoint, managed)
            }
            SwitchCommand::LinkStatusSync { endpoint, status } => {
                reply.sync_port_link_status(endpoint, status)
            }
            SwitchCommand::PortDiscovery { endpoint, facts } => {
                reply.notify_port_discovery(endpoint, &facts)
            }
        }
    }
}

/// Collects commands in emission order.
impl SwitchReply for Vec<SwitchCommand> {
    fn setup_port_handler(&mut self, switch_id: SwitchId, facts: &PortFacts) {
        self.push(SwitchCommand::SetupPort {
            switch_id,
            facts: facts.clone(),
        });
    }

    fn remove_port_handler(&mut self, endpoint: Endpoint) {
        self.push(SwitchCommand::RemovePort { endpoint });
    }

    fn set_online_status(&mut self, endpoint: Endpoint, online: bool) {
        self.push(SwitchCommand::OnlineStatus { endpoint, online });
    }

    fn set_management_status(&mut self, endpoint: Endpoint, managed: bool) {
        self.push(SwitchCommand::ManagementStatus { endpoint, managed });
    }

    fn sync_port_link_status(&mut self, endpoint: Endpoint, status: LinkStatus) {
        self.push(SwitchCommand::LinkStatusSync { endpoint, status });
    }

    fn notify_port_discovery(&mut self, endpoint: Endpoint, facts: &IslFacts) {
        self.push(SwitchCommand::PortDiscovery {
            endpoint,
            facts: facts.clone(),
        });
    }
}

impl SwitchPrepopulateReply for Vec<SwitchInit> {
    fn prepopulate_switch(&mut self, init: SwitchInit) {
        self.push(init);
    }
}
