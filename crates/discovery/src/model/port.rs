//! Per-port facts and the bootstrap snapshot of a switch.

use super::{Endpoint, SwitchId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    /// Link is up and operational
    Up,
    /// Link is down
    Down,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Up => "UP",
            LinkStatus::Down => "DOWN",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is known about one port of a switch.
///
/// Owned by the switch controller holding it in its port-by-number map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFacts {
    pub port_number: u32,
    /// `None` until a live roster or port event reports the status
    pub link_status: Option<LinkStatus>,
    pub disabled: bool,
    /// Peer this port is believed to connect to
    pub remote: Option<Endpoint>,
}

impl PortFacts {
    pub fn new(port_number: u32) -> Self {
        Self {
            port_number,
            link_status: None,
            disabled: false,
            remote: None,
        }
    }

    pub fn with_link_status(mut self, status: LinkStatus) -> Self {
        self.link_status = Some(status);
        self
    }

    pub fn with_remote(mut self, remote: Endpoint) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn endpoint(&self, switch_id: SwitchId) -> Endpoint {
        Endpoint::new(switch_id, self.port_number)
    }
}

/// Durable snapshot of one switch, consumed once by switch controller creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchInit {
    pub switch_id: SwitchId,
    pub ports: Vec<PortFacts>,
}

impl SwitchInit {
    pub fn new(switch_id: SwitchId) -> Self {
        Self {
            switch_id,
            ports: Vec::new(),
        }
    }

    pub fn add_port(&mut self, port: PortFacts) {
        self.ports.push(port);
    }
}
