//! Wire shapes of the daemon: speaker events in, link-layer requests out.
//!
//! Both directions are newline-delimited JSON, one tagged object per line.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use topo_discovery::{
    Endpoint, IslFacts, IslInfo, IslReference, PortEvent, SharedSync, SwitchEvent, SwitchId,
    SwitchInit, SwitchView,
};

/// Event reported by the device-control (speaker) layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeakerEvent {
    Switch(SwitchEvent),
    Port(PortEvent),
    Isl(IslInfo),
    /// Management of a reachable switch restored after a speaker outage
    RestoreManagement(SwitchView),
    SharedSync(SharedSync),
}

/// Where the router delivers an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Partition owning this switch
    Switch(SwitchId),
    /// Every partition
    Broadcast,
}

impl SpeakerEvent {
    /// Decodes one input line.
    pub fn decode(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn route(&self) -> Route {
        match self {
            SpeakerEvent::Switch(event) => Route::Switch(event.switch_id),
            SpeakerEvent::Port(event) => Route::Switch(event.switch_id),
            // handled by the switch that received the probe
            SpeakerEvent::Isl(info) => Route::Switch(info.destination.switch_id),
            SpeakerEvent::RestoreManagement(view) => Route::Switch(view.switch_id),
            SpeakerEvent::SharedSync(_) => Route::Broadcast,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SpeakerEvent::Switch(_) => "switch",
            SpeakerEvent::Port(_) => "port",
            SpeakerEvent::Isl(_) => "isl",
            SpeakerEvent::RestoreManagement(_) => "restore_management",
            SpeakerEvent::SharedSync(_) => "shared_sync",
        }
    }
}

/// Input of one discovery worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerInput {
    Speaker(SpeakerEvent),
    /// Durable snapshot produced by the preloader
    Prepopulate(SwitchInit),
    /// Monotonic time in milliseconds
    Tick(u64),
}

/// Request for the link layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    SetupIslHandler {
        reference: IslReference,
        facts: IslFacts,
    },
    DiscoveryRequest {
        endpoint: Endpoint,
    },
}
