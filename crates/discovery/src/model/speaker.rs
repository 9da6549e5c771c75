//! Events and rosters reported by the device-control (speaker) layer.

use super::{Endpoint, IslFacts, LinkStatus, SwitchId};
use crate::error::{DiscoveryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Port admin state as reported in a live roster.
///
/// Values outside the known set are preserved so they can be reported
/// instead of guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PortAdminState {
    Up,
    Down,
    Unsupported(String),
}

impl From<String> for PortAdminState {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("up") {
            PortAdminState::Up
        } else if value.eq_ignore_ascii_case("down") {
            PortAdminState::Down
        } else {
            PortAdminState::Unsupported(value)
        }
    }
}

impl From<PortAdminState> for String {
    fn from(value: PortAdminState) -> Self {
        match value {
            PortAdminState::Up => "UP".to_string(),
            PortAdminState::Down => "DOWN".to_string(),
            PortAdminState::Unsupported(raw) => raw,
        }
    }
}

/// One port of a live roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPortView {
    pub number: u32,
    pub state: PortAdminState,
}

impl SwitchPortView {
    pub fn new(number: u32, state: PortAdminState) -> Self {
        Self { number, state }
    }

    /// Maps the admin state onto a link status.
    pub fn link_status(&self, switch_id: SwitchId) -> Result<LinkStatus> {
        match &self.state {
            PortAdminState::Up => Ok(LinkStatus::Up),
            PortAdminState::Down => Ok(LinkStatus::Down),
            PortAdminState::Unsupported(raw) => Err(DiscoveryError::UnsupportedAdminState {
                switch_id,
                port_number: self.number,
                value: raw.clone(),
            }),
        }
    }
}

/// Full port list of a switch reported on (re)connect. Never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchView {
    pub switch_id: SwitchId,
    #[serde(default)]
    pub ports: Vec<SwitchPortView>,
}

impl SwitchView {
    pub fn new(switch_id: SwitchId, ports: Vec<SwitchPortView>) -> Self {
        Self { switch_id, ports }
    }
}

/// Global management mode of the device-control layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationMode {
    Managed,
    Unmanaged,
    Unsupported(String),
}

impl From<String> for OperationMode {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "MANAGED" | "MANAGED_MODE" => OperationMode::Managed,
            "UNMANAGED" | "UNMANAGED_MODE" => OperationMode::Unmanaged,
            _ => OperationMode::Unsupported(value),
        }
    }
}

impl From<OperationMode> for String {
    fn from(value: OperationMode) -> Self {
        match value {
            OperationMode::Managed => "MANAGED".to_string(),
            OperationMode::Unmanaged => "UNMANAGED".to_string(),
            OperationMode::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from(self.clone()))
    }
}

/// Signal broadcast when the device-control layer changes management mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSync {
    pub mode: OperationMode,
    /// Switches the device-control layer still knows about (MANAGED mode only)
    #[serde(default)]
    pub known_switches: HashSet<SwitchId>,
}

impl SharedSync {
    pub fn managed(known_switches: impl IntoIterator<Item = SwitchId>) -> Self {
        Self {
            mode: OperationMode::Managed,
            known_switches: known_switches.into_iter().collect(),
        }
    }

    pub fn unmanaged() -> Self {
        Self {
            mode: OperationMode::Unmanaged,
            known_switches: HashSet::new(),
        }
    }
}

/// Switch level change reported by the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchChangeType {
    Activated,
    Deactivated,
    Added,
    Removed,
    Changed,
    Validating,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchEvent {
    pub switch_id: SwitchId,
    pub state: SwitchChangeType,
    /// Live roster, present on activation
    #[serde(default)]
    pub switch_view: Option<SwitchView>,
}

/// Port level change reported by the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortChangeType {
    Add,
    Delete,
    Up,
    Down,
    OtherUpdate,
    Cached,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEvent {
    pub switch_id: SwitchId,
    pub port_number: u32,
    pub state: PortChangeType,
}

/// ISL discovery report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslInfo {
    pub source: Endpoint,
    pub destination: Endpoint,
    #[serde(default)]
    pub speed: u64,
    #[serde(default)]
    pub available_bandwidth: u64,
}

impl From<&IslInfo> for IslFacts {
    fn from(info: &IslInfo) -> Self {
        IslFacts::new(
            info.source,
            info.destination,
            info.speed,
            info.available_bandwidth,
        )
    }
}
