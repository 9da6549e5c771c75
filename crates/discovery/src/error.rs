//! Error types for topology discovery

use crate::model::{Endpoint, SwitchId};
use thiserror::Error;

/// Topology discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// No switch controller exists for an event that requires one
    #[error("Switch FSM not found ({0})")]
    SwitchNotFound(SwitchId),

    /// No port controller exists for an event that requires one
    #[error("Port FSM not found ({0})")]
    PortNotFound(Endpoint),

    /// Live roster carries an admin state this controller does not understand
    #[error("Unsupported port admin state value {value} ({switch_id} port {port_number})")]
    UnsupportedAdminState {
        switch_id: SwitchId,
        port_number: u32,
        value: String,
    },

    /// Shared sync carries an operation mode this controller does not understand
    #[error("Unsupported operation mode value {0}")]
    UnsupportedOperationMode(String),

    /// Switch activation arrived without the live port roster
    #[error("Switch {0} activated without a port roster")]
    MissingSwitchView(SwitchId),

    /// Endpoint failed validation
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Switch identifier could not be parsed
    #[error("Invalid switch id: {0}")]
    InvalidSwitchId(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DiscoveryError {
    /// Returns true for invariant violations: an event delivered out of causal
    /// order or a value outside the known protocol set.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiscoveryError::SwitchNotFound(_)
                | DiscoveryError::PortNotFound(_)
                | DiscoveryError::UnsupportedAdminState { .. }
                | DiscoveryError::UnsupportedOperationMode(_)
                | DiscoveryError::MissingSwitchView(_)
        )
    }
}

/// Result type for topology discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
