//! Error types for discoveryd

use thiserror::Error;
use topo_discovery::DiscoveryError;

/// Discovery daemon errors
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Orchestrator or durable store error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Inbound event could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A worker or writer channel was closed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DaemonError {
    /// Structural errors point at an upstream ordering bug or a protocol
    /// mismatch rather than bad data.
    pub fn is_structural(&self) -> bool {
        matches!(self, DaemonError::Discovery(e) if e.is_structural())
    }
}

/// Result type for discoveryd operations
pub type Result<T> = std::result::Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use topo_discovery::SwitchId;

    #[test]
    fn test_error_display() {
        let err = DaemonError::Configuration("workers must be > 0".to_string());
        assert_eq!(err.to_string(), "Configuration error: workers must be > 0");
    }

    #[test]
    fn test_discovery_error_wraps() {
        let err: DaemonError = DiscoveryError::SwitchNotFound(SwitchId::new(2)).into();
        assert!(err.is_structural());
        assert_eq!(
            err.to_string(),
            "Discovery error: Switch FSM not found (00:00:00:00:00:00:00:02)"
        );
    }

    #[test]
    fn test_channel_closed_is_not_structural() {
        assert!(!DaemonError::ChannelClosed("worker 0".into()).is_structural());
    }
}
