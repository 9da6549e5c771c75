//! Audit trail for topology controller lifecycle.
//!
//! Creation and eviction of switch controllers and setup/removal of port
//! controllers are recorded as structured [`AuditRecord`]s on the `audit`
//! tracing target, so an operator can reconstruct when the controller started
//! or stopped tracking a piece of the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of topology change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditCategory {
    /// A controller started tracking an object
    ResourceCreate,
    /// A tracked object changed state
    ResourceModify,
    /// A controller stopped tracking an object
    ResourceDelete,
    /// Bootstrap from durable storage
    Bootstrap,
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditCategory::ResourceCreate => write!(f, "RESOURCE_CREATE"),
            AuditCategory::ResourceModify => write!(f, "RESOURCE_MODIFY"),
            AuditCategory::ResourceDelete => write!(f, "RESOURCE_DELETE"),
            AuditCategory::Bootstrap => write!(f, "BOOTSTRAP"),
        }
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    InProgress,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure => write!(f, "failure"),
            AuditOutcome::InProgress => write!(f, "in_progress"),
        }
    }
}

/// Structured audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// UTC time the record was built
    pub timestamp: DateTime<Utc>,

    pub category: AuditCategory,

    /// Component emitting the record
    pub source: String,

    pub action: String,

    pub outcome: AuditOutcome,

    /// Switch id or endpoint the action applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// "switch", "port", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    /// Create a new audit record stamped with the current time.
    ///
    /// The outcome defaults to `InProgress` until explicitly set.
    pub fn new(
        category: AuditCategory,
        source: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            category,
            source: source.into(),
            action: action.into(),
            outcome: AuditOutcome::InProgress,
            object_id: None,
            object_type: None,
            details: None,
            error: None,
        }
    }

    pub fn with_outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_object_id(mut self, id: impl Into<String>) -> Self {
        self.object_id = Some(id.into());
        self
    }

    pub fn with_object_type(mut self, obj_type: impl Into<String>) -> Self {
        self.object_type = Some(obj_type.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Set the error message and mark the outcome as failure.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.outcome = AuditOutcome::Failure;
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization_failed","message":"{}"}}"#, e))
    }
}

/// Emits an [`AuditRecord`] on the `audit` target.
///
/// Successful and in-progress records are logged at info level, failures at
/// warn level with the error attached.
///
/// ```ignore
/// let record = AuditRecord::new(AuditCategory::ResourceCreate, "DiscoveryService", "create_switch_fsm")
///     .with_outcome(AuditOutcome::Success)
///     .with_object_id(switch_id.to_string())
///     .with_object_type("switch");
/// audit_log!(record);
/// ```
#[macro_export]
macro_rules! audit_log {
    ($record:expr) => {
        let record = $record;
        match record.outcome {
            $crate::audit::AuditOutcome::Success | $crate::audit::AuditOutcome::InProgress => {
                tracing::info!(
                    target: "audit",
                    category = %record.category,
                    source = %record.source,
                    action = %record.action,
                    outcome = %record.outcome,
                    audit_json = %record.to_json(),
                    "AUDIT: {} - {} - {}",
                    record.category,
                    record.action,
                    record.outcome
                );
            }
            $crate::audit::AuditOutcome::Failure => {
                tracing::warn!(
                    target: "audit",
                    category = %record.category,
                    source = %record.source,
                    action = %record.action,
                    outcome = %record.outcome,
                    error = record.error.as_deref().unwrap_or(""),
                    audit_json = %record.to_json(),
                    "AUDIT: {} - {} - {}",
                    record.category,
                    record.action,
                    record.outcome
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_record_creation() {
        let record = AuditRecord::new(AuditCategory::ResourceCreate, "DiscoveryService", "create_switch_fsm")
            .with_outcome(AuditOutcome::Success)
            .with_object_id("00:00:00:00:00:00:00:01")
            .with_object_type("switch");

        assert_eq!(record.category, AuditCategory::ResourceCreate);
        assert_eq!(record.outcome, AuditOutcome::Success);
        assert_eq!(record.object_type.as_deref(), Some("switch"));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_audit_record_with_error() {
        let record = AuditRecord::new(AuditCategory::ResourceDelete, "DiscoveryService", "remove_port")
            .with_error("port controller missing");

        assert_eq!(record.outcome, AuditOutcome::Failure);
        assert_eq!(record.error.as_deref(), Some("port controller missing"));
    }

    #[test]
    fn test_audit_record_json_serialization() {
        let record = AuditRecord::new(AuditCategory::Bootstrap, "DiscoveryService", "prepopulate")
            .with_outcome(AuditOutcome::Success)
            .with_details(serde_json::json!({"switches": 3}));

        let json = record.to_json();
        assert!(json.contains("\"category\":\"BOOTSTRAP\""));
        assert!(json.contains("\"outcome\":\"success\""));
        assert!(json.contains("\"switches\":3"));
        assert!(!json.contains("object_id"));
    }

    #[test]
    fn test_audit_category_display() {
        assert_eq!(AuditCategory::ResourceDelete.to_string(), "RESOURCE_DELETE");
        assert_eq!(AuditOutcome::InProgress.to_string(), "in_progress");
    }
}
