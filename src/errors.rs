//! Error handling module
//!
//! Every failure the resolver can produce is an [`InventoryError`]. The task
//! boundary turns it into the structured `_error` object Bolt expects, so
//! nothing escapes as a raw panic.

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Main error type for inventory resolution
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Bad or inconsistent task parameters, reported before any network I/O
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A mode the plugin recognises but deliberately does not implement
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Connecting or binding to the domain controller failed
    #[error("LDAP connection failed: {message}")]
    Connection { rc: Option<u32>, message: String },

    /// The search failed after a successful bind
    #[error("LDAP query failed: {message}")]
    Query { rc: Option<u32>, message: String },

    /// Anything else coming out of the client or the runtime
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InventoryError {
    /// Machine-readable kind reported to the orchestration tool.
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryError::Validation(_) => "bolt.plugin/validation-error",
            InventoryError::Unsupported(_) => "bolt.plugin/unsupported-operation",
            InventoryError::Connection { .. } => "bolt.plugin/ldap-connection-error",
            InventoryError::Query { .. } => "bolt.plugin/ldap-query-error",
            InventoryError::Internal(_) => "bolt.plugin/task-error",
        }
    }

    /// Server result code, when the directory reported one.
    pub fn result_code(&self) -> Option<u32> {
        match self {
            InventoryError::Connection { rc, .. } | InventoryError::Query { rc, .. } => *rc,
            _ => None,
        }
    }

    /// Classify an ldap3 failure that happened while connecting or binding.
    pub fn connection_from(err: ldap3::LdapError) -> Self {
        let (rc, message) = describe_ldap_error(&err);
        InventoryError::Connection { rc, message }
    }

    /// Classify an ldap3 failure that happened during the search.
    pub fn query_from(err: ldap3::LdapError) -> Self {
        let (rc, message) = describe_ldap_error(&err);
        InventoryError::Query { rc, message }
    }

    /// Build the serializable `_error` payload.
    pub fn to_task_error(&self) -> TaskError {
        let mut details = Map::new();
        if let Some(rc) = self.result_code() {
            details.insert("rc".to_string(), json!(rc));
            if let Some(name) = result_code_name(rc) {
                details.insert("rc_name".to_string(), json!(name));
            }
        }

        TaskError {
            kind: self.kind().to_string(),
            msg: self.to_string(),
            details: Value::Object(details),
        }
    }
}

/// Structured error object printed under the `_error` key
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskError {
    pub kind: String,
    pub msg: String,
    pub details: Value,
}

/// Split an ldap3 error into the server result code (if any) and a
/// human-readable message. The server's diagnostic text is kept verbatim.
fn describe_ldap_error(err: &ldap3::LdapError) -> (Option<u32>, String) {
    match err {
        ldap3::LdapError::LdapResult { result } => {
            let message = if result.text.is_empty() {
                format!("LDAP error code {}", result.rc)
            } else {
                format!("LDAP error code {}: {}", result.rc, result.text)
            };
            (Some(result.rc), message)
        }
        ldap3::LdapError::EndOfStream => (None, "Connection closed unexpectedly".to_string()),
        ldap3::LdapError::Io { source } => (None, format!("I/O error: {}", source)),
        ldap3::LdapError::Timeout { .. } => (None, "LDAP operation timed out".to_string()),
        other => (None, format!("LDAP error: {}", other)),
    }
}

/// Symbolic names for the result codes AD commonly returns
fn result_code_name(rc: u32) -> Option<&'static str> {
    match rc {
        1 => Some("operationsError"),
        4 => Some("sizeLimitExceeded"),
        8 => Some("strongerAuthRequired"),
        10 => Some("referral"),
        32 => Some("noSuchObject"),
        49 => Some("invalidCredentials"),
        50 => Some("insufficientAccessRights"),
        51 => Some("busy"),
        52 => Some("unavailable"),
        53 => Some("unwillingToPerform"),
        _ => None,
    }
}

impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        InventoryError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Internal(format!("JSON error: {}", err))
    }
}

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ldap3::LdapResult;

    fn ldap_result_error(rc: u32, text: &str) -> ldap3::LdapError {
        ldap3::LdapError::LdapResult {
            result: LdapResult {
                rc,
                matched: String::new(),
                text: text.to_string(),
                refs: vec![],
                ctrls: vec![],
            },
        }
    }

    #[test]
    fn test_error_display() {
        let err = InventoryError::Validation("ad_domain is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: ad_domain is required");

        let err = InventoryError::Connection { rc: Some(49), message: "bad password".to_string() };
        assert_eq!(err.to_string(), "LDAP connection failed: bad password");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            InventoryError::Validation(String::new()).kind(),
            "bolt.plugin/validation-error"
        );
        assert_eq!(
            InventoryError::Unsupported(String::new()).kind(),
            "bolt.plugin/unsupported-operation"
        );
        assert_eq!(
            InventoryError::Query { rc: None, message: String::new() }.kind(),
            "bolt.plugin/ldap-query-error"
        );
        assert_eq!(InventoryError::Internal(String::new()).kind(), "bolt.plugin/task-error");
    }

    #[test]
    fn test_bind_failure_keeps_server_code_and_text() {
        let err = InventoryError::connection_from(ldap_result_error(
            49,
            "80090308: LdapErr: DSID-0C09042A, comment: AcceptSecurityContext error",
        ));
        assert!(matches!(err, InventoryError::Connection { rc: Some(49), .. }));
        assert!(err.to_string().contains("AcceptSecurityContext error"));
    }

    #[test]
    fn test_search_failure_maps_to_query() {
        let err = InventoryError::query_from(ldap_result_error(32, "no such object"));
        assert_eq!(err.result_code(), Some(32));
        assert_eq!(err.kind(), "bolt.plugin/ldap-query-error");
    }

    #[test]
    fn test_task_error_details() {
        let err = InventoryError::query_from(ldap_result_error(50, ""));
        let task_err = err.to_task_error();
        assert_eq!(task_err.kind, "bolt.plugin/ldap-query-error");
        assert_eq!(task_err.details["rc"], 50);
        assert_eq!(task_err.details["rc_name"], "insufficientAccessRights");

        let task_err = InventoryError::Validation("x".to_string()).to_task_error();
        assert_eq!(task_err.details, json!({}));
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: InventoryError = anyhow::anyhow!("something went wrong").into();
        assert!(matches!(err, InventoryError::Internal(_)));
    }
}
