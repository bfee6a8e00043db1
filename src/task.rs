//! Bolt task boundary
//!
//! Turns a parameter document into the JSON object Bolt reads from the
//! task's stdout: `{"value": [...]}` on success, `{"_error": {...}}` on any
//! failure.

use serde::Serialize;
use tracing::error;

use crate::directory::DirectoryClient;
use crate::errors::{InventoryError, Result, TaskError};
use crate::inventory::{resolve, resolve_targets};
use crate::options::{QueryOptions, RawOptions};
use crate::target::TargetRecord;

/// Task result document
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TaskOutput {
    Value { value: Vec<TargetRecord> },
    Error { _error: TaskError },
}

impl TaskOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, TaskOutput::Error { .. })
    }
}

impl From<Result<Vec<TargetRecord>>> for TaskOutput {
    fn from(result: Result<Vec<TargetRecord>>) -> Self {
        match result {
            Ok(value) => TaskOutput::Value { value },
            Err(e) => {
                error!("Inventory resolution failed: {}", e);
                TaskOutput::Error { _error: e.to_task_error() }
            }
        }
    }
}

/// Run the task against a live domain controller.
pub fn run(raw: RawOptions) -> TaskOutput {
    QueryOptions::from_raw(raw).and_then(|options| resolve(&options)).into()
}

/// Run the task from a JSON parameter document.
pub fn run_json(input: &str) -> TaskOutput {
    match RawOptions::from_json(input) {
        Ok(raw) => run(raw),
        Err(e) => TaskOutput::from(Err::<Vec<TargetRecord>, InventoryError>(e)),
    }
}

/// Run the task through a caller-supplied client. The client is only
/// touched once the parameters have validated.
pub fn run_with<C: DirectoryClient + ?Sized>(raw: RawOptions, client: &mut C) -> TaskOutput {
    QueryOptions::from_raw(raw)
        .and_then(|options| resolve_targets(client, &options, chrono::Utc::now()))
        .into()
}

/// Options for manual runs against a lab domain
pub fn sample_options() -> RawOptions {
    RawOptions {
        ad_domain: Some("bolt.local".to_string()),
        domain_controller: Some("192.168.200.200".to_string()),
        user: Some("BOLT\\Administrator".to_string()),
        password: Some("Password1".to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_shape() {
        let output = TaskOutput::from(Ok(vec![TargetRecord {
            name: "CN=h,DC=corp,DC=local".to_string(),
            uri: "h.corp.local".to_string(),
            config: None,
        }]));
        assert!(!output.is_error());
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"value": [{"name": "CN=h,DC=corp,DC=local", "uri": "h.corp.local"}]})
        );
    }

    #[test]
    fn test_error_shape() {
        let output = run_json(r#"{"domain_controller": "dc01"}"#);
        assert!(output.is_error());
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["_error"]["kind"], "bolt.plugin/validation-error");
        assert!(value["_error"]["msg"].as_str().unwrap().contains("ad_domain"));
        assert!(value.get("value").is_none());
    }

    #[test]
    fn test_unparseable_parameters() {
        let value = serde_json::to_value(run_json("[1, 2")).unwrap();
        assert_eq!(value["_error"]["kind"], "bolt.plugin/validation-error");
    }

    #[test]
    fn test_sample_options_validate() {
        let options = QueryOptions::from_raw(sample_options()).unwrap();
        assert_eq!(options.domain_controller, "192.168.200.200");
        assert!(options.credentials.is_some());
    }
}
