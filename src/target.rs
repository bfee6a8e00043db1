//! Inventory target records

use ldap3::SearchEntry;
use serde::{Deserialize, Serialize};

use crate::classify::TransportHint;
use crate::ldap_helpers::{attrs, SearchEntryExt};

/// One Bolt target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub name: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TargetConfig>,
}

/// Per-target connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub transport: TransportHint,
}

/// Turn a directory entry into a target.
///
/// Returns `None` for entries without a usable `dNSHostName`; this is the
/// final gate regardless of what the classifier decided.
pub fn to_target_record(entry: &SearchEntry, transport: TransportHint) -> Option<TargetRecord> {
    let uri = entry.first_non_empty(attrs::DNS_HOST_NAME)?;

    let config = match transport {
        TransportHint::Unset => None,
        transport => Some(TargetConfig { transport }),
    };

    Some(TargetRecord {
        name: entry.dn.clone(),
        uri: uri.to_string(),
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn entry(dn: &str, hostnames: Vec<&str>) -> SearchEntry {
        let mut attrs = HashMap::new();
        attrs.insert(
            "dNSHostName".to_string(),
            hostnames.into_iter().map(String::from).collect(),
        );
        SearchEntry { dn: dn.to_string(), attrs, bin_attrs: HashMap::new() }
    }

    #[test]
    fn test_record_uses_dn_and_first_hostname() {
        let record = to_target_record(
            &entry("CN=host1,DC=corp,DC=local", vec!["host1.corp.local", "alias.corp.local"]),
            TransportHint::Winrm,
        )
        .unwrap();

        assert_eq!(record.name, "CN=host1,DC=corp,DC=local");
        assert_eq!(record.uri, "host1.corp.local");
        assert_eq!(record.config, Some(TargetConfig { transport: TransportHint::Winrm }));
    }

    #[test]
    fn test_no_hostname_no_record() {
        assert!(to_target_record(&entry("CN=x,DC=corp,DC=local", vec![]), TransportHint::Ssh).is_none());
        assert!(to_target_record(&entry("CN=x,DC=corp,DC=local", vec![""]), TransportHint::Ssh).is_none());
    }

    #[test]
    fn test_unset_transport_omits_config() {
        let record = to_target_record(
            &entry("CN=host2,DC=corp,DC=local", vec!["host2.corp.local"]),
            TransportHint::Unset,
        )
        .unwrap();

        assert_eq!(record.config, None);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"name": "CN=host2,DC=corp,DC=local", "uri": "host2.corp.local"})
        );
    }

    #[test]
    fn test_serialized_shape_with_transport() {
        let record = to_target_record(
            &entry("CN=host3,DC=corp,DC=local", vec!["host3.corp.local"]),
            TransportHint::Ssh,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "name": "CN=host3,DC=corp,DC=local",
                "uri": "host3.corp.local",
                "config": {"transport": "ssh"}
            })
        );
    }
}
