//! Task parameters
//!
//! `RawOptions` mirrors the JSON parameter map Bolt hands to the plugin.
//! `QueryOptions::from_raw` validates it once, before any network I/O, and
//! the result is read-only for the rest of the resolution.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{InventoryError, Result};
use crate::ldap_utils::{domain_to_base_dn, is_valid_attribute_name};
use crate::secure_types::Credentials;

/// Parameter map as supplied by the caller. Unknown keys such as `_task`
/// or `_installdir` are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawOptions {
    #[serde(default)]
    pub ad_domain: Option<String>,

    #[serde(default)]
    pub domain_controller: Option<String>,

    #[serde(default, alias = "username")]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Group-object search by name. Not implemented.
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub member_of_group_dn: Option<String>,

    #[serde(default)]
    pub ignore_older_than_attribute: Option<String>,

    #[serde(default)]
    pub ignore_older_than_days: Option<u32>,

    #[serde(default)]
    pub ignore_dns_hostnames: Option<Vec<String>>,

    #[serde(default)]
    pub calculate_transport: Option<bool>,

    #[serde(default)]
    pub tls_skip_verify: Option<bool>,
}

impl RawOptions {
    /// Parse the JSON parameter document. A malformed document is the
    /// caller's fault, so it surfaces as a validation error.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| InventoryError::Validation(format!("Invalid task parameters: {}", e)))
    }
}

/// Exclude entries whose age attribute is older than `days`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeFilter {
    pub attribute: String,
    pub days: u32,
}

/// Validated options for one resolution
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub domain: String,
    pub domain_controller: String,
    pub credentials: Option<Credentials>,
    pub member_of_group_dn: Option<String>,
    pub max_age: Option<AgeFilter>,
    pub ignore_dns_hostnames: HashSet<String>,
    pub calculate_transport: bool,
    pub tls_skip_verify: bool,
}

impl QueryOptions {
    pub fn from_raw(raw: RawOptions) -> Result<Self> {
        let domain = non_empty(raw.ad_domain).ok_or_else(|| {
            InventoryError::Validation(
                "The Active Directory inventory plugin requires the ad_domain".to_string(),
            )
        })?;
        // Reject malformed domains here rather than after connecting
        domain_to_base_dn(&domain)?;

        let max_age = match (non_empty(raw.ignore_older_than_attribute), raw.ignore_older_than_days) {
            (Some(attribute), Some(days)) => {
                if !is_valid_attribute_name(&attribute) {
                    return Err(InventoryError::Validation(format!(
                        "ignore_older_than_attribute '{}' is not a valid attribute name",
                        attribute
                    )));
                }
                Some(AgeFilter { attribute, days })
            }
            (None, None) => None,
            _ => {
                return Err(InventoryError::Validation(
                    "ignore_older_than_attribute and ignore_older_than_days must be \
                     specified together"
                        .to_string(),
                ));
            }
        };

        if non_empty(raw.group).is_some() {
            return Err(InventoryError::Unsupported(
                "Searching by group object is not implemented; use member_of_group_dn \
                 with the group's distinguished name instead"
                    .to_string(),
            ));
        }

        let domain_controller = non_empty(raw.domain_controller).unwrap_or_else(|| domain.clone());
        let credentials = Credentials::from_pair(non_empty(raw.user), raw.password);

        let options = Self {
            domain,
            domain_controller,
            credentials,
            member_of_group_dn: non_empty(raw.member_of_group_dn),
            max_age,
            ignore_dns_hostnames: raw.ignore_dns_hostnames.unwrap_or_default().into_iter().collect(),
            calculate_transport: raw.calculate_transport.unwrap_or(true),
            tls_skip_verify: raw.tls_skip_verify.unwrap_or(false),
        };

        debug!(
            domain = %options.domain,
            controller = %options.domain_controller,
            authenticated = options.credentials.is_some(),
            "validated inventory options"
        );

        Ok(options)
    }

    /// Search base derived from the domain name.
    pub fn search_base(&self) -> Result<String> {
        domain_to_base_dn(&self.domain)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
