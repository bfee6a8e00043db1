//! Inventory resolution
//!
//! Drives one resolution end to end: prepare the query, bind, stream the
//! search through the classifier and mapper, and return the targets in the
//! order the directory delivered them. The first failure ends the
//! resolution and no partial list is returned.

use chrono::{DateTime, Utc};
use ldap3::SearchEntry;
use tracing::{debug, info};

use crate::classify::{classify_transport, should_exclude};
use crate::directory::{DirectoryClient, LdapDirectory};
use crate::errors::Result;
use crate::filetime::directory_time_to_rfc3339;
use crate::filter::{build_filter, search_attributes};
use crate::ldap_helpers::SearchEntryExt;
use crate::options::QueryOptions;
use crate::target::{to_target_record, TargetRecord};

/// Resolve targets against a live domain controller.
pub fn resolve(options: &QueryOptions) -> Result<Vec<TargetRecord>> {
    let mut directory = LdapDirectory::connect(&options.domain_controller, options.tls_skip_verify)?;
    let result = resolve_targets(&mut directory, options, Utc::now());
    directory.close();
    result
}

/// Resolve targets through an already-connected directory client.
///
/// `now` anchors the age cutoff, if one is configured.
pub fn resolve_targets<C: DirectoryClient + ?Sized>(
    client: &mut C,
    options: &QueryOptions,
    now: DateTime<Utc>,
) -> Result<Vec<TargetRecord>> {
    let base = options.search_base()?;
    let filter = build_filter(options, now)?.to_string();
    let attributes = search_attributes(options);

    client.bind(options.credentials.as_ref())?;

    let mut targets = Vec::new();
    client.search(&base, &filter, &attributes, &mut |entry: SearchEntry| {
        fold_entry(&mut targets, &entry, options);
    })?;

    info!("Resolved {} targets from {}", targets.len(), base);
    Ok(targets)
}

/// Apply the exclusion rules and mapping to one entry, appending the target
/// (if any) to `targets`.
pub fn fold_entry(targets: &mut Vec<TargetRecord>, entry: &SearchEntry, options: &QueryOptions) {
    if let Some(max_age) = &options.max_age {
        if let Some(ticks) = entry.optional_i64(&max_age.attribute) {
            debug!(
                "{}: {} = {}",
                entry.dn,
                max_age.attribute,
                directory_time_to_rfc3339(ticks)
            );
        }
    }

    if should_exclude(entry, &options.ignore_dns_hostnames) {
        debug!("Skipping {}: no usable dNSHostName or hostname is ignored", entry.dn);
        return;
    }

    let transport = classify_transport(entry, options.calculate_transport);
    if let Some(target) = to_target_record(entry, transport) {
        debug!("Adding target {} ({:?})", target.uri, transport);
        targets.push(target);
    }
}
