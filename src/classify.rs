//! Per-entry exclusion and transport classification

use std::collections::HashSet;

use ldap3::SearchEntry;
use serde::{Deserialize, Serialize};

use crate::ldap_helpers::{attrs, SearchEntryExt};

/// Connection protocol suggested for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportHint {
    Winrm,
    Ssh,
    /// No hint. Never serialized; the record omits `config` instead.
    Unset,
}

/// True when the entry must not become a target: it has no usable
/// `dNSHostName`, or its first hostname is on the block list.
///
/// Hostnames are compared exactly as the directory returns them.
pub fn should_exclude(entry: &SearchEntry, blocked_hostnames: &HashSet<String>) -> bool {
    match entry.first_non_empty(attrs::DNS_HOST_NAME) {
        Some(hostname) => blocked_hostnames.contains(hostname),
        None => true,
    }
}

/// Guess the transport from `operatingSystem`.
///
/// This is a heuristic, not OS detection: any OS string containing
/// "windows" (any case) is WinRM, every other non-empty string is SSH, and
/// entries without an OS get no hint.
pub fn classify_transport(entry: &SearchEntry, enabled: bool) -> TransportHint {
    if !enabled {
        return TransportHint::Unset;
    }

    match entry.first_value(attrs::OPERATING_SYSTEM) {
        None | Some("") => TransportHint::Unset,
        Some(os) if os.to_lowercase().contains("windows") => TransportHint::Winrm,
        Some(_) => TransportHint::Ssh,
    }
}
