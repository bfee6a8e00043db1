//! LDAP Utilities
//!
//! Filter-value escaping (RFC 4515), attribute descriptor checks (RFC 4512)
//! and search base derivation from a DNS domain name.

use crate::errors::{InventoryError, Result};

/// Escapes a string for safe use as an assertion value in a search filter.
///
/// - `*` -> `\2a`
/// - `(` -> `\28`
/// - `)` -> `\29`
/// - `\` -> `\5c`
/// - NUL -> `\00`
pub fn escape_ldap_filter(input: &str) -> String {
    input.chars().fold(String::with_capacity(input.len()), |mut acc, c| {
        match c {
            '*' => acc.push_str("\\2a"),
            '(' => acc.push_str("\\28"),
            ')' => acc.push_str("\\29"),
            '\\' => acc.push_str("\\5c"),
            '\0' => acc.push_str("\\00"),
            _ => acc.push(c),
        }
        acc
    })
}

/// Checks that `name` is a plain attribute descriptor (`keystring` in
/// RFC 4512): a letter followed by letters, digits or hyphens.
///
/// Attribute names are spliced into the filter unescaped, so anything else
/// is rejected.
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    }
}

/// Convert a DNS domain name to an LDAP search base.
///
/// `corp.example.com` becomes `DC=corp,DC=example,DC=com`. A single trailing
/// dot (fully-qualified form) is accepted; empty labels are not.
pub fn domain_to_base_dn(domain: &str) -> Result<String> {
    let domain = domain.trim();
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        return Err(InventoryError::Validation(
            "The Active Directory inventory plugin requires the ad_domain".to_string(),
        ));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.iter().any(|label| label.trim().is_empty()) {
        return Err(InventoryError::Validation(format!(
            "ad_domain '{}' contains an empty label",
            domain
        )));
    }

    Ok(labels
        .iter()
        .map(|label| format!("DC={}", label.trim()))
        .collect::<Vec<_>>()
        .join(","))
}
