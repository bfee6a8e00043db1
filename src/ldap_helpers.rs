//! LDAP Helper Utilities
//!
//! Extension trait for reading the handful of attributes the resolver cares
//! about from an `ldap3::SearchEntry`.

use ldap3::SearchEntry;

/// Extension trait for SearchEntry attribute extraction
///
/// Attribute names in LDAP are case-insensitive, and servers do not always
/// echo the casing that was requested, so lookups fall back to a
/// case-insensitive scan.
pub trait SearchEntryExt {
    /// All values of an attribute (empty if absent)
    fn values(&self, name: &str) -> &[String];

    /// First value of an attribute, if any
    fn first_value(&self, name: &str) -> Option<&str>;

    /// First value of an attribute, if present and non-empty
    fn first_non_empty(&self, name: &str) -> Option<&str>;

    /// Parse the first value as a signed integer (FILETIME attributes)
    fn optional_i64(&self, name: &str) -> Option<i64>;
}

impl SearchEntryExt for SearchEntry {
    fn values(&self, name: &str) -> &[String] {
        if let Some(values) = self.attrs.get(name) {
            return values;
        }

        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    fn first_value(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    fn first_non_empty(&self, name: &str) -> Option<&str> {
        self.first_value(name).filter(|v| !v.trim().is_empty())
    }

    fn optional_i64(&self, name: &str) -> Option<i64> {
        self.first_value(name).and_then(|v| v.trim().parse().ok())
    }
}

/// Attribute names read from computer objects
pub mod attrs {
    pub const DISTINGUISHED_NAME: &str = "distinguishedName";
    pub const OBJECT_CATEGORY: &str = "objectCategory";
    pub const MEMBER_OF: &str = "memberOf";
    pub const DNS_HOST_NAME: &str = "dNSHostName";
    pub const OPERATING_SYSTEM: &str = "operatingSystem";
}

/// Attributes requested for every inventory search
pub const INVENTORY_ATTRIBUTES: &[&str] = &[
    attrs::DISTINGUISHED_NAME,
    attrs::DNS_HOST_NAME,
    attrs::OPERATING_SYSTEM,
];
