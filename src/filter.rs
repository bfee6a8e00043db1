//! Search filter construction
//!
//! Filters are built as a small predicate tree and rendered to RFC 4515 text
//! only when handed to the directory client.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::errors::{InventoryError, Result};
use crate::filetime::cutoff_ticks;
use crate::ldap_helpers::{attrs, INVENTORY_ATTRIBUTES};
use crate::ldap_utils::escape_ldap_filter;
use crate::options::QueryOptions;

/// LDAP search filter predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `(attribute=value)`
    Equals { attribute: String, value: String },

    /// `(attribute>=value)`
    GreaterOrEqual { attribute: String, value: String },

    /// `(&...)`
    And { filters: Vec<Filter> },
}

impl Filter {
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals { attribute: attribute.into(), value: value.into() }
    }

    pub fn ge(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::GreaterOrEqual { attribute: attribute.into(), value: value.into() }
    }

    /// Conjunction. A single clause is returned unwrapped.
    pub fn and(mut filters: Vec<Filter>) -> Self {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            Filter::And { filters }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Equals { attribute, value } => {
                write!(f, "({}={})", attribute, escape_ldap_filter(value))
            }
            Filter::GreaterOrEqual { attribute, value } => {
                write!(f, "({}>={})", attribute, escape_ldap_filter(value))
            }
            Filter::And { filters } => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Build the computer search filter for `options`, with age cutoffs measured
/// from `now`.
///
/// Fails with a validation error when the age cutoff falls outside the range
/// of directory timestamps.
pub fn build_filter(options: &QueryOptions, now: DateTime<Utc>) -> Result<Filter> {
    let mut clauses = vec![Filter::eq(attrs::OBJECT_CATEGORY, "computer")];

    if let Some(max_age) = &options.max_age {
        let cutoff = cutoff_ticks(now, max_age.days).ok_or_else(|| {
            InventoryError::Validation(format!(
                "ignore_older_than_days {} reaches before the earliest directory timestamp",
                max_age.days
            ))
        })?;
        clauses.push(Filter::ge(max_age.attribute.as_str(), cutoff.to_string()));
    }

    if let Some(group_dn) = &options.member_of_group_dn {
        clauses.push(Filter::eq(attrs::MEMBER_OF, group_dn.as_str()));
    }

    Ok(Filter::and(clauses))
}

/// Attributes to request. The age attribute is echoed back so it can be
/// logged alongside each entry.
pub fn search_attributes(options: &QueryOptions) -> Vec<String> {
    let mut attributes: Vec<String> = INVENTORY_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
    if let Some(max_age) = &options.max_age {
        if !attributes.iter().any(|a| a.eq_ignore_ascii_case(&max_age.attribute)) {
            attributes.push(max_age.attribute.clone());
        }
    }
    attributes
}
