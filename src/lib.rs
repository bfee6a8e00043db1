//! Active Directory inventory plugin
//!
//! Resolves Bolt targets from AD computer objects. The domain controller is
//! queried over LDAP for `objectCategory=computer`, optionally narrowed by
//! group membership and by the age of a timestamp attribute. Each entry with
//! a `dNSHostName` becomes a target. The target's transport is guessed from
//! `operatingSystem`.

pub mod classify;
pub mod directory;
pub mod errors;
pub mod filetime;
pub mod filter;
pub mod inventory;
pub mod ldap_helpers;
pub mod ldap_utils;
pub mod options;
pub mod secure_types;
pub mod target;
pub mod task;

pub use classify::TransportHint;
pub use directory::{DirectoryClient, LdapDirectory};
pub use errors::{InventoryError, Result, TaskError};
pub use inventory::{resolve, resolve_targets};
pub use options::{AgeFilter, QueryOptions, RawOptions};
pub use target::{TargetConfig, TargetRecord};
pub use task::TaskOutput;
