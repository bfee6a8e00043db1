//! Directory client
//!
//! The resolver talks to the directory through [`DirectoryClient`]: one
//! bind, then one streaming search whose entries are handed to a callback
//! as they arrive. [`LdapDirectory`] implements it on top of the blocking
//! `ldap3::LdapConn`, with timeouts on every operation so an unreachable or
//! stalled controller cannot hang the task.

use std::time::Duration;

use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{LdapConn, LdapConnSettings, Scope, SearchEntry};
use tracing::{debug, error, info, warn};

use crate::errors::{InventoryError, Result};
use crate::secure_types::Credentials;

/// Connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bind timeout
pub const DEFAULT_BIND_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for each request of a paged search
pub const PAGED_SEARCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Page size for the Simple Paged Results control. AD caps unpaged searches
/// at 1000 entries.
pub const DEFAULT_PAGE_SIZE: i32 = 500;

/// The two directory operations the resolver needs.
pub trait DirectoryClient {
    /// Authenticate. `None` performs an anonymous bind.
    fn bind(&mut self, credentials: Option<&Credentials>) -> Result<()>;

    /// Subtree search under `base`. Each entry is passed to `on_entry` in
    /// delivery order. An error is returned if the search as a whole fails,
    /// even after some entries were delivered.
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
        on_entry: &mut dyn FnMut(SearchEntry),
    ) -> Result<()>;
}

/// Build the connection URL for a controller address.
///
/// A bare host gets `ldap://`. An address ending in `:636`, or given
/// with an explicit `ldaps://` scheme, uses LDAPS.
pub fn controller_url(controller: &str) -> String {
    let controller = controller.trim();
    if controller.starts_with("ldap://") || controller.starts_with("ldaps://") {
        return controller.to_string();
    }

    if controller.ends_with(":636") {
        format!("ldaps://{}", controller)
    } else {
        format!("ldap://{}", controller)
    }
}

/// `DirectoryClient` backed by a blocking ldap3 connection
pub struct LdapDirectory {
    conn: LdapConn,
    url: String,
}

impl LdapDirectory {
    /// Open a connection to the domain controller.
    pub fn connect(controller: &str, tls_skip_verify: bool) -> Result<Self> {
        let url = controller_url(controller);
        info!("Connecting to LDAP server: {}", url);

        let settings = LdapConnSettings::new()
            .set_conn_timeout(DEFAULT_CONNECT_TIMEOUT)
            .set_no_tls_verify(tls_skip_verify);

        let conn = LdapConn::with_settings(settings, &url).map_err(|e| {
            error!("LDAP connection failed to {}: {}", url, e);
            InventoryError::connection_from(e)
        })?;

        debug!("TCP connection established to {}", url);
        Ok(Self { conn, url })
    }

    /// Unbind from the server. Failures only get logged; the connection
    /// is dropped either way.
    pub fn close(mut self) {
        if let Err(e) = self.conn.unbind() {
            warn!("Unbind from {} failed (connection will be dropped): {}", self.url, e);
        }
    }
}

impl DirectoryClient for LdapDirectory {
    fn bind(&mut self, credentials: Option<&Credentials>) -> Result<()> {
        let (username, password) = match credentials {
            Some(creds) => (creds.username(), creds.password()),
            None => ("", ""),
        };

        let result = self
            .conn
            .with_timeout(DEFAULT_BIND_TIMEOUT)
            .simple_bind(username, password)
            .and_then(|res| res.success());

        match result {
            Ok(_) => {
                if credentials.is_some() {
                    info!("LDAP bind successful as {}", username);
                } else {
                    info!("LDAP anonymous bind successful");
                }
                Ok(())
            }
            Err(e) => {
                error!("LDAP bind failed on {}: {}", self.url, e);
                Err(InventoryError::connection_from(e))
            }
        }
    }

    fn search(
        &mut self,
        base: &str,
        filter: &str,
        attributes: &[String],
        on_entry: &mut dyn FnMut(SearchEntry),
    ) -> Result<()> {
        info!(
            "Starting paged search in {} with filter {} (page_size: {}, timeout: {}s)",
            base,
            filter,
            DEFAULT_PAGE_SIZE,
            PAGED_SEARCH_TIMEOUT.as_secs()
        );

        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(DEFAULT_PAGE_SIZE)),
        ];

        let mut stream = self
            .conn
            .with_timeout(PAGED_SEARCH_TIMEOUT)
            .streaming_search_with(adapters, base, Scope::Subtree, filter, attributes.to_vec())
            .map_err(InventoryError::query_from)?;

        let mut delivered = 0usize;
        loop {
            match stream.next() {
                Ok(Some(entry)) => {
                    delivered += 1;
                    on_entry(SearchEntry::construct(entry));
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Search failed after {} entries: {}", delivered, e);
                    return Err(InventoryError::query_from(e));
                }
            }
        }

        let result = stream.result();
        match result.success() {
            Ok(_) => {
                info!("Search returned {} entries", delivered);
                Ok(())
            }
            Err(e) => {
                error!("Search failed after {} entries: {}", delivered, e);
                Err(InventoryError::query_from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_url_defaults_to_ldap() {
        assert_eq!(controller_url("corp.local"), "ldap://corp.local");
        assert_eq!(controller_url("192.168.200.200"), "ldap://192.168.200.200");
        assert_eq!(controller_url("dc01.corp.local:389"), "ldap://dc01.corp.local:389");
    }

    #[test]
    fn test_controller_url_ldaps() {
        assert_eq!(controller_url("dc01.corp.local:636"), "ldaps://dc01.corp.local:636");
        assert_eq!(controller_url("ldaps://dc01.corp.local"), "ldaps://dc01.corp.local");
        assert_eq!(controller_url("ldap://dc01.corp.local"), "ldap://dc01.corp.local");
    }
}
