//! Query credentials collected from the operator and the identities derived
//! from them: the search base DN and the simple-bind identity.
//!
//! The password lives in a [`Zeroizing`] buffer and is wiped when the
//! credentials are dropped. It is still handed to `ldapsearch` as a process
//! argument, so anyone able to list processes on the host can observe it.
use std::fmt;

use zeroize::Zeroizing;

/// Parameters for a single account lookup.
#[derive(Clone)]
pub struct QueryCredentials {
    pub server: String,
    pub domain: String,
    pub username: String,
    pub password: Zeroizing<String>,
}

impl fmt::Debug for QueryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCredentials")
            .field("server", &self.server)
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl QueryCredentials {
    pub fn new(
        server: impl Into<String>,
        domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            domain: domain.into(),
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Search base derived from the domain, e.g. `DC=corp,DC=local`.
    pub fn base_dn(&self) -> String {
        domain_to_base_dn(&self.domain)
    }

    /// Simple-bind identity in UPN form: `user@domain`.
    pub fn bind_identity(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }

    pub fn server_url(&self) -> String {
        format!("ldap://{}", self.server)
    }
}

/// Map each dot-separated label of `domain` to a `DC=` component.
///
/// No escaping is applied; labels containing LDAP special characters produce
/// a DN that the directory will likely reject.
pub fn domain_to_base_dn(domain: &str) -> String {
    domain
        .split('.')
        .map(|part| format!("DC={}", part))
        .collect::<Vec<_>>()
        .join(",")
}
