//! Profile: turns captured query output into a classified account.
//!
//! The only success signal available from `ldapsearch` output is the literal
//! `objectClass:` marker. A failure message that happens to contain it is
//! misread as success; the exit status is only logged when it disagrees.
//!
//! ```no_run
//! use schemafirst::{credentials::QueryCredentials, profile::Profile, query::QueryRunner};
//! # fn main() -> anyhow::Result<()> {
//! let creds = QueryCredentials::new("dc01", "corp.local", "svc_sql", "pw");
//! let output = QueryRunner::default().query(&creds)?;
//! let profile = Profile::from_output(&creds.username, &output)?;
//! println!("{}", schemafirst::report::render_report(&profile));
//! # Ok(())
//! # }
//! ```
use log::debug;

use crate::classify::{Verdict, classify};
use crate::ldif::{Attributes, ParseError, parse_attributes};
use crate::query::QueryOutput;

/// Marker whose presence in the captured output means the lookup returned the
/// account.
pub const SUCCESS_MARKER: &str = "objectClass:";

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("LDAP query failed")]
    QueryFailed { raw: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub account: String,
    pub attributes: Attributes,
    pub verdict: Verdict,
}

impl Profile {
    pub fn from_output(account: &str, output: &QueryOutput) -> Result<Self, ProfileError> {
        if output.success() != has_success_marker(&output.text) {
            debug!(
                "exit status {:?} disagrees with output marker check",
                output.status
            );
        }
        Self::from_text(account, &output.text)
    }

    pub fn from_text(account: &str, text: &str) -> Result<Self, ProfileError> {
        if !has_success_marker(text) {
            return Err(ProfileError::QueryFailed {
                raw: text.to_string(),
            });
        }
        let attributes = parse_attributes(text)?;
        debug!(
            "parsed attributes: classes={:?} spn={} uac={:#x}",
            attributes.object_class, attributes.spn, attributes.uac
        );
        let verdict = classify(&attributes);
        Ok(Self {
            account: account.to_string(),
            attributes,
            verdict,
        })
    }
}

pub fn has_success_marker(text: &str) -> bool {
    text.contains(SUCCESS_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ObjectType;

    #[test]
    fn missing_marker_keeps_raw_output() {
        let raw = "ldap_bind: Invalid credentials (49)\n\tadditional info: 80090308\n";
        match Profile::from_text("bob", raw) {
            Err(ProfileError::QueryFailed { raw: r }) => assert_eq!(r, raw),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn marker_is_case_sensitive() {
        assert!(!has_success_marker("objectclass: user"));
        assert!(has_success_marker("objectClass: user"));
    }

    #[test]
    fn classifies_successful_output() {
        let p = Profile::from_text(
            "gmsa_web$",
            "dn: CN=gmsa_web,CN=Managed Service Accounts,DC=corp,DC=local\n\
             objectClass: top\n\
             objectClass: msDS-GroupManagedServiceAccount\n\
             servicePrincipalName: HTTP/web01.corp.local\n\
             userAccountControl: 4096\n",
        )
        .unwrap();
        assert_eq!(p.account, "gmsa_web$");
        assert_eq!(p.verdict.object_type, ObjectType::Gmsa);
        assert!(p.verdict.service_identity);
        assert_eq!(p.attributes.uac, 4096);
    }

    #[test]
    fn status_does_not_override_marker() {
        let out = QueryOutput {
            text: "objectClass: user\nuserAccountControl: 512\n".to_string(),
            status: Some(4),
        };
        let p = Profile::from_output("alice", &out).unwrap();
        assert_eq!(p.verdict.object_type, ObjectType::User);
    }

    #[test]
    fn bad_uac_surfaces_as_parse_error() {
        let err = Profile::from_text("x", "objectClass: user\nuserAccountControl: 0x200\n")
            .unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
        assert_eq!(
            err.to_string(),
            "could not parse userAccountControl value: 0x200"
        );
    }
}
