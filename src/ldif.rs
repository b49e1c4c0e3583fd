//! Line-oriented parser for `ldapsearch -LLL` output.
//!
//! Only the three attributes the tool requests are picked up; every other
//! line (the `dn:` line, referrals, error text) is ignored.
use std::sync::LazyLock;

use regex::Regex;

static ATTRIBUTE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(objectclass|serviceprincipalname|useraccountcontrol):(.*)$")
        .expect("attribute line pattern is valid")
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("could not parse userAccountControl value: {raw}")]
    UserAccountControl { raw: String },
}

/// Attributes of the queried account relevant to classification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Every objectClass value in the order seen, duplicates kept.
    pub object_class: Vec<String>,
    /// Whether any servicePrincipalName line was present.
    pub spn: bool,
    /// Last userAccountControl value seen, 0 when absent.
    pub uac: u32,
}

pub fn parse_attributes(contents: &str) -> Result<Attributes, ParseError> {
    let mut attrs = Attributes::default();
    for line in contents.lines() {
        let Some(caps) = ATTRIBUTE_LINE.captures(line) else {
            continue;
        };
        let value = caps[2].trim();
        match caps[1].to_ascii_lowercase().as_str() {
            "objectclass" => attrs.object_class.push(value.to_string()),
            "serviceprincipalname" => attrs.spn = true,
            "useraccountcontrol" => {
                attrs.uac = value
                    .parse::<u32>()
                    .map_err(|_| ParseError::UserAccountControl {
                        raw: value.to_string(),
                    })?;
            }
            _ => {}
        }
    }
    Ok(attrs)
}
