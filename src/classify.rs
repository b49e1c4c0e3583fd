//! Account classification from schema classes and userAccountControl flags.
//!
//! Object type is decided by the first matching class in a fixed priority:
//! gMSA, then MSA, then plain user. Intended-use labels are produced by an
//! ordered flag table so report output stays stable between runs.
use std::collections::HashSet;
use std::fmt;

use crate::ldif::Attributes;

pub const CLASS_GMSA: &str = "msds-groupmanagedserviceaccount";
pub const CLASS_MSA: &str = "msds-managedserviceaccount";
pub const CLASS_USER: &str = "user";

pub const LABEL_SPN: &str = "Kerberos-backed service identity";
pub const LABEL_GENERIC: &str = "Generic interactive / operational user";

/// userAccountControl bits that map to an intended-use label, in report order.
pub const UAC_LABELS: [(u32, &str); 4] = [
    (0x10000, "Password does not expire"),
    (0x200000, "Trusted for delegation"),
    (0x100000, "Marked as not delegated"),
    (0x20, "Password not required"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Gmsa,
    Msa,
    User,
    Unknown,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Gmsa => "gMSA",
            ObjectType::Msa => "MSA",
            ObjectType::User => "USER",
            ObjectType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub object_type: ObjectType,
    pub service_identity: bool,
    /// Never empty.
    pub intended_use: Vec<String>,
}

impl Verdict {
    /// A plain user account with no SPN, for which Kerberos service attacks
    /// do not apply.
    pub fn is_plain_user(&self) -> bool {
        self.object_type == ObjectType::User && !self.service_identity
    }
}

pub fn object_type<S: AsRef<str>>(object_class: &[S]) -> ObjectType {
    let classes: HashSet<String> = object_class
        .iter()
        .map(|c| c.as_ref().to_lowercase())
        .collect();
    if classes.contains(CLASS_GMSA) {
        ObjectType::Gmsa
    } else if classes.contains(CLASS_MSA) {
        ObjectType::Msa
    } else if classes.contains(CLASS_USER) {
        ObjectType::User
    } else {
        ObjectType::Unknown
    }
}

pub fn intended_use(spn: bool, uac: u32) -> Vec<String> {
    let mut labels = Vec::new();
    if spn {
        labels.push(LABEL_SPN.to_string());
    }
    for (bit, label) in UAC_LABELS {
        if uac & bit != 0 {
            labels.push(label.to_string());
        }
    }
    if labels.is_empty() {
        labels.push(LABEL_GENERIC.to_string());
    }
    labels
}

pub fn classify(attrs: &Attributes) -> Verdict {
    Verdict {
        object_type: object_type(&attrs.object_class),
        service_identity: attrs.spn,
        intended_use: intended_use(attrs.spn, attrs.uac),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldif::parse_attributes;

    #[test]
    fn gmsa_wins_regardless_of_other_classes() {
        let classes = [
            "top",
            "user",
            "msDS-ManagedServiceAccount",
            "MSDS-GROUPMANAGEDSERVICEACCOUNT",
        ];
        assert_eq!(object_type(&classes), ObjectType::Gmsa);
    }

    #[test]
    fn msa_beats_user() {
        assert_eq!(
            object_type(&["computer", "user", "msDS-ManagedServiceAccount"]),
            ObjectType::Msa
        );
    }

    #[test]
    fn plain_user_and_unknown() {
        assert_eq!(object_type(&["USER"]), ObjectType::User);
        assert_eq!(object_type(&["top", "group"]), ObjectType::Unknown);
        assert_eq!(object_type::<&str>(&[]), ObjectType::Unknown);
    }

    #[test]
    fn dont_expire_only() {
        assert_eq!(intended_use(false, 0x10000), vec!["Password does not expire"]);
    }

    #[test]
    fn fallback_label_when_nothing_matches() {
        assert_eq!(
            intended_use(false, 0),
            vec!["Generic interactive / operational user"]
        );
        // NORMAL_ACCOUNT and ACCOUNTDISABLE carry no label
        assert_eq!(intended_use(false, 0x200 | 0x2), vec![LABEL_GENERIC]);
    }

    #[test]
    fn labels_follow_fixed_order() {
        let all = 0x20 | 0x100000 | 0x200000 | 0x10000;
        assert_eq!(
            intended_use(true, all),
            vec![
                "Kerberos-backed service identity",
                "Password does not expire",
                "Trusted for delegation",
                "Marked as not delegated",
                "Password not required",
            ]
        );
    }

    #[test]
    fn parsed_user_with_normal_and_dont_expire() {
        let attrs = parse_attributes("objectClass: user\nuserAccountControl: 66048\n").unwrap();
        let v = classify(&attrs);
        assert_eq!(v.object_type, ObjectType::User);
        assert!(!v.service_identity);
        assert_eq!(v.intended_use, vec!["Password does not expire"]);
        assert!(v.is_plain_user());
    }

    #[test]
    fn spn_marks_service_identity() {
        let attrs = Attributes {
            object_class: vec!["msDS-GroupManagedServiceAccount".into()],
            spn: true,
            uac: 0x1000,
        };
        let v = classify(&attrs);
        assert_eq!(v.object_type.to_string(), "gMSA");
        assert!(v.service_identity);
        assert_eq!(v.intended_use, vec![LABEL_SPN]);
        assert!(!v.is_plain_user());
    }
}
