//! Human-readable report rendering for terminal output.
//!
//! Every section is a two-column ASCII table with fixed 30-character columns.
//! Cells are padded by their printable width so colored values line up;
//! values longer than a column overflow it rather than wrap.
use colored::*;

use crate::classify::ObjectType;
use crate::profile::Profile;

pub const COL_WIDTH: usize = 30;

pub const DOCTRINE: &str = "Identify the object → Eliminate invalid attacks → Enumerate trust";

/// One `(attribute, value)` table row; values may carry ANSI color.
pub type Row = (String, String);

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(visible_len(s));
    format!("{}{}", s, " ".repeat(fill))
}

fn section_header(title: &str) -> String {
    format!("\n{}\n", format!("[{}]", title).cyan().bold())
}

fn border() -> String {
    format!(
        "+{}+{}+\n",
        "-".repeat(COL_WIDTH + 2),
        "-".repeat(COL_WIDTH + 2)
    )
}

fn row_line(key: &str, value: &str) -> String {
    format!("| {} | {} |\n", pad(key, COL_WIDTH), pad(value, COL_WIDTH))
}

pub fn render_table(title: &str, rows: &[Row]) -> String {
    let mut out = section_header(title);
    out.push_str(&border());
    out.push_str(&row_line("ATTRIBUTE", "VALUE"));
    out.push_str(&border());
    for (k, v) in rows {
        out.push_str(&row_line(k, v));
    }
    out.push_str(&border());
    out
}

fn row(key: &str, value: impl ToString) -> Row {
    (key.to_string(), value.to_string())
}

pub fn identity_summary_rows(profile: &Profile) -> Vec<Row> {
    let verdict = &profile.verdict;
    let schema = match verdict.object_type {
        ObjectType::User => "Standard AD User".green(),
        other => other.as_str().yellow(),
    };
    let service = if verdict.service_identity {
        "YES".red()
    } else {
        "NO".green()
    };
    vec![
        row("Account", &profile.account),
        row("Schema Object", schema),
        row("Service Identity", service),
    ]
}

pub fn verification_rows() -> Vec<Row> {
    vec![
        row("Primary Tool", "ldapsearch (authoritative)".green()),
        row("Secondary Tool", "bloodyAD (schema-consistent)".green()),
    ]
}

pub fn intended_use_rows(profile: &Profile) -> Vec<Row> {
    profile
        .verdict
        .intended_use
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let value = if label.to_lowercase().contains("service") {
                label.yellow().to_string()
            } else {
                label.clone()
            };
            (format!("Use-{}", i + 1), value)
        })
        .collect()
}

pub fn operator_decision_rows(profile: &Profile) -> Vec<Row> {
    if profile.verdict.is_plain_user() {
        vec![
            row("Kerberos Attacks", "NOT APPLICABLE".red()),
            row("Primary Risk Surface", "Permissions / trust abuse".yellow()),
        ]
    } else {
        vec![row(
            "Primary Risk Surface",
            "Kerberos & delegation abuse".yellow(),
        )]
    }
}

pub fn next_enumeration_rows(profile: &Profile) -> Vec<Row> {
    let steps: &[&str] = if profile.verdict.object_type == ObjectType::User {
        &[
            "LDAP write permissions (GenericWrite / WriteDACL)",
            "Computer object control (RBCD)",
            "Group-based delegated trust",
        ]
    } else {
        &["Delegation paths", "Kerberos ticket exposure"]
    };
    steps
        .iter()
        .enumerate()
        .map(|(i, s)| (format!("Next-{}", i + 1), s.to_string()))
        .collect()
}

/// Full report: all tables followed by the doctrine line.
pub fn render_report(profile: &Profile) -> String {
    let mut out = String::new();
    out.push_str(&render_table(
        "IDENTITY SUMMARY",
        &identity_summary_rows(profile),
    ));
    out.push_str(&render_table("VERIFICATION (MOAT)", &verification_rows()));
    out.push_str(&render_table(
        "INFERRED INTENDED USE",
        &intended_use_rows(profile),
    ));
    out.push_str(&render_table(
        "OPERATOR DECISION",
        &operator_decision_rows(profile),
    ));
    out.push_str(&render_table(
        "NEXT ENUMERATION AXIS",
        &next_enumeration_rows(profile),
    ));
    out.push_str(&section_header("DOCTRINE"));
    out.push_str(DOCTRINE);
    out.push_str("\n\n");
    out
}

/// Failure banner followed by whatever the query tool printed.
pub fn render_query_failure(raw: &str) -> String {
    format!("{}\n{}", "\n[!] LDAP query failed\n".red(), raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    fn profile(text: &str) -> Profile {
        Profile::from_text("svc_test", text).unwrap()
    }

    fn body_rows(table: &str) -> Vec<&str> {
        table.lines().filter(|l| l.starts_with('|')).collect()
    }

    #[test]
    fn operator_decision_table() {
        colored::control::set_override(false);
        let p = profile("objectClass: user\nuserAccountControl: 512\n");
        let table = render_table("OPERATOR DECISION", &operator_decision_rows(&p));
        insta::assert_snapshot!(table.trim());
    }

    #[test]
    fn padding_ignores_color_codes() {
        let red = "\u{1b}[31mYES\u{1b}[0m";
        assert_eq!(visible_len(red), 3);
        assert_eq!(visible_len(&pad(red, COL_WIDTH)), COL_WIDTH);
    }

    #[test]
    fn long_values_overflow_without_truncation() {
        let value = "LDAP write permissions (GenericWrite / WriteDACL)";
        let t = render_table("X", &[row("Next-1", value)]);
        assert!(t.contains(&format!("| {} |", value)));
    }

    #[test]
    fn plain_user_report_sections() {
        let p = profile("objectClass: top\nobjectClass: user\nuserAccountControl: 66048\n");
        let r = render_report(&p);
        for title in [
            "[IDENTITY SUMMARY]",
            "[VERIFICATION (MOAT)]",
            "[INFERRED INTENDED USE]",
            "[OPERATOR DECISION]",
            "[NEXT ENUMERATION AXIS]",
            "[DOCTRINE]",
        ] {
            assert!(r.contains(title), "missing {}", title);
        }
        assert!(r.contains("Standard AD User"));
        assert!(r.contains("NOT APPLICABLE"));
        assert!(r.contains("Password does not expire"));
        assert!(r.contains("Next-3"));
        assert!(r.contains(DOCTRINE));
    }

    #[test]
    fn service_account_gets_kerberos_decision() {
        let p = profile(
            "objectClass: msDS-ManagedServiceAccount\nservicePrincipalName: HTTP/x\nuserAccountControl: 4096\n",
        );
        let decision = operator_decision_rows(&p);
        assert_eq!(decision.len(), 1);
        assert_eq!(decision[0].0, "Primary Risk Surface");
        assert!(decision[0].1.contains("Kerberos & delegation abuse"));

        let next = next_enumeration_rows(&p);
        assert_eq!(
            next.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>(),
            vec!["Delegation paths", "Kerberos ticket exposure"]
        );
        let summary = identity_summary_rows(&p);
        assert!(summary[1].1.contains("MSA"));
        assert!(summary[2].1.contains("YES"));
    }

    #[test]
    fn user_with_spn_is_not_plain() {
        let p = profile("objectClass: user\nservicePrincipalName: MSSQLSvc/db\n");
        let decision = operator_decision_rows(&p);
        assert_eq!(decision.len(), 1);
        // still a USER, so user-oriented next steps apply
        assert_eq!(next_enumeration_rows(&p).len(), 3);
    }

    #[test]
    fn intended_use_rows_are_numbered() {
        let p = profile("objectClass: user\nservicePrincipalName: a\nuserAccountControl: 65568\n");
        let rows = intended_use_rows(&p);
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Use-1", "Use-2", "Use-3"]);
    }

    #[test]
    fn rows_have_fixed_width_frame() {
        let p = profile("objectClass: user\n");
        let t = render_table("IDENTITY SUMMARY", &identity_summary_rows(&p));
        for line in body_rows(&t) {
            assert_eq!(visible_len(line), 2 * COL_WIDTH + 7, "{:?}", line);
        }
    }
}
