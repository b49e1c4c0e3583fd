//! Export helpers for writing a profiled account to disk.
//!
//! - `save_profile_csv` writes `(attribute, value)` pairs for the verdict and
//!   the raw attributes behind it.
//! - `save_raw_output_txt` keeps the captured `ldapsearch` output as-is.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::profile::Profile;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    #[serde(rename = "Attribute")]
    pub attribute: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl ExportRow {
    fn new(attribute: &str, value: impl ToString) -> Self {
        Self {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }
}

pub fn export_rows(profile: &Profile) -> Vec<ExportRow> {
    let v = &profile.verdict;
    let a = &profile.attributes;
    let mut rows = vec![
        ExportRow::new("account", &profile.account),
        ExportRow::new("object_type", v.object_type),
        ExportRow::new("service_identity", v.service_identity),
        ExportRow::new("userAccountControl", a.uac),
        ExportRow::new("userAccountControl_hex", format!("{:#x}", a.uac)),
    ];
    rows.extend(a.object_class.iter().map(|c| ExportRow::new("objectClass", c)));
    rows.extend(
        v.intended_use
            .iter()
            .map(|u| ExportRow::new("intended_use", u)),
    );
    rows
}

/// File names for one run, keyed by account and a local timestamp.
pub fn export_paths(dir: &Path, account: &str, ts: &str) -> (PathBuf, PathBuf) {
    let stem = format!("schemafirst_{}_{}", sanitize(account), ts);
    (
        dir.join(format!("{}.csv", stem)),
        dir.join(format!("{}.ldif.txt", stem)),
    )
}

fn sanitize(account: &str) -> String {
    account
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn save_profile_csv<P: AsRef<Path>>(profile: &Profile, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for r in export_rows(profile) {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_raw_output_txt<P: AsRef<Path>>(raw: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(raw.as_bytes())?;
    Ok(())
}
