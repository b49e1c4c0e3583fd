//! Interactive collection of the four query inputs.
//!
//! On a terminal the password is read with echo disabled. When stdin is a
//! pipe the password is read as an ordinary line so runs can be scripted.
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use zeroize::Zeroizing;

use crate::credentials::QueryCredentials;

const PROMPT_SERVER: &str = "DC IP / Hostname             : ";
const PROMPT_DOMAIN: &str = "AD Domain (e.g. domain.local): ";
const PROMPT_USER: &str = "Username to profile          : ";
const PROMPT_PASSWORD: &str = "Password (hidden)            : ";

/// Prompt on stdin/stdout. Echo is suppressed for the password when stdin is
/// a terminal.
pub fn collect_credentials() -> Result<QueryCredentials> {
    let stdin = io::stdin();
    let masked = stdin.is_terminal();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    collect_from(&mut input, &mut out, masked)
}

/// Prompt using explicit reader/writer. With `masked` set the password is read
/// from the controlling terminal instead of `input`.
pub fn collect_from<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    masked: bool,
) -> Result<QueryCredentials> {
    writeln!(out, "{}", "\nActive Directory Identity Profiler\n".cyan().bold())?;

    let server = read_field(input, out, PROMPT_SERVER, "DC address")?;
    let domain = read_field(input, out, PROMPT_DOMAIN, "domain")?;
    let username = read_field(input, out, PROMPT_USER, "username")?;

    write!(out, "{}", PROMPT_PASSWORD)?;
    out.flush()?;
    let password = if masked {
        Zeroizing::new(rpassword::read_password().context("failed to read password")?)
    } else {
        let mut buf = Zeroizing::new(String::new());
        let n = input
            .read_line(&mut buf)
            .context("failed to read password")?;
        if n == 0 {
            bail!("unexpected end of input while reading password");
        }
        let keep = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(keep);
        writeln!(out)?;
        buf
    };

    Ok(QueryCredentials {
        server,
        domain,
        username,
        password,
    })
}

fn read_field<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    what: &str,
) -> Result<String> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut line = String::new();
    let n = input
        .read_line(&mut line)
        .with_context(|| format!("failed to read {}", what))?;
    if n == 0 {
        bail!("unexpected end of input while reading {}", what);
    }
    Ok(line.trim().to_string())
}
