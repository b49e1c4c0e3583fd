//! CLI entrypoint for `schemafirst`.
//!
//! Prompts for the directory server, domain and account credentials, runs
//! `ldapsearch` for that account, classifies what comes back and prints the
//! operator report. Optionally keeps a CSV of the verdict and the raw query
//! output when an output directory is provided.
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{LevelFilter, error, info};
use schemafirst::{
    export::{export_paths, save_profile_csv, save_raw_output_txt},
    profile::{Profile, ProfileError},
    prompt::collect_credentials,
    query::{DEFAULT_LDAPSEARCH, DEFAULT_TIMEOUT_SECS, QueryRunner},
    report::{render_query_failure, render_report},
};

const EXIT_QUERY_FAILED: i32 = 1;
const EXIT_TOOL: i32 = 2;
const EXIT_CLASSIFY: i32 = 3;
const EXIT_INPUT: i32 = 4;
const EXIT_EXPORT: i32 = 5;

#[derive(Parser, Debug)]
#[command(
    name = "schemafirst",
    version,
    about = "Active Directory identity profiler: schema object, intended use, next steps"
)]
struct Args {
    /// External LDAP query binary
    #[arg(long = "ldapsearch", default_value = DEFAULT_LDAPSEARCH)]
    ldapsearch: String,

    /// Query timeout in seconds. If zero, wait indefinitely.
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Directory to save the verdict CSV and raw query output
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }

    let creds = match collect_credentials() {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            process::exit(EXIT_INPUT);
        }
    };
    info!(
        "querying {} for {} (base {})",
        creds.server_url(),
        creds.username,
        creds.base_dn()
    );

    let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));
    let runner = QueryRunner::new(args.ldapsearch, timeout);
    let result = runner.query(&creds);
    drop(creds.password);
    let output = match result {
        Ok(o) => o,
        Err(e) => {
            error!("{}", e);
            process::exit(EXIT_TOOL);
        }
    };

    let profile = match Profile::from_output(&creds.username, &output) {
        Ok(p) => p,
        Err(ProfileError::QueryFailed { raw }) => {
            println!("{}", render_query_failure(&raw));
            process::exit(EXIT_QUERY_FAILED);
        }
        Err(e @ ProfileError::Parse(_)) => {
            error!("{}", e);
            process::exit(EXIT_CLASSIFY);
        }
    };

    print!("{}", render_report(&profile));

    if let Some(outdir) = args.output {
        if let Err(e) = fs::create_dir_all(&outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            process::exit(EXIT_EXPORT);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S").to_string();
        let (csv, txt) = export_paths(&outdir, &profile.account, &ts);
        if let Err(e) = save_profile_csv(&profile, &csv) {
            error!("failed to write {}: {:#}", csv.display(), e);
            process::exit(EXIT_EXPORT);
        }
        if let Err(e) = save_raw_output_txt(&output.text, &txt) {
            error!("failed to write {}: {:#}", txt.display(), e);
            process::exit(EXIT_EXPORT);
        }
        info!("saved {} and {}", csv.display(), txt.display());
    }
}
