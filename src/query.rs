//! Runs the external `ldapsearch` binary and captures what it prints.
//!
//! stdout and stderr share one pipe, so the captured text keeps the order the
//! tool wrote it in. It is returned whatever the exit status; deciding whether
//! the query worked is left to the caller. The pipe is drained on a helper
//! thread so a chatty child cannot stall on a full pipe while we wait on it,
//! and the timeout covers both the child and the drain.
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use zeroize::Zeroizing;

use crate::credentials::QueryCredentials;

/// Default external binary.
pub const DEFAULT_LDAPSEARCH: &str = "ldapsearch";
/// Default wall-clock limit for the external query.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Attributes requested for the profiled account.
pub const REQUESTED_ATTRIBUTES: [&str; 3] =
    ["objectClass", "servicePrincipalName", "userAccountControl"];

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("could not execute external query tool `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("external query tool `{program}` timed out after {limit:?}")]
    Timeout { program: String, limit: Duration },
    #[error("failed waiting on external query tool: {0}")]
    Wait(#[source] io::Error),
}

/// Captured text of a finished query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    pub text: String,
    /// Exit code, `None` when the child was terminated by a signal.
    pub status: Option<i32>,
}

impl QueryOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Argument list for a simple-bind, LDIF-only lookup of one account.
pub fn build_args(creds: &QueryCredentials) -> Vec<String> {
    let mut args = vec![
        "-x".to_string(),
        "-LLL".to_string(),
        "-H".to_string(),
        creds.server_url(),
        "-D".to_string(),
        creds.bind_identity(),
        "-w".to_string(),
        creds.password.to_string(),
        "-b".to_string(),
        creds.base_dn(),
        format!("(sAMAccountName={})", creds.username),
    ];
    args.extend(REQUESTED_ATTRIBUTES.iter().map(|a| a.to_string()));
    args
}

/// Render an argument list for logs with the `-w` value masked.
pub fn redacted_command_line(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    let mut mask_next = false;
    for a in args {
        if mask_next {
            parts.push("********".to_string());
            mask_next = false;
        } else {
            mask_next = a == "-w";
            parts.push(a.clone());
        }
    }
    parts.join(" ")
}

/// Executes the external query binary.
#[derive(Debug, Clone)]
pub struct QueryRunner {
    program: String,
    timeout: Option<Duration>,
}

impl Default for QueryRunner {
    fn default() -> Self {
        Self::new(
            DEFAULT_LDAPSEARCH,
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        )
    }
}

impl QueryRunner {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Look up the account described by `creds`.
    pub fn query(&self, creds: &QueryCredentials) -> Result<QueryOutput, QueryError> {
        let args = Zeroizing::new(build_args(creds));
        debug!("running: {}", redacted_command_line(&self.program, &args));
        self.run(&args)
    }

    /// Spawn the program with `args` and collect merged output. A non-zero
    /// exit status is not an error.
    pub fn run(&self, args: &[String]) -> Result<QueryOutput, QueryError> {
        let deadline = self.timeout.map(|limit| Instant::now() + limit);
        let spawn_err = |source| QueryError::Spawn {
            program: self.program.clone(),
            source,
        };

        // one pipe for both streams keeps their interleaving
        let (reader, writer) = io::pipe().map_err(spawn_err)?;
        let writer_err = writer.try_clone().map_err(spawn_err)?;
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err)
            .spawn()
            .map_err(spawn_err)?;

        let captured = drain(reader);
        let status = self.wait(&mut child, deadline)?;

        let bytes = match deadline {
            None => captured.recv().unwrap_or_default(),
            Some(at) => {
                let left = at.saturating_duration_since(Instant::now());
                match captured.recv_timeout(left) {
                    Ok(bytes) => bytes,
                    Err(RecvTimeoutError::Timeout) => return Err(self.timed_out()),
                    Err(RecvTimeoutError::Disconnected) => Vec::new(),
                }
            }
        };
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let code = status.code();
        if code != Some(0) {
            debug!("{} exited with status {:?}", self.program, code);
        }
        debug!("captured {} bytes of query output", text.len());
        Ok(QueryOutput { text, status: code })
    }

    fn wait(
        &self,
        child: &mut Child,
        deadline: Option<Instant>,
    ) -> Result<ExitStatus, QueryError> {
        let Some(at) = deadline else {
            return child.wait().map_err(QueryError::Wait);
        };
        loop {
            if let Some(status) = child.try_wait().map_err(QueryError::Wait)? {
                return Ok(status);
            }
            if Instant::now() >= at {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn timed_out(&self) -> QueryError {
        QueryError::Timeout {
            program: self.program.clone(),
            limit: self.timeout.unwrap_or_default(),
        }
    }
}

/// Read `pipe` to EOF on a helper thread; the bytes arrive on the returned
/// channel. EOF only comes once every holder of the write end is gone,
/// including grandchildren that inherited it.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            debug!("query output read stopped after {} bytes: {}", buf.len(), e);
        }
        let _ = tx.send(buf);
    });
    rx
}
