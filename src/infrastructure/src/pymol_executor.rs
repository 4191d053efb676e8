use async_trait::async_trait;
use domain::services::CommandExecutor;
use regex::Regex;
use shared::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::config::EngineConfig;

const SENTINEL_PREFIX: &str = "__molscribe_done_";

struct PymolSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// Drives a headless `pymol -cpq` process, one command at a time.
///
/// The process is started on first use and kept for the executor's lifetime.
/// After each command a sentinel print marks the end of its output.
pub struct PymolExecutor {
    executable: String,
    timeout: Duration,
    error_pattern: Regex,
    session: Mutex<Option<PymolSession>>,
    counter: AtomicU64,
    spawns: AtomicU64,
}

impl PymolExecutor {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let error_pattern =
            Regex::new(r"(?i)(^|[\s-])(error:|traceback|exception|unknown command)")
                .map_err(|e| Error::Configuration(format!("error pattern: {}", e)))?;
        Ok(Self {
            executable: config.executable.clone(),
            timeout: Duration::from_secs(config.command_timeout_seconds),
            error_pattern,
            session: Mutex::new(None),
            counter: AtomicU64::new(0),
            spawns: AtomicU64::new(0),
        })
    }

    /// Returns an executor only when the engine binary can be found.
    pub fn detect(config: &EngineConfig) -> Option<Self> {
        if locate_executable(&config.executable).is_none() {
            tracing::info!(executable = %config.executable, "PyMOL not found, execution disabled");
            return None;
        }
        Self::new(config).ok()
    }

    fn spawn(&self) -> Result<PymolSession> {
        let mut child = Command::new(&self.executable)
            .arg("-cpq")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Critical(format!("failed to start {}: {}", self.executable, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Critical("PyMOL stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Critical("PyMOL stdout unavailable".to_string()))?;

        if self.spawns.fetch_add(1, Ordering::Relaxed) == 0 {
            tracing::info!(executable = %self.executable, "started PyMOL session");
        } else {
            tracing::warn!(
                executable = %self.executable,
                restarts = self.restarts(),
                "restarted PyMOL session, previously loaded objects are gone"
            );
        }
        Ok(PymolSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Times the engine process was replaced after a fault. Structures loaded
    /// before a restart must be loaded again.
    pub fn restarts(&self) -> u64 {
        self.spawns.load(Ordering::Relaxed).saturating_sub(1)
    }

    pub fn is_error_output(&self, line: &str) -> bool {
        self.error_pattern.is_match(line)
    }

    async fn run_in_session(&self, session: &mut PymolSession, line: &str) -> Result<Vec<String>> {
        let sentinel = format!(
            "{}{}__",
            SENTINEL_PREFIX,
            self.counter.fetch_add(1, Ordering::Relaxed)
        );
        let script = format!("{}\n/print(\"{}\")\n", line, sentinel);
        session
            .stdin
            .write_all(script.as_bytes())
            .await
            .map_err(|e| Error::Critical(format!("PyMOL stdin closed: {}", e)))?;
        session
            .stdin
            .flush()
            .await
            .map_err(|e| Error::Critical(format!("PyMOL stdin closed: {}", e)))?;

        let mut output = Vec::new();
        loop {
            match session.stdout.next_line().await {
                Ok(Some(out)) if out.trim() == sentinel => return Ok(output),
                Ok(Some(out)) => output.push(out),
                Ok(None) => {
                    return Err(Error::Critical("PyMOL process exited".to_string()));
                }
                Err(e) => return Err(Error::Critical(format!("PyMOL stdout: {}", e))),
            }
        }
    }
}

#[async_trait]
impl CommandExecutor for PymolExecutor {
    async fn execute(&self, line: &str) -> Result<()> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            *guard = Some(self.spawn()?);
        }
        let Some(session) = guard.as_mut() else {
            return Err(Error::Critical("PyMOL session missing".to_string()));
        };

        let run = self.run_in_session(session, line);
        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                *guard = None;
                return Err(e);
            }
            Err(_) => {
                if let Some(mut stale) = guard.take() {
                    let _ = stale.child.start_kill();
                }
                return Err(Error::Upstream(format!(
                    "PyMOL did not finish '{}' within {}s",
                    line,
                    self.timeout.as_secs()
                )));
            }
        };

        let errors: Vec<&str> = output
            .iter()
            .map(|l| l.trim())
            .filter(|l| self.is_error_output(l))
            .collect();
        if errors.is_empty() {
            tracing::debug!(command = %line, "PyMOL accepted command");
            Ok(())
        } else {
            Err(Error::Execution(errors.join("; ")))
        }
    }
}

/// Resolve an executable name against `PATH`, or accept an explicit path that exists.
pub fn locate_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}
