// src/fetch/git.rs

//! Cloning component repositories
//!
//! The clone runs as a `git` subprocess with stdin detached. Its exit status
//! is always checked, the run is killed once the configured timeout elapses,
//! and a [`CancelToken`] is polled while it runs so an install can be
//! interrupted mid-clone.

use crate::cancel::CancelToken;
use crate::config::GitConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// How often a running clone checks for cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Something that can materialise a remote repository in a local directory
pub trait RemoteCloner {
    /// Clone `address` into `destination`, which exists and is empty
    fn clone_repository(
        &self,
        address: &str,
        destination: &Path,
        cancel: &CancelToken,
    ) -> Result<()>;
}

/// Clones repositories with the `git` command line tool
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
    timeout: Duration,
    shallow: bool,
}

impl GitCloner {
    /// Create a cloner from the `[git]` configuration section
    pub fn new(config: &GitConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.clone_timeout(),
            shallow: config.shallow,
        }
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Locate the git executable
    fn resolve_program(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| {
            Error::ConfigError(format!("git executable '{}' not found: {}", self.program, e))
        })
    }

    fn build_command(&self, program: &Path, address: &str, destination: &Path) -> Command {
        let mut command = Command::new(program);
        command.arg("clone");
        if self.shallow {
            command.args(["--depth", "1"]);
        }
        command
            .arg("--")
            .arg(address)
            .arg(destination)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    fn wait(&self, mut child: Child, address: &str, cancel: &CancelToken) -> Result<()> {
        let deadline = Instant::now() + self.timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                kill(&mut child);
                return Err(Error::FetchFailed {
                    address: address.to_string(),
                    reason: format!("clone timed out after {} seconds", self.timeout.as_secs()),
                });
            }

            if let Some(status) = child.wait_timeout(remaining.min(POLL_INTERVAL))? {
                let output = child.wait_with_output()?;
                let stderr = String::from_utf8_lossy(&output.stderr);

                for line in String::from_utf8_lossy(&output.stdout).lines() {
                    debug!("[git] {}", line);
                }

                if status.success() {
                    for line in stderr.lines() {
                        debug!("[git] {}", line);
                    }
                    return Ok(());
                }

                for line in stderr.lines() {
                    warn!("[git] {}", line);
                }
                let code = status.code().unwrap_or(-1);
                return Err(Error::FetchFailed {
                    address: address.to_string(),
                    reason: format!("git clone failed with exit code {}: {}", code, stderr.trim()),
                });
            }

            if cancel.is_cancelled() {
                kill(&mut child);
                return Err(Error::Cancelled);
            }
        }
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl RemoteCloner for GitCloner {
    fn clone_repository(
        &self,
        address: &str,
        destination: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        cancel.check()?;
        let program = self.resolve_program()?;

        info!("Cloning {} into {}", address, destination.display());
        let child = self
            .build_command(&program, address, destination)
            .spawn()
            .map_err(|e| Error::FetchFailed {
                address: address.to_string(),
                reason: format!("failed to spawn '{}': {}", program.display(), e),
            })?;

        self.wait(child, address, cancel)
    }
}
