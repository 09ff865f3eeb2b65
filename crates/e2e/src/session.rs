//! Browser session
//!
//! A `BrowserSession` owns one Node.js driver process, and through it one
//! browser, context and page. Sessions are scoped to a scenario: `close()`
//! shuts the browser down cleanly, and dropping an unclosed session kills the
//! driver process.

use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::error::{E2eError, E2eResult};
use crate::protocol::{Command, LaunchOptions, Request, Response};

const DRIVER_SCRIPT: &str = include_str!("../driver/driver.js");

const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    step_timeout: Duration,
    closed: bool,
    // Holds the staged driver script until the session ends
    _script_dir: TempDir,
}

impl BrowserSession {
    /// Start the driver and wait until its page is open
    pub async fn launch(config: &DriverConfig) -> E2eResult<Self> {
        Self::launch_script(config, DRIVER_SCRIPT).await
    }

    async fn launch_script(config: &DriverConfig, script: &str) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        tokio::fs::write(&script_path, script).await?;

        let options = serde_json::to_string(&LaunchOptions::from(config))?;
        debug!("Launching driver: {} {}", config.node_binary.display(), script_path.display());

        let mut child = TokioCommand::new(&config.node_binary)
            .arg(&script_path)
            .arg(options)
            .current_dir(&config.node_project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                E2eError::DriverLaunch(format!(
                    "failed to spawn {}: {}",
                    config.node_binary.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::DriverLaunch("driver stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::DriverLaunch("driver stdout not captured".to_string()))?;

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            step_timeout: config.step_timeout,
            closed: false,
            _script_dir: script_dir,
        };

        let ready = timeout(config.launch_timeout, session.read_response())
            .await
            .map_err(|_| E2eError::Timeout(format!("{} launch", config.browser.as_str())))??;
        if !ready.ready {
            return Err(E2eError::DriverLaunch(
                ready
                    .error
                    .unwrap_or_else(|| "driver did not report ready".to_string()),
            ));
        }

        info!("Browser session ready ({})", config.browser.as_str());
        Ok(session)
    }

    /// Send one command and wait for its response
    pub async fn execute(&mut self, command: &Command) -> E2eResult<()> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_string(&Request { id, command })?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        debug!("-> #{} {}", id, command.describe());

        let response = timeout(self.step_timeout, self.read_reply(id))
            .await
            .map_err(|_| E2eError::Timeout(command.describe()))??;

        if response.ok {
            Ok(())
        } else {
            Err(E2eError::StepFailed {
                step: command.describe(),
                reason: response
                    .error
                    .unwrap_or_else(|| "unknown driver error".to_string()),
            })
        }
    }

    /// Close the browser and wait for the driver to exit
    pub async fn close(mut self) -> E2eResult<()> {
        let result = self.execute(&Command::Close).await;
        self.closed = true;

        match timeout(EXIT_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) if status.success() => {}
            Ok(Ok(status)) => warn!("Driver exited with {}", status),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!("Driver did not exit after close, killing it");
                self.child.kill().await?;
            }
        }

        result
    }

    /// Response to request `id`. Replies to earlier requests that timed out
    /// arrive late and are dropped.
    async fn read_reply(&mut self, id: u64) -> E2eResult<Response> {
        loop {
            let response = self.read_response().await?;
            let reply_to = response.id;
            match reply_to {
                Some(seen) if seen == id => return Ok(response),
                Some(seen) if seen < id => debug!("Dropping late response #{} (ok={})", seen, response.ok),
                other => {
                    return Err(E2eError::Protocol(format!(
                        "expected response #{}, got {:?}",
                        id, other
                    )))
                }
            }
        }
    }

    async fn read_response(&mut self) -> E2eResult<Response> {
        loop {
            let Some(line) = self.stdout.next_line().await? else {
                return Err(E2eError::Protocol("driver exited unexpectedly".to_string()));
            };
            let line = line.trim();
            if line.starts_with('{') {
                return Ok(serde_json::from_str(line)?);
            }
            if !line.is_empty() {
                debug!("driver: {}", line);
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.child.start_kill();
        }
    }
}
