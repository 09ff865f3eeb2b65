//! Dev server management - reusing or spawning the app server and waiting for it

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{E2eError, E2eResult};

/// How long a spawned server gets to exit after SIGTERM
const STOP_GRACE: Duration = Duration::from_millis(500);

/// Handle to the server the app is reachable on
pub struct AppServer {
    /// Present only when this process started the server
    child: Option<Child>,
    base_url: String,
}

impl AppServer {
    /// Reuse a server already answering on `base_url`, or spawn one
    pub async fn start(config: &ServerConfig, base_url: &str) -> E2eResult<Self> {
        let client = http_client()?;

        if config.reuse_existing && is_up(&client, base_url).await {
            info!("Reusing dev server at {}", base_url);
            return Ok(Self {
                child: None,
                base_url: base_url.to_string(),
            });
        }

        info!("Starting dev server: {} {}", config.program, config.args.join(" "));
        let child = Command::new(&config.program)
            .args(&config.args)
            .current_dir(&config.working_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                E2eError::ServerStartup(format!("Failed to spawn {}: {}", config.program, e))
            })?;

        let mut server = Self {
            child: Some(child),
            base_url: base_url.to_string(),
        };
        server.wait_until_ready(&client, config.startup_timeout).await?;

        info!("Dev server is up at {}", base_url);
        Ok(server)
    }

    /// Poll the app URL until it answers with a success status
    async fn wait_until_ready(&mut self, client: &reqwest::Client, limit: Duration) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < limit {
            attempts += 1;

            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    return Err(E2eError::ServerStartup(format!("server exited early with {}", status)));
                }
            }

            match client.get(&self.base_url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => warn!("Readiness check returned {}", resp.status()),
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for dev server to start...");
                    }
                    // Connection refused is expected while the app is compiling
                    if !e.is_connect() {
                        warn!("Readiness check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether this handle started (and will stop) the server
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    /// Stop the server if we started it. Dropping the handle kills it instead.
    pub async fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping dev server (pid: {:?})", child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(raw) = child.id() {
                if kill(Pid::from_raw(raw as i32), Signal::SIGTERM).is_ok() {
                    if let Ok(status) = timeout(STOP_GRACE, child.wait()).await {
                        status?;
                        return Ok(());
                    }
                }
            }
        }

        // Force kill if still running
        warn!("Dev server did not stop on SIGTERM, killing it");
        child.kill().await?;
        Ok(())
    }
}

fn http_client() -> E2eResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?)
}

async fn is_up(client: &reqwest::Client, url: &str) -> bool {
    matches!(client.get(url).send().await, Ok(resp) if resp.status().is_success())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn spawn_server(script: &str) -> AppServer {
        let child = Command::new("sh")
            .args(["-c", script])
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        AppServer {
            child: Some(child),
            base_url: "http://127.0.0.1:4200".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stop_terminates_server() {
        let mut server = spawn_server("trap 'exit 0' TERM; while :; do sleep 0.1; done");
        assert!(server.is_managed());

        timeout(Duration::from_secs(5), server.stop()).await.unwrap().unwrap();
        assert!(!server.is_managed());
    }

    #[tokio::test]
    async fn test_stop_does_not_block_the_runtime() {
        // ignores SIGTERM, so stop waits out the grace period and kills it
        let mut server = spawn_server("trap '' TERM; while :; do sleep 1; done");

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                sleep(Duration::from_millis(50)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        timeout(Duration::from_secs(5), server.stop()).await.unwrap().unwrap();
        ticker.abort();

        assert!(ticks.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_stop_on_reused_server_is_noop() {
        let mut server = AppServer {
            child: None,
            base_url: "http://127.0.0.1:4200".to_string(),
        };
        server.stop().await.unwrap();
        assert_eq!(server.base_url(), "http://127.0.0.1:4200");
    }
}
