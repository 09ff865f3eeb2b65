//! Runner configuration
//!
//! Defaults match the local development setup: the app is served by
//! `trunk serve` on port 4200 and an already running server is reused.
//! On CI the server is always started fresh and failed scenarios are retried.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::E2eError;

pub const DEFAULT_APP_URL: &str = "http://localhost:4200";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

/// How the browser is launched and driven
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub browser: Browser,
    pub headless: bool,
    /// Delay Playwright inserts between actions, useful when watching a run
    pub slow_mo_ms: u64,
    pub viewport: Viewport,
    /// How long Playwright assertions keep retrying before failing
    pub expect_timeout: Duration,
    /// Upper bound for a single driver command
    pub step_timeout: Duration,
    /// Upper bound for launching the browser
    pub launch_timeout: Duration,
    /// Node.js executable
    pub node_binary: PathBuf,
    /// Directory whose node_modules provides @playwright/test
    pub node_project_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            slow_mo_ms: 0,
            viewport: Viewport::default(),
            expect_timeout: Duration::from_secs(5),
            step_timeout: Duration::from_secs(60),
            launch_timeout: Duration::from_secs(30),
            node_binary: PathBuf::from("node"),
            node_project_dir: PathBuf::from("."),
        }
    }
}

/// How the app's dev server is started
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Use a server that already answers on the app URL instead of spawning one
    pub reuse_existing: bool,
    /// Trunk compiles the app before serving, so this is generous
    pub startup_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            program: "trunk".to_string(),
            args: vec!["serve".to_string(), "--port".to_string(), "4200".to_string()],
            working_dir: PathBuf::from("."),
            reuse_existing: true,
            startup_timeout: Duration::from_secs(300),
        }
    }
}

/// Which scenarios to run
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub tag: Option<String>,
    pub name: Option<String>,
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct E2eConfig {
    pub app_url: String,
    pub driver: DriverConfig,
    pub server: ServerConfig,
    pub features_dir: PathBuf,
    pub output_dir: PathBuf,
    pub filter: ScenarioFilter,
    /// Extra attempts for a failed scenario
    pub retries: u32,
    pub screenshot_on_failure: bool,
    pub fail_fast: bool,
    /// Resolve steps without starting a server or browser
    pub dry_run: bool,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.to_string(),
            driver: DriverConfig::default(),
            server: ServerConfig::default(),
            features_dir: PathBuf::from("features"),
            output_dir: PathBuf::from("test-results"),
            filter: ScenarioFilter::default(),
            retries: 0,
            screenshot_on_failure: true,
            fail_fast: false,
            dry_run: false,
        }
    }
}

impl E2eConfig {
    /// Defaults adjusted for the `CI` environment variable
    pub fn from_env() -> Self {
        Self::for_ci(std::env::var_os("CI").is_some())
    }

    pub fn for_ci(ci: bool) -> Self {
        let mut config = Self::default();
        if ci {
            config.retries = 2;
            config.server.reuse_existing = false;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_defaults() {
        let config = E2eConfig::for_ci(false);
        assert_eq!(config.app_url, "http://localhost:4200");
        assert_eq!(config.retries, 0);
        assert!(config.server.reuse_existing);
        assert_eq!(config.driver.viewport, Viewport { width: 1280, height: 720 });
        assert_eq!(config.driver.step_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_ci_defaults() {
        let config = E2eConfig::for_ci(true);
        assert_eq!(config.retries, 2);
        assert!(!config.server.reuse_existing);
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("WebKit".parse::<Browser>().unwrap(), Browser::Webkit);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("netscape".parse::<Browser>().is_err());
    }
}
