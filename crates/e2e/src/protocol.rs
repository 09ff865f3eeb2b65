//! Driver wire protocol
//!
//! The Node.js driver reads one JSON request per line on stdin and answers
//! with one JSON response per line on stdout. The first line it prints is
//! `{"ready":true}` once the browser page is open.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{Browser, DriverConfig, Viewport};

/// Element query, resolved by the driver into a Playwright locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub selector: String,
    /// Only elements containing this text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
    /// Only elements containing a match of this locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has: Option<Box<Locator>>,
    /// Resolved inside each match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<Locator>>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            has_text: None,
            has: None,
            child: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    pub fn has(mut self, inner: Locator) -> Self {
        self.has = Some(Box::new(inner));
        self
    }

    /// Narrow to `child` inside the innermost match
    pub fn find(mut self, child: Locator) -> Self {
        let child = match self.child.take() {
            Some(existing) => (*existing).find(child),
            None => child,
        };
        self.child = Some(Box::new(child));
        self
    }

    /// Human-readable form used in logs and reports
    pub fn describe(&self) -> String {
        let mut out = self.selector.clone();
        if let Some(text) = &self.has_text {
            out.push_str(&format!("[text~={:?}]", text));
        }
        if let Some(has) = &self.has {
            out.push_str(&format!(":has({})", has.describe()));
        }
        if let Some(child) = &self.child {
            out.push_str(" >> ");
            out.push_str(&child.describe());
        }
        out
    }
}

/// A single browser action or assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Goto { url: String },
    Fill { target: Locator, value: String },
    Click { target: Locator },
    ExpectContainsText { target: Locator, text: String },
    ExpectVisible { target: Locator },
    ExpectHidden { target: Locator },
    ExpectClass { target: Locator, class_name: String },
    ExpectNoClass { target: Locator, class_name: String },
    ExpectValue { target: Locator, value: String },
    ExpectCount { target: Locator, count: usize },
    Screenshot { path: PathBuf },
    Close,
}

impl Command {
    pub fn describe(&self) -> String {
        match self {
            Command::Goto { url } => format!("goto {}", url),
            Command::Fill { target, value } => format!("fill {} with {:?}", target.describe(), value),
            Command::Click { target } => format!("click {}", target.describe()),
            Command::ExpectContainsText { target, text } => {
                format!("expect {} to contain {:?}", target.describe(), text)
            }
            Command::ExpectVisible { target } => format!("expect {} visible", target.describe()),
            Command::ExpectHidden { target } => format!("expect {} hidden", target.describe()),
            Command::ExpectClass { target, class_name } => {
                format!("expect {} to have class {}", target.describe(), class_name)
            }
            Command::ExpectNoClass { target, class_name } => {
                format!("expect {} not to have class {}", target.describe(), class_name)
            }
            Command::ExpectValue { target, value } => {
                format!("expect {} to have value {:?}", target.describe(), value)
            }
            Command::ExpectCount { target, count } => {
                format!("expect {} to match {} element(s)", target.describe(), count)
            }
            Command::Screenshot { path } => format!("screenshot {}", path.display()),
            Command::Close => "close".to_string(),
        }
    }
}

/// Request line sent to the driver
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub id: u64,
    #[serde(flatten)]
    pub command: &'a Command,
}

/// Response line read from the driver
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Passed to the driver as its first argument
#[derive(Debug, Clone, Serialize)]
pub struct LaunchOptions {
    pub browser: Browser,
    pub headless: bool,
    pub slow_mo_ms: u64,
    pub viewport: Viewport,
    pub expect_timeout_ms: u64,
}

impl From<&DriverConfig> for LaunchOptions {
    fn from(config: &DriverConfig) -> Self {
        Self {
            browser: config.browser,
            headless: config.headless,
            slow_mo_ms: config.slow_mo_ms,
            viewport: config.viewport,
            expect_timeout_ms: config.expect_timeout.as_millis() as u64,
        }
    }
}
