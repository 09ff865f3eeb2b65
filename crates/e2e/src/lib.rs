//! Todo App E2E Test Framework
//!
//! This crate drives a real browser against the running todo app:
//! - Reuses or spawns the `trunk serve` dev server
//! - Controls Playwright through a small Node.js driver speaking JSON lines
//! - Parses YAML feature files of Gherkin step sentences
//! - Writes a JSON report of every scenario and step
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── AppServer::start() -> reuse or spawn dev server      │
//! │    ├── per scenario: BrowserSession::launch()               │
//! │    │     ├── StepRegistry::resolve(text) -> TodoStep        │
//! │    │     ├── TodoStep::commands() -> [Command]              │
//! │    │     └── BrowserSession::execute(command)               │
//! │    │   BrowserSession::close()                              │
//! │    └── SuiteReport::write()                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  driver.js (Node.js + @playwright/test)                     │
//! │    stdin:  {"id":1,"op":"click","target":{...}}             │
//! │    stdout: {"id":1,"ok":true}                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod feature;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod server;
pub mod session;
pub mod steps;

pub use config::{Browser, E2eConfig};
pub use error::{E2eError, E2eResult};
pub use feature::{Feature, Scenario};
pub use report::SuiteReport;
pub use runner::TestRunner;
pub use session::BrowserSession;
pub use steps::{StepRegistry, TodoStep};
