//! Main test runner that orchestrates the dev server, browser sessions and steps

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::E2eConfig;
use crate::error::E2eResult;
use crate::feature::{Feature, Scenario};
use crate::protocol::Command;
use crate::report::{ScenarioReport, Status, StepReport, SuiteReport};
use crate::server::AppServer;
use crate::session::BrowserSession;
use crate::steps::{StepRegistry, TodoStep};

/// Main E2E test runner
pub struct TestRunner {
    config: E2eConfig,
    registry: StepRegistry,
    /// Running (or reused) dev server, if any
    server: Option<AppServer>,
}

impl TestRunner {
    pub fn new(config: E2eConfig) -> E2eResult<Self> {
        Ok(Self {
            config,
            registry: StepRegistry::todo_steps()?,
            server: None,
        })
    }

    pub fn config(&self) -> &E2eConfig {
        &self.config
    }

    /// Load every feature file from the configured directory
    pub fn load_features(&self) -> E2eResult<Vec<Feature>> {
        Feature::load_all(&self.config.features_dir)
    }

    /// Scenarios passing the configured tag/name filter, in file order
    pub fn selected<'a>(&self, features: &'a [Feature]) -> Vec<(&'a Feature, &'a Scenario)> {
        let filter = &self.config.filter;
        features
            .iter()
            .flat_map(|feature| feature.scenarios.iter().map(move |scenario| (feature, scenario)))
            .filter(|(feature, scenario)| {
                filter
                    .tag
                    .as_deref()
                    .map_or(true, |tag| scenario.has_tag(feature, tag))
            })
            .filter(|(_, scenario)| filter.name.as_deref().map_or(true, |name| scenario.name == name))
            .collect()
    }

    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() {
            return Ok(());
        }
        let server = AppServer::start(&self.config.server, &self.config.app_url).await?;
        self.server = Some(server);
        Ok(())
    }

    pub async fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop().await?;
        }
        Ok(())
    }

    /// Run the selected scenarios, or only resolve them in dry-run mode
    pub async fn run(&mut self, features: &[Feature]) -> E2eResult<SuiteReport> {
        if self.config.dry_run {
            return Ok(self.dry_run(features));
        }

        let started_at = Utc::now();
        let start = Instant::now();
        self.start_server().await?;

        let selected = self.selected(features);
        info!("Running {} scenario(s)...", selected.len());

        let mut scenarios = Vec::new();
        for (feature, scenario) in selected {
            let report = self.run_scenario(feature, scenario).await;
            let failed = !report.passed();
            scenarios.push(report);
            if failed && self.config.fail_fast {
                warn!("Stopping after first failure (fail fast)");
                break;
            }
        }

        Ok(SuiteReport::new(
            started_at,
            start.elapsed().as_millis() as u64,
            false,
            scenarios,
        ))
    }

    /// Resolve every selected step without touching a browser
    pub fn dry_run(&self, features: &[Feature]) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();

        let scenarios = self
            .selected(features)
            .into_iter()
            .map(|(feature, scenario)| {
                let steps = self
                    .resolve_steps(feature, scenario)
                    .into_iter()
                    .map(|(text, resolved)| match resolved {
                        Ok(_) => StepReport::skipped(&text),
                        Err(e) => StepReport::undefined(&text, e.to_string()),
                    })
                    .collect::<Vec<_>>();
                let mut report = ScenarioReport::from_steps(&feature.feature, &scenario.name, steps, 0);
                report.attempts = 0;
                if report.passed() {
                    report.status = Status::Skipped;
                }
                report
            })
            .collect::<Vec<_>>();

        SuiteReport::new(started_at, start.elapsed().as_millis() as u64, true, scenarios)
    }

    async fn run_scenario(&self, feature: &Feature, scenario: &Scenario) -> ScenarioReport {
        let max_attempts = self.config.retries + 1;
        let mut attempt = 1;
        loop {
            info!("▶ {} / {} (attempt {}/{})", feature.feature, scenario.name, attempt, max_attempts);
            let mut report = self.attempt(feature, scenario, attempt).await;
            report.attempts = attempt;
            if report.passed() || attempt >= max_attempts {
                return report;
            }
            warn!(
                "Retrying {} after failure: {}",
                scenario.name,
                report.error.as_deref().unwrap_or("unknown error")
            );
            attempt += 1;
        }
    }

    async fn attempt(&self, feature: &Feature, scenario: &Scenario, attempt: u32) -> ScenarioReport {
        let start = Instant::now();
        let resolved = self.resolve_steps(feature, scenario);

        // Undefined steps fail the scenario before any browser is started
        if resolved.iter().any(|(_, step)| step.is_err()) {
            let steps = resolved
                .into_iter()
                .map(|(text, step)| match step {
                    Ok(_) => StepReport::skipped(&text),
                    Err(e) => StepReport::undefined(&text, e.to_string()),
                })
                .collect();
            return ScenarioReport::from_steps(&feature.feature, &scenario.name, steps, 0);
        }

        let mut session = match BrowserSession::launch(&self.config.driver).await {
            Ok(session) => session,
            Err(e) => return ScenarioReport::aborted(&feature.feature, &scenario.name, e.to_string()),
        };

        let steps = self.execute_steps(&mut session, resolved).await;
        let mut report = ScenarioReport::from_steps(
            &feature.feature,
            &scenario.name,
            steps,
            start.elapsed().as_millis() as u64,
        );

        if !report.passed() && self.config.screenshot_on_failure {
            report.screenshot = self.capture_failure(&mut session, scenario, attempt).await;
        }

        if let Err(e) = session.close().await {
            warn!("Browser session did not close cleanly: {}", e);
        }
        report
    }

    async fn execute_steps(
        &self,
        session: &mut BrowserSession,
        resolved: Vec<(String, E2eResult<TodoStep>)>,
    ) -> Vec<StepReport> {
        let mut reports = Vec::with_capacity(resolved.len());
        let mut failed = false;

        for (text, step) in resolved {
            let step = match step {
                Ok(step) if !failed => step,
                _ => {
                    reports.push(StepReport::skipped(&text));
                    continue;
                }
            };

            let start = Instant::now();
            let mut outcome = Ok(());
            for command in step.commands(&self.config.app_url) {
                outcome = session.execute(&command).await;
                if outcome.is_err() {
                    break;
                }
            }
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    debug!("  ✓ {}", text);
                    reports.push(StepReport::passed(&text, duration_ms));
                }
                Err(e) => {
                    warn!("  ✗ {} - {}", text, e);
                    reports.push(StepReport::failed(&text, duration_ms, e.to_string()));
                    failed = true;
                }
            }
        }

        reports
    }

    async fn capture_failure(
        &self,
        session: &mut BrowserSession,
        scenario: &Scenario,
        attempt: u32,
    ) -> Option<PathBuf> {
        let dir = self.config.output_dir.join("screenshots");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("Cannot create screenshot dir {}: {}", dir.display(), e);
            return None;
        }

        let path = dir.join(format!("{}-{}.png", slug(&scenario.name), attempt));
        // The driver may run elsewhere, so hand it an absolute path
        let path = std::path::absolute(&path).unwrap_or(path);
        let command = Command::Screenshot { path: path.clone() };
        match session.execute(&command).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Failure screenshot not taken: {}", e);
                None
            }
        }
    }

    fn resolve_steps(&self, feature: &Feature, scenario: &Scenario) -> Vec<(String, E2eResult<TodoStep>)> {
        feature
            .steps_for(scenario)
            .map(|text| (text.to_string(), self.registry.resolve(text)))
            .collect()
    }
}

/// File-name friendly form of a scenario name
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
