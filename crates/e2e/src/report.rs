//! Run results

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::E2eResult;

pub const REPORT_FILE: &str = "e2e-report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    Undefined,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub text: String,
    pub status: Status,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl StepReport {
    pub fn passed(text: &str, duration_ms: u64) -> Self {
        Self {
            text: text.to_string(),
            status: Status::Passed,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(text: &str, duration_ms: u64, error: String) -> Self {
        Self {
            text: text.to_string(),
            status: Status::Failed,
            duration_ms,
            error: Some(error),
        }
    }

    pub fn skipped(text: &str) -> Self {
        Self {
            text: text.to_string(),
            status: Status::Skipped,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn undefined(text: &str, error: String) -> Self {
        Self {
            text: text.to_string(),
            status: Status::Undefined,
            duration_ms: 0,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub feature: String,
    pub name: String,
    pub status: Status,
    pub attempts: u32,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    pub screenshot: Option<PathBuf>,
    pub error: Option<String>,
}

impl ScenarioReport {
    /// Passed only when every step passed
    pub fn from_steps(feature: &str, name: &str, steps: Vec<StepReport>, duration_ms: u64) -> Self {
        let failing = steps
            .iter()
            .find(|step| matches!(step.status, Status::Failed | Status::Undefined));
        let status = if failing.is_some() || steps.is_empty() {
            Status::Failed
        } else {
            Status::Passed
        };
        let error = failing.and_then(|step| step.error.clone());

        Self {
            feature: feature.to_string(),
            name: name.to_string(),
            status,
            attempts: 1,
            duration_ms,
            steps,
            screenshot: None,
            error,
        }
    }

    /// A scenario that could not run at all, e.g. the browser did not launch
    pub fn aborted(feature: &str, name: &str, error: String) -> Self {
        Self {
            feature: feature.to_string(),
            name: name.to_string(),
            status: Status::Failed,
            attempts: 1,
            duration_ms: 0,
            steps: Vec::new(),
            screenshot: None,
            error: Some(error),
        }
    }

    /// Passed, or skipped in a dry run
    pub fn passed(&self) -> bool {
        self.status != Status::Failed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub dry_run: bool,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn new(
        started_at: DateTime<Utc>,
        duration_ms: u64,
        dry_run: bool,
        scenarios: Vec<ScenarioReport>,
    ) -> Self {
        let passed = scenarios.iter().filter(|s| s.passed()).count();
        Self {
            started_at,
            duration_ms,
            dry_run,
            total: scenarios.len(),
            passed,
            failed: scenarios.len() - passed,
            scenarios,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} scenario(s): {} passed, {} failed ({} ms)",
            self.total, self.passed, self.failed, self.duration_ms
        )
    }

    /// Log one line per scenario and the totals
    pub fn log(&self) {
        for scenario in &self.scenarios {
            if scenario.passed() {
                info!("✓ {} / {} ({} ms)", scenario.feature, scenario.name, scenario.duration_ms);
            } else {
                error!(
                    "✗ {} / {} - {}",
                    scenario.feature,
                    scenario.name,
                    scenario.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        info!("Test Results: {}", self.summary());
    }

    /// Write the report as JSON into `dir`
    pub fn write(&self, dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(name: &str, steps: Vec<StepReport>) -> ScenarioReport {
        ScenarioReport::from_steps("Todo", name, steps, 10)
    }

    #[test]
    fn test_scenario_status() {
        let ok = scenario("ok", vec![StepReport::passed("a", 1), StepReport::passed("b", 1)]);
        assert!(ok.passed());
        assert!(ok.error.is_none());

        let bad = scenario(
            "bad",
            vec![
                StepReport::passed("a", 1),
                StepReport::failed("b", 1, "boom".into()),
                StepReport::skipped("c"),
            ],
        );
        assert_eq!(bad.status, Status::Failed);
        assert_eq!(bad.error.as_deref(), Some("boom"));

        let undefined = scenario("undefined", vec![StepReport::undefined("x", "Undefined step: x".into())]);
        assert_eq!(undefined.status, Status::Failed);
    }

    #[test]
    fn test_suite_totals() {
        let report = SuiteReport::new(
            Utc::now(),
            25,
            false,
            vec![
                scenario("one", vec![StepReport::passed("a", 1)]),
                ScenarioReport::aborted("Todo", "two", "no browser".into()),
            ],
        );
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.success());
        assert_eq!(report.summary(), "2 scenario(s): 1 passed, 1 failed (25 ms)");
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = SuiteReport::new(Utc::now(), 5, true, vec![scenario("one", vec![StepReport::passed("a", 1)])]);

        let path = report.write(&dir.path().join("results")).unwrap();
        assert_eq!(path.file_name().unwrap(), REPORT_FILE);

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["scenarios"][0]["status"], "passed");
    }
}
