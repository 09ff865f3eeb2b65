//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Dev server failed to start: {0}")]
    ServerStartup(String),

    #[error("Dev server not ready after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Browser driver failed to launch: {0}")]
    DriverLaunch(String),

    #[error("Driver protocol error: {0}")]
    Protocol(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Undefined step: {0}")]
    UndefinedStep(String),

    #[error("Ambiguous step: {step} (matches {})", candidates.join(", "))]
    AmbiguousStep { step: String, candidates: Vec<String> },

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Feature parse error: {0}")]
    FeatureParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
