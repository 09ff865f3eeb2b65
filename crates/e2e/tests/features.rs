//! Bundled feature files resolve against the step definitions
//!
//! Runs without a browser or dev server.

use std::path::PathBuf;

use todo_e2e::config::ScenarioFilter;
use todo_e2e::protocol::Command;
use todo_e2e::report::Status;
use todo_e2e::{E2eConfig, Feature, StepRegistry, TestRunner, TodoStep};

fn features_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("features")
}

fn bundled() -> Vec<Feature> {
    Feature::load_all(&features_dir()).expect("bundled features should parse")
}

#[test]
fn bundled_features_load() {
    let features = bundled();
    assert!(!features.is_empty());
    assert!(features.iter().all(|f| f.source.is_some()));
}

#[test]
fn every_bundled_step_is_defined() {
    let registry = StepRegistry::todo_steps().unwrap();
    for feature in bundled() {
        for scenario in &feature.scenarios {
            for text in feature.steps_for(scenario) {
                assert!(
                    registry.resolve(text).is_ok(),
                    "{} / {}: undefined step {:?}",
                    feature.feature,
                    scenario.name,
                    text
                );
            }
        }
    }
}

#[test]
fn dry_run_of_bundled_features_succeeds() {
    let runner = TestRunner::new(E2eConfig {
        features_dir: features_dir(),
        dry_run: true,
        ..E2eConfig::default()
    })
    .unwrap();

    let features = runner.load_features().unwrap();
    let report = runner.dry_run(&features);

    assert!(report.success(), "{}", report.summary());
    assert!(report.scenarios.iter().all(|s| s.status == Status::Skipped));
}

#[test]
fn smoke_tag_selects_lifecycle_scenarios() {
    let runner = TestRunner::new(E2eConfig {
        features_dir: features_dir(),
        filter: ScenarioFilter {
            tag: Some("smoke".into()),
            name: None,
        },
        dry_run: true,
        ..E2eConfig::default()
    })
    .unwrap();

    let features = runner.load_features().unwrap();
    let names: Vec<&str> = runner
        .selected(&features)
        .iter()
        .map(|(_, scenario)| scenario.name.as_str())
        .collect();
    assert_eq!(names, vec!["Adding a todo item", "Full todo lifecycle"]);
}

#[test]
fn lifecycle_scenario_compiles_to_driver_commands() {
    let features = bundled();
    let feature = &features[0];
    let scenario = feature
        .scenarios
        .iter()
        .find(|s| s.name == "Full todo lifecycle")
        .expect("lifecycle scenario");

    let registry = StepRegistry::todo_steps().unwrap();
    let steps: Vec<TodoStep> = feature
        .steps_for(scenario)
        .map(|text| registry.resolve(text).unwrap())
        .collect();
    assert_eq!(steps[0], TodoStep::OpenApp);
    assert_eq!(steps.last(), Some(&TodoStep::ExpectNotListed("Buy milk".into())));

    let ops: Vec<&'static str> = steps
        .iter()
        .flat_map(|step| step.commands("http://localhost:4200"))
        .map(|command| match command {
            Command::Goto { .. } => "goto",
            Command::Fill { .. } => "fill",
            Command::Click { .. } => "click",
            Command::ExpectContainsText { .. } => "expect_contains_text",
            Command::ExpectVisible { .. } => "expect_visible",
            Command::ExpectHidden { .. } => "expect_hidden",
            Command::ExpectClass { .. } => "expect_class",
            _ => "other",
        })
        .collect();
    assert_eq!(
        ops,
        vec![
            "goto",
            "expect_contains_text",
            "fill",
            "click",
            "expect_visible",
            "click",
            "expect_class",
            "click",
            "expect_hidden",
        ]
    );
}
