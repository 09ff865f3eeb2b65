//! Feature files
//!
//! Scenarios are written as Gherkin sentences inside YAML:
//!
//! ```yaml
//! feature: Todo list management
//! background:
//!   - Given I am on the todo application
//! scenarios:
//!   - name: Adding a todo item
//!     steps:
//!       - When I add a todo item with text "Buy milk"
//!       - Then I should see "Buy milk" in the todo list
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Feature title
    pub feature: String,

    #[serde(default)]
    pub description: String,

    /// Tags applied to every scenario
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps run before each scenario's own steps
    #[serde(default)]
    pub background: Vec<String>,

    pub scenarios: Vec<Scenario>,

    /// File the feature was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    pub steps: Vec<String>,
}

impl Feature {
    pub fn parse(yaml: &str) -> E2eResult<Self> {
        let feature: Feature = serde_yaml::from_str(yaml)?;
        feature.validate()?;
        Ok(feature)
    }

    pub fn load(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut feature = Self::parse(&content)
            .map_err(|e| E2eError::FeatureParse(format!("{}: {}", path.display(), e)))?;
        feature.source = Some(path.to_path_buf());
        Ok(feature)
    }

    /// Load every `.yaml`/`.yml` file in `dir`, sorted by file name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if is_yaml {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| Self::load(path)).collect()
    }

    /// Background steps followed by the scenario's own steps
    pub fn steps_for<'a>(&'a self, scenario: &'a Scenario) -> impl Iterator<Item = &'a str> {
        self.background
            .iter()
            .chain(scenario.steps.iter())
            .map(String::as_str)
    }

    fn validate(&self) -> E2eResult<()> {
        if self.scenarios.is_empty() {
            return Err(E2eError::FeatureParse(format!(
                "feature '{}' has no scenarios",
                self.feature
            )));
        }

        let mut names = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.steps.is_empty() {
                return Err(E2eError::FeatureParse(format!(
                    "scenario '{}' has no steps",
                    scenario.name
                )));
            }
            if !names.insert(scenario.name.as_str()) {
                return Err(E2eError::FeatureParse(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
        }
        Ok(())
    }
}

impl Scenario {
    /// Tag match against the scenario's and its feature's tags, `@` optional
    pub fn has_tag(&self, feature: &Feature, tag: &str) -> bool {
        let wanted = tag.trim_start_matches('@');
        feature
            .tags
            .iter()
            .chain(self.tags.iter())
            .any(|t| t.trim_start_matches('@') == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
feature: Todo list management
tags: ["@todo"]
background:
  - Given I am on the todo application
scenarios:
  - name: Adding a todo item
    tags: [smoke]
    steps:
      - When I add a todo item with text "Buy milk"
      - Then I should see "Buy milk" in the todo list
  - name: Deleting a todo item
    steps:
      - When I delete the todo item "Buy milk"
"#;

    #[test]
    fn test_parse_feature() {
        let feature = Feature::parse(SAMPLE).unwrap();
        assert_eq!(feature.feature, "Todo list management");
        assert_eq!(feature.scenarios.len(), 2);
        assert_eq!(feature.background.len(), 1);
        assert!(feature.source.is_none());
    }

    #[test]
    fn test_background_comes_first() {
        let feature = Feature::parse(SAMPLE).unwrap();
        let steps: Vec<&str> = feature.steps_for(&feature.scenarios[0]).collect();
        assert_eq!(
            steps,
            vec![
                "Given I am on the todo application",
                "When I add a todo item with text \"Buy milk\"",
                "Then I should see \"Buy milk\" in the todo list",
            ]
        );
    }

    #[test]
    fn test_tags() {
        let feature = Feature::parse(SAMPLE).unwrap();
        let adding = &feature.scenarios[0];
        let deleting = &feature.scenarios[1];
        assert!(adding.has_tag(&feature, "smoke"));
        assert!(adding.has_tag(&feature, "@smoke"));
        assert!(deleting.has_tag(&feature, "todo"));
        assert!(!deleting.has_tag(&feature, "smoke"));
    }

    #[test]
    fn test_rejects_empty_scenario() {
        let yaml = "feature: Empty\nscenarios:\n  - name: Nothing\n    steps: []\n";
        assert!(matches!(Feature::parse(yaml), Err(E2eError::FeatureParse(_))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let yaml = r#"
feature: Dupes
scenarios:
  - name: Same
    steps: ["Given I am on the todo application"]
  - name: Same
    steps: ["Given I am on the todo application"]
"#;
        assert!(matches!(Feature::parse(yaml), Err(E2eError::FeatureParse(_))));
    }

    #[test]
    fn test_load_all_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), SAMPLE.replace("Todo list management", "B")).unwrap();
        std::fs::write(dir.path().join("a.yml"), SAMPLE.replace("Todo list management", "A")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let features = Feature::load_all(dir.path()).unwrap();
        let names: Vec<&str> = features.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(features[0].source.as_deref(), Some(dir.path().join("a.yml").as_path()));
    }
}
