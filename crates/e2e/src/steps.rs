//! Step definitions
//!
//! Step sentences are matched against cucumber-style expressions, where
//! `{string}` matches a quoted string and `{int}` an integer. Each matched
//! step turns into a [`TodoStep`], which compiles to driver commands.

use regex::Regex;

use crate::error::{E2eError, E2eResult};
use crate::protocol::{Command, Locator};

/// Heading text the app renders
pub const APP_HEADING: &str = "Todo App";

const COMPLETED_CLASS: &str = "completed";

const KEYWORDS: &[&str] = &["Given ", "When ", "Then ", "And ", "But ", "* "];

/// A resolved step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoStep {
    OpenApp,
    AddTodo(String),
    HaveAdded(String),
    ExpectListed(String),
    ExpectNotListed(String),
    MarkComplete(String),
    MarkIncomplete(String),
    ExpectCompleted(String),
    ExpectNotCompleted(String),
    DeleteTodo(String),
    ExpectInputEmpty,
    ExpectCount(usize),
}

fn todo_input() -> Locator {
    Locator::css(".todo-input")
}

fn todo_text(text: &str) -> Locator {
    Locator::css(".todo-text").with_text(text)
}

fn todo_row(text: &str) -> Locator {
    Locator::css(".todo-item").has(todo_text(text))
}

fn add_commands(text: &str) -> Vec<Command> {
    vec![
        Command::Fill {
            target: todo_input(),
            value: text.to_string(),
        },
        Command::Click {
            target: Locator::css(".todo-button"),
        },
    ]
}

impl TodoStep {
    /// Driver commands that perform this step against the app at `app_url`
    pub fn commands(&self, app_url: &str) -> Vec<Command> {
        match self {
            TodoStep::OpenApp => vec![
                Command::Goto {
                    url: app_url.to_string(),
                },
                Command::ExpectContainsText {
                    target: Locator::css("h1"),
                    text: APP_HEADING.to_string(),
                },
            ],
            TodoStep::AddTodo(text) => add_commands(text),
            TodoStep::HaveAdded(text) => {
                let mut commands = add_commands(text);
                commands.push(Command::ExpectVisible { target: todo_text(text) });
                commands
            }
            TodoStep::ExpectListed(text) => vec![Command::ExpectVisible { target: todo_text(text) }],
            TodoStep::ExpectNotListed(text) => vec![Command::ExpectHidden { target: todo_text(text) }],
            TodoStep::MarkComplete(text) | TodoStep::MarkIncomplete(text) => vec![Command::Click {
                target: todo_row(text).find(Locator::css(".todo-checkbox")),
            }],
            TodoStep::ExpectCompleted(text) => vec![Command::ExpectClass {
                target: todo_row(text).find(Locator::css(".todo-text")),
                class_name: COMPLETED_CLASS.to_string(),
            }],
            TodoStep::ExpectNotCompleted(text) => vec![Command::ExpectNoClass {
                target: todo_row(text).find(Locator::css(".todo-text")),
                class_name: COMPLETED_CLASS.to_string(),
            }],
            TodoStep::DeleteTodo(text) => vec![Command::Click {
                target: todo_row(text).find(Locator::css(".delete-button")),
            }],
            TodoStep::ExpectInputEmpty => vec![Command::ExpectValue {
                target: todo_input(),
                value: String::new(),
            }],
            TodoStep::ExpectCount(count) => vec![Command::ExpectCount {
                target: Locator::css(".todo-item"),
                count: *count,
            }],
        }
    }
}

type BuildStep = fn(&[String]) -> E2eResult<TodoStep>;

struct StepDefinition {
    expression: &'static str,
    pattern: Regex,
    build: BuildStep,
}

/// Ordered set of step definitions
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Registry with every todo app step
    pub fn todo_steps() -> E2eResult<Self> {
        let mut registry = Self::new();
        registry.define("I am on the todo application", |_| Ok(TodoStep::OpenApp))?;
        registry.define("I add a todo item with text {string}", |args| {
            Ok(TodoStep::AddTodo(arg(args, 0)?))
        })?;
        registry.define("I have added a todo item {string}", |args| {
            Ok(TodoStep::HaveAdded(arg(args, 0)?))
        })?;
        registry.define("I should see {string} in the todo list", |args| {
            Ok(TodoStep::ExpectListed(arg(args, 0)?))
        })?;
        registry.define("I should not see {string} in the todo list", |args| {
            Ok(TodoStep::ExpectNotListed(arg(args, 0)?))
        })?;
        registry.define("I mark the todo item {string} as complete", |args| {
            Ok(TodoStep::MarkComplete(arg(args, 0)?))
        })?;
        registry.define("I mark the todo item {string} as incomplete", |args| {
            Ok(TodoStep::MarkIncomplete(arg(args, 0)?))
        })?;
        registry.define("the todo item {string} should be marked as complete", |args| {
            Ok(TodoStep::ExpectCompleted(arg(args, 0)?))
        })?;
        registry.define("the todo item {string} should not be marked as complete", |args| {
            Ok(TodoStep::ExpectNotCompleted(arg(args, 0)?))
        })?;
        registry.define("I delete the todo item {string}", |args| {
            Ok(TodoStep::DeleteTodo(arg(args, 0)?))
        })?;
        registry.define("the todo input should be empty", |_| Ok(TodoStep::ExpectInputEmpty))?;
        registry.define("I should see {int} todo items", |args| {
            let raw = arg(args, 0)?;
            let count = raw
                .parse()
                .map_err(|_| E2eError::InvalidStep(format!("not a count: {}", raw)))?;
            Ok(TodoStep::ExpectCount(count))
        })?;
        Ok(registry)
    }

    pub fn define(&mut self, expression: &'static str, build: BuildStep) -> E2eResult<()> {
        let pattern = Regex::new(&expression_to_regex(expression))
            .map_err(|e| E2eError::InvalidStep(format!("{}: {}", expression, e)))?;
        self.definitions.push(StepDefinition {
            expression,
            pattern,
            build,
        });
        Ok(())
    }

    /// Match a step sentence, keyword included, to exactly one definition
    pub fn resolve(&self, text: &str) -> E2eResult<TodoStep> {
        let body = strip_keyword(text);
        let mut matches = self
            .definitions
            .iter()
            .filter_map(|def| def.pattern.captures(body).map(|caps| (def, caps)));

        let Some((definition, captures)) = matches.next() else {
            return Err(E2eError::UndefinedStep(text.to_string()));
        };
        let others: Vec<String> = matches.map(|(def, _)| def.expression.to_string()).collect();
        if !others.is_empty() {
            let mut candidates = vec![definition.expression.to_string()];
            candidates.extend(others);
            return Err(E2eError::AmbiguousStep {
                step: text.to_string(),
                candidates,
            });
        }

        // {string} has one group per quote style; only one of them takes part
        let args: Vec<String> = captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().to_string())
            .collect();
        (definition.build)(&args)
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn arg(args: &[String], index: usize) -> E2eResult<String> {
    args.get(index)
        .cloned()
        .ok_or_else(|| E2eError::InvalidStep(format!("missing parameter #{}", index + 1)))
}

/// Drop a leading Gherkin keyword
pub fn strip_keyword(text: &str) -> &str {
    let text = text.trim();
    KEYWORDS
        .iter()
        .find_map(|keyword| text.strip_prefix(keyword))
        .map(str::trim_start)
        .unwrap_or(text)
}

/// Translate a cucumber expression into an anchored regex
pub fn expression_to_regex(expression: &str) -> String {
    let mut pattern = String::from("^");
    let mut rest = expression;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let end = start + len + 1;
        let capture = match &rest[start + 1..end - 1] {
            "string" => r#"(?:"([^"]*)"|'([^']*)')"#,
            "int" => r"(-?\d+)",
            // unknown parameter types are matched literally
            _ => {
                pattern.push_str(&regex::escape(&rest[..end]));
                rest = &rest[end..];
                continue;
            }
        };
        pattern.push_str(&regex::escape(&rest[..start]));
        pattern.push_str(capture);
        rest = &rest[end..];
    }

    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn registry() -> StepRegistry {
        StepRegistry::todo_steps().unwrap()
    }

    #[test_case("Given I am on the todo application", TodoStep::OpenApp ; "open app")]
    #[test_case("When I add a todo item with text \"Buy milk\"", TodoStep::AddTodo("Buy milk".into()) ; "add")]
    #[test_case("Given I have added a todo item 'Walk dog'", TodoStep::HaveAdded("Walk dog".into()) ; "single quotes")]
    #[test_case("Then I should see \"Buy milk\" in the todo list", TodoStep::ExpectListed("Buy milk".into()) ; "listed")]
    #[test_case("Then I should not see \"Buy milk\" in the todo list", TodoStep::ExpectNotListed("Buy milk".into()) ; "not listed")]
    #[test_case("When I mark the todo item \"Buy milk\" as complete", TodoStep::MarkComplete("Buy milk".into()) ; "complete")]
    #[test_case("And I mark the todo item \"Buy milk\" as incomplete", TodoStep::MarkIncomplete("Buy milk".into()) ; "incomplete")]
    #[test_case("Then the todo item \"Buy milk\" should be marked as complete", TodoStep::ExpectCompleted("Buy milk".into()) ; "expect completed")]
    #[test_case("Then the todo item \"Buy milk\" should not be marked as complete", TodoStep::ExpectNotCompleted("Buy milk".into()) ; "expect not completed")]
    #[test_case("When I delete the todo item \"Buy milk\"", TodoStep::DeleteTodo("Buy milk".into()) ; "delete")]
    #[test_case("And the todo input should be empty", TodoStep::ExpectInputEmpty ; "input empty")]
    #[test_case("Then I should see 3 todo items", TodoStep::ExpectCount(3) ; "count")]
    #[test_case("When I add a todo item with text \"\"", TodoStep::AddTodo(String::new()) ; "empty text")]
    fn test_resolve(text: &str, expected: TodoStep) {
        assert_eq!(registry().resolve(text).unwrap(), expected);
    }

    #[test]
    fn test_undefined_step() {
        let err = registry().resolve("When I rename the todo item \"a\" to \"b\"").unwrap_err();
        assert!(matches!(err, E2eError::UndefinedStep(_)));
    }

    #[test]
    fn test_ambiguous_step() {
        let mut registry = StepRegistry::new();
        registry.define("I add {string}", |args| Ok(TodoStep::AddTodo(arg(args, 0)?))).unwrap();
        registry.define("I add \"milk\"", |_| Ok(TodoStep::AddTodo("milk".into()))).unwrap();

        match registry.resolve("When I add \"milk\"") {
            Err(E2eError::AmbiguousStep { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = registry().resolve("Then I should see -1 todo items").unwrap_err();
        assert!(matches!(err, E2eError::InvalidStep(_)));
    }

    #[test]
    fn test_expression_to_regex() {
        assert_eq!(expression_to_regex("a (b)"), r"^a \(b\)$");
        assert_eq!(expression_to_regex("see {int} items"), r"^see (-?\d+) items$");
        assert_eq!(expression_to_regex("odd {float}"), r"^odd \{float\}$");
    }

    #[test]
    fn test_strip_keyword() {
        assert_eq!(strip_keyword("  Given I am here "), "I am here");
        assert_eq!(strip_keyword("* I am here"), "I am here");
        assert_eq!(strip_keyword("I am here"), "I am here");
    }

    #[test]
    fn test_open_app_commands() {
        let commands = TodoStep::OpenApp.commands("http://localhost:4200");
        assert_eq!(
            commands,
            vec![
                Command::Goto { url: "http://localhost:4200".into() },
                Command::ExpectContainsText {
                    target: Locator::css("h1"),
                    text: "Todo App".into(),
                },
            ]
        );
    }

    #[test]
    fn test_toggle_targets_row_checkbox() {
        let commands = TodoStep::MarkComplete("Buy milk".into()).commands("");
        assert_eq!(
            commands,
            vec![Command::Click {
                target: Locator::css(".todo-item")
                    .has(Locator::css(".todo-text").with_text("Buy milk"))
                    .find(Locator::css(".todo-checkbox")),
            }]
        );
    }

    #[test]
    fn test_have_added_waits_for_row() {
        let commands = TodoStep::HaveAdded("Buy milk".into()).commands("");
        assert_eq!(commands.len(), 3);
        assert!(matches!(&commands[0], Command::Fill { value, .. } if value == "Buy milk"));
        assert!(matches!(&commands[1], Command::Click { .. }));
        assert!(matches!(&commands[2], Command::ExpectVisible { .. }));
    }
}
