//! Configuration validation and conversion.
//!
//! Validation walks the raw document and collects every problem into one
//! list before failing, so a broken file is diagnosed in a single pass. A
//! clean document is converted into the immutable [`RuleSet`] the runtime
//! consumes.

use std::collections::HashSet;
use std::time::Duration;

use nook_core::{Action, Direction, Matcher, Mode, Orientation, Position, Rule, RuleSet};
use serde_yaml::Value;

use crate::errors::ConfigError;
use crate::schema::{RawConfig, RawRule, to_list};
use crate::{Config, Settings};

/// Validate a raw document and build the runtime configuration.
pub fn build_config(raw: RawConfig) -> Result<Config, ConfigError> {
    let mut errors = Vec::new();
    let mut rules = Vec::new();

    match raw.rules {
        None => errors.push("configuration missing required field: rules".to_string()),
        Some(raw_rules) => {
            let mut seen = HashSet::new();
            for (index, raw_rule) in raw_rules.into_iter().enumerate() {
                if let Some(name) = &raw_rule.name
                    && !seen.insert(name.clone())
                {
                    errors.push(format!("duplicate rule name: '{name}'"));
                }
                if let Some(rule) = validate_rule(index, raw_rule, &mut errors) {
                    rules.push(rule);
                }
            }
        }
    }

    let mut settings = Settings::default();
    if let Some(raw_settings) = raw.settings {
        if let Some(debug) = raw_settings.debug {
            settings.debug = debug;
        }
        if let Some(timeout) = raw_settings.rule_timeout {
            if timeout > 0.0 {
                settings.rule_timeout = Duration::from_secs_f64(timeout);
            } else {
                errors.push(format!(
                    "settings.rule_timeout must be greater than 0, got {timeout}"
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(Config {
            rules: RuleSet::new(rules),
            settings,
        })
    } else {
        Err(ConfigError::Invalid(errors))
    }
}

fn validate_rule(index: usize, raw: RawRule, errors: &mut Vec<String>) -> Option<Rule> {
    let before = errors.len();
    let label = raw
        .name
        .clone()
        .unwrap_or_else(|| format!("rule {index}"));

    let name = match raw.name {
        Some(name) if !name.trim().is_empty() => Some(name),
        Some(_) => {
            errors.push(format!("rule {index}: 'name' cannot be empty"));
            None
        }
        None => {
            errors.push(format!("rule {index}: missing required field: name"));
            None
        }
    };

    let parent = match raw.parent {
        Some(parent) => {
            let app_ids = validated_list(&label, "parent.app_id", to_list(parent.app_id), errors);
            let classes = validated_list(
                &label,
                "parent.class",
                to_list(parent.window_class),
                errors,
            );
            let patterns = validated_list(
                &label,
                "parent.title_pattern",
                to_list(parent.title_pattern),
                errors,
            );
            if app_ids.is_empty() && classes.is_empty() && patterns.is_empty() {
                errors.push(format!("{label}: parent cannot be empty"));
                None
            } else {
                compile_matcher(&label, "parent", app_ids, classes, patterns, errors)
            }
        }
        None => {
            errors.push(format!("{label}: missing required field: parent"));
            None
        }
    };

    let child = match raw.child {
        Some(child) => {
            let app_ids = validated_list(&label, "child.app_id", to_list(child.app_id), errors);
            if app_ids.is_empty() {
                errors.push(format!("{label}: child.app_id cannot be empty"));
                None
            } else {
                compile_matcher(&label, "child", app_ids, Vec::new(), Vec::new(), errors)
            }
        }
        None => {
            errors.push(format!("{label}: missing required field: child"));
            None
        }
    };

    let actions = match raw.actions {
        Some(values) if !values.is_empty() => values
            .iter()
            .enumerate()
            .filter_map(|(i, value)| validate_action(&label, i, value, errors))
            .collect(),
        Some(_) => {
            errors.push(format!("{label}: actions cannot be empty"));
            Vec::new()
        }
        None => {
            errors.push(format!("{label}: missing required field: actions"));
            Vec::new()
        }
    };

    if errors.len() > before {
        return None;
    }
    Some(Rule {
        name: name?,
        parent: parent?,
        child: child?,
        actions,
        priority: raw.priority,
    })
}

fn validated_list(
    label: &str,
    field: &str,
    values: Vec<String>,
    errors: &mut Vec<String>,
) -> Vec<String> {
    for value in &values {
        if value.trim().is_empty() {
            errors.push(format!("{label}: {field} entries cannot be empty strings"));
        }
    }
    values
}

fn compile_matcher(
    label: &str,
    section: &str,
    app_ids: Vec<String>,
    classes: Vec<String>,
    patterns: Vec<String>,
    errors: &mut Vec<String>,
) -> Option<Matcher> {
    match Matcher::new(app_ids, classes, patterns) {
        Ok(matcher) => Some(matcher),
        Err(err) => {
            errors.push(format!("{label}: {section}: {err}"));
            None
        }
    }
}

/// Validate one action entry: a mapping with exactly one known key.
fn validate_action(
    label: &str,
    index: usize,
    value: &Value,
    errors: &mut Vec<String>,
) -> Option<Action> {
    let Value::Mapping(map) = value else {
        errors.push(format!("{label}: action[{index}] must be a mapping"));
        return None;
    };
    if map.len() != 1 {
        errors.push(format!(
            "{label}: action[{index}] must contain exactly one key-value pair"
        ));
        return None;
    }
    let (key, value) = map.iter().next()?;
    let Some(key) = key.as_str() else {
        errors.push(format!("{label}: action[{index}] key must be a string"));
        return None;
    };

    let result = match key {
        "set_mode" => value
            .as_str()
            .ok_or_else(|| "set_mode value must be a string".to_string())
            .and_then(parse_mode)
            .map(|mode| Some(Action::SetMode { mode })),
        "place" => value
            .as_str()
            .ok_or_else(|| "place value must be a string".to_string())
            .and_then(parse_direction)
            .map(|direction| Some(Action::Place { direction })),
        "size_ratio" => value
            .as_f64()
            .ok_or_else(|| "size_ratio value must be a number".to_string())
            .and_then(|ratio| {
                if (0.1..=0.9).contains(&ratio) {
                    Ok(Some(Action::SetSize { ratio }))
                } else {
                    Err(format!(
                        "size_ratio must be between 0.1 and 0.9, got {ratio}"
                    ))
                }
            }),
        "inherit_cwd" => parse_flag(value, "inherit_cwd").map(|on| on.then_some(Action::InheritCwd)),
        "preserve_column" => {
            parse_flag(value, "preserve_column").map(|on| on.then_some(Action::PreserveColumn))
        }
        other => Err(format!("unknown action type '{other}'")),
    };

    match result {
        Ok(action) => action,
        Err(message) => {
            errors.push(format!("{label}: action[{index}]: {message}"));
            None
        }
    }
}

/// Parse a `set_mode` value: `<h|v> [after|before|end|beg]`.
fn parse_mode(value: &str) -> Result<Mode, String> {
    let mut parts = value.split_whitespace();
    let orientation = match parts.next() {
        Some("h") => Orientation::Horizontal,
        Some("v") => Orientation::Vertical,
        _ => {
            return Err(format!(
                "invalid set_mode '{value}': expected '<h|v> [after|before|end|beg]'"
            ));
        }
    };
    let position = match parts.next() {
        None => None,
        Some("after") => Some(Position::After),
        Some("before") => Some(Position::Before),
        Some("end") => Some(Position::End),
        Some("beg") => Some(Position::Beginning),
        Some(other) => return Err(format!("invalid set_mode position '{other}'")),
    };
    if parts.next().is_some() {
        return Err(format!("invalid set_mode '{value}': trailing tokens"));
    }
    Ok(Mode {
        orientation,
        position,
    })
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    match value {
        "below" => Ok(Direction::Below),
        "right" => Ok(Direction::Right),
        "above" => Ok(Direction::Above),
        "left" => Ok(Direction::Left),
        other => Err(format!(
            "invalid place direction '{other}': must be below, right, above, or left"
        )),
    }
}

fn parse_flag(value: &Value, name: &str) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("{name} value must be a boolean"))
}
