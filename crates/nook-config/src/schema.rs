//! Raw (pre-validation) configuration schema.
//!
//! These types deserialize leniently: fields are optional, scalar-or-list is
//! accepted wherever a list of strings is expected, and actions stay as raw
//! YAML values so validation can report every problem instead of stopping at
//! the first serde mismatch.

use serde::Deserialize;

/// Top-level raw configuration document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Rule list. Required for a non-empty config file.
    pub rules: Option<Vec<RawRule>>,
    /// Optional daemon settings.
    pub settings: Option<RawSettings>,
}

/// One raw rule entry.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    /// Rule name.
    pub name: Option<String>,
    /// Parent matcher criteria.
    pub parent: Option<RawParent>,
    /// Child matcher criteria.
    pub child: Option<RawChild>,
    /// Raw action list; interpreted during validation.
    pub actions: Option<Vec<serde_yaml::Value>>,
    /// Match priority; higher wins. Defaults to 0.
    #[serde(default)]
    pub priority: i32,
}

/// Raw parent matcher section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawParent {
    /// Wayland application ids.
    pub app_id: Option<StringOrList>,
    /// X11 window classes.
    #[serde(rename = "class")]
    pub window_class: Option<StringOrList>,
    /// Title glob patterns.
    pub title_pattern: Option<StringOrList>,
}

/// Raw child matcher section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawChild {
    /// Wayland application ids.
    pub app_id: Option<StringOrList>,
}

/// Raw settings section. Unknown fields are rejected so typos surface.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    /// Extra debug logging.
    pub debug: Option<bool>,
    /// Pending correlation timeout in seconds.
    pub rule_timeout: Option<f64>,
}

/// A YAML field that accepts either a scalar string or a list of strings.
///
/// `app_id: kitty` and `app_id: [kitty, alacritty]` are both valid.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    /// Single scalar value.
    One(String),
    /// List of values.
    Many(Vec<String>),
}

impl StringOrList {
    /// Normalize to a list.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(s) => vec![s],
            StringOrList::Many(v) => v,
        }
    }
}

/// Normalize an optional scalar-or-list field.
pub fn to_list(field: Option<StringOrList>) -> Vec<String> {
    field.map(StringOrList::into_vec).unwrap_or_default()
}
