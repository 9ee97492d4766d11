//! # nook-config
//!
//! Rule file discovery, parsing, and validation.
//!
//! Configuration is a YAML document with a `rules:` list and an optional
//! `settings:` section. Loading goes through three stages:
//!
//! 1. **Discovery** — an explicit path, or the first existing default
//!    location (`~/.config/nook/rules.yaml`, `~/.config/nook/config.yaml`,
//!    `/etc/nook/config.yaml`). No file at all is not an error: the daemon
//!    runs in pure fallback mode with an empty rule set.
//! 2. **Parsing** — `serde_yaml` into loose raw types ([`schema`]).
//! 3. **Validation** — every problem in the file is collected and reported
//!    at once ([`validate`]), then raw rules are converted into the
//!    immutable [`nook_core::RuleSet`] handed to the runtime.
//!
//! # Example
//!
//! ```yaml
//! rules:
//!   - name: editor-terminal
//!     parent:
//!       app_id: [kitty, alacritty]
//!       title_pattern: ["*nvim*", "*vim*"]
//!     child:
//!       app_id: kitty
//!     actions:
//!       - set_mode: v after
//!       - size_ratio: 0.333
//!       - inherit_cwd: true
//! settings:
//!   rule_timeout: 15
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod schema;
pub mod validate;

pub use errors::ConfigError;

use std::path::{Path, PathBuf};
use std::time::Duration;

use nook_core::RuleSet;
use tracing::debug;

use crate::schema::RawConfig;

/// Default timeout for a pending correlation when `settings.rule_timeout`
/// is not set.
pub const DEFAULT_RULE_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Priority-ordered rule set.
    pub rules: RuleSet,
    /// Daemon settings.
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: RuleSet::default(),
            settings: Settings::default(),
        }
    }
}

/// Validated `settings:` section.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    /// Extra debug logging requested from the config file.
    pub debug: bool,
    /// How long an armed rule waits for its child window.
    pub rule_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            rule_timeout: DEFAULT_RULE_TIMEOUT,
        }
    }
}

/// Default configuration file locations, in probe order.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        let config_dir = Path::new(&home).join(".config").join("nook");
        paths.push(config_dir.join("rules.yaml"));
        paths.push(config_dir.join("config.yaml"));
    }
    paths.push(PathBuf::from("/etc/nook/config.yaml"));
    paths
}

/// Load and validate configuration.
///
/// With an explicit `path`, that file must exist and parse. Without one, the
/// default locations are probed and the first existing file is used; if none
/// exists, the default (empty) configuration is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config_from_path(path);
    }
    for candidate in default_config_paths() {
        if candidate.exists() {
            debug!(path = %candidate.display(), "loading configuration");
            return load_config_from_path(&candidate);
        }
    }
    debug!("no configuration file found, running with empty rule set");
    Ok(Config::default())
}

/// Load and validate a specific configuration file.
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    let raw: RawConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    validate::build_config(raw)
}
