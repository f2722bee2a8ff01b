//! # hidefile-config
//!
//! Configuration management for the hidefile launcher.
//!
//! Loads configuration from:
//! 1. `~/.hidefile/config.toml` (global)
//! 2. `.hidefile/config.toml` (project-local, overrides global)
//! 3. `HIDDEN` / `BLOCKED` environment variables (highest priority)
//!
//! The inception layer itself never reads these files; it only sees the
//! environment variables rendered by [`Config::to_env`].

pub mod logging;

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use hidefile_policy::{PatternList, BLOCKED_VAR, DELIMITER, HIDDEN_VAR};
use serde::{Deserialize, Serialize};

/// Project-local config path, relative to the working directory.
pub const PROJECT_CONFIG: &str = ".hidefile/config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("invalid {list} pattern {pattern:?}: {reason}")]
    InvalidPattern {
        list: &'static str,
        pattern: String,
        reason: &'static str,
    },
    #[error("out of memory parsing {list} patterns: {source}")]
    Alloc {
        list: &'static str,
        source: std::collections::TryReserveError,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: PolicyConfig,
    pub logging: LoggingConfig,
    pub layer: LayerConfig,
}

impl Config {
    /// Load config from standard locations, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let global = Self::global_config_path();
        let mut config = Self::load_from(global.as_deref(), Path::new(PROJECT_CONFIG))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single explicit file, then apply environment overrides.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        crate::log_config_debug!("Loading config", path = &*path.to_string_lossy());
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Global then project file, without environment overrides. Missing files are
    /// skipped.
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                crate::log_config_debug!(
                    "Loading global config",
                    path = &*global_path.to_string_lossy()
                );
                let contents = std::fs::read_to_string(global_path)?;
                config = toml::from_str(&contents)?;
            }
        }

        if project.exists() {
            crate::log_config_debug!(
                "Loading project config",
                path = &*project.to_string_lossy()
            );
            let contents = std::fs::read_to_string(project)?;
            let project_config: Config = toml::from_str(&contents)?;
            config.merge(project_config);
        }

        Ok(config)
    }

    /// Global config path: ~/.hidefile/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".hidefile/config.toml"))
    }

    /// Merge another config (project overrides). Non-empty lists replace, they do
    /// not append.
    fn merge(&mut self, other: Config) {
        if !other.policy.hidden.is_empty() {
            self.policy.hidden = other.policy.hidden;
        }
        if !other.policy.blocked.is_empty() {
            self.policy.blocked = other.policy.blocked;
        }
        if other.logging != LoggingConfig::default() {
            self.logging = other.logging;
        }
        if other.layer.library.is_some() {
            self.layer.library = other.layer.library;
        }
    }

    /// Apply `HIDDEN` / `BLOCKED` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var_os(key))
    }

    /// Apply overrides from `lookup`. A set variable replaces the list, split exactly
    /// as the inception layer splits it. Values must be UTF-8.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<OsString>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(HIDDEN_VAR) {
            self.policy.hidden = split_patterns("hidden", &raw)?;
        }
        if let Some(raw) = lookup(BLOCKED_VAR) {
            self.policy.blocked = split_patterns("blocked", &raw)?;
        }
        Ok(())
    }

    /// Reject patterns that cannot round-trip through a `:`-separated variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_list("hidden", &self.policy.hidden)?;
        validate_list("blocked", &self.policy.blocked)
    }

    /// Variables to hand to a child process. `None` means the variable should be
    /// removed so an inherited value cannot leak through.
    pub fn to_env(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            (HIDDEN_VAR, join_patterns(&self.policy.hidden)),
            (BLOCKED_VAR, join_patterns(&self.policy.blocked)),
        ]
    }

    /// The hidden patterns exactly as the layer would parse them from the environment.
    pub fn hidden_list(&self) -> PatternList {
        to_pattern_list(&self.policy.hidden)
    }

    /// The blocked suffixes exactly as the layer would parse them from the environment.
    pub fn blocked_list(&self) -> PatternList {
        to_pattern_list(&self.policy.blocked)
    }

    /// Generate default config TOML string
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }
}

/// Hide / block patterns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Substrings: any directory entry containing one is omitted from `readdir`
    pub hidden: Vec<String>,
    /// Suffixes: any `open` of a path ending with one fails with `EACCES`
    pub blocked: Vec<String>,
}

/// Launcher logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// error, warn, info, debug or trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Inception layer location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Path to the built `libhidefile_inception_layer` shared object
    pub library: Option<PathBuf>,
}

fn split_patterns(list: &'static str, raw: &OsStr) -> Result<Vec<String>, ConfigError> {
    let patterns = PatternList::parse(raw.as_bytes(), DELIMITER)
        .map_err(|source| ConfigError::Alloc { list, source })?;
    patterns
        .iter()
        .map(|p| match std::str::from_utf8(p) {
            Ok(p) => Ok(p.to_string()),
            Err(_) => Err(ConfigError::InvalidPattern {
                list,
                pattern: String::from_utf8_lossy(p).into_owned(),
                reason: "patterns must be UTF-8",
            }),
        })
        .collect()
}

fn join_patterns(patterns: &[String]) -> Option<String> {
    if patterns.is_empty() {
        None
    } else {
        let sep = char::from(DELIMITER).to_string();
        Some(patterns.join(&sep))
    }
}

fn to_pattern_list(patterns: &[String]) -> PatternList {
    join_patterns(patterns)
        .and_then(|joined| PatternList::parse(joined.as_bytes(), DELIMITER).ok())
        .unwrap_or_default()
}

fn validate_list(list: &'static str, patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        let reason = if pattern.is_empty() {
            "empty patterns match nothing"
        } else if pattern.as_bytes().contains(&DELIMITER) {
            "patterns cannot contain ':'"
        } else if pattern.as_bytes().contains(&0) {
            "patterns cannot contain NUL"
        } else {
            continue;
        };
        return Err(ConfigError::InvalidPattern {
            list,
            pattern: pattern.clone(),
            reason,
        });
    }
    Ok(())
}
