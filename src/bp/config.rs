//! Parser and printer configuration
//!
//! `defaults/blueprint.default.yaml` is embedded so that documentation and runtime
//! behavior stay in sync. Callers layer their own YAML on top with [`Loader`]; any key
//! they leave out keeps its default, and unknown keys are rejected.

use crate::bp::ast::DanglingPolicy;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_YAML: &str = include_str!("../../defaults/blueprint.default.yaml");

/// Errors threshold used when nothing else is configured
pub const DEFAULT_MAX_ERRORS: usize = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parse: ParseConfig,
    pub format: FormatConfig,
}

/// How source text is turned into a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    /// Resolve variables and compute operator values
    pub eval: bool,
    /// Stop after this many errors (values below 1 count as 1)
    pub max_errors: usize,
    /// How an error-free parse treats comments on unreachable nodes
    pub dangling: DanglingPolicy,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            eval: false,
            max_errors: DEFAULT_MAX_ERRORS,
            dangling: DanglingPolicy::Strict,
        }
    }
}

impl ParseConfig {
    pub fn evaluating() -> Self {
        Self {
            eval: true,
            ..Self::default()
        }
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// When lists are printed one element per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListLayout {
    /// Inline when the list has at most one element and fit on one source line
    #[default]
    Preserve,
    /// Every non-empty list is split
    Expand,
}

/// How a tree is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    pub list_layout: ListLayout,
    pub blank_line_after_module: bool,
    /// Sort primitive lists before printing
    pub sort_lists: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            list_layout: ListLayout::Preserve,
            blank_line_after_module: true,
            sort_lists: false,
        }
    }
}

impl Config {
    /// Parse a complete configuration from YAML, defaulting missing keys
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Helper for layering user overrides over the built-in defaults
#[derive(Debug, Clone)]
pub struct Loader {
    layers: Vec<Value>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            layers: vec![serde_yaml::from_str(DEFAULT_YAML)?],
        })
    }

    /// Layer YAML text
    pub fn with_str(mut self, yaml: &str) -> Result<Self, ConfigError> {
        self.layers.push(serde_yaml::from_str(yaml)?);
        Ok(self)
    }

    /// Layer a configuration file; a missing file is an error
    pub fn with_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.with_str(&text)
    }

    /// Merge the layers and deserialize the result
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut merged = Value::Null;
        for layer in self.layers {
            merge(&mut merged, layer);
        }
        Ok(serde_yaml::from_value(merged)?)
    }
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

/// Convenience helper for callers that only need the defaults
pub fn load_defaults() -> Result<Config, ConfigError> {
    Loader::new()?.build()
}
