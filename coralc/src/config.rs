///
/// # Compiler Configuration
///
/// Optional `coralc.toml` read from `--config` or from the directory of the
/// input. Every section and field may be omitted.
///
/// ## Example coralc.toml
///
/// ```toml
/// [codegen]
/// temp_prefix = "_"
/// function_prefix = "coral_"
/// indent = "\t"
///
/// [builtins]
/// disabled = ["svd"]
///
/// [builtins.aliases]
/// normalize = "vector_normalize"
/// ```
///
/// Aliases are applied before builtins are disabled, so disabling a builtin
/// also removes any alias configured for it.
///

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lowering::{BuiltinRegistry, RegistryError};

pub const CONFIG_FILE: &str = "coralc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("alias '{alias}' refers to unknown builtin '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("cannot disable unknown builtin '{name}'")]
    UnknownDisabled { name: String },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub builtins: BuiltinsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodegenConfig {
    pub temp_prefix: String,
    pub function_prefix: String,
    pub indent: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            temp_prefix: "_".to_string(),
            function_prefix: "coral_".to_string(),
            indent: "\t".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuiltinsConfig {
    pub disabled: Vec<String>,
    pub aliases: IndexMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `coralc.toml` next to the input (its own directory when the input is
    /// a directory), or the defaults when there is none.
    pub fn discover(input: &Path) -> Result<Self, ConfigError> {
        let dir = if input.is_dir() {
            input
        } else {
            input.parent().unwrap_or_else(|| Path::new("."))
        };

        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let codegen = &self.codegen;

        if !is_identifier_prefix(&codegen.temp_prefix) || codegen.temp_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "codegen.temp_prefix",
                reason: format!("'{}' is not a C identifier prefix", codegen.temp_prefix),
            });
        }

        if !is_identifier_prefix(&codegen.function_prefix) {
            return Err(ConfigError::InvalidValue {
                field: "codegen.function_prefix",
                reason: format!("'{}' is not a C identifier prefix", codegen.function_prefix),
            });
        }

        if !codegen.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::InvalidValue {
                field: "codegen.indent",
                reason: "only spaces and tabs are allowed".to_string(),
            });
        }

        Ok(())
    }

    /// The default registry with this configuration's aliases and disables.
    pub fn registry(&self) -> Result<BuiltinRegistry, ConfigError> {
        let mut registry = BuiltinRegistry::with_defaults();

        for (alias, target) in &self.builtins.aliases {
            if !registry.contains(target) {
                return Err(ConfigError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
            registry.alias(alias, target)?;
        }

        for name in &self.builtins.disabled {
            if !registry.contains(name) {
                return Err(ConfigError::UnknownDisabled { name: name.clone() });
            }
            registry.disable(name)?;
        }

        Ok(registry)
    }
}

fn is_identifier_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => false,
    }
}
