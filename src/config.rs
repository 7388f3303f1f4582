//! Layered configuration: defaults, a YAML file, then environment overrides.
//!
//! Command-line flags are applied on top by the command handlers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::pipeline::{GenerateOptions, DEFAULT_MAX_TOKENS};
use crate::prompt::DEFAULT_TARGET_MODEL;
use crate::render::OutputFormat;
use crate::tree::ExclusionConfig;

/// Config file looked up in the target root.
pub const CONFIG_FILE_NAME: &str = ".ctxpack.yaml";

/// Overrides the output format.
pub const ENV_FORMAT: &str = "CTXPACK_FORMAT";
/// Overrides the token budget.
pub const ENV_MAX_TOKENS: &str = "CTXPACK_MAX_TOKENS";
/// Overrides the target model.
pub const ENV_TARGET_MODEL: &str = "CTXPACK_TARGET_MODEL";

/// Settings for a generation, as read from disk and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// What to skip while walking the tree.
    pub exclusion: ExclusionConfig,
    /// Output format name.
    pub format: String,
    /// Requested token budget before the safety margin.
    pub max_tokens: usize,
    /// Model the artifact is prepared for.
    pub target_model: String,
    /// Skip the per-file character limit.
    pub full_content: bool,
    /// Include the metadata section.
    pub include_metadata: bool,
    /// Emit compact JSON.
    pub minify: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            exclusion: ExclusionConfig::default(),
            format: OutputFormat::Json.as_str().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            target_model: DEFAULT_TARGET_MODEL.to_string(),
            full_content: false,
            include_metadata: true,
            minify: false,
        }
    }
}

impl ContextConfig {
    /// Resolves the file layer of the configuration for a run against `root`.
    ///
    /// Reads `explicit` when given, otherwise `root/.ctxpack.yaml` if it
    /// exists, otherwise the defaults. Environment overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed.
    pub fn discover(root: Option<&Path>, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file: Option<PathBuf> = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => root.map(|r| r.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
        };
        match file {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] as [`ContextConfig::apply_env`] does.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Parses a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        let config = Self::from_yaml(&content)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parses YAML text; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if `content` does not parse.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Applies `CTXPACK_*` overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for an empty format or model, or a
    /// budget that is not a positive integer.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: &str| ConfigError::InvalidEnv { key: key.to_string(), value: value.to_string() };

        if let Some(value) = lookup(ENV_FORMAT) {
            if value.trim().is_empty() {
                return Err(invalid(ENV_FORMAT, &value));
            }
            self.format = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_MAX_TOKENS) {
            self.max_tokens = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid(ENV_MAX_TOKENS, &value)),
            };
        }
        if let Some(value) = lookup(ENV_TARGET_MODEL) {
            if value.trim().is_empty() {
                return Err(invalid(ENV_TARGET_MODEL, &value));
            }
            self.target_model = value.trim().to_string();
        }
        Ok(())
    }

    /// Pipeline options carried by this configuration.
    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            format: self.format.clone(),
            max_tokens: self.max_tokens,
            target_model: self.target_model.clone(),
            full_content: self.full_content,
            include_metadata: self.include_metadata,
            minify: self.minify,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = ContextConfig::from_yaml(
            "format: markdown\nexclusion:\n  excluded_patterns: ['*.lock']\n  include_hidden: true\n",
        )
        .unwrap();
        assert_eq!(config.format, "markdown");
        assert_eq!(config.max_tokens, 128_000);
        assert!(config.exclusion.include_hidden);
        assert!(config.exclusion.excluded_patterns.contains("*.lock"));
        assert!(config.exclusion.excluded_directory_names.contains("node_modules"));
        assert_eq!(ContextConfig::from_yaml("").unwrap(), ContextConfig::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = ContextConfig::default();
        config
            .apply_env(env(&[(ENV_FORMAT, "plain"), (ENV_MAX_TOKENS, "2000"), (ENV_TARGET_MODEL, "o1")]))
            .unwrap();
        let options = config.generate_options();
        assert_eq!(options.format, "plain");
        assert_eq!(options.max_tokens, 2000);
        assert_eq!(options.target_model, "o1");
    }

    #[test]
    fn invalid_budget_is_rejected() {
        let mut config = ContextConfig::default();
        let err = config.apply_env(env(&[(ENV_MAX_TOKENS, "lots")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for CTXPACK_MAX_TOKENS: lots");
        assert!(config.apply_env(env(&[(ENV_MAX_TOKENS, "0")])).is_err());
    }

    #[test]
    fn root_config_file_is_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "minify: true\n").unwrap();
        let config = ContextConfig::from_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(config.minify);
    }

    #[test]
    fn discover_prefers_explicit_then_root_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ContextConfig::discover(Some(dir.path()), None).unwrap(), ContextConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "format: markdown\n").unwrap();
        assert_eq!(ContextConfig::discover(Some(dir.path()), None).unwrap().format, "markdown");
        assert_eq!(ContextConfig::discover(None, None).unwrap(), ContextConfig::default());

        let explicit = dir.path().join("other.yaml");
        std::fs::write(&explicit, "format: plain\n").unwrap();
        let config = ContextConfig::discover(Some(dir.path()), Some(&explicit)).unwrap();
        assert_eq!(config.format, "plain");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ContextConfig::from_file(Path::new("/no/such/ctxpack.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
