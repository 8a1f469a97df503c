//! TOML-based configuration for conflictkit.
//!
//! Every section is optional; a missing file or section yields defaults.
//! A small set of values can be overridden from the environment via
//! [`EngineConfig::apply_env_overrides`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conflict::Selection;
use crate::errors::ConfigError;

/// Environment variable overriding `log.level`.
pub const LOG_LEVEL_ENV: &str = "CONFLICTKIT_LOG";
/// Environment variable overriding `resolve.default_selection`.
pub const DEFAULT_SELECTION_ENV: &str = "CONFLICTKIT_DEFAULT_SELECTION";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Resolution policy.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Rendering of the block model.
    #[serde(default)]
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

/// Resolution policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveConfig {
    /// Selection every conflict block starts with (default `none`).
    #[serde(default)]
    pub default_selection: Selection,

    /// Allow writing a resolution in which some conflict blocks produce no
    /// text. When `false`, such a resolution is refused.
    #[serde(default = "default_true")]
    pub allow_empty: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            default_selection: Selection::None,
            allow_empty: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Show diff3 base text when present.
    #[serde(default = "default_true")]
    pub show_base: bool,

    /// Colorize terminal output.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_base: true,
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Commented configuration written by `conflictkit init`. Parses to
/// [`EngineConfig::default`].
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# conflictkit configuration

[log]
# trace, debug, info, warn, error
level = "warn"

[resolve]
# Selection every conflict starts with: none, ours, theirs, both
default_selection = "none"
# Allow saving while some conflicts resolve to nothing
allow_empty = true

[display]
show_base = true
color = true
"#;

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl EngineConfig {
    /// Load an [`EngineConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::FileNotFound(path)) => {
                debug!(%path, "no configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Override values from [`LOG_LEVEL_ENV`] and [`DEFAULT_SELECTION_ENV`].
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(level) = read_optional_env(LOG_LEVEL_ENV) {
            self.log.level = level;
        }
        if let Some(selection) = read_optional_env(DEFAULT_SELECTION_ENV) {
            self.resolve.default_selection =
                selection.parse::<Selection>().map_err(|detail| ConfigError::InvalidValue {
                    field: DEFAULT_SELECTION_ENV.into(),
                    detail,
                })?;
        }
        Ok(())
    }

    /// Validate that all values are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".into(),
                detail: format!(
                    "unknown level '{}', expected one of {}",
                    self.log.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        if self.resolve.default_selection == Selection::None && !self.resolve.allow_empty {
            warn!(
                "default_selection = none with allow_empty = false: \
                 every conflict must be chosen explicitly"
            );
        }
        Ok(())
    }

    /// Convenience: load (or default), apply env overrides, and validate.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

/// Read an environment variable, treating unset and empty the same.
fn read_optional_env(env_name: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(env_name, "resolved env override");
            Some(val)
        }
        Ok(_) => {
            warn!(env_name, "env var is set but empty");
            None
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[log]
level = "debug"

[resolve]
default_selection = "theirs"
allow_empty = false

[display]
show_base = false
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: EngineConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.resolve.default_selection, Selection::Theirs);
        assert!(!config.resolve.allow_empty);
        assert!(!config.display.show_base);
        assert!(config.display.color);
    }

    #[test]
    fn test_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.resolve.default_selection, Selection::None);
        assert!(config.resolve.allow_empty);
    }

    #[test]
    fn test_template_matches_defaults() {
        let config: EngineConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = EngineConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.resolve.default_selection, Selection::Theirs);
    }

    #[test]
    fn test_file_not_found() {
        let result = EngineConfig::load_from_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));

        let config = EngineConfig::load_or_default("/nonexistent/config.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[resolve]\ndefault_selection = \"all\"\n").unwrap();

        let result = EngineConfig::load_or_default(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = EngineConfig::default();
        config.log.level = "loud".into();
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "log.level"
        ));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var(DEFAULT_SELECTION_ENV, "both");
        std::env::set_var(LOG_LEVEL_ENV, "info");

        let mut config = EngineConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.resolve.default_selection, Selection::Both);
        assert_eq!(config.log.level, "info");

        std::env::set_var(DEFAULT_SELECTION_ENV, "everything");
        let mut config = EngineConfig::default();
        assert!(matches!(
            config.apply_env_overrides(),
            Err(ConfigError::InvalidValue { .. })
        ));

        // Clean up
        std::env::remove_var(DEFAULT_SELECTION_ENV);
        std::env::remove_var(LOG_LEVEL_ENV);
    }
}
