//! Mapping configuration.
//!
//! [`MappingConfig`] decides how generated SQL is written: identifier delimiters and
//! the parameter placeholder style. Load it from `config/config.toml` (section
//! `[mapping]`) or environment variables prefixed `TABLEMAP__`, e.g.
//! `TABLEMAP__MAPPING__PARAM_STYLE=dollar`.

use crate::mapping::formatter::{ParamStyle, SqlFormatter};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "TABLEMAP";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub param_style: ParamStyle,
    #[serde(default = "default_param_prefix")]
    pub param_prefix: String,
    #[serde(default)]
    pub left_delimiter: String,
    #[serde(default)]
    pub right_delimiter: String,
}

fn default_param_prefix() -> String {
    "?Param".to_string()
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            param_style: ParamStyle::default(),
            param_prefix: default_param_prefix(),
            left_delimiter: String::new(),
            right_delimiter: String::new(),
        }
    }
}

impl MappingConfig {
    /// Load the mapping configuration from `config/config.toml`, falling back to env vars.
    ///
    /// A missing `[mapping]` section yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("Failed to load config file, falling back to env. Error: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };
        Self::from_settings(&settings)
    }

    /// Parse configuration from TOML text, e.g. in tests
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<MappingConfig>("mapping") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Mapping configuration could not be loaded from file or environment: {e}"
            ))),
        }
    }

    /// The formatter a [`SqlMapper`](crate::mapping::SqlMapper) is built with
    pub fn formatter(&self) -> SqlFormatter {
        SqlFormatter::new(
            self.left_delimiter.as_str(),
            self.right_delimiter.as_str(),
            self.param_style,
            self.param_prefix.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_section_missing() {
        let cfg = MappingConfig::from_toml_str("[other]\nkey = 1\n").unwrap();
        assert_eq!(cfg, MappingConfig::default());
        assert_eq!(cfg.formatter().placeholder(0), "?Param0");
    }

    #[test]
    fn test_mapping_section_is_read() {
        let cfg = MappingConfig::from_toml_str(
            r#"
            [mapping]
            param_style = "dollar"
            left_delimiter = '"'
            right_delimiter = '"'
            "#,
        )
        .unwrap();
        assert_eq!(cfg.param_style, ParamStyle::Dollar);
        let formatter = cfg.formatter();
        assert_eq!(formatter.placeholder(1), "$2");
        assert_eq!(formatter.qualified("Shape", "ShapeID"), "\"Shape\".\"ShapeID\"");
    }

    #[test]
    fn test_invalid_style_is_an_error() {
        let err = MappingConfig::from_toml_str("[mapping]\nparam_style = \"colon\"\n");
        assert!(err.is_err());
    }
}
