//! Site configuration.
//!
//! Configuration is layered: an optional TOML file, then `FOLIO__`-prefixed
//! environment variables (`FOLIO__API_URL`, `FOLIO__USE_MOCK_DATA`, ...).
//! Validation is fail-fast at startup; a half-configured site never gets far
//! enough to issue a request.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading site configuration.
#[derive(Debug, Error)]
pub enum SiteConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),

    /// The configuration is incomplete for the selected mode.
    #[error("{0} must be set unless use_mock_data is enabled")]
    MissingOptions(String),
}

/// Runtime configuration for the portfolio site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the portfolio API. Required unless `use_mock_data` is set.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Base URL of the contact-message API. Required unless `use_mock_data`
    /// is set.
    #[serde(default)]
    pub message_api_url: Option<String>,

    /// Serve fixture data instead of calling a backend.
    #[serde(default)]
    pub use_mock_data: bool,
}

impl SiteConfig {
    /// Loads configuration from an optional TOML file plus environment
    /// overrides.
    ///
    /// Callers apply any further overrides (CLI flags) and then run
    /// [`validate`](Self::validate) before using the result.
    pub fn load(path: Option<&Path>) -> Result<Self, SiteConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            let path_str = path
                .to_str()
                .ok_or_else(|| SiteConfigError::InvalidPath(format!("{:?}", path)))?;
            if !path.exists() {
                return Err(SiteConfigError::FileNotFound(path_str.to_string()));
            }
            builder = builder.add_source(File::with_name(path_str));
        }

        let config = builder
            // Environment overrides use double underscore for nesting,
            // e.g. FOLIO__API_URL.
            .add_source(
                Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let site_config: SiteConfig = config.try_deserialize()?;
        Ok(site_config)
    }

    /// Rejects configurations that cannot serve any data.
    ///
    /// Non-mock mode needs both backend URLs: one for portfolio data, one for
    /// contact messages.
    pub fn validate(&self) -> Result<(), SiteConfigError> {
        if self.use_mock_data {
            return Ok(());
        }
        let mut missing = Vec::new();
        if self.api_url.is_none() {
            missing.push("api_url");
        }
        if self.message_api_url.is_none() {
            missing.push("message_api_url");
        }
        if !missing.is_empty() {
            return Err(SiteConfigError::MissingOptions(missing.join(", ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_rejects_empty_config() {
        let config = SiteConfig::default();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "api_url, message_api_url must be set unless use_mock_data is enabled"
        );
    }

    #[test]
    fn test_validate_rejects_missing_message_api_url() {
        let config = SiteConfig {
            api_url: Some("https://api.example.com".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "message_api_url must be set unless use_mock_data is enabled"
        );
    }

    #[test]
    fn test_validate_accepts_mock_mode_without_urls() {
        let config = SiteConfig {
            use_mock_data: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_both_urls() {
        let config = SiteConfig {
            api_url: Some("https://api.example.com".to_string()),
            message_api_url: Some("https://messages.example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = SiteConfig::load(Some(Path::new("/nonexistent/folio.toml")));
        assert!(matches!(result, Err(SiteConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "api_url = \"https://api.example.com\"").unwrap();
        writeln!(file, "use_mock_data = false").unwrap();

        let config = SiteConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com"));
        assert!(!config.use_mock_data);
        assert!(config.message_api_url.is_none());
    }
}
