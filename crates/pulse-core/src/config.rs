//! pulse.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::default_catalog;
use crate::types::EndpointDescriptor;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    pub target: TargetConfig,
    pub run: Option<RunConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<EndpointDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub base_url: String,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub batch_size: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("batch size must be positive, got {0}")]
    InvalidBatchSize(usize),
    #[error("base url must start with http://, got {0}")]
    InvalidBaseUrl(String),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

impl PulseConfig {
    pub fn new(base_url: &str) -> Self {
        PulseConfig {
            target: TargetConfig {
                base_url: base_url.to_string(),
                timeout: None,
            },
            run: None,
            endpoints: Vec::new(),
        }
    }

    /// Parse a config file. Not validated, so that command-line overrides
    /// can still be applied; call [`PulseConfig::validate`] afterwards.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a minimal pulse.toml pointing at a local server.
    pub fn scaffold() -> Self {
        PulseConfig {
            target: TargetConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout: Some("10s".to_string()),
            },
            run: Some(RunConfig {
                batch_size: Some(DEFAULT_BATCH_SIZE),
            }),
            endpoints: Vec::new(),
        }
    }

    /// Configured endpoints, or the built-in catalog when none are listed.
    pub fn catalog(&self) -> Vec<EndpointDescriptor> {
        if self.endpoints.is_empty() {
            default_catalog()
        } else {
            self.endpoints.clone()
        }
    }

    pub fn batch_size(&self) -> usize {
        self.run
            .as_ref()
            .and_then(|r| r.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.run.get_or_insert(RunConfig { batch_size: None }).batch_size = Some(batch_size);
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        match &self.target.timeout {
            Some(s) => parse_duration(s),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let batch_size = self.batch_size();
        if batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        if !self.target.base_url.starts_with("http://") {
            return Err(ConfigError::InvalidBaseUrl(self.target.base_url.clone()));
        }
        self.timeout()?;
        Ok(())
    }
}

/// Parse a timeout such as `"500ms"`, `"10s"` or `"1m"`. A bare number
/// is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(s.to_string());
    let trimmed = s.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    #[test]
    fn test_scaffold_round_trips() {
        let config = PulseConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("batch_size = 10"));

        let parsed: PulseConfig = toml::from_str(&toml_str).unwrap();
        parsed.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_uses_defaults() {
        let toml_str = r#"
[target]
base_url = "http://localhost:3000"
"#;
        let config: PulseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.timeout().unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(config.catalog(), default_catalog());
    }

    #[test]
    fn test_endpoints_replace_catalog() {
        let toml_str = r#"
[target]
base_url = "http://localhost:3000"
timeout = "750ms"

[run]
batch_size = 4

[[endpoints]]
path = "/health"
method = "GET"
category = "Core"

[[endpoints]]
path = "/admin/x"
method = "GET"
requires_auth = true
category = "Admin"
"#;
        let config: PulseConfig = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();

        let catalog = config.catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1].path, "/admin/x");
        assert_eq!(catalog[1].method, HttpMethod::Get);
        assert!(catalog[1].requires_auth);
        assert_eq!(config.batch_size(), 4);
        assert_eq!(config.timeout().unwrap(), Duration::from_millis(750));
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = PulseConfig::new("http://localhost:3000");
        config.set_batch_size(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = PulseConfig::new("https://example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulse.toml");
        std::fs::write(&path, PulseConfig::scaffold().to_toml_string().unwrap()).unwrap();

        let config = PulseConfig::from_file(&path).unwrap();
        assert_eq!(config.target.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration(" 500ms ").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        for bad in ["soon", "", "ms", "5h", "1.5s", "-3s"] {
            assert!(
                matches!(parse_duration(bad), Err(ConfigError::InvalidDuration(ref s)) if s == bad),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_from_file_defers_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulse.toml");
        std::fs::write(
            &path,
            "[target]\nbase_url = \"https://api.example.com\"\n\n[run]\nbatch_size = 0\n",
        )
        .unwrap();

        let mut config = PulseConfig::from_file(&path).unwrap();
        assert!(config.validate().is_err());

        config.target.base_url = "http://127.0.0.1:9000".to_string();
        config.set_batch_size(5);
        config.validate().unwrap();
    }
}
