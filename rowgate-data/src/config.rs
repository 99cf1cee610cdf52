//! Data-layer configuration.
//!
//! Resolution order (lowest to highest priority):
//! 1. built-in defaults
//! 2. the `data:` section of a YAML file
//! 3. `.env` file (loaded into process environment, never overwriting it)
//! 4. environment variables (`data.statement_timeout_ms` <-> `DATA_STATEMENT_TIMEOUT_MS`)

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
    /// A value was present but unusable.
    Invalid { key: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Invalid { key, message } => {
                write!(f, "Invalid config value for '{key}': {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Maximum widths for credential inputs, mirroring the column widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialLimits {
    pub username_max_len: usize,
    pub password_hash_max_len: usize,
}

impl Default for CredentialLimits {
    fn default() -> Self {
        Self {
            username_max_len: 64,
            password_hash_max_len: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Time budget for a single store interaction.
    pub statement_timeout_ms: u64,
    pub credentials: CredentialLimits,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            statement_timeout_ms: 5_000,
            credentials: CredentialLimits::default(),
        }
    }
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    data: DataConfig,
}

impl DataConfig {
    /// Load from a YAML file, then overlay `.env` and environment variables.
    ///
    /// A missing file is not an error: defaults and the environment still apply.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
            Self::from_yaml_str(&content)?
        } else {
            Self::default()
        };
        let _ = dotenvy::dotenv();
        config.apply_overrides(std::env::vars())?;
        config.check()?;
        tracing::debug!(
            statement_timeout_ms = config.statement_timeout_ms,
            "data config loaded"
        );
        Ok(config)
    }

    /// Parse a YAML document and read its `data:` section (useful for testing).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: Document =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load(e.to_string()))?;
        let config = doc.data;
        config.check()?;
        Ok(config)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }

    /// Overlay `DATA_*` variables. Unrelated variables are ignored.
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (env_key, env_val) in vars {
            let config_key = env_key.to_lowercase();
            match config_key.as_str() {
                "data_statement_timeout_ms" => {
                    self.statement_timeout_ms = parse_number(&config_key, &env_val)?;
                }
                "data_credentials_username_max_len" => {
                    self.credentials.username_max_len = parse_number(&config_key, &env_val)?;
                }
                "data_credentials_password_hash_max_len" => {
                    self.credentials.password_hash_max_len = parse_number(&config_key, &env_val)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.statement_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "data.statement_timeout_ms".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("not a number: {raw}"),
    })
}
