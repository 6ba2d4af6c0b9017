use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Explorer configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Rows fetched per table sample (1-10000)
    #[validate(range(
        min = 1,
        max = 10_000,
        message = "Sample row limit must be between 1 and 10000"
    ))]
    pub sample_row_limit: u32,

    /// Rows fetched per related table during record expansion (1-10000)
    #[validate(range(
        min = 1,
        max = 10_000,
        message = "Related row limit must be between 1 and 10000"
    ))]
    pub related_row_limit: u32,

    /// Maximum keyword-search hits returned (1-1000)
    #[validate(range(
        min = 1,
        max = 1_000,
        message = "Search result limit must be between 1 and 1000"
    ))]
    pub search_result_limit: u32,

    /// Schema owners excluded from the catalog (system schemas)
    pub excluded_owners: Vec<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            sample_row_limit: 10,
            related_row_limit: 100,
            search_result_limit: 100,
            excluded_owners: vec![
                "pg_catalog".to_string(),
                "information_schema".to_string(),
            ],
        }
    }
}

impl ExplorerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            sample_row_limit: parse_env_var("SCHEMASCOPE_SAMPLE_ROW_LIMIT", "10")?,
            related_row_limit: parse_env_var("SCHEMASCOPE_RELATED_ROW_LIMIT", "100")?,
            search_result_limit: parse_env_var("SCHEMASCOPE_SEARCH_RESULT_LIMIT", "100")?,
            excluded_owners: env::var("SCHEMASCOPE_EXCLUDED_OWNERS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| ExplorerConfig::default().excluded_owners),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let config = Self {
            sample_row_limit: cli.sample_row_limit,
            related_row_limit: cli.related_row_limit,
            search_result_limit: cli.search_result_limit,
            excluded_owners: cli.excluded_owners,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with another configuration (CLI overrides environment)
    pub fn merge(&mut self, other: Self) {
        self.sample_row_limit = other.sample_row_limit;
        self.related_row_limit = other.related_row_limit;
        self.search_result_limit = other.search_result_limit;
        self.excluded_owners = other.excluded_owners;
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub sample_row_limit: u32,
    pub related_row_limit: u32,
    pub search_result_limit: u32,
    pub excluded_owners: Vec<String>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
