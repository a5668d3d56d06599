use serde::{Deserialize, Serialize};

use crate::diff::{DiffOptions, DEFAULT_ID_KEY};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub binding: BindingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Row identity used for incremental diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Row field holding a stable identifier (default: "id").
    /// Set to "" to always diff rows by position.
    #[serde(default = "default_row_id_key")]
    pub row_id_key: String,
}

/// Renderer binding behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Report rows missing fields a template declared (default: true).
    #[serde(default = "default_validate_schema")]
    pub validate_schema: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_row_id_key() -> String {
    DEFAULT_ID_KEY.to_string()
}

fn default_validate_schema() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            row_id_key: default_row_id_key(),
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            validate_schema: default_validate_schema(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Diff options derived from `[identity]`.
    pub fn diff_options(&self) -> DiffOptions {
        if self.identity.row_id_key.is_empty() {
            DiffOptions::positional()
        } else {
            DiffOptions {
                id_key: Some(self.identity.row_id_key.clone()),
            }
        }
    }
}
