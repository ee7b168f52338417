//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AppError, Result};

/// Escalation and identity policy constants.
///
/// These defaults mirror observed proctoring behavior; they are exposed as
/// configuration so a deployment can tune them without a rebuild.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PolicyConfig {
    /// Accumulated Low/Medium warnings at which a session is terminated.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u32,
    /// Minimum cosine similarity for an identity check to count as success.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_warning_threshold() -> u32 {
    3
}

fn default_similarity_threshold() -> f64 {
    0.6
}

fn default_http_port() -> u16 {
    8080
}

fn default_db_path() -> PathBuf {
    PathBuf::from("exam-sentry.db")
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path of the `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// HTTP port the proctoring API binds to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Escalation and identity policy constants.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            http_port: default_http_port(),
            policy: PolicyConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.policy.warning_threshold == 0 {
            return Err(AppError::Config(
                "policy.warning_threshold must be greater than zero".into(),
            ));
        }

        // Cosine similarity is bounded; anything outside [-1, 1] can never match.
        if !(-1.0..=1.0).contains(&self.policy.similarity_threshold) {
            return Err(AppError::Config(
                "policy.similarity_threshold must be within [-1, 1]".into(),
            ));
        }

        Ok(())
    }
}
