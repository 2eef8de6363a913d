// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

use crate::collection::Collection;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub edge: EdgeConfig,
}

/// Which deployment form the process runs as
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Static site plus collections in local files
    Local,
    /// Stateless handler with collections in a remote repository
    Edge,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    /// Directory served as the site root (local mode)
    pub root_dir: String,
    pub workers: Option<usize>,
}

/// Local collection storage
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Relative to `server.root_dir`
    pub wishes_file: String,
    pub rsvp_file: String,
    /// Request bodies above this many bytes are rejected
    pub max_body_size: usize,
}

/// Log verbosity, ordered from quietest to noisiest
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound in seconds for serving one connection
    pub connection_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Edge handler configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    /// `*` echoes the caller's origin; anything else is sent verbatim
    pub allowed_origin: String,
    pub github_owner: String,
    pub github_repo: String,
    pub github_token: String,
    pub branch: String,
    /// Repository path of the wishes file
    pub wishes_path: String,
    /// Repository path of the RSVP file
    pub rsvp_path: String,
    pub api_base: String,
    pub user_agent: String,
    pub max_conflict_retries: u32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            github_owner: String::new(),
            github_repo: String::new(),
            github_token: String::new(),
            branch: "main".to_string(),
            wishes_path: Collection::Wishes.default_file_name().to_string(),
            rsvp_path: Collection::Rsvp.default_file_name().to_string(),
            api_base: "https://api.github.com".to_string(),
            user_agent: "wedding-worker".to_string(),
            max_conflict_retries: 2,
        }
    }
}

impl EdgeConfig {
    /// Check that the remote repository is fully specified
    pub fn validate(&self) -> Result<(), String> {
        let missing: Vec<&str> = [
            ("github_owner", &self.github_owner),
            ("github_repo", &self.github_repo),
            ("github_token", &self.github_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Edge mode requires edge.{}",
                missing.join(", edge.")
            ))
        }
    }
}
