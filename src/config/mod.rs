// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::collection::Collection;

// Re-export public types
pub use state::{AppState, Site};
pub use types::{
    Config, EdgeConfig, LogLevel, LoggingConfig, Mode, PerformanceConfig, ServerConfig,
    StorageConfig,
};

/// Bare environment variables understood for compatibility with existing
/// deployments, mapped to their configuration keys. They win over every
/// other source.
const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("ALLOWED_ORIGIN", "edge.allowed_origin"),
    ("GITHUB_OWNER", "edge.github_owner"),
    ("GITHUB_REPO", "edge.github_repo"),
    ("GITHUB_TOKEN", "edge.github_token"),
    ("GITHUB_BRANCH", "edge.branch"),
    ("WISHES_FILE_PATH", "edge.wishes_path"),
    ("RSVP_FILE_PATH", "edge.rsvp_path"),
];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, |name| std::env::var(name).ok())
    }

    /// Same as [`Config::load_from`], reading legacy variables through `lookup`
    pub fn load_with_env<F>(config_path: &str, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let edge = EdgeConfig::default();
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WEDDING")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.mode", "local")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5500)?
            .set_default("server.root_dir", ".")?
            .set_default("storage.wishes_file", Collection::Wishes.default_file_name())?
            .set_default("storage.rsvp_file", Collection::Rsvp.default_file_name())?
            .set_default("storage.max_body_size", 2_097_152)? // 2 MiB
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.connection_timeout", 30)?
            .set_default("edge.allowed_origin", edge.allowed_origin)?
            .set_default("edge.github_owner", edge.github_owner)?
            .set_default("edge.github_repo", edge.github_repo)?
            .set_default("edge.github_token", edge.github_token)?
            .set_default("edge.branch", edge.branch)?
            .set_default("edge.wishes_path", edge.wishes_path)?
            .set_default("edge.rsvp_path", edge.rsvp_path)?
            .set_default("edge.api_base", edge.api_base)?
            .set_default("edge.user_agent", edge.user_agent)?
            .set_default(
                "edge.max_conflict_retries",
                i64::from(edge.max_conflict_retries),
            )?;

        for (name, key) in LEGACY_ENV_OVERRIDES {
            // Empty values fall back to the defaults, like unset ones
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.server.root_dir)
    }
}
