// Application state module
// Holds the site built from configuration plus cached values for the hot path

use std::sync::atomic::AtomicBool;

use super::types::{Config, Mode};
use crate::edge::EdgeFunction;
use crate::handler::LocalSite;

/// What the server answers requests with
pub enum Site {
    Local(LocalSite),
    Edge(EdgeFunction),
}

/// Application state
pub struct AppState {
    pub config: Config,
    pub site: Site,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Build the site for the configured mode
    ///
    /// Edge mode fails when the repository settings are incomplete.
    pub fn new(config: Config) -> Result<Self, String> {
        let site = match config.server.mode {
            Mode::Local => Site::Local(LocalSite::from_config(&config)),
            Mode::Edge => Site::Edge(EdgeFunction::new(
                config.edge.clone(),
                config.storage.max_body_size,
            )?),
        };

        Ok(Self {
            cached_access_log: AtomicBool::new(config.logging.access_log),
            site,
            config,
        })
    }
}
