use crate::error::{Result, ScratchpadError};
use crate::filter::FilterMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Host the sensor process listens on
pub const DEFAULT_HOST: &str = "localhost";
/// Port the sensor process listens on
pub const DEFAULT_PORT: u16 = 10009;
pub const DEFAULT_DIMENSIONS: usize = 5;
pub const DEFAULT_VIEW_SLOTS: usize = 5;
pub const DEFAULT_SAVE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_VIEW_INTERVAL_MS: u64 = 250;

/// In-memory session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadConfig {
    /// State feed host
    pub host: String,
    /// State feed port
    pub port: u16,
    /// Arity of every state vector in the session
    pub dimensions: usize,
    /// Smoothing applied to the feed before it reaches the shared state
    pub filter: FilterMode,
    /// Number of bookmark slots a renderer shows
    pub view_slots: usize,
    /// Continuous-save tick period
    pub save_interval_ms: u64,
    /// Continuous-view refresh period
    pub view_interval_ms: u64,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dimensions: DEFAULT_DIMENSIONS,
            filter: FilterMode::default(),
            view_slots: DEFAULT_VIEW_SLOTS,
            save_interval_ms: DEFAULT_SAVE_INTERVAL_MS,
            view_interval_ms: DEFAULT_VIEW_INTERVAL_MS,
        }
    }
}

impl PadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ScratchpadError::InvalidConfig(
                "feed host must not be empty".to_string(),
            ));
        }
        if self.dimensions == 0 {
            return Err(ScratchpadError::InvalidConfig(
                "state vectors need at least one dimension".to_string(),
            ));
        }
        if self.view_slots == 0 {
            return Err(ScratchpadError::InvalidConfig(
                "view needs at least one bookmark slot".to_string(),
            ));
        }
        if self.save_interval_ms == 0 || self.view_interval_ms == 0 {
            return Err(ScratchpadError::InvalidConfig(
                "timer intervals must be greater than zero".to_string(),
            ));
        }
        self.filter.validate()
    }

    /// Feed address as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_millis(self.save_interval_ms)
    }

    pub fn view_interval(&self) -> Duration {
        Duration::from_millis(self.view_interval_ms)
    }
}
