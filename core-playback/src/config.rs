//! # Adapter Configuration
//!
//! Tunables for a playback session: progress cadence and the parameters used
//! when building engine media sources.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Interval between progress ticks while progress updating is enabled.
    ///
    /// Default: 16 ms (~60 Hz, one tick per display frame).
    #[serde(default = "default_progress_update_period")]
    pub progress_update_period: Duration,

    /// User agent the engine sends when fetching remote media.
    ///
    /// Default: `"PlaybackAdapter/<crate version>"`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum time to establish a connection to the media host.
    ///
    /// Default: 8 seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Maximum time to wait for data on an open connection.
    ///
    /// Default: 8 seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout: Duration,

    /// Follow redirects that switch between http and https.
    ///
    /// Recording mirrors commonly redirect from https to plain http.
    ///
    /// Default: true.
    #[serde(default = "default_allow_cross_protocol_redirects")]
    pub allow_cross_protocol_redirects: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            progress_update_period: default_progress_update_period(),
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            allow_cross_protocol_redirects: default_allow_cross_protocol_redirects(),
        }
    }
}

impl AdapterConfig {
    /// Configuration for battery-constrained hosts.
    ///
    /// - Progress ticks at ~4 Hz
    pub fn low_power() -> Self {
        Self {
            progress_update_period: Duration::from_millis(250),
            ..Default::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_progress_update_period(mut self, period: Duration) -> Self {
        self.progress_update_period = period;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_update_period.is_zero() {
            return Err("progress_update_period must be > 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err("connect_timeout and read_timeout must be > 0".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_progress_update_period() -> Duration {
    Duration::from_millis(16)
}

fn default_user_agent() -> String {
    format!("PlaybackAdapter/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_allow_cross_protocol_redirects() -> bool {
    true
}
