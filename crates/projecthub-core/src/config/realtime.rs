//! Real-time presence hub configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) presence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Seconds after which a presence record without activity is excluded
    /// from active-user listings.
    #[serde(default = "default_presence_ttl")]
    pub presence_ttl_seconds: u64,
    /// Interval of the dead-connection sweeper in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Maximum simultaneous connections per user in one workspace.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            presence_ttl_seconds: default_presence_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            max_connections_per_user: default_max_connections_per_user(),
        }
    }
}

impl RealtimeConfig {
    /// Staleness window as a `chrono` duration.
    pub fn presence_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.presence_ttl_seconds as i64)
    }

    /// Sweeper interval.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_presence_ttl() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_max_connections_per_user() -> usize {
    10
}
