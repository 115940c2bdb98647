//! Session store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// TTL applied to stored sessions when the caller does not supply one,
    /// in seconds.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
}

impl SessionConfig {
    /// The default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl(),
        }
    }
}

fn default_ttl() -> u64 {
    86_400
}
