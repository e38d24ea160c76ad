//! Configuration for dhtproto
//!
//! Timeouts are bundled here and handed to every operation explicitly.

use std::time::Duration;

/// Client configuration shared by connections and operations
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Deadline for establishing a TCP connection (direct or to a proxy)
    pub connect_timeout: Duration,

    /// Deadline applied to each send or receive call
    ///
    /// The deadline covers one whole `send_all`/`recv_exact` call and is not
    /// reset when a partial transfer makes progress.
    pub network_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            network_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout = Duration::from_millis(ms.max(1));
        self
    }

    /// Set the per-call network timeout (in milliseconds)
    pub fn network_timeout_ms(mut self, ms: u64) -> Self {
        self.config.network_timeout = Duration::from_millis(ms.max(1));
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
