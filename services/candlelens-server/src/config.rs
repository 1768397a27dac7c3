//! Server configuration
//!
//! Binding and logging settings, resolved from CLI flags and environment
//! variables. Provider credentials are loaded separately by
//! `ProviderRegistry::from_env`.

use std::net::SocketAddr;

/// Server binding settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (json, pretty)
    pub log_format: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {e}", self.host, self.port))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}
