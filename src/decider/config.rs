// SPDX-License-Identifier: MIT

//! Runtime configuration from environment variables

use crate::decider::error::DeciderError;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_METRICS_NAMESPACE: &str = "PolicyInferenceDecider";

/// Server and metrics settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `DECIDER_HOST`
    pub host: String,
    /// `DECIDER_PORT`
    pub port: u16,
    /// `DECIDER_METRICS`
    pub metrics_enabled: bool,
    /// `DECIDER_METRICS_NAMESPACE`
    pub metrics_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            metrics_enabled: true,
            metrics_namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, DeciderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeciderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("DECIDER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("DECIDER_PORT") {
            config.port = port.trim().parse().map_err(|_| {
                DeciderError::config(format!("DECIDER_PORT must be a port number, got '{}'", port))
            })?;
        }
        if let Some(enabled) = lookup("DECIDER_METRICS") {
            config.metrics_enabled = match enabled.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => {
                    return Err(DeciderError::config(format!(
                        "DECIDER_METRICS must be true or false, got '{}'",
                        enabled
                    )))
                }
            };
        }
        if let Some(namespace) = lookup("DECIDER_METRICS_NAMESPACE") {
            if namespace.trim().is_empty() {
                return Err(DeciderError::config(
                    "DECIDER_METRICS_NAMESPACE must not be empty",
                ));
            }
            config.metrics_namespace = namespace;
        }

        Ok(config)
    }

    /// Socket address the server listens on
    pub fn listen_addr(&self) -> Result<SocketAddr, DeciderError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            DeciderError::config(format!("DECIDER_HOST must be an IP address, got '{}'", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
