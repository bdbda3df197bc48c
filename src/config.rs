//! Configuration types for zonal-dns.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// DNS proxy configuration.
    pub dns: DnsConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// DNS proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Address for the DNS proxy to listen on (UDP and TCP).
    pub listen_addr: SocketAddr,

    /// TTL for answer records in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Deadline for resolving and filtering a single question, in seconds.
    /// A question that exceeds it is omitted from the reply.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Upstream resolver configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Which zone classification strategy to use.
    pub classifier: ClassifierConfig,
}

impl DnsConfig {
    /// Per-question deadline as a [`Duration`].
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Upstream (forward) resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Name servers to forward to. Empty means the Cloudflare defaults.
    #[serde(default)]
    pub nameservers: Vec<IpAddr>,

    /// Port the name servers listen on.
    #[serde(default = "default_upstream_port")]
    pub port: u16,

    /// Timeout for a single upstream lookup, in seconds.
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Upstream lookup timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            port: default_upstream_port(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// Zone classification strategy, selected at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ClassifierConfig {
    /// Static CIDR table loaded from a JSON rules document.
    Static {
        /// Path to the zone rules document.
        zone_file: PathBuf,
    },

    /// Remote lookup against a cloud inventory service.
    Remote {
        /// Base URL of the inventory service (e.g. "http://inventory.internal").
        endpoint: String,

        /// Optional bearer token for the inventory service.
        #[serde(default)]
        auth_token: Option<String>,

        /// Timeout for a single inventory lookup, in seconds.
        #[serde(default = "default_inventory_timeout")]
        timeout_secs: u64,
    },
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "zonal_dns=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus metrics exporter address.
    #[serde(default)]
    pub prometheus_addr: Option<SocketAddr>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            prometheus_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ttl() -> u32 {
    60
}

fn default_query_timeout() -> u64 {
    5
}

fn default_upstream_port() -> u16 {
    53
}

fn default_upstream_timeout() -> u64 {
    3
}

fn default_inventory_timeout() -> u64 {
    2
}
