//! Error types for zonal-dns.

use thiserror::Error;

/// Errors that can occur in the DNS proxy.
#[derive(Debug, Error)]
pub enum ZoneDnsError {
    /// IO error (network, file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Zone rules document could not be read or parsed
    #[error("Zone rules error: {0}")]
    ZoneRules(String),

    /// Upstream resolution error
    #[error("Upstream resolution error: {0}")]
    Resolve(#[from] hickory_resolver::ResolveError),

    /// Inventory service HTTP error (remote classifier)
    #[error("Inventory client error: {0}")]
    Inventory(#[from] reqwest::Error),

    /// A per-question lookup exceeded its deadline
    #[error("Query timed out after {0:?}")]
    QueryTimeout(std::time::Duration),
}
