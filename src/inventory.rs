//! HTTP client for the cloud inventory service.
//!
//! The inventory service answers "which network interface has private address
//! X" and each interface record carries the availability zone it lives in.
//! The client is cheap to clone and internally thread-safe, so a single
//! instance is shared across all in-flight queries.

use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

use crate::classifier::ZoneId;
use crate::error::ZoneDnsError;

/// A network interface record as returned by the inventory service.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceRecord {
    /// Availability zone the interface resides in.
    #[serde(default)]
    pub availability_zone: Option<String>,

    /// Private address of the interface.
    #[serde(default)]
    pub private_ip: Option<IpAddr>,
}

/// Client for the inventory service's network-interface endpoint.
#[derive(Clone)]
pub struct InventoryClient {
    http: HttpClient,
    base_url: String,
    auth_token: Option<String>,
}

impl InventoryClient {
    /// Create a client for `base_url` with a bounded request timeout.
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ZoneDnsError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            auth_token,
        })
    }

    /// Look up the zone of the interface whose private address is `ip`.
    ///
    /// The service filters by private address, but records that carry one
    /// which disagrees with `ip` are ignored rather than trusted. Returns
    /// `Ok(None)` when no interface matches or the match has no zone
    /// attribute; transport and status errors surface as `Err` for the
    /// caller to downgrade.
    pub async fn lookup_zone(&self, ip: IpAddr) -> Result<Option<ZoneId>, ZoneDnsError> {
        let url = format!("{}/network-interfaces", self.base_url);
        let mut request = self.http.get(&url).query(&[("private-ip", ip.to_string())]);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let records: Vec<InterfaceRecord> =
            request.send().await?.error_for_status()?.json().await?;

        debug!(ip = %ip, matches = records.len(), "inventory interface lookup");

        Ok(records
            .into_iter()
            .find(|r| r.private_ip.map_or(true, |p| p == ip))
            .and_then(|r| r.availability_zone)
            .map(ZoneId::new))
    }
}
