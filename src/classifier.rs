//! Availability-zone classification of IP addresses.
//!
//! Two interchangeable strategies sit behind [`ZoneClassifier`]: a static CIDR
//! table loaded once at startup, and a remote lookup against a cloud inventory
//! service. Both treat every failure as "unknown" rather than an error, so the
//! request path never sees a classification failure.

use async_trait::async_trait;
use ipnetwork::IpNetwork;
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ZoneDnsError;
use crate::inventory::InventoryClient;
use crate::metrics;

/// An opaque availability-zone token, e.g. `us-east-1a`.
///
/// Equality and hashing are case-insensitive; `Display` preserves the original
/// spelling. No registry of valid zones is enforced.
#[derive(Debug, Clone)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap a zone token.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The zone token as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq for ZoneId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ZoneId {}

impl Hash for ZoneId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Maps an IP address to an availability zone, or `None` when unknown.
///
/// Implementations must be safe for concurrent invocation by many simultaneous
/// requests and must never panic or surface errors; lookup failures classify
/// as unknown.
#[async_trait]
pub trait ZoneClassifier: Send + Sync {
    /// Classify `ip` into a zone, or `None` if no rule or record matches.
    async fn classify(&self, ip: IpAddr) -> Option<ZoneId>;
}

/// On-disk shape of the zone rules document:
/// `{"azs": {"us-east-1a": ["10.0.1.0/24", ...], ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneRulesDoc {
    /// Zone name to CIDR block list.
    pub azs: HashMap<String, Vec<String>>,
}

/// A single (zone, CIDR) membership rule.
#[derive(Debug, Clone)]
struct ZoneRule {
    zone: ZoneId,
    network: IpNetwork,
}

/// Static CIDR-table classifier.
///
/// The rule table is built once at startup and never mutated, so concurrent
/// reads need no synchronization. Where CIDR blocks overlap across zones the
/// longest prefix wins; exact-duplicate prefixes tie-break on zone name, so
/// classification is deterministic regardless of input ordering.
#[derive(Debug)]
pub struct StaticZoneClassifier {
    rules: Vec<ZoneRule>,
}

impl StaticZoneClassifier {
    /// Load the rules document from `path`. An unreadable file or malformed
    /// top-level document is fatal; individual bad CIDR entries are skipped
    /// with a warning.
    pub fn from_path(path: &Path) -> Result<Self, ZoneDnsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ZoneDnsError::ZoneRules(format!("failed to read {}: {}", path.display(), e))
        })?;
        let doc: ZoneRulesDoc = serde_json::from_str(&raw).map_err(|e| {
            ZoneDnsError::ZoneRules(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Self::from_document(doc))
    }

    /// Build the classifier from an already-parsed rules document.
    pub fn from_document(doc: ZoneRulesDoc) -> Self {
        let mut rules = Vec::new();

        for (zone, cidrs) in &doc.azs {
            for cidr in cidrs {
                match cidr.parse::<IpNetwork>() {
                    Ok(network) => rules.push(ZoneRule {
                        zone: ZoneId::new(zone.clone()),
                        network,
                    }),
                    Err(e) => {
                        warn!(zone = %zone, cidr = %cidr, error = %e, "skipping malformed CIDR entry");
                    }
                }
            }
        }

        // Longest prefix first; ties resolved by zone name then network so the
        // scan below is first-match-wins and fully deterministic.
        rules.sort_by_key(|r| {
            (
                Reverse(r.network.prefix()),
                r.zone.as_str().to_ascii_lowercase(),
                r.network.network(),
            )
        });

        if rules.is_empty() {
            warn!("zone rule table is empty; every client will classify as unknown");
        }
        metrics::record_rules_loaded(rules.len());

        Self { rules }
    }

    /// Number of usable rules after load.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn classify_sync(&self, ip: IpAddr) -> Option<ZoneId> {
        self.rules
            .iter()
            .find(|r| r.network.contains(ip))
            .map(|r| r.zone.clone())
    }
}

#[async_trait]
impl ZoneClassifier for StaticZoneClassifier {
    async fn classify(&self, ip: IpAddr) -> Option<ZoneId> {
        let zone = self.classify_sync(ip);
        metrics::record_classification("static", zone.is_some());
        zone
    }
}

/// Remote classifier backed by the cloud inventory service.
///
/// Looks up the network interface whose private address equals the queried IP
/// and returns its zone attribute. Any failure (timeout, auth, empty result)
/// degrades to unknown.
pub struct RemoteZoneClassifier {
    client: InventoryClient,
}

impl RemoteZoneClassifier {
    /// Wrap an inventory client.
    pub fn new(client: InventoryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ZoneClassifier for RemoteZoneClassifier {
    async fn classify(&self, ip: IpAddr) -> Option<ZoneId> {
        let zone = match self.client.lookup_zone(ip).await {
            Ok(Some(zone)) => Some(zone),
            Ok(None) => {
                debug!(ip = %ip, "no inventory interface matched");
                None
            }
            Err(e) => {
                warn!(ip = %ip, error = %e, "inventory lookup failed, classifying as unknown");
                None
            }
        };
        metrics::record_classification("remote", zone.is_some());
        zone
    }
}
