//! The zone-filtering resolution pipeline.

use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::classifier::{ZoneClassifier, ZoneId};
use crate::error::ZoneDnsError;
use crate::resolver::UpstreamResolver;

/// Resolves a name upstream and keeps only the IPv4 addresses that classify
/// into the client's zone.
///
/// An empty result is a normal outcome ("no backend in this zone for this
/// name"), never an error. Upstream failures propagate so the handler can log
/// and skip the affected question.
pub struct ZoneFilteringResolver {
    upstream: Arc<dyn UpstreamResolver>,
    classifier: Arc<dyn ZoneClassifier>,
}

impl ZoneFilteringResolver {
    /// Combine an upstream resolver with a zone classifier.
    pub fn new(upstream: Arc<dyn UpstreamResolver>, classifier: Arc<dyn ZoneClassifier>) -> Self {
        Self {
            upstream,
            classifier,
        }
    }

    /// Resolve `name` and return the IPv4 addresses residing in `target_zone`.
    ///
    /// IPv6 upstream results are ignored. Addresses that classify as unknown
    /// never match any target zone.
    pub async fn resolve_filtered(
        &self,
        name: &str,
        target_zone: &ZoneId,
    ) -> Result<Vec<Ipv4Addr>, ZoneDnsError> {
        let addrs = self.upstream.lookup(name).await?;
        let candidates = addrs.len();

        let mut retained = Vec::new();
        for addr in addrs {
            let v4 = match addr {
                std::net::IpAddr::V4(v4) => v4,
                std::net::IpAddr::V6(v6) => {
                    trace!(name = %name, addr = %v6, "ignoring IPv6 upstream address");
                    continue;
                }
            };

            match self.classifier.classify(v4.into()).await {
                Some(zone) if &zone == target_zone => retained.push(v4),
                Some(zone) => {
                    trace!(name = %name, addr = %v4, zone = %zone, target = %target_zone, "address outside target zone");
                }
                None => {
                    trace!(name = %name, addr = %v4, "address zone unknown, dropping");
                }
            }
        }

        debug!(
            name = %name,
            target = %target_zone,
            candidates,
            retained = retained.len(),
            "zone-filtered resolution"
        );
        Ok(retained)
    }
}
