//! Upstream (forward) name resolution.

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::Resolver;
use std::net::IpAddr;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::ZoneDnsError;

/// Forward-resolves a domain name to its published addresses.
///
/// The contract deliberately returns both IPv4 and IPv6 addresses; the
/// filtering layer discards what it cannot use. Failures (NXDOMAIN, timeout,
/// network error) surface as errors and are handled per question by the
/// caller.
#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    /// Resolve `name` to the addresses currently published for it.
    async fn lookup(&self, name: &str) -> Result<Vec<IpAddr>, ZoneDnsError>;
}

/// Production resolver backed by hickory-resolver over Tokio.
pub struct HickoryUpstreamResolver {
    resolver: Resolver<TokioConnectionProvider>,
}

impl HickoryUpstreamResolver {
    /// Build a resolver from configuration. Empty `nameservers` falls back to
    /// the Cloudflare public resolvers.
    pub fn new(config: &UpstreamConfig) -> Self {
        let resolver_config = if config.nameservers.is_empty() {
            ResolverConfig::cloudflare()
        } else {
            ResolverConfig::from_parts(
                None,
                Vec::new(),
                NameServerConfigGroup::from_ips_clear(&config.nameservers, config.port, true),
            )
        };

        let mut builder =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default());
        let opts = builder.options_mut();
        opts.timeout = config.timeout();
        // The proxy is stateless by contract; answer caching stays upstream.
        opts.cache_size = 0;

        Self {
            resolver: builder.build(),
        }
    }
}

#[async_trait]
impl UpstreamResolver for HickoryUpstreamResolver {
    async fn lookup(&self, name: &str) -> Result<Vec<IpAddr>, ZoneDnsError> {
        let lookup = self.resolver.lookup_ip(name).await?;
        let addrs: Vec<IpAddr> = lookup.iter().collect();
        debug!(name = %name, count = addrs.len(), "upstream lookup");
        Ok(addrs)
    }
}
