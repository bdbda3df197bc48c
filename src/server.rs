//! DNS server setup and lifecycle management.

use hickory_server::ServerFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::classifier::{RemoteZoneClassifier, StaticZoneClassifier, ZoneClassifier};
use crate::config::{ClassifierConfig, DnsConfig};
use crate::error::ZoneDnsError;
use crate::handler::ZoneDnsHandler;
use crate::inventory::InventoryClient;
use crate::resolver::{HickoryUpstreamResolver, UpstreamResolver};

/// TCP connection handling timeout.
const TCP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the classifier selected by configuration.
fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn ZoneClassifier>, ZoneDnsError> {
    match config {
        ClassifierConfig::Static { zone_file } => {
            let classifier = StaticZoneClassifier::from_path(zone_file)?;
            info!(
                zone_file = %zone_file.display(),
                rules = classifier.rule_count(),
                "loaded static zone rules"
            );
            Ok(Arc::new(classifier))
        }
        ClassifierConfig::Remote {
            endpoint,
            auth_token,
            timeout_secs,
        } => {
            let client = InventoryClient::new(
                endpoint,
                auth_token.clone(),
                Duration::from_secs(*timeout_secs),
            )?;
            info!(endpoint = %endpoint, "using remote inventory classifier");
            Ok(Arc::new(RemoteZoneClassifier::new(client)))
        }
    }
}

/// Zone-filtering DNS proxy server.
pub struct DnsServer {
    config: DnsConfig,
}

impl DnsServer {
    /// Create a new DNS server with the given configuration.
    pub fn new(config: DnsConfig) -> Self {
        Self { config }
    }

    /// Run the DNS server until the cancellation token fires.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ZoneDnsError> {
        info!(
            listen_addr = %self.config.listen_addr,
            ttl = self.config.ttl,
            "Starting zonal-dns server"
        );

        let classifier = build_classifier(&self.config.classifier)?;
        let upstream: Arc<dyn UpstreamResolver> =
            Arc::new(HickoryUpstreamResolver::new(&self.config.upstream));

        let handler = ZoneDnsHandler::new(
            classifier,
            upstream,
            self.config.ttl,
            self.config.query_timeout(),
        );

        let mut server = ServerFuture::new(handler);

        // Bind UDP
        let udp_socket = UdpSocket::bind(self.config.listen_addr).await?;
        info!(addr = %self.config.listen_addr, "DNS UDP listening");
        server.register_socket(udp_socket);

        // Bind TCP
        let tcp_listener = TcpListener::bind(self.config.listen_addr).await?;
        info!(addr = %self.config.listen_addr, "DNS TCP listening");
        server.register_listener(tcp_listener, TCP_TIMEOUT);

        info!("DNS server ready to serve queries");

        // Run server until shutdown
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("DNS server shutdown requested");
            }
            result = server.block_until_done() => {
                if let Err(e) = result {
                    error!("DNS server error: {}", e);
                }
            }
        }

        info!("DNS server stopped");
        Ok(())
    }
}
