//! Zonal DNS - A topology-aware DNS resolution proxy.
//!
//! This crate provides a DNS proxy that answers A-record queries with only the
//! upstream addresses residing in the same availability zone (AZ) as the
//! querying client. The client's zone is determined from its source IP, either
//! through a static CIDR rule table or through a cloud inventory service.
//!
//! ## Features
//!
//! - Per-client answer filtering based on network topology
//! - Static CIDR rule tables with longest-prefix matching
//! - Optional remote classification via a cloud inventory API
//! - Graceful degradation: every failure yields fewer answers, never an error
//! - Graceful shutdown support
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          zonal-dns                              │
//! │                                                                 │
//! │  ┌──────────────────┐    ┌──────────────────┐                  │
//! │  │  AZ Classifier   │◀───│  Request Handler │◀── UDP/TCP       │
//! │  │ (static/remote)  │    │  (per question)  │    :53           │
//! │  └──────────────────┘    └────────┬─────────┘                  │
//! │                                   │                             │
//! │                                   ▼                             │
//! │  ┌──────────────────┐    ┌──────────────────┐                  │
//! │  │ Upstream         │◀───│  Zone-Filtering  │                  │
//! │  │ Resolver         │    │  Resolver        │                  │
//! │  └──────────────────┘    └──────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resolution Flow
//!
//! ```text
//! A? svc.example. from 10.0.1.5
//!   → classify 10.0.1.5 → az-1
//!   → resolve svc.example. upstream → [10.0.1.10, 10.0.2.20, 10.0.1.11]
//!   → retain addresses classified az-1 → [10.0.1.10, 10.0.1.11]
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use zonal_dns::{ClassifierConfig, DnsConfig, DnsServer, UpstreamConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DnsConfig {
//!         listen_addr: "0.0.0.0:5353".parse().unwrap(),
//!         ttl: 60,
//!         query_timeout_secs: 5,
//!         upstream: UpstreamConfig::default(),
//!         classifier: ClassifierConfig::Static {
//!             zone_file: "zones.json".into(),
//!         },
//!     };
//!
//!     let shutdown = CancellationToken::new();
//!     let server = DnsServer::new(config);
//!     server.run(shutdown).await.unwrap();
//! }
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod inventory;
pub mod metrics;
pub mod resolver;
pub mod server;
pub mod telemetry;

// Re-export main types
pub use classifier::{RemoteZoneClassifier, StaticZoneClassifier, ZoneClassifier, ZoneId};
pub use config::{ClassifierConfig, Config, DnsConfig, TelemetryConfig, UpstreamConfig};
pub use error::ZoneDnsError;
pub use filter::ZoneFilteringResolver;
pub use handler::ZoneDnsHandler;
pub use inventory::InventoryClient;
pub use resolver::{HickoryUpstreamResolver, UpstreamResolver};
pub use server::DnsServer;
