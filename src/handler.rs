//! DNS request handling: the per-query pipeline.
//!
//! Each inbound query runs receive -> classify client -> per-question
//! filtered resolution -> reply. Every failure along the way degrades to
//! fewer or zero answers; the handler always sends a syntactically valid,
//! authoritative reply and never surfaces a DNS error status for pipeline
//! failures.

use hickory_proto::op::Header;
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::classifier::ZoneClassifier;
use crate::filter::ZoneFilteringResolver;
use crate::metrics::{self, QueryResult, Timer};
use crate::resolver::UpstreamResolver;

/// Hickory request handler implementing the zone-filtering proxy pipeline.
pub struct ZoneDnsHandler {
    classifier: Arc<dyn ZoneClassifier>,
    filter: ZoneFilteringResolver,
    ttl: u32,
    query_timeout: Duration,
}

impl ZoneDnsHandler {
    /// Create a handler over a classifier and an upstream resolver.
    pub fn new(
        classifier: Arc<dyn ZoneClassifier>,
        upstream: Arc<dyn UpstreamResolver>,
        ttl: u32,
        query_timeout: Duration,
    ) -> Self {
        let filter = ZoneFilteringResolver::new(upstream, classifier.clone());
        Self {
            classifier,
            filter,
            ttl,
            query_timeout,
        }
    }

    /// Send an authoritative reply with no answer records.
    async fn send_empty<R: ResponseHandler>(
        &self,
        request: &Request,
        header: Header,
        response_handle: &mut R,
    ) -> ResponseInfo {
        let response = MessageResponseBuilder::from_message_request(request).build_no_records(header);
        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "failed to send empty response");
                ResponseInfo::from(header)
            }
        }
    }
}

#[async_trait::async_trait]
impl RequestHandler for ZoneDnsHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_recursion_available(true);

        let client_ip = request.src().ip();
        let queries = request.queries();

        if queries.is_empty() {
            debug!(client = %client_ip, "query without question section");
            return self.send_empty(request, header, &mut response_handle).await;
        }

        // Classify the client first; an unknown zone can never match any
        // address, so short-circuit with an empty reply.
        let client_zone = match self.classifier.classify(client_ip).await {
            Some(zone) => zone,
            None => {
                debug!(client = %client_ip, "client zone unknown, replying empty");
                for query in queries {
                    metrics::record_query(
                        &format!("{:?}", query.query_type()),
                        QueryResult::UnknownClientZone,
                        Duration::ZERO,
                    );
                }
                return self.send_empty(request, header, &mut response_handle).await;
            }
        };

        debug!(client = %client_ip, zone = %client_zone, questions = queries.len(), "handling query");

        let mut answers: Vec<Record> = Vec::new();

        for query in queries {
            let timer = Timer::start();
            let rtype = query.query_type();
            let rtype_str = format!("{:?}", rtype);

            // Only A questions participate; others are skipped silently.
            if rtype != RecordType::A {
                debug!(name = %query.name(), rtype = ?rtype, "unsupported question type, skipping");
                metrics::record_query(&rtype_str, QueryResult::Unsupported, timer.elapsed());
                continue;
            }

            let name = Name::from(query.name().clone());
            let name_str = name.to_string();

            let resolved = tokio::time::timeout(
                self.query_timeout,
                self.filter.resolve_filtered(&name_str, &client_zone),
            )
            .await;

            match resolved {
                Ok(Ok(ips)) => {
                    let result = if ips.is_empty() {
                        QueryResult::EmptyZone
                    } else {
                        QueryResult::Answered
                    };
                    metrics::record_answers_returned(ips.len());
                    metrics::record_query(&rtype_str, result, timer.elapsed());

                    for ip in ips {
                        answers.push(Record::from_rdata(
                            name.clone(),
                            self.ttl,
                            RData::A(A::from(ip)),
                        ));
                    }
                }
                Ok(Err(e)) => {
                    warn!(name = %name_str, error = %e, "resolution failed, omitting question");
                    metrics::record_query(&rtype_str, QueryResult::UpstreamError, timer.elapsed());
                }
                Err(_) => {
                    let e = crate::error::ZoneDnsError::QueryTimeout(self.query_timeout);
                    warn!(name = %name_str, error = %e, "omitting question");
                    metrics::record_query(&rtype_str, QueryResult::Timeout, timer.elapsed());
                }
            }
        }

        let response = MessageResponseBuilder::from_message_request(request).build(
            header,
            answers.iter(),
            &[] as &[Record],
            &[] as &[Record],
            &[] as &[Record],
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "failed to send response");
                ResponseInfo::from(header)
            }
        }
    }
}

