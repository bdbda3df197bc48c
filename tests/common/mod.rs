//! Shared test infrastructure for zone filter integration tests.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder, BinEncoder};
use hickory_server::authority::{MessageRequest, MessageResponse};
use hickory_server::proto::rr::Record;
use hickory_server::proto::xfer::Protocol;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

use zonal_dns::classifier::{StaticZoneClassifier, ZoneRulesDoc};
use zonal_dns::resolver::UpstreamResolver;
use zonal_dns::{ZoneDnsError, ZoneDnsHandler};

// --- Constants ---

pub const ZONE_A: &str = "az-1";
pub const ZONE_B: &str = "az-2";
pub const ZONE_A_CIDR: &str = "10.0.1.0/24";
pub const ZONE_B_CIDR: &str = "10.0.2.0/24";

pub const TEST_TTL: u32 = 60;
pub const TEST_QUERY_TIMEOUT: Duration = Duration::from_millis(500);

// --- TestResponseHandler ---

/// Captures the serialized DNS response for inspection in tests.
///
/// Implements `ResponseHandler` so it can be passed to
/// `RequestHandler::handle_request()`. The response is serialized via
/// `MessageResponse::destructive_emit()` and stored as raw wire-format bytes,
/// which can then be parsed with `Message::from_vec()`.
#[derive(Clone)]
pub struct TestResponseHandler {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl TestResponseHandler {
    pub fn new() -> Self {
        Self {
            buf: Arc::new(Mutex::new(Vec::with_capacity(512))),
        }
    }

    /// Parse the captured wire bytes into a `Message` for assertions.
    pub fn into_message(self) -> Message {
        let buf = self.buf.lock().unwrap();
        assert!(!buf.is_empty(), "no response was captured");
        Message::from_vec(&buf).expect("failed to parse captured DNS response")
    }
}

#[async_trait]
impl ResponseHandler for TestResponseHandler {
    async fn send_response<'a>(
        &mut self,
        response: MessageResponse<
            '_,
            'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
        >,
    ) -> io::Result<ResponseInfo> {
        let mut buf = self.buf.lock().unwrap();
        buf.clear();
        let mut encoder = BinEncoder::new(&mut *buf);
        encoder.set_max_size(u16::MAX);
        let info = response
            .destructive_emit(&mut encoder)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(info)
    }
}

// --- Mock upstreams ---

/// Upstream resolver that always returns the same address set.
pub struct FixedUpstream {
    addrs: Vec<IpAddr>,
}

impl FixedUpstream {
    pub fn new(addrs: &[&str]) -> Self {
        Self {
            addrs: addrs.iter().map(|a| a.parse().unwrap()).collect(),
        }
    }
}

#[async_trait]
impl UpstreamResolver for FixedUpstream {
    async fn lookup(&self, _name: &str) -> Result<Vec<IpAddr>, ZoneDnsError> {
        Ok(self.addrs.clone())
    }
}

/// Upstream resolver that always fails.
pub struct FailingUpstream;

#[async_trait]
impl UpstreamResolver for FailingUpstream {
    async fn lookup(&self, _name: &str) -> Result<Vec<IpAddr>, ZoneDnsError> {
        Err(ZoneDnsError::Config("simulated upstream failure".to_string()))
    }
}

/// Upstream resolver that never completes within the test deadline.
pub struct StalledUpstream;

#[async_trait]
impl UpstreamResolver for StalledUpstream {
    async fn lookup(&self, _name: &str) -> Result<Vec<IpAddr>, ZoneDnsError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
}

// --- Classifier builders ---

/// Rules document with the two standard test zones.
pub fn two_zone_rules() -> ZoneRulesDoc {
    zone_rules(&[(ZONE_A, &[ZONE_A_CIDR]), (ZONE_B, &[ZONE_B_CIDR])])
}

/// Build a rules document from (zone, cidrs) pairs.
pub fn zone_rules(entries: &[(&str, &[&str])]) -> ZoneRulesDoc {
    let azs = entries
        .iter()
        .map(|(zone, cidrs)| {
            (
                zone.to_string(),
                cidrs.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect();
    ZoneRulesDoc { azs }
}

// --- Handler builders ---

/// Build a handler over the two standard zones and a fixed upstream.
pub fn build_handler(upstream_addrs: &[&str]) -> ZoneDnsHandler {
    build_handler_with(two_zone_rules(), Arc::new(FixedUpstream::new(upstream_addrs)))
}

/// Build a handler from an arbitrary rules document and upstream.
pub fn build_handler_with(
    rules: ZoneRulesDoc,
    upstream: Arc<dyn UpstreamResolver>,
) -> ZoneDnsHandler {
    let classifier = Arc::new(StaticZoneClassifier::from_document(rules));
    ZoneDnsHandler::new(classifier, upstream, TEST_TTL, TEST_QUERY_TIMEOUT)
}

// --- Query/Request construction ---

/// Build wire-format bytes for a DNS query.
pub fn build_query_bytes(name: &str, record_type: RecordType, id: u16) -> Vec<u8> {
    let mut msg = Message::new();
    msg.set_id(id);
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(true);
    let mut query = Query::new();
    query.set_name(Name::from_ascii(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);
    msg.add_query(query);
    msg.to_vec().unwrap()
}

/// Parse wire bytes into a MessageRequest.
pub fn parse_message_request(bytes: &[u8]) -> MessageRequest {
    let mut decoder = BinDecoder::new(bytes);
    MessageRequest::read(&mut decoder).expect("failed to parse MessageRequest")
}

/// Build a full `Request` with a crafted source address.
pub fn build_request(name: &str, record_type: RecordType, src: SocketAddr, id: u16) -> Request {
    let bytes = build_query_bytes(name, record_type, id);
    let msg = parse_message_request(&bytes);
    Request::new(msg, src, Protocol::Udp)
}

/// Source address inside the given zone's CIDR.
pub fn src_in_zone_a() -> SocketAddr {
    "10.0.1.5:40000".parse().unwrap()
}

pub fn src_in_zone_b() -> SocketAddr {
    "10.0.2.5:40000".parse().unwrap()
}

/// Source address matching no zone rule.
pub fn src_unknown() -> SocketAddr {
    "192.168.9.9:40000".parse().unwrap()
}

// --- Response helpers ---

/// Execute a query through the handler and return the parsed response.
pub async fn execute_query(
    handler: &ZoneDnsHandler,
    name: &str,
    record_type: RecordType,
    src: SocketAddr,
    id: u16,
) -> Message {
    let request = build_request(name, record_type, src, id);
    let capture = TestResponseHandler::new();
    handler.handle_request(&request, capture.clone()).await;
    capture.into_message()
}

/// Extract A addresses from a response.
pub fn extract_a_ips(msg: &Message) -> Vec<Ipv4Addr> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect()
}

/// Assert response code.
pub fn assert_response_code(msg: &Message, expected: ResponseCode) {
    assert_eq!(
        msg.response_code(),
        expected,
        "expected {:?}, got {:?}",
        expected,
        msg.response_code()
    );
}

/// Assert response is successful with exactly the expected IPs.
pub fn assert_a_response(msg: &Message, expected_ips: &[&str]) {
    assert_response_code(msg, ResponseCode::NoError);
    let mut actual = extract_a_ips(msg);
    actual.sort();
    let mut expected: Vec<Ipv4Addr> = expected_ips.iter().map(|s| s.parse().unwrap()).collect();
    expected.sort();
    assert_eq!(
        actual, expected,
        "A records mismatch.\nactual:   {:?}\nexpected: {:?}",
        actual, expected
    );
}
