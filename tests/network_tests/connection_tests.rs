//! Connection Tests
//!
//! Full request/response transactions against a scripted buffer server.

#[path = "../common/mod.rs"]
mod common;

use bytes::BufMut;

use bufferbci::protocol::{Command, DataType, PROTOCOL_VERSION};
use bufferbci::{BufferError, ByteOrder, Event, WaitRequest};
use common::{payload, reply, MockServer, Reply};

// =============================================================================
// Payload Builders
// =============================================================================

fn header_payload(
    order: ByteOrder,
    channels: u32,
    samples: u32,
    events: u32,
    fsamp: f32,
    data_type: u32,
    chunks: &[u8],
) -> Vec<u8> {
    let mut buf = payload();
    order.put_u32(&mut buf, channels);
    order.put_u32(&mut buf, samples);
    order.put_u32(&mut buf, events);
    order.put_f32(&mut buf, fsamp);
    order.put_u32(&mut buf, data_type);
    order.put_u32(&mut buf, chunks.len() as u32);
    buf.put_slice(chunks);
    buf.to_vec()
}

fn data_payload(
    order: ByteOrder,
    channels: u32,
    samples: u32,
    data_type: u32,
    raw: &[u8],
) -> Vec<u8> {
    let mut buf = payload();
    order.put_u32(&mut buf, channels);
    order.put_u32(&mut buf, samples);
    order.put_u32(&mut buf, data_type);
    order.put_u32(&mut buf, raw.len() as u32);
    buf.put_slice(raw);
    buf.to_vec()
}

fn counts_payload(order: ByteOrder, samples: u32, events: u32) -> Vec<u8> {
    let mut buf = payload();
    order.put_u32(&mut buf, samples);
    order.put_u32(&mut buf, events);
    buf.to_vec()
}

fn u32_at(order: ByteOrder, bytes: &[u8], offset: usize) -> u32 {
    let mut buf = &bytes[offset..offset + 4];
    order.get_u32(&mut buf)
}

fn i32_at(order: ByteOrder, bytes: &[u8], offset: usize) -> i32 {
    let mut buf = &bytes[offset..offset + 4];
    order.get_i32(&mut buf)
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_get_header() {
    let order = ByteOrder::Big;
    let body = header_payload(order, 3, 1000, 0, 250.0, DataType::Float32.tag(), &[]);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &body)]);

    let mut conn = server.connect();
    let header = conn.get_header().unwrap();
    conn.close().unwrap();

    assert_eq!(header.channel_count, 3);
    assert_eq!(header.sample_count, 1000);
    assert_eq!(header.event_count, 0);
    assert_eq!(header.sampling_frequency_hz, 250.0);
    assert_eq!(header.data_type, DataType::Float32);
    assert!(header.chunks.is_empty());

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].envelope.version, PROTOCOL_VERSION);
    assert_eq!(requests[0].envelope.command, Command::GetHdr.code());
    assert_eq!(requests[0].envelope.payload_size, 0);
}

#[test]
fn test_get_header_little_endian() {
    let order = ByteOrder::Little;
    let body = header_payload(order, 8, 42, 2, 512.0, DataType::Int16.tag(), &[]);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &body)]);

    let mut conn = server.connect();
    let header = conn.get_header().unwrap();
    drop(conn);

    assert_eq!(header.channel_count, 8);
    assert_eq!(header.sample_count, 42);
    assert_eq!(header.event_count, 2);
    assert_eq!(header.data_type, DataType::Int16);
    server.finish();
}

#[test]
fn test_get_header_empty_payload_is_protocol_error() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &[])]);

    let mut conn = server.connect();
    let err = conn.get_header().unwrap_err();
    assert!(err.is_protocol(), "unexpected error: {}", err);
    assert!(conn.is_broken());
    drop(conn);
    server.finish();
}

#[test]
fn test_get_header_get_err_is_unexpected_command() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![reply(order, Command::GetErr, &[])]);

    let mut conn = server.connect();
    match conn.get_header() {
        Err(BufferError::UnexpectedCommand { expected, received }) => {
            assert_eq!(expected, Command::GetOk);
            assert_eq!(received, Command::GetErr.code());
        }
        other => panic!("Expected UnexpectedCommand, got {:?}", other),
    }
    drop(conn);
    server.finish();
}

#[test]
fn test_header_chunk_tail_is_consumed_exactly() {
    let order = ByteOrder::Big;
    let chunks = [0xAA; 12];
    let header = header_payload(order, 2, 7, 1, 100.0, DataType::Float64.tag(), &chunks);
    let counts = counts_payload(order, 7, 1);
    let server = MockServer::start(
        order,
        vec![
            reply(order, Command::GetOk, &header),
            reply(order, Command::WaitOk, &counts),
        ],
    );

    let mut conn = server.connect();
    let header = conn.get_header().unwrap();
    assert_eq!(header.chunks, chunks.to_vec());

    // The next transaction only decodes correctly if the tail was fully read
    let counts = conn.wait_data(WaitRequest::poll()).unwrap();
    assert_eq!(counts.samples, 7);
    assert_eq!(counts.events, 1);
    conn.close().unwrap();
    server.finish();
}

#[test]
fn test_put_header() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![reply(order, Command::PutOk, &[])]);

    let mut conn = server.connect();
    conn.put_header(16, 256.0).unwrap();
    conn.close().unwrap();

    let requests = server.finish();
    let request = &requests[0];
    assert_eq!(request.envelope.command, Command::PutHdr.code());
    assert_eq!(request.envelope.payload_size, 24);
    assert_eq!(u32_at(order, &request.payload, 0), 16);
    assert_eq!(u32_at(order, &request.payload, 4), 0);
    assert_eq!(u32_at(order, &request.payload, 8), 0);
    assert_eq!(u32_at(order, &request.payload, 12), 256.0f32.to_bits());
    assert_eq!(u32_at(order, &request.payload, 16), 0);
    assert_eq!(u32_at(order, &request.payload, 20), 0);
}

// =============================================================================
// Data Tests
// =============================================================================

#[test]
fn test_get_data_uint8() {
    let order = ByteOrder::Big;
    let body = data_payload(order, 2, 2, DataType::Uint8.tag(), &[1, 2, 3, 4]);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &body)]);

    let mut conn = server.connect();
    let samples = conn.get_data(0, 1).unwrap();
    conn.close().unwrap();

    assert_eq!(samples, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

    let requests = server.finish();
    assert_eq!(requests[0].envelope.command, Command::GetDat.code());
    assert_eq!(requests[0].envelope.payload_size, 8);
    assert_eq!(u32_at(order, &requests[0].payload, 0), 0);
    assert_eq!(u32_at(order, &requests[0].payload, 4), 1);
}

#[test]
fn test_get_all_data_sends_empty_payload() {
    let order = ByteOrder::Little;
    let mut raw = payload();
    for v in [-1.5f32, 2.25, 8.0] {
        order.put_f32(&mut raw, v);
    }
    let body = data_payload(order, 3, 1, DataType::Float32.tag(), &raw);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &body)]);

    let mut conn = server.connect();
    let samples = conn.get_all_data().unwrap();
    conn.close().unwrap();

    assert_eq!(samples, vec![vec![-1.5, 2.25, 8.0]]);

    let requests = server.finish();
    assert_eq!(requests[0].envelope.payload_size, 0);
    assert!(requests[0].payload.is_empty());
}

#[test]
fn test_get_data_count_size_mismatch() {
    let order = ByteOrder::Big;
    let body = data_payload(order, 2, 5, DataType::Float32.tag(), &[]);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &body)]);

    let mut conn = server.connect();
    let err = conn.get_data(0, 4).unwrap_err();
    assert!(matches!(err, BufferError::Protocol(_)), "unexpected error: {}", err);
    drop(conn);
    server.finish();
}

#[test]
fn test_get_data_short_response() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &[0u8; 8])]);

    let mut conn = server.connect();
    let err = conn.get_all_data().unwrap_err();
    assert!(err.is_protocol());
    drop(conn);
    server.finish();
}

#[test]
fn test_get_data_unknown_data_type() {
    let order = ByteOrder::Big;
    let body = data_payload(order, 1, 1, 42, &[0; 8]);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &body)]);

    let mut conn = server.connect();
    let err = conn.get_all_data().unwrap_err();
    assert!(matches!(err, BufferError::UnknownDataType(42)));
    drop(conn);
    server.finish();
}

#[test]
fn test_get_data_invalid_range_never_hits_network() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![]);

    let mut conn = server.connect();
    let err = conn.get_data(10, 5).unwrap_err();
    assert!(matches!(err, BufferError::Validation(_)));
    assert!(!conn.is_broken());
    drop(conn);

    assert!(server.finish().is_empty());
}

#[test]
fn test_get_latest_data() {
    let order = ByteOrder::Big;
    let header = header_payload(order, 1, 10, 0, 100.0, DataType::Int8.tag(), &[]);
    let data = data_payload(order, 1, 3, DataType::Int8.tag(), &[0xFF, 0x00, 0x7F]);
    let server = MockServer::start(
        order,
        vec![
            reply(order, Command::GetOk, &header),
            reply(order, Command::GetOk, &data),
        ],
    );

    let mut conn = server.connect();
    let samples = conn.get_latest_data(3).unwrap();
    conn.close().unwrap();

    assert_eq!(samples, vec![vec![-1.0], vec![0.0], vec![127.0]]);

    let requests = server.finish();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].envelope.command, Command::GetDat.code());
    assert_eq!(u32_at(order, &requests[1].payload, 0), 7);
    assert_eq!(u32_at(order, &requests[1].payload, 4), 9);
}

#[test]
fn test_get_latest_data_more_than_available() {
    let order = ByteOrder::Big;
    let header = header_payload(order, 3, 50, 0, 250.0, DataType::Float32.tag(), &[]);
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &header)]);

    let mut conn = server.connect();
    let err = conn.get_latest_data(100).unwrap_err();
    assert!(matches!(err, BufferError::Validation(_)));
    drop(conn);

    // Only the header was requested
    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].envelope.command, Command::GetHdr.code());
}

// =============================================================================
// Event Tests
// =============================================================================

#[test]
fn test_put_event_attaches_to_latest_sample() {
    let order = ByteOrder::Big;
    let server = MockServer::start(
        order,
        vec![
            reply(order, Command::WaitOk, &counts_payload(order, 10, 0)),
            reply(order, Command::PutOk, &[]),
        ],
    );

    let mut conn = server.connect();
    conn.put_event("marker", "onset").unwrap();
    conn.close().unwrap();

    let requests = server.finish();
    assert_eq!(requests.len(), 2);

    // Poll for the current count without waiting
    let wait = &requests[0];
    assert_eq!(wait.envelope.command, Command::WaitDat.code());
    assert_eq!(wait.payload, vec![0u8; 12]);

    let event = &requests[1];
    assert_eq!(event.envelope.command, Command::PutEvt.code());
    assert_eq!(event.envelope.payload_size, 32 + 6 + 5);
    assert_eq!(u32_at(order, &event.payload, 0), DataType::Char.tag());
    assert_eq!(u32_at(order, &event.payload, 4), 6);
    assert_eq!(u32_at(order, &event.payload, 8), DataType::Char.tag());
    assert_eq!(u32_at(order, &event.payload, 12), 5);
    assert_eq!(i32_at(order, &event.payload, 16), 9);
    assert_eq!(i32_at(order, &event.payload, 20), 0);
    assert_eq!(i32_at(order, &event.payload, 24), 0);
    assert_eq!(u32_at(order, &event.payload, 28), 11);
    assert_eq!(&event.payload[32..], b"markeronset");
}

#[test]
fn test_put_event_requires_put_ok() {
    let order = ByteOrder::Big;
    let server = MockServer::start(
        order,
        vec![
            reply(order, Command::WaitOk, &counts_payload(order, 10, 0)),
            reply(order, Command::PutErr, &[]),
        ],
    );

    let mut conn = server.connect();
    let err = conn.put_event("marker", "onset").unwrap_err();
    assert!(matches!(
        err,
        BufferError::UnexpectedCommand { expected: Command::PutOk, .. }
    ));
    drop(conn);
    server.finish();
}

#[test]
fn test_put_event_at_explicit_sample() {
    let order = ByteOrder::Little;
    let server = MockServer::start(order, vec![reply(order, Command::PutOk, &[])]);

    let mut event = Event::new("stimulus", "left", 120);
    event.offset = -4;
    event.duration = 25;

    let mut conn = server.connect();
    conn.put_event_at(&event).unwrap();
    conn.close().unwrap();

    let requests = server.finish();
    let payload = &requests[0].payload;
    assert_eq!(i32_at(order, payload, 16), 120);
    assert_eq!(i32_at(order, payload, 20), -4);
    assert_eq!(i32_at(order, payload, 24), 25);
    assert_eq!(&payload[32..], b"stimulusleft");
}

// =============================================================================
// Flush / Wait Tests
// =============================================================================

#[test]
fn test_flush_operations() {
    let order = ByteOrder::Big;
    let server = MockServer::start(
        order,
        vec![
            reply(order, Command::FlushOk, &[]),
            reply(order, Command::FlushOk, &[]),
            reply(order, Command::FlushOk, &[]),
        ],
    );

    let mut conn = server.connect();
    conn.flush_data().unwrap();
    conn.flush_events().unwrap();
    conn.flush_header().unwrap();
    conn.close().unwrap();

    let commands: Vec<u16> = server
        .finish()
        .iter()
        .map(|r| r.envelope.command)
        .collect();
    assert_eq!(
        commands,
        vec![
            Command::FlushDat.code(),
            Command::FlushEvt.code(),
            Command::FlushHdr.code()
        ]
    );
}

#[test]
fn test_flush_data_error() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![reply(order, Command::FlushErr, &[])]);

    let mut conn = server.connect();
    assert!(conn.flush_data().unwrap_err().is_protocol());
    drop(conn);
    server.finish();
}

#[test]
fn test_wait_data_sends_thresholds() {
    let order = ByteOrder::Big;
    let server = MockServer::start(
        order,
        vec![reply(order, Command::WaitOk, &counts_payload(order, 300, 4))],
    );

    let mut conn = server.connect();
    let counts = conn
        .wait_data(WaitRequest {
            sample_threshold: 250,
            event_threshold: 3,
            timeout_ms: 1000,
        })
        .unwrap();
    conn.close().unwrap();

    assert_eq!(counts.samples, 300);
    assert_eq!(counts.events, 4);

    let requests = server.finish();
    assert_eq!(requests[0].envelope.payload_size, 12);
    assert_eq!(u32_at(order, &requests[0].payload, 0), 250);
    assert_eq!(u32_at(order, &requests[0].payload, 4), 3);
    assert_eq!(u32_at(order, &requests[0].payload, 8), 1000);
}

// =============================================================================
// Failure Handling Tests
// =============================================================================

#[test]
fn test_hangup_is_transport_error() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![Reply::Hangup]);

    let mut conn = server.connect();
    let err = conn.get_header().unwrap_err();
    assert!(matches!(err, BufferError::Transport(_)), "unexpected error: {}", err);
    assert!(conn.is_broken());
    drop(conn);
    server.finish();
}

#[test]
fn test_broken_connection_refuses_requests() {
    let order = ByteOrder::Big;
    let server = MockServer::start(order, vec![reply(order, Command::GetOk, &[])]);

    let mut conn = server.connect();
    assert!(conn.get_header().is_err());
    assert!(conn.is_broken());

    // Nothing else is sent once the stream is out of sync
    let err = conn.flush_data().unwrap_err();
    assert!(err.is_protocol());
    drop(conn);

    assert_eq!(server.finish().len(), 1);
}

#[test]
fn test_wrong_byte_order_is_detected() {
    // Server answers little-endian, client expects big-endian
    let server_order = ByteOrder::Little;
    let body = counts_payload(server_order, 1, 1);
    let server = MockServer::start(
        ByteOrder::Big,
        vec![reply(server_order, Command::WaitOk, &body)],
    );

    let mut conn = server.connect();
    let err = conn.wait_data(WaitRequest::poll()).unwrap_err();
    assert!(err.is_protocol(), "unexpected error: {}", err);
    drop(conn);
    server.finish();
}
