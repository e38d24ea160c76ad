//! Response Reception Tests
//!
//! These tests verify:
//! - Header status precedence over body length
//! - Caller-owned vs callee-owned body buffers
//! - Over-capacity buffers rejected before any read
//! - Body read failures

#[path = "../support/mod.rs"]
mod support;

use std::io::Write;

use dhtproto::client::{read_response, read_response_body, read_response_header, BodyBuffer, ResponseBody};
use dhtproto::error::errno;
use dhtproto::{DhtError, ServerConnection};
use support::{capture_levels, reply, reply_with_body, response_header, test_config, MockPeer};
use tracing::Level;

// =============================================================================
// Helper Functions
// =============================================================================

fn connect(peer: &MockPeer) -> ServerConnection {
    let mut conn = ServerConnection::new("127.0.0.1", peer.port);
    conn.connect(test_config().connect_timeout).unwrap();
    conn
}

fn serve_body(body: &'static [u8]) -> MockPeer {
    MockPeer::spawn(move |mut stream| {
        reply_with_body(&mut stream, body);
    })
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_returns_body_length() {
    let peer = MockPeer::spawn(|mut stream| reply(&mut stream, 0, 12));
    let mut conn = connect(&peer);

    assert_eq!(read_response_header(&mut conn, test_config().network_timeout).unwrap(), 12);
    peer.join();
}

#[test]
fn test_header_negative_length() {
    let peer = MockPeer::spawn(|mut stream| reply(&mut stream, 0, -12));
    let mut conn = connect(&peer);

    assert!(matches!(
        read_response_header(&mut conn, test_config().network_timeout),
        Err(DhtError::Protocol { .. })
    ));
    peer.join();
}

#[test]
fn test_header_status_wins_over_length() {
    let peer = MockPeer::spawn(|mut stream| reply(&mut stream, errno::ENOSPC as u8, -12));
    let mut conn = connect(&peer);

    match read_response_header(&mut conn, test_config().network_timeout) {
        Err(DhtError::Status { code, .. }) => assert_eq!(code, errno::ENOSPC),
        other => panic!("Expected status error, got {:?}", other),
    }
    peer.join();
}

// =============================================================================
// Body Buffer Tests
// =============================================================================

#[test]
fn test_callee_owned_body() {
    let peer = serve_body(b"hello");
    let mut conn = connect(&peer);

    let body = read_response(&mut conn, BodyBuffer::CalleeOwned, test_config().network_timeout).unwrap();
    assert_eq!(body, ResponseBody::Owned(b"hello".to_vec()));
    assert_eq!(body.len(), 5);
    assert_eq!(body.into_vec(), b"hello");
    peer.join();
}

#[test]
fn test_caller_owned_body() {
    let peer = serve_body(b"hello");
    let mut conn = connect(&peer);

    let mut buf = [0xAAu8; 16];
    let body = read_response(
        &mut conn,
        BodyBuffer::CallerOwned(&mut buf),
        test_config().network_timeout,
    )
    .unwrap();
    assert_eq!(body, ResponseBody::Borrowed(b"hello"));
    assert_eq!(body.as_slice(), b"hello");

    assert_eq!(&buf[..5], b"hello");
    assert!(buf[5..].iter().all(|&b| b == 0xAA));
    peer.join();
}

#[test]
fn test_caller_owned_exact_fit() {
    let peer = serve_body(b"hello");
    let mut conn = connect(&peer);

    let mut buf = [0u8; 5];
    let body = read_response(
        &mut conn,
        BodyBuffer::CallerOwned(&mut buf),
        test_config().network_timeout,
    )
    .unwrap();
    assert_eq!(body.as_slice(), b"hello");
    peer.join();
}

#[test]
fn test_caller_owned_too_small_reads_nothing() {
    let peer = serve_body(b"hello");
    let mut conn = connect(&peer);
    let timeout = test_config().network_timeout;

    let declared = read_response_header(&mut conn, timeout).unwrap();
    assert_eq!(declared, 5);

    let mut buf = [0u8; 3];
    match read_response_body(&mut conn, declared, BodyBuffer::CallerOwned(&mut buf), timeout) {
        Err(e @ DhtError::BufferTooSmall { .. }) => {
            assert_eq!(e.errno(), errno::ENOSPC);
            if let DhtError::BufferTooSmall { declared, capacity, .. } = e {
                assert_eq!(declared, 5);
                assert_eq!(capacity, 3);
            }
        }
        other => panic!("Expected BufferTooSmall, got {:?}", other),
    }
    assert_eq!(buf, [0u8; 3]);

    // The body is still waiting on the socket
    assert_eq!(conn.recv_exact(5, timeout).unwrap(), b"hello");
    peer.join();
}

#[test]
fn test_empty_body_reads_nothing() {
    let peer = MockPeer::spawn(|mut stream| {
        reply(&mut stream, 0, 0);
        stream.write_all(b"next").unwrap();
    });
    let mut conn = connect(&peer);
    let timeout = test_config().network_timeout;

    let mut buf = [0u8; 0];
    let body = read_response(&mut conn, BodyBuffer::CallerOwned(&mut buf), timeout).unwrap();
    assert_eq!(body, ResponseBody::Empty);
    assert!(body.is_empty());

    assert_eq!(conn.recv_exact(4, timeout).unwrap(), b"next");
    peer.join();
}

#[test]
fn test_status_error_skips_body() {
    let peer = MockPeer::spawn(|mut stream| reply(&mut stream, errno::ENOENT as u8, 0));
    let mut conn = connect(&peer);

    assert!(matches!(
        read_response(&mut conn, BodyBuffer::CalleeOwned, test_config().network_timeout),
        Err(DhtError::NotFound { .. })
    ));
    peer.join();
}

#[test]
fn test_status_error_is_logged_by_combined_read() {
    let peer = MockPeer::spawn(|mut stream| reply(&mut stream, errno::EINVAL as u8, 0));
    let mut conn = connect(&peer);

    let (result, levels) = capture_levels(|| {
        read_response(&mut conn, BodyBuffer::CalleeOwned, test_config().network_timeout)
            .map(ResponseBody::into_vec)
    });

    assert!(matches!(result, Err(DhtError::Status { code, .. }) if code == errno::EINVAL));
    assert_eq!(levels.iter().filter(|&&l| l == Level::ERROR).count(), 1);
    peer.join();
}

// =============================================================================
// Body Failure Tests
// =============================================================================

#[test]
fn test_callee_owned_body_truncated() {
    let peer = MockPeer::spawn(|mut stream| {
        stream.write_all(&response_header(0, 10)).unwrap();
        stream.write_all(b"abcd").unwrap();
    });
    let mut conn = connect(&peer);

    match read_response(&mut conn, BodyBuffer::CalleeOwned, test_config().network_timeout) {
        Err(DhtError::PeerClosed { done, expected, .. }) => {
            assert_eq!(done, 4);
            assert_eq!(expected, 10);
        }
        other => panic!("Expected PeerClosed, got {:?}", other),
    }
    peer.join();
}

#[test]
fn test_caller_owned_body_truncated_keeps_buffer() {
    let peer = MockPeer::spawn(|mut stream| {
        stream.write_all(&response_header(0, 10)).unwrap();
        stream.write_all(b"abcd").unwrap();
    });
    let mut conn = connect(&peer);

    let mut buf = vec![0u8; 32];
    let result = read_response(
        &mut conn,
        BodyBuffer::CallerOwned(&mut buf),
        test_config().network_timeout,
    );
    assert!(matches!(result, Err(DhtError::PeerClosed { .. })));

    // Still the caller's buffer, same size
    assert_eq!(buf.len(), 32);
    assert_eq!(&buf[..4], b"abcd");
    peer.join();
}
