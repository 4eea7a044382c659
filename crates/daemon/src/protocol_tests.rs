// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use mb_core::Player;

#[test]
fn encode_decode_roundtrip_request() {
    let request = Request::CreateAssignments {
        assignments: Assignments {
            assignment: "srvA".to_string(),
            rosters: vec![Roster::new("red", vec![Player::new("p1")])],
        },
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn match_failure_keeps_profile_and_message() {
    let response = Response::MatchFailed {
        profile: MatchProfile::failed("watch stopped: backoff deadline exceeded"),
        message: "error retrieving matchmaking results".to_string(),
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn absent_pools_stay_absent_on_the_wire() {
    let request = Request::CreateMatch {
        profile: MatchProfile::new("1v1", "{}"),
    };
    let json = String::from_utf8(encode(&request).unwrap()).unwrap();

    assert!(json.contains(r#""type":"CreateMatch""#), "{}", json);
    let decoded: Request = decode(json.as_bytes()).unwrap();
    let Request::CreateMatch { profile } = decoded else {
        panic!("Expected CreateMatch");
    };
    assert_eq!(profile.pools, None);
}

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Pong).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(
        json_str.starts_with('{'),
        "should be JSON object: {}",
        json_str
    );
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn read_on_empty_input_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let mut buffer = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes().to_vec();
    buffer.extend_from_slice(b"{}");

    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn request_and_response_helpers_roundtrip() {
    let mut buffer = Vec::new();
    write_request(&mut buffer, &Request::Ping, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    write_response(&mut buffer, &Response::StreamEnd { emitted: 3 }, DEFAULT_TIMEOUT)
        .await
        .unwrap();

    let mut cursor = std::io::Cursor::new(buffer);
    assert_eq!(
        read_request(&mut cursor, DEFAULT_TIMEOUT).await.unwrap(),
        Request::Ping
    );
    assert_eq!(
        read_response(&mut cursor).await.unwrap(),
        Response::StreamEnd { emitted: 3 }
    );
}

#[test]
fn worker_messages_carry_the_request_key() {
    let request = Request::CompleteRequest {
        key: "mo-1.1v1".to_string(),
        profile: MatchProfile::new("1v1", "{}"),
    };
    let json = String::from_utf8(encode(&request).unwrap()).unwrap();
    assert!(json.contains(r#""key":"mo-1.1v1""#), "{}", json);

    let empty = String::from_utf8(encode(&Response::QueueEmpty).unwrap()).unwrap();
    assert_eq!(empty, r#"{"type":"QueueEmpty"}"#);
}
