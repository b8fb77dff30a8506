//! Response Decoding Tests
//!
//! Tests for status handling and the per-operation response bodies.

#[path = "../common/mod.rs"]
mod common;

use common::Packet;
use rowwire::protocol::{
    decode_handshake, decode_response, response_len, OpCode, Response, StatusCode, Value,
};
use rowwire::RowWireError;

// =============================================================================
// Status Handling
// =============================================================================

#[test]
fn test_failure_status_reads_nothing_else() {
    for code in 2..=11 {
        let bytes = Packet::status(code).build();
        let status = StatusCode::from_wire(code).unwrap();
        for op in [OpCode::Insert, OpCode::Update, OpCode::Drop, OpCode::Get, OpCode::Scan] {
            assert_eq!(decode_response(op, &bytes).unwrap(), Response::Failed(status));
        }
    }
}

#[test]
fn test_unknown_status_is_protocol_error() {
    let bytes = Packet::status(42).build();
    assert!(matches!(
        decode_response(OpCode::Get, &bytes),
        Err(RowWireError::Protocol(_))
    ));
}

#[test]
fn test_empty_response_is_protocol_error() {
    assert!(matches!(
        decode_response(OpCode::Drop, &[]),
        Err(RowWireError::Protocol(_))
    ));
    assert!(matches!(
        decode_response(OpCode::Drop, &[0, 0, 1]),
        Err(RowWireError::Protocol(_))
    ));
}

#[test]
fn test_handshake() {
    assert_eq!(decode_handshake(&Packet::ok().build()).unwrap(), StatusCode::Ok);
    assert_eq!(
        decode_handshake(&Packet::status(10).build()).unwrap(),
        StatusCode::ServerBusy
    );
    assert!(decode_handshake(&[]).is_err());
}

// =============================================================================
// Per-operation Bodies
// =============================================================================

#[test]
fn test_insert_response() {
    let bytes = Packet::ok().i64(7).i64(1).build();
    assert_eq!(
        decode_response(OpCode::Insert, &bytes).unwrap(),
        Response::Inserted { key: 7, version: 1 }
    );
}

#[test]
fn test_insert_response_truncated() {
    let bytes = Packet::ok().i64(7).build();
    assert!(matches!(
        decode_response(OpCode::Insert, &bytes),
        Err(RowWireError::Protocol(_))
    ));
}

#[test]
fn test_update_response_with_and_without_id() {
    let full = Packet::ok().i64(7).i64(4).build();
    assert_eq!(
        decode_response(OpCode::Update, &full).unwrap(),
        Response::Updated { key: Some(7), version: 4 }
    );

    let version_only = Packet::ok().i64(4).build();
    assert_eq!(
        decode_response(OpCode::Update, &version_only).unwrap(),
        Response::Updated { key: None, version: 4 }
    );

    let empty = Packet::ok().build();
    assert!(decode_response(OpCode::Update, &empty).is_err());
}

#[test]
fn test_drop_response() {
    let bytes = Packet::ok().build();
    assert_eq!(decode_response(OpCode::Drop, &bytes).unwrap(), Response::Dropped);
}

#[test]
fn test_get_response() {
    let bytes = Packet::ok()
        .i64(3) // version
        .i32(5) // column count
        .i32(3).i32(4).bytes(b"Ada\0")
        .i32(3).i32(0)
        .i32(2).i32(8).f64(1.7)
        .i32(4).i32(8).i64(12)
        .i32(0).i32(0)
        .build();

    match decode_response(OpCode::Get, &bytes).unwrap() {
        Response::Row { version, values } => {
            assert_eq!(version, 3);
            assert_eq!(
                values,
                vec![
                    Value::from("Ada"),
                    Value::from(""),
                    Value::Float(1.7),
                    Value::Foreign(12),
                    Value::Null,
                ]
            );
        }
        other => panic!("expected Row, got {:?}", other),
    }
}

#[test]
fn test_get_response_short_value_list() {
    // count says 2, only one value present
    let bytes = Packet::ok().i64(1).i32(2).i32(1).i32(8).i64(5).build();
    assert!(matches!(
        decode_response(OpCode::Get, &bytes),
        Err(RowWireError::Protocol(_))
    ));
}

#[test]
fn test_scan_response() {
    let bytes = Packet::ok().i32(3).i64(1).i64(4).i64(9).build();
    assert_eq!(
        decode_response(OpCode::Scan, &bytes).unwrap(),
        Response::Keys(vec![1, 4, 9])
    );

    let empty = Packet::ok().i32(0).build();
    assert_eq!(
        decode_response(OpCode::Scan, &empty).unwrap(),
        Response::Keys(vec![])
    );
}

#[test]
fn test_scan_response_bad_count() {
    let truncated = Packet::ok().i32(2).i64(1).build();
    assert!(decode_response(OpCode::Scan, &truncated).is_err());

    let negative = Packet::ok().i32(-1).build();
    assert!(decode_response(OpCode::Scan, &negative).is_err());
}

#[test]
fn test_exit_has_no_response() {
    assert!(decode_response(OpCode::Exit, &Packet::ok().build()).is_err());
}

// =============================================================================
// Status to Error Mapping
// =============================================================================

#[test]
fn test_status_error_mapping() {
    use StatusCode::*;

    assert!(matches!(RowWireError::from_status(NotFound, false), RowWireError::ObjectNotFound));
    assert!(matches!(RowWireError::from_status(BadForeign, false), RowWireError::InvalidReference(_)));
    assert!(matches!(RowWireError::from_status(BadValue, true), RowWireError::InvalidReference(_)));
    assert!(matches!(RowWireError::from_status(BadValue, false), RowWireError::MalformedRequest(BadValue)));
    assert!(matches!(RowWireError::from_status(TxnAbort, false), RowWireError::TransactionAborted));
    assert!(matches!(RowWireError::from_status(ServerBusy, false), RowWireError::ServerBusy));
    assert!(matches!(RowWireError::from_status(Unimplemented, false), RowWireError::Unimplemented));

    for status in [BadTable, BadRow, BadRequest, BadQuery] {
        assert!(matches!(
            RowWireError::from_status(status, true),
            RowWireError::MalformedRequest(s) if s == status
        ));
    }
}

// =============================================================================
// Framing
// =============================================================================

/// Every strict prefix is incomplete and the whole reply is exactly one frame
fn assert_frames(op: OpCode, reply: &[u8]) {
    for cut in 0..reply.len() {
        assert_eq!(response_len(op, &reply[..cut]), None, "{:?} cut at {}", op, cut);
    }
    assert_eq!(response_len(op, reply), Some(reply.len()), "{:?}", op);

    let mut longer = reply.to_vec();
    longer.extend_from_slice(&[9, 9, 9, 9]);
    assert_eq!(response_len(op, &longer), Some(reply.len()), "{:?} with trailing bytes", op);
}

#[test]
fn test_response_len_per_operation() {
    assert_frames(OpCode::Insert, &Packet::ok().i64(7).i64(1).build());
    assert_frames(OpCode::Drop, &Packet::ok().build());
    assert_frames(OpCode::Scan, &Packet::ok().i32(2).i64(1).i64(4).build());
    assert_frames(OpCode::Scan, &Packet::ok().i32(0).build());
    assert_frames(
        OpCode::Get,
        &Packet::ok()
            .i64(3)
            .i32(3)
            .i32(3).i32(4).bytes(b"Ada\0")
            .i32(0).i32(0)
            .i32(2).i32(8).f64(1.5)
            .build(),
    );
    for status in 2..=11 {
        assert_frames(OpCode::Get, &Packet::status(status).build());
    }
}

#[test]
fn test_response_len_update_body() {
    let short = Packet::ok().i64(4).build();
    assert_eq!(response_len(OpCode::Update, &short[..11]), None);
    assert_eq!(response_len(OpCode::Update, &short), Some(12));

    let long = Packet::ok().i64(7).i64(4).build();
    assert_eq!(response_len(OpCode::Update, &long), Some(20));
}

#[test]
fn test_response_len_stops_at_malformed_input() {
    // the decoder, not the reader, reports these
    let unknown_status = Packet::status(42).i64(1).build();
    assert_eq!(response_len(OpCode::Insert, &unknown_status), Some(4));

    let negative_count = Packet::ok().i32(-1).build();
    assert_eq!(response_len(OpCode::Scan, &negative_count), Some(8));
    assert!(decode_response(OpCode::Scan, &negative_count).is_err());

    let negative_len = Packet::ok().i64(1).i32(1).i32(3).i32(-4).build();
    assert_eq!(response_len(OpCode::Get, &negative_len), Some(negative_len.len()));
    assert!(decode_response(OpCode::Get, &negative_len).is_err());
}
