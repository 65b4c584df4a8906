//! Fixture-driven codec checks. The vectors mirror the JSON test-vector
//! format consumed by the reference test suites: byte strings are hex
//! strings, lists are JSON arrays.

use hexary_rlp::{encode::RLPEncode, error::RLPDecodeError, item::RLPItem};
use serde_json::Value;

static VECTORS: &str = include_str!("fixtures/rlp_vectors.json");

fn vectors() -> Value {
    serde_json::from_str(VECTORS).expect("malformed fixture file")
}

fn decode_hex(s: &str) -> Vec<u8> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).expect("malformed fixture hex")
}

fn parse_item(value: &Value) -> RLPItem {
    match value {
        Value::String(s) => RLPItem::bytes(decode_hex(s)),
        Value::Array(items) => RLPItem::list(items.iter().map(parse_item).collect::<Vec<_>>()),
        other => panic!("unsupported fixture value: {other}"),
    }
}

fn error_kind(err: &RLPDecodeError) -> &'static str {
    match err {
        RLPDecodeError::InvalidLength(_) => "InvalidLength",
        RLPDecodeError::MalformedData(_) => "MalformedData",
        RLPDecodeError::NonCanonical(_) => "NonCanonical",
        RLPDecodeError::DepthExceeded => "DepthExceeded",
        _ => "Other",
    }
}

#[test]
fn encodes_fixture_vectors() {
    for case in vectors()["valid"].as_array().expect("valid vector list") {
        let name = case["name"].as_str().expect("case name");
        let item = parse_item(&case["in"]);
        let expected = decode_hex(case["out"].as_str().expect("case output"));
        assert_eq!(item.encode_to_vec(), expected, "encoding mismatch for {name}");
        assert_eq!(item.length(), expected.len(), "length mismatch for {name}");
    }
}

#[test]
fn decodes_fixture_vectors() {
    for case in vectors()["valid"].as_array().expect("valid vector list") {
        let name = case["name"].as_str().expect("case name");
        let item = parse_item(&case["in"]);
        let encoded = decode_hex(case["out"].as_str().expect("case output"));
        assert_eq!(
            RLPItem::decode(&encoded).expect("canonical vector must decode"),
            item,
            "decoding mismatch for {name}"
        );
    }
}

#[test]
fn rejects_invalid_fixture_vectors() {
    for case in vectors()["invalid"].as_array().expect("invalid vector list") {
        let name = case["name"].as_str().expect("case name");
        let input = decode_hex(case["in"].as_str().expect("case input"));
        let expected_kind = case["error"].as_str().expect("case error kind");
        let err = RLPItem::decode(&input).expect_err("invalid vector must be rejected");
        assert_eq!(error_kind(&err), expected_kind, "error mismatch for {name}");
    }
}
