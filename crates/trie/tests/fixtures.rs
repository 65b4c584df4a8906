//! Fixture-driven trie checks. The vectors mirror the JSON test-vector
//! format consumed by the reference test suites: hex-encoded key-value
//! entries with the expected root digest.

use ethereum_types::H256;
use hexary_trie::{InMemoryTrieDB, Trie, verify_proof};
use serde_json::Value;

static VECTORS: &str = include_str!("fixtures/trie_vectors.json");

fn vectors() -> Value {
    serde_json::from_str(VECTORS).expect("malformed fixture file")
}

fn decode_hex(s: &str) -> Vec<u8> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).expect("malformed fixture hex")
}

fn parse_entries(value: &Value) -> Vec<(Vec<u8>, Vec<u8>)> {
    value
        .as_array()
        .expect("entry list")
        .iter()
        .map(|pair| {
            let pair = pair.as_array().expect("entry pair");
            (
                decode_hex(pair[0].as_str().expect("entry key")),
                decode_hex(pair[1].as_str().expect("entry value")),
            )
        })
        .collect()
}

fn build_trie(entries: &[(Vec<u8>, Vec<u8>)]) -> Trie {
    let mut trie = Trie::new(Box::new(InMemoryTrieDB::new_empty()));
    for (key, value) in entries {
        trie.insert(key.clone(), value.clone())
            .expect("in-memory insert cannot fail");
    }
    trie
}

#[test]
fn computes_fixture_roots() {
    for case in vectors()["roots"].as_array().expect("root vector list") {
        let name = case["name"].as_str().expect("case name");
        let entries = parse_entries(&case["entries"]);
        let expected = H256::from_slice(&decode_hex(case["root"].as_str().expect("case root")));
        let mut trie = build_trie(&entries);
        assert_eq!(trie.hash().expect("hash"), expected, "root mismatch for {name}");
    }
}

#[test]
fn fixture_roots_are_insertion_order_independent() {
    for case in vectors()["roots"].as_array().expect("root vector list") {
        let name = case["name"].as_str().expect("case name");
        // Collapse duplicate keys to their final value first, so that
        // reversing the order doesn't change the key-value set
        let latest: std::collections::BTreeMap<_, _> =
            parse_entries(&case["entries"]).into_iter().collect();
        let forwards: Vec<_> = latest.clone().into_iter().collect();
        let backwards: Vec<_> = latest.into_iter().rev().collect();
        assert_eq!(
            build_trie(&forwards).hash_no_commit(),
            build_trie(&backwards).hash_no_commit(),
            "order-dependent root for {name}"
        );
    }
}

#[test]
fn fixture_proofs_verify() {
    for case in vectors()["roots"].as_array().expect("root vector list") {
        let name = case["name"].as_str().expect("case name");
        let entries = parse_entries(&case["entries"]);
        let mut latest = std::collections::HashMap::new();
        for (key, value) in &entries {
            latest.insert(key.clone(), value.clone());
        }
        let trie = build_trie(&entries);
        let root = trie.hash_no_commit();
        for (key, value) in &latest {
            let proof = trie.get_proof(key).expect("proof generation");
            assert!(
                verify_proof(root, key, &proof, Some(value)),
                "proof failed for {name}"
            );
        }
    }
}

#[test]
fn fixture_deletions_restore_previous_root() {
    for case in vectors()["deletions"]
        .as_array()
        .expect("deletion vector list")
    {
        let name = case["name"].as_str().expect("case name");
        let entries = parse_entries(&case["entries"]);
        let extra = case["insert_then_delete"].as_array().expect("extra entry");
        let extra_key = decode_hex(extra[0].as_str().expect("extra key"));
        let extra_value = decode_hex(extra[1].as_str().expect("extra value"));

        let mut trie = build_trie(&entries);
        let root_before = trie.hash_no_commit();

        trie.insert(extra_key.clone(), extra_value.clone())
            .expect("insert");
        assert_ne!(trie.hash_no_commit(), root_before, "no-op insert in {name}");
        assert_eq!(
            trie.remove(extra_key).expect("remove"),
            Some(extra_value),
            "removed value mismatch in {name}"
        );

        assert_eq!(
            trie.hash_no_commit(),
            root_before,
            "root not restored after deletion in {name}"
        );
    }
}
