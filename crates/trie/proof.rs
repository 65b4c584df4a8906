use std::collections::HashMap;

use ethereum_types::H256;
use hexary_rlp::decode::RLPDecode;
use sha3::{Digest, Keccak256};

use crate::{
    EMPTY_TRIE_HASH, NodeRLP, PathRLP, ValueRLP, nibbles::Nibbles, node::Node,
    node_hash::NodeHash,
};

/// Verifies a single-key proof against a root digest.
///
/// `proof` holds the encoded nodes on the path from the root towards the
/// key, as produced by [`Trie::get_proof`](crate::Trie::get_proof). For an
/// inclusion proof `expected_value` is the value claimed to be stored
/// under `key`; for an exclusion proof it is `None` and the proof must
/// show the trie provably cannot contain the key.
///
/// This is a pure predicate meant for untrusted input: any inconsistency
/// (tampered node bytes, missing nodes, references that don't match)
/// yields `false`, never an error.
pub fn verify_proof(
    root_hash: H256,
    key: &PathRLP,
    proof: &[NodeRLP],
    expected_value: Option<&[u8]>,
) -> bool {
    // An empty proof can only support the empty trie
    if proof.is_empty() {
        return expected_value.is_none() && root_hash == *EMPTY_TRIE_HASH;
    }

    // Proof entries authenticate themselves through their digest
    let nodes: HashMap<H256, &[u8]> = proof
        .iter()
        .map(|encoded| (keccak(encoded), encoded.as_slice()))
        .collect();

    let Some(root_encoding) = nodes.get(&root_hash) else {
        return false;
    };
    let Ok(root_node) = Node::decode(root_encoding) else {
        return false;
    };

    match walk(&nodes, root_node, Nibbles::from_bytes(key)) {
        Some(found_value) => found_value.as_deref() == expected_value,
        // The proof doesn't connect the key to the root either way
        None => false,
    }
}

/// Walks the proof along `path`. Returns `None` if the proof is
/// inconsistent, `Some(None)` if it proves the key absent, and
/// `Some(Some(value))` if it proves the key present with `value`.
fn walk(nodes: &HashMap<H256, &[u8]>, node: Node, mut path: Nibbles) -> Option<Option<ValueRLP>> {
    match node {
        Node::Branch(branch_node) => match path.next_choice() {
            Some(choice) => {
                let child = &branch_node.choices[choice];
                if !child.is_valid() {
                    // An empty slot on the key's path proves absence
                    return Some(None);
                }
                walk(nodes, resolve_child(nodes, child)?, path)
            }
            None => Some((!branch_node.value.is_empty()).then_some(branch_node.value)),
        },
        Node::Extension(extension_node) => {
            // An empty prefix cannot appear in a well-formed trie, and
            // rejecting it bounds the walk by the key length
            if extension_node.prefix.is_empty() {
                return None;
            }
            if path.skip_prefix(&extension_node.prefix) {
                walk(nodes, resolve_child(nodes, &extension_node.child)?, path)
            } else {
                // The prefix diverges from the key, nothing below can hold it
                Some(None)
            }
        }
        Node::Leaf(leaf_node) => Some((leaf_node.partial == path).then_some(leaf_node.value)),
    }
}

fn resolve_child(nodes: &HashMap<H256, &[u8]>, hash: &NodeHash) -> Option<Node> {
    let encoded = match hash {
        NodeHash::Hashed(digest) => *nodes.get(digest)?,
        NodeHash::Inline(_) => hash.as_ref(),
    };
    Node::decode(encoded).ok()
}

fn keccak(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}
