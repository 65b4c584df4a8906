// RLP encoding and decoding for trie nodes. The same encoding is used for
// hash computation and for storing nodes in the backing store.
use hexary_rlp::{
    decode::{RLPDecode, decode_bytes},
    encode::{RLPEncode, encode_length, list_length},
    error::RLPDecodeError,
    structs::Decoder,
};

use crate::{
    nibbles::Nibbles,
    node::{BranchNode, ExtensionNode, LeafNode, Node},
    node_hash::NodeHash,
};

impl RLPEncode for BranchNode {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        let value_len = <[u8] as RLPEncode>::length(&self.value);
        let payload_len = self
            .choices
            .iter()
            .fold(value_len, |acc, child| acc + child.encoded_length());

        encode_length(payload_len, buf);
        for child in self.choices.iter() {
            child.encode(buf);
        }
        <[u8] as RLPEncode>::encode(&self.value, buf);
    }

    fn length(&self) -> usize {
        let value_len = <[u8] as RLPEncode>::length(&self.value);
        let payload_len = self
            .choices
            .iter()
            .fold(value_len, |acc, child| acc + child.encoded_length());
        list_length(payload_len)
    }
}

impl RLPEncode for ExtensionNode {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        let compact_prefix = self.prefix.encode_compact();
        let payload_len =
            <[u8] as RLPEncode>::length(&compact_prefix) + self.child.encoded_length();

        encode_length(payload_len, buf);
        <[u8] as RLPEncode>::encode(&compact_prefix, buf);
        self.child.encode(buf);
    }

    fn length(&self) -> usize {
        let compact_prefix = self.prefix.encode_compact();
        let payload_len =
            <[u8] as RLPEncode>::length(&compact_prefix) + self.child.encoded_length();
        list_length(payload_len)
    }
}

impl RLPEncode for LeafNode {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        hexary_rlp::structs::Encoder::new(buf)
            .encode_bytes(&self.partial.encode_compact())
            .encode_bytes(&self.value)
            .finish()
    }

    fn length(&self) -> usize {
        let compact_partial = self.partial.encode_compact();
        let value_len = <[u8] as RLPEncode>::length(&self.value);
        list_length(<[u8] as RLPEncode>::length(&compact_partial) + value_len)
    }
}

impl RLPEncode for Node {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        match self {
            Node::Branch(n) => n.encode(buf),
            Node::Extension(n) => n.encode(buf),
            Node::Leaf(n) => n.encode(buf),
        }
    }

    fn length(&self) -> usize {
        match self {
            Node::Branch(n) => n.length(),
            Node::Extension(n) => n.length(),
            Node::Leaf(n) => n.length(),
        }
    }
}

impl RLPDecode for Node {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let mut rlp_items_len = 0;
        let mut rlp_items: [Option<&[u8]>; 17] = Default::default();
        let mut decoder = Decoder::new(rlp)?;
        let mut item;

        // Collect the encoded fields, bailing out if there are more than
        // a branch node could hold
        while !decoder.is_done() && rlp_items_len < 17 {
            (item, decoder) = decoder.get_encoded_item_ref()?;
            rlp_items[rlp_items_len] = Some(item);
            rlp_items_len += 1;
        }
        if !decoder.is_done() {
            return Err(RLPDecodeError::Custom(
                "Invalid arg count for Node, expected 2 or 17, got more than 17".to_string(),
            ));
        }

        // Deserialize into a node depending on the available fields
        let node = match rlp_items_len {
            // Leaf or Extension Node
            2 => {
                let (path, _) = decode_bytes(rlp_items[0].unwrap_or_default())?;
                let path = Nibbles::decode_compact(path);
                if path.is_leaf() {
                    // Decode as Leaf
                    let (value, _) = decode_bytes(rlp_items[1].unwrap_or_default())?;
                    LeafNode {
                        partial: path,
                        value: value.to_vec(),
                    }
                    .into()
                } else {
                    // Decode as Extension
                    ExtensionNode {
                        prefix: path,
                        child: decode_child(rlp_items[1].unwrap_or_default())?,
                    }
                    .into()
                }
            }
            // Branch Node
            17 => {
                let mut choices: [NodeHash; 16] = BranchNode::EMPTY_CHOICES;
                for (i, choice) in choices.iter_mut().enumerate() {
                    *choice = decode_child(rlp_items[i].unwrap_or_default())?;
                }
                let (value, _) = decode_bytes(rlp_items[16].unwrap_or_default())?;
                BranchNode {
                    choices,
                    value: value.to_vec(),
                }
                .into()
            }
            n => {
                return Err(RLPDecodeError::Custom(format!(
                    "Invalid arg count for Node, expected 2 or 17, got {n}"
                )));
            }
        };
        Ok((node, decoder.finish()?))
    }
}

/// Decodes a child reference: a 32-byte string is a hash reference, an
/// empty string marks an absent child, anything else below the digest
/// size is an inlined node.
fn decode_child(rlp: &[u8]) -> Result<NodeHash, RLPDecodeError> {
    match decode_bytes(rlp) {
        Ok((hash, &[])) if hash.len() == 32 => Ok(NodeHash::from_slice(hash)),
        Ok((&[], &[])) => Ok(NodeHash::default()),
        _ if rlp.len() < 32 => Ok(NodeHash::from_encoded_raw(rlp)),
        _ => Err(RLPDecodeError::invalid_length()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_hash::NodeHash;
    use ethereum_types::H256;

    #[test]
    fn leaf_node_round_trips() {
        let leaf: Node = LeafNode::new(Nibbles::from_bytes(b"dog"), b"puppy".to_vec()).into();
        let encoded = leaf.encode_to_vec();
        assert_eq!(encoded.len(), leaf.length());
        assert_eq!(Node::decode(&encoded).unwrap(), leaf);
    }

    #[test]
    fn extension_node_round_trips() {
        let extension: Node = ExtensionNode::new(
            Nibbles::from_raw(&[0x12], false),
            NodeHash::Hashed(H256([0xAA; 32])),
        )
        .into();
        let encoded = extension.encode_to_vec();
        assert_eq!(encoded.len(), extension.length());
        assert_eq!(Node::decode(&encoded).unwrap(), extension);
    }

    #[test]
    fn branch_node_round_trips() {
        let mut choices = BranchNode::EMPTY_CHOICES;
        choices[3] = NodeHash::Hashed(H256([0xBB; 32]));
        // child small enough to be inlined
        choices[7] = Node::from(LeafNode::new(Nibbles::from_bytes(&[0x07]), vec![0x01]))
            .compute_hash();
        let branch: Node = BranchNode::new_with_value(choices, b"value".to_vec()).into();
        let encoded = branch.encode_to_vec();
        assert_eq!(encoded.len(), branch.length());
        assert_eq!(Node::decode(&encoded).unwrap(), branch);
    }

    #[test]
    fn rejects_wrong_item_count() {
        // a 3 item list is not a trie node
        let mut buf = Vec::new();
        hexary_rlp::structs::Encoder::new(&mut buf)
            .encode_bytes(&[0x01])
            .encode_bytes(&[0x02])
            .encode_bytes(&[0x03])
            .finish();
        assert!(Node::decode(&buf).is_err());
    }
}
