use ethereum_types::H256;
use hexary_rlp::constants::RLP_NULL;
use sha3::{Digest, Keccak256};

/// A reference to a trie node, as it appears inside its parent's encoding.
/// Nodes whose RLP encoding reaches the digest size are addressed by their
/// keccak hash; shorter encodings are embedded verbatim. An empty inline
/// reference stands for an absent child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeHash {
    Hashed(H256),
    Inline(([u8; 31], u8)),
}

impl NodeHash {
    /// Build a reference to a node from its RLP encoding: a digest for
    /// encodings of 32 bytes or more, the encoding itself otherwise.
    pub fn from_encoded_raw(encoded: &[u8]) -> NodeHash {
        if encoded.len() >= 32 {
            NodeHash::Hashed(H256::from_slice(&Keccak256::digest(encoded)))
        } else {
            let mut buffer = [0u8; 31];
            buffer[..encoded.len()].copy_from_slice(encoded);
            NodeHash::Inline((buffer, encoded.len() as u8))
        }
    }

    /// Build a reference from a raw slice: a 32-byte slice is taken as a
    /// digest, anything shorter as an inline encoding.
    pub fn from_slice(slice: &[u8]) -> NodeHash {
        match slice.len() {
            32 => NodeHash::Hashed(H256::from_slice(slice)),
            _ => Self::from_encoded_raw(slice),
        }
    }

    /// Returns the root digest this reference stands for. The inline
    /// optimization applies to child references only, so an inline root
    /// is still reported by its hash.
    pub fn finalize(&self) -> H256 {
        match self {
            NodeHash::Hashed(hash) => *hash,
            NodeHash::Inline(_) => H256::from_slice(&Keccak256::digest(self.as_ref())),
        }
    }

    /// Returns true if the reference points at a node (an empty inline
    /// reference marks an absent child).
    pub fn is_valid(&self) -> bool {
        !matches!(self, NodeHash::Inline((_, 0)))
    }

    /// Byte length of this reference within a parent node's encoding.
    pub(crate) fn encoded_length(&self) -> usize {
        match self {
            NodeHash::Hashed(_) => 33,
            NodeHash::Inline((_, 0)) => 1,
            NodeHash::Inline((_, len)) => *len as usize,
        }
    }

    /// Writes this reference into a parent node's encoding: digests are
    /// encoded as 32-byte strings, inline nodes are spliced in verbatim.
    pub(crate) fn encode(&self, buf: &mut dyn bytes::BufMut) {
        use hexary_rlp::encode::RLPEncode;
        match self {
            NodeHash::Hashed(hash) => hash.as_bytes().encode(buf),
            NodeHash::Inline((_, 0)) => buf.put_u8(RLP_NULL),
            NodeHash::Inline((encoded, len)) => buf.put_slice(&encoded[..*len as usize]),
        }
    }
}

impl Default for NodeHash {
    fn default() -> Self {
        NodeHash::Inline(([0; 31], 0))
    }
}

impl From<H256> for NodeHash {
    fn from(value: H256) -> Self {
        NodeHash::Hashed(value)
    }
}

impl AsRef<[u8]> for NodeHash {
    fn as_ref(&self) -> &[u8] {
        match self {
            NodeHash::Hashed(hash) => hash.as_bytes(),
            NodeHash::Inline((encoded, len)) => &encoded[..*len as usize],
        }
    }
}
