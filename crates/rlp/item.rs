use bytes::Bytes;

use super::{
    constants::RLP_NULL,
    decode::{MAX_RLP_BYTES, static_left_pad},
    encode::{RLPEncode, bytes_length, encode_length, list_length},
    error::RLPDecodeError,
};

/// Maximum list nesting accepted by [`RLPItem::decode`].
/// Decoding deeper input fails with [`RLPDecodeError::DepthExceeded`]
/// instead of exhausting the stack.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// An arbitrary RLP value: either a byte string or a list of nested values.
///
/// This is the dynamic counterpart of the [`RLPEncode`]/[`RLPDecode`](super::decode::RLPDecode)
/// traits, for callers that handle RLP structure without a fixed schema.
/// Encoding is canonical, and [`decode`](Self::decode) accepts canonical
/// input only, so `decode(encode(item)) == item` and every encoding has
/// exactly one accepted byte form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RLPItem {
    Bytes(Bytes),
    List(Vec<RLPItem>),
}

impl RLPItem {
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes(data.into())
    }

    pub fn list(items: Vec<RLPItem>) -> Self {
        Self::List(items)
    }

    /// Decodes a single item consuming the whole input.
    pub fn decode(rlp: &[u8]) -> Result<Self, RLPDecodeError> {
        let (item, rest) = Self::decode_unfinished(rlp)?;
        if !rest.is_empty() {
            return Err(RLPDecodeError::invalid_length());
        }
        Ok(item)
    }

    /// Decodes a single item from the start of the input, returning the
    /// remaining bytes for nested decoding.
    pub fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        Self::decode_at(rlp, DEFAULT_MAX_DEPTH)
    }

    /// Same as [`decode`](Self::decode) with a caller-chosen bound on list
    /// nesting. A `max_depth` of zero accepts byte strings only.
    pub fn decode_with_depth(rlp: &[u8], max_depth: usize) -> Result<Self, RLPDecodeError> {
        let (item, rest) = Self::decode_at(rlp, max_depth)?;
        if !rest.is_empty() {
            return Err(RLPDecodeError::invalid_length());
        }
        Ok(item)
    }

    fn decode_at(rlp: &[u8], depth_left: usize) -> Result<(Self, &[u8]), RLPDecodeError> {
        let first_byte = *rlp.first().ok_or(RLPDecodeError::invalid_length())?;

        match first_byte {
            // Single byte, its own encoding
            0..=0x7F => Ok((Self::Bytes(Bytes::copy_from_slice(&rlp[..1])), &rlp[1..])),
            0x80..=0xB7 => {
                let length = (first_byte - RLP_NULL) as usize;
                let payload = rlp
                    .get(1..length + 1)
                    .ok_or(RLPDecodeError::invalid_length())?;
                // A single byte below 0x80 must use the single-byte form
                if length == 1 && payload[0] < RLP_NULL {
                    return Err(RLPDecodeError::non_canonical());
                }
                Ok((
                    Self::Bytes(Bytes::copy_from_slice(payload)),
                    &rlp[length + 1..],
                ))
            }
            0xB8..=0xBF => {
                let length_of_length = (first_byte - 0xB7) as usize;
                let length_bytes = rlp
                    .get(1..length_of_length + 1)
                    .ok_or(RLPDecodeError::invalid_length())?;
                // static_left_pad rejects leading zeros in the length field
                let length = usize::from_be_bytes(static_left_pad(length_bytes)?);
                // Payloads up to 55 bytes must use the short form
                if length <= 55 {
                    return Err(RLPDecodeError::non_canonical());
                }
                if length > MAX_RLP_BYTES {
                    return Err(RLPDecodeError::invalid_length());
                }
                let start = length_of_length + 1;
                let payload = rlp
                    .get(start..start + length)
                    .ok_or(RLPDecodeError::invalid_length())?;
                Ok((
                    Self::Bytes(Bytes::copy_from_slice(payload)),
                    &rlp[start + length..],
                ))
            }
            0xC0..=0xF7 => {
                let length = (first_byte - 0xC0) as usize;
                let payload = rlp
                    .get(1..length + 1)
                    .ok_or(RLPDecodeError::invalid_length())?;
                let items = Self::decode_list_payload(payload, depth_left)?;
                Ok((Self::List(items), &rlp[length + 1..]))
            }
            0xF8..=0xFF => {
                let length_of_length = (first_byte - 0xF7) as usize;
                let length_bytes = rlp
                    .get(1..length_of_length + 1)
                    .ok_or(RLPDecodeError::invalid_length())?;
                let length = usize::from_be_bytes(static_left_pad(length_bytes)?);
                if length <= 55 {
                    return Err(RLPDecodeError::non_canonical());
                }
                if length > MAX_RLP_BYTES {
                    return Err(RLPDecodeError::invalid_length());
                }
                let start = length_of_length + 1;
                let payload = rlp
                    .get(start..start + length)
                    .ok_or(RLPDecodeError::invalid_length())?;
                let items = Self::decode_list_payload(payload, depth_left)?;
                Ok((Self::List(items), &rlp[start + length..]))
            }
        }
    }

    fn decode_list_payload(
        mut payload: &[u8],
        depth_left: usize,
    ) -> Result<Vec<RLPItem>, RLPDecodeError> {
        // Entering a list consumes one nesting level
        let depth_left = depth_left
            .checked_sub(1)
            .ok_or(RLPDecodeError::DepthExceeded)?;
        let mut items = Vec::new();
        while !payload.is_empty() {
            let (item, rest) = Self::decode_at(payload, depth_left)?;
            items.push(item);
            payload = rest;
        }
        Ok(items)
    }
}

impl RLPEncode for RLPItem {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        match self {
            Self::Bytes(bytes) => bytes.encode(buf),
            Self::List(items) => {
                let payload_len: usize = items.iter().map(RLPEncode::length).sum();
                encode_length(payload_len, buf);
                for item in items {
                    item.encode(buf);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Bytes(bytes) if bytes.is_empty() => 1,
            Self::Bytes(bytes) => bytes_length(bytes.len(), bytes[0]),
            Self::List(items) => list_length(items.iter().map(RLPEncode::length).sum()),
        }
    }
}

impl From<Vec<u8>> for RLPItem {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value.into())
    }
}

impl From<&[u8]> for RLPItem {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<RLPItem>> for RLPItem {
    fn from(value: Vec<RLPItem>) -> Self {
        Self::List(value)
    }
}
