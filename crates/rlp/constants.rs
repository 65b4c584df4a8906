/// Prefix byte of the empty byte string, also the base offset for
/// length-prefixed strings.
pub const RLP_NULL: u8 = 0x80;

/// Prefix byte of the empty list, also the base offset for
/// length-prefixed lists.
pub const RLP_EMPTY_LIST: u8 = 0xC0;
