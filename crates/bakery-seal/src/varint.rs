//! Unsigned LEB128 varints.

use crate::error::{Result, SealError};

/// Append `value` as an unsigned varint.
pub fn encode_uvarint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Read a varint that must fit in 32 bits.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_uvarint_u32(bytes: &[u8]) -> Result<(u32, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if i >= 5 {
            return Err(SealError::VarIntTooLong);
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return u32::try_from(value)
                .map(|v| (v, i + 1))
                .map_err(|_| SealError::VarIntTooLong);
        }
    }
    Err(SealError::Malformed("truncated varint".into()))
}
