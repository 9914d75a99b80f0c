use byteorder::{ByteOrder, LittleEndian};

use crate::error::SampQueryError;

/// Characters stripped from both ends of info strings.
const PADDING: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Get `len` raw bytes at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
/// Fails without moving `offset` if fewer than `len` bytes remain.
pub fn get_bytes<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], SampQueryError> {
    let available: usize = data.len().saturating_sub(*offset);
    if len > available {
        return Err(SampQueryError::Truncated { needed: len, available });
    }
    let bytes: &[u8] = &data[*offset..*offset + len];
    *offset += len;
    Ok(bytes)
}

/// Get the [u8] at index `offset` from `data`.
///
/// Mutates `offset` to the index after the byte.
pub fn get_u8(data: &[u8], offset: &mut usize) -> Result<u8, SampQueryError> {
    Ok(get_bytes(data, offset, 1)?[0])
}

/// Get 2 little-endian bytes (as a [u16]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u16(data: &[u8], offset: &mut usize) -> Result<u16, SampQueryError> {
    Ok(LittleEndian::read_u16(get_bytes(data, offset, 2)?))
}

/// Get 4 little-endian bytes (as a [u32]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u32(data: &[u8], offset: &mut usize) -> Result<u32, SampQueryError> {
    Ok(LittleEndian::read_u32(get_bytes(data, offset, 4)?))
}

/// Get 4 little-endian bytes (as an [i32]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_i32(data: &[u8], offset: &mut usize) -> Result<i32, SampQueryError> {
    Ok(LittleEndian::read_i32(get_bytes(data, offset, 4)?))
}

/// Get a string prefixed by a 1-byte length.
pub fn get_short_string(data: &[u8], offset: &mut usize) -> Result<String, SampQueryError> {
    let len: usize = get_u8(data, offset)? as usize;
    Ok(latin1(get_bytes(data, offset, len)?))
}

/// Get a string prefixed by a 4-byte little-endian length, trimmed of padding.
pub fn get_long_string(data: &[u8], offset: &mut usize) -> Result<String, SampQueryError> {
    let len: usize = get_u32(data, offset)? as usize;
    let text: String = latin1(get_bytes(data, offset, len)?);
    Ok(text.trim_matches(PADDING.as_slice()).to_owned())
}

/// Decode ISO-8859-1 bytes. Every byte maps to the code point of the same value.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
