// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Variable-byte integers and a couple of byte-slice helpers.
//!
//! Every integer in the index format goes through this codec except the
//! fixed-width footer fields. Seven value bits per byte, least significant
//! group first. The twist compared to LEB128: the *terminal* byte carries the
//! high bit, continuation bytes do not. So `5` is `0x85` and `300` is
//! `0x2c 0x82`.
//!
//! There is no end-of-stream marker. Readers always know how many values
//! they are about to decode from a count stored earlier in the stream.
//!
//! # References
//!
//! - **Variable-byte coding**: Witten, Moffat, Bell (1999): "Managing
//!   Gigabytes", §3.3. Scholer et al. (2002): "Compression of Inverted
//!   Indexes for Fast Query Evaluation", SIGIR.

use std::io::{self, Write};

use crate::error::{IndexError, Result};

/// Longest encoding of a u64 (ceil(64 / 7)).
pub const MAX_VBYTE_BYTES: usize = 10;

/// Longest encoding of a u32 (ceil(32 / 7)).
pub const MAX_VBYTE_U32_BYTES: usize = 5;

const TERMINAL_BIT: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

// ============================================================================
// ENCODING
// ============================================================================

/// Append the variable-byte form of `value` to `buf`.
pub fn encode_vbyte(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value & VALUE_MASK as u64) as u8);
        value >>= 7;
    }
    buf.push(value as u8 | TERMINAL_BIT);
}

/// Write the variable-byte form of `value` to any writer.
pub fn write_vbyte<W: Write + ?Sized>(w: &mut W, value: u64) -> io::Result<()> {
    let mut scratch = [0u8; MAX_VBYTE_BYTES];
    let len = encode_vbyte_into(value, &mut scratch);
    w.write_all(&scratch[..len])
}

fn encode_vbyte_into(mut value: u64, out: &mut [u8; MAX_VBYTE_BYTES]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        out[i] = (value & VALUE_MASK as u64) as u8;
        value >>= 7;
        i += 1;
    }
    out[i] = value as u8 | TERMINAL_BIT;
    i + 1
}

/// Number of bytes `encode_vbyte` would produce for `value`.
pub fn vbyte_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode one value from the front of `bytes`, returning (value, bytes_consumed).
///
/// Fails on an empty slice, on a slice that ends before the terminal byte,
/// and on encodings longer than a u64 can hold.
pub fn decode_vbyte(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in bytes.iter().enumerate().take(MAX_VBYTE_BYTES) {
        result |= ((byte & VALUE_MASK) as u64) << shift;
        if byte & TERMINAL_BIT != 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }

    if bytes.len() >= MAX_VBYTE_BYTES {
        Err(IndexError::format("vbyte exceeds maximum length"))
    } else {
        Err(IndexError::format("truncated vbyte"))
    }
}

/// Decode a value that must fit in 32 bits.
pub fn decode_vbyte_u32(bytes: &[u8]) -> Result<(u32, usize)> {
    let (value, consumed) = decode_vbyte(bytes)?;
    let value = u32::try_from(value)
        .map_err(|_| IndexError::format(format!("vbyte value {} overflows u32", value)))?;
    Ok((value, consumed))
}

/// Cursor over an in-memory byte slice. Used for block headers and the
/// vocabulary, where the whole section is already loaded.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn read_vbyte(&mut self) -> Result<u64> {
        let (value, consumed) = decode_vbyte(&self.bytes[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    pub fn read_vbyte_u32(&mut self) -> Result<u32> {
        let (value, consumed) = decode_vbyte_u32(&self.bytes[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    pub fn read_usize(&mut self) -> Result<usize> {
        let value = self.read_vbyte()?;
        usize::try_from(value).map_err(|_| IndexError::format("length overflows usize"))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                IndexError::format(format!(
                    "truncated data: wanted {} bytes at offset {}, have {}",
                    len,
                    self.pos,
                    self.bytes.len()
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

// ============================================================================
// FRONT COMPRESSION HELPERS
// ============================================================================

/// Length of the shared prefix of two byte strings.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_byte_carries_high_bit() {
        let mut buf = Vec::new();
        encode_vbyte(5, &mut buf);
        assert_eq!(buf, vec![0x85]);

        buf.clear();
        encode_vbyte(300, &mut buf);
        assert_eq!(buf, vec![0x2c, 0x82]);

        buf.clear();
        encode_vbyte(0, &mut buf);
        assert_eq!(buf, vec![0x80]);
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for value in [0u64, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            encode_vbyte(value, &mut buf);
            assert_eq!(buf.len(), vbyte_len(value), "length for {}", value);
            let (decoded, consumed) = decode_vbyte(&buf).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn test_u32_uses_at_most_five_bytes() {
        assert_eq!(vbyte_len(u32::MAX as u64), MAX_VBYTE_U32_BYTES);
        assert_eq!(vbyte_len(u64::MAX), MAX_VBYTE_BYTES);
    }

    #[test]
    fn test_write_vbyte_matches_encode() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        encode_vbyte(987_654_321, &mut a);
        write_vbyte(&mut b, 987_654_321).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_errors() {
        assert!(decode_vbyte(&[]).is_err());
        // Continuation bytes with no terminal byte
        assert!(decode_vbyte(&[0x01, 0x02]).is_err());
        assert!(decode_vbyte(&[0x00; 12]).is_err());

        let mut buf = Vec::new();
        encode_vbyte(u32::MAX as u64 + 1, &mut buf);
        assert!(decode_vbyte_u32(&buf).is_err());
    }

    #[test]
    fn test_slice_reader_sequence() {
        let mut buf = Vec::new();
        encode_vbyte(3, &mut buf);
        buf.extend_from_slice(b"abc");
        encode_vbyte(70000, &mut buf);

        let mut reader = SliceReader::new(&buf);
        let len = reader.read_usize().unwrap();
        assert_eq!(reader.read_bytes(len).unwrap(), b"abc");
        assert_eq!(reader.read_vbyte().unwrap(), 70000);
        assert!(reader.is_empty());
        assert!(reader.read_bytes(1).is_err());
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len(b"apple", b"apply"), 4);
        assert_eq!(common_prefix_len(b"", b"x"), 0);
        assert_eq!(common_prefix_len(b"same", b"same"), 4);
    }
}
