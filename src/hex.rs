//! Hex prefixes, decoded into bytes plus a mask of which nibbles matter.

use crate::error::{Error, Result};

/// The number of hex digits in a SHA-1 commit ID.
pub const MAX_PREFIX_LEN: usize = 40;

/// Decodes a lowercase hex prefix of any length, including odd lengths.
///
/// The trailing half of the last byte is masked out when the prefix has an
/// odd number of digits.
///
/// # Errors
///
/// [`Error::InvalidPrefix`] for anything other than `0-9` and `a-f`, and
/// [`Error::PrefixTooLong`] for prefixes that can't fit in a commit ID.
pub fn decode_hex_nibbles(s: impl AsRef<str>) -> Result<MaskedBytes> {
    let s = s.as_ref();

    if let Some(character) = s.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(Error::InvalidPrefix {
            prefix: s.to_string(),
            character,
        });
    }

    if s.len() > MAX_PREFIX_LEN {
        return Err(Error::PrefixTooLong {
            prefix: s.to_string(),
            len: s.len(),
        });
    }

    let capacity = (s.len() + 1) / 2;
    let mut bytes = Vec::<u8>::with_capacity(capacity);
    let mut mask = Vec::<u8>::with_capacity(capacity);
    let mut buffer_byte: Option<u8> = None;

    for byte in s.bytes() {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            _ => byte - b'a' + 0xa,
        };

        if let Some(high) = buffer_byte.take() {
            bytes.push(high | nibble);
            mask.push(0xFF);
        } else {
            buffer_byte = Some(nibble << 4);
        }
    }

    if let Some(high) = buffer_byte {
        bytes.push(high);
        mask.push(0xF0);
    }

    Ok(MaskedBytes { bytes, mask })
}

/// Bytes where only the bits set in the corresponding `mask` byte are
/// significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedBytes {
    /// The target bits.
    pub bytes: Vec<u8>,
    /// Which of the target bits matter.
    pub mask: Vec<u8>,
}

impl MaskedBytes {
    /// Returns whether `digest` starts with these bytes, ignoring masked-out
    /// bits. An empty prefix matches everything.
    #[inline]
    #[must_use]
    pub fn matches(&self, digest: &[u8]) -> bool {
        digest.len() >= self.bytes.len()
            && digest
                .iter()
                .zip(self.bytes.iter())
                .map(|(a, b)| a ^ b)
                .zip(self.mask.iter())
                .all(|(x, mask)| x & mask == 0)
    }

    /// The number of significant hex digits.
    #[must_use]
    pub fn nibbles(&self) -> usize {
        self.mask
            .iter()
            .map(|mask| match mask {
                0xFF => 2,
                0x00 => 0,
                _ => 1,
            })
            .sum()
    }
}
