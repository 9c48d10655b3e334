//! Huffman decoding tables for BZip2.
//!
//! Every block carries between 2 and 6 coding groups. A group is sent as one
//! code length per symbol and the decoder rebuilds the canonical code from
//! the lengths alone: symbols are ordered by (length, symbol index) and
//! consecutive codes are handed out starting from the shortest length.
//!
//! Decoding walks the code one bit at a time. For each length `L`,
//! `limit[L]` is the largest code of that length and `base[L]` maps a code
//! back to its slot in `perm`.

use std::io::Read;
use unbz_core::bitstream::BitReader;
use unbz_core::error::{BzError, Result};

/// Minimum number of coding groups in a block.
pub const MIN_GROUPS: usize = 2;

/// Maximum number of coding groups in a block.
pub const MAX_GROUPS: usize = 6;

/// Symbols coded with one group before the next selector applies.
pub const SYMBOLS_PER_GROUP: usize = 50;

/// Maximum code length.
pub const MAX_CODE_LEN: u8 = 20;

/// Largest alphabet: 256 byte ranks, RUNA/RUNB and EOB share the slack.
pub const MAX_ALPHA_SIZE: usize = 258;

/// Zero-run digit worth 1 at the current weight.
pub const RUNA: u16 = 0;

/// Zero-run digit worth 2 at the current weight.
pub const RUNB: u16 = 1;

const TABLE_LEN: usize = MAX_CODE_LEN as usize + 1;

/// Canonical decode table for one coding group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanGroup {
    /// Shortest code length in use.
    pub min_len: u8,
    /// Longest code length in use.
    pub max_len: u8,
    /// Largest code value at each length, `-1` when the length is unused
    /// and nothing shorter spills into it.
    pub limit: [i32; TABLE_LEN],
    /// Offset subtracted from a code of each length to index `perm`.
    pub base: [i32; TABLE_LEN],
    /// Symbols ordered by code length, then by symbol index.
    pub perm: Vec<u16>,
}

impl HuffmanGroup {
    /// Build the decode table for `group` from per-symbol code lengths.
    ///
    /// Every length must be in `1..=20`. Incomplete codes are accepted
    /// (encoders emit them for tiny alphabets); oversubscribed ones are not.
    pub fn from_lengths(group: usize, lengths: &[u8]) -> Result<Self> {
        if lengths.is_empty() {
            return Err(BzError::bad_huffman_lengths(group, "empty alphabet"));
        }
        if lengths.len() > MAX_ALPHA_SIZE {
            return Err(BzError::bad_huffman_lengths(
                group,
                format!("alphabet of {} symbols is too large", lengths.len()),
            ));
        }

        let mut counts = [0u32; TABLE_LEN];
        let mut min_len = MAX_CODE_LEN;
        let mut max_len = 0u8;
        for (sym, &len) in lengths.iter().enumerate() {
            if !(1..=MAX_CODE_LEN).contains(&len) {
                return Err(BzError::bad_huffman_lengths(
                    group,
                    format!("symbol {} has code length {}", sym, len),
                ));
            }
            counts[len as usize] += 1;
            min_len = min_len.min(len);
            max_len = max_len.max(len);
        }

        let mut perm = Vec::with_capacity(lengths.len());
        for len in min_len..=max_len {
            perm.extend(
                lengths
                    .iter()
                    .enumerate()
                    .filter(|&(_, &l)| l == len)
                    .map(|(sym, _)| sym as u16),
            );
        }

        let mut limit = [-1i32; TABLE_LEN];
        let mut base = [0i32; TABLE_LEN];
        let mut code = 0i32;
        let mut index = 0i32;
        for len in min_len..=max_len {
            let count = counts[len as usize] as i32;
            base[len as usize] = code - index;
            code += count;
            index += count;
            if code > (1i32 << len) {
                return Err(BzError::bad_huffman_lengths(
                    group,
                    format!("code space oversubscribed at length {}", len),
                ));
            }
            limit[len as usize] = code - 1;
            code <<= 1;
        }

        Ok(Self {
            min_len,
            max_len,
            limit,
            base,
            perm,
        })
    }

    /// Number of symbols in the group's alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.perm.len()
    }

    /// Decode one symbol.
    #[inline]
    pub fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut len = self.min_len;
        let mut code = reader.read_bits(len)? as i32;

        loop {
            if code <= self.limit[len as usize] {
                let index = (code - self.base[len as usize]) as usize;
                return self.perm.get(index).copied().ok_or_else(|| {
                    BzError::corrupted(reader.bit_position(), "Huffman code outside alphabet")
                });
            }

            len += 1;
            if len > self.max_len {
                return Err(BzError::corrupted(
                    reader.bit_position(),
                    "invalid Huffman code",
                ));
            }
            code = (code << 1) | reader.read_bits(1)? as i32;
        }
    }
}

/// Read one group's delta-coded code lengths.
///
/// The first length is a 5-bit value. For each symbol, `10` increments the
/// running length, `11` decrements it and `0` accepts it. The running length
/// must stay within `1..=20` the whole time.
pub fn read_code_lengths<R: Read>(
    reader: &mut BitReader<R>,
    group: usize,
    alpha_size: usize,
) -> Result<Vec<u8>> {
    let mut lengths = Vec::with_capacity(alpha_size);
    let mut current = reader.read_bits(5)? as i32;

    for sym in 0..alpha_size {
        loop {
            if !(1..=MAX_CODE_LEN as i32).contains(&current) {
                return Err(BzError::bad_huffman_lengths(
                    group,
                    format!("code length {} for symbol {} out of range", current, sym),
                ));
            }
            if !reader.read_bit()? {
                break;
            }
            if reader.read_bit()? {
                current -= 1;
            } else {
                current += 1;
            }
        }
        lengths.push(current as u8);
    }

    Ok(lengths)
}
