//! Per-block header fields and coding tables.
//!
//! After the block magic come the stored CRC, the randomized flag, `origPtr`
//! and the tables needed to decode the symbol stream:
//!
//! ```text
//! crc:32 randomized:1 origPtr:24
//! used-map:16 { used-bytes:16 }*   one 16-bit map per set coarse bit
//! groups:3 selectors:15 { unary MTF rank }*
//! { start-length:5 { delta-coded length }* }*   one per group
//! ```

use crate::huffman::{self, HuffmanGroup, MAX_GROUPS, MIN_GROUPS};
use crate::mtf::MtfList;
use log::trace;
use std::io::Read;
use unbz_core::bitstream::BitReader;
use unbz_core::error::{BzError, Result};

/// Selectors beyond this count are read and discarded.
pub const MAX_SELECTORS: usize = 18_002;

/// Fixed fields that open a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// CRC of the block's decoded bytes.
    pub stored_crc: u32,
    /// Legacy randomization flag.
    pub randomized: bool,
    /// Row of the original text among the sorted rotations.
    pub orig_ptr: usize,
}

impl BlockHeader {
    /// Read the fields following the block magic.
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let stored_crc = reader.read_u32()?;
        let randomized = reader.read_bit()?;
        let orig_ptr = reader.read_bits(24)? as usize;
        Ok(Self {
            stored_crc,
            randomized,
            orig_ptr,
        })
    }
}

/// Everything needed to decode a block's symbol stream.
#[derive(Debug, Clone)]
pub struct BlockTables {
    /// Byte values used in the block, ascending.
    pub in_use: Vec<u8>,
    /// Coding group for each run of 50 symbols.
    pub selectors: Vec<u8>,
    /// Decode tables, indexed by selector value.
    pub groups: Vec<HuffmanGroup>,
}

impl BlockTables {
    /// Read the symbol map, selectors and code lengths.
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let in_use = read_symbol_map(reader)?;
        // RUNA, RUNB, ranks 1 to in_use - 1, EOB
        let alpha_size = in_use.len() + 2;

        let group_count = reader.read_bits(3)? as usize;
        if !(MIN_GROUPS..=MAX_GROUPS).contains(&group_count) {
            return Err(BzError::corrupted(
                reader.bit_position(),
                format!("invalid number of Huffman groups: {}", group_count),
            ));
        }

        let selectors = read_selectors(reader, group_count)?;

        let mut groups = Vec::with_capacity(group_count);
        for group in 0..group_count {
            let lengths = huffman::read_code_lengths(reader, group, alpha_size)?;
            let table = HuffmanGroup::from_lengths(group, &lengths)?;
            trace!(
                "group {}: code lengths {}..={}",
                group, table.min_len, table.max_len
            );
            groups.push(table);
        }

        trace!(
            "block tables: {} symbols in use, {} groups, {} selectors",
            in_use.len(),
            group_count,
            selectors.len()
        );

        Ok(Self {
            in_use,
            selectors,
            groups,
        })
    }
}

/// Read the two-level bitmap of byte values used in the block.
fn read_symbol_map<R: Read>(reader: &mut BitReader<R>) -> Result<Vec<u8>> {
    let coarse = reader.read_bits(16)?;
    let mut in_use = Vec::new();

    for hi in 0..16u32 {
        if coarse & (0x8000 >> hi) == 0 {
            continue;
        }
        let fine = reader.read_bits(16)?;
        for lo in 0..16u32 {
            if fine & (0x8000 >> lo) != 0 {
                in_use.push((hi * 16 + lo) as u8);
            }
        }
    }

    if in_use.is_empty() {
        return Err(BzError::corrupted(reader.bit_position(), "block uses no symbols"));
    }
    Ok(in_use)
}

/// Read the unary-coded, MTF-ranked selector list.
fn read_selectors<R: Read>(reader: &mut BitReader<R>, group_count: usize) -> Result<Vec<u8>> {
    let count = reader.read_bits(15)? as usize;
    if count == 0 {
        return Err(BzError::corrupted(reader.bit_position(), "block has no selectors"));
    }

    let mut ranks = MtfList::identity(group_count as u8);
    let mut selectors = Vec::with_capacity(count.min(MAX_SELECTORS));
    for _ in 0..count {
        let mut rank = 0usize;
        while reader.read_bit()? {
            rank += 1;
            if rank >= group_count {
                return Err(BzError::corrupted(
                    reader.bit_position(),
                    "selector rank out of range",
                ));
            }
        }
        let selector = ranks.move_to_front(rank);
        if selectors.len() < MAX_SELECTORS {
            selectors.push(selector);
        }
    }
    Ok(selectors)
}
