//! Inverse Move-to-Front and zero-run decoding for BZip2.
//!
//! The encoder turns the BWT output into MTF ranks, collapses runs of rank 0
//! into RUNA/RUNB digits and Huffman-codes the result. This module undoes
//! the last two steps: it pulls Huffman symbols, expands zero runs and maps
//! ranks back to bytes, producing the pre-BWT block.
//!
//! The same move-to-front discipline also decodes the selector list, over
//! the group indices instead of byte values.

use crate::bwt::BwtBlock;
use crate::huffman::{HuffmanGroup, RUNA, RUNB, SYMBOLS_PER_GROUP};
use std::io::Read;
use unbz_core::bitstream::BitReader;
use unbz_core::error::{BzError, Result};

/// Recency-ordered list; index 0 is the most recently used entry.
#[derive(Debug, Clone)]
pub struct MtfList {
    list: Vec<u8>,
}

impl MtfList {
    /// List holding `alphabet` in the given order.
    pub fn new(alphabet: &[u8]) -> Self {
        Self {
            list: alphabet.to_vec(),
        }
    }

    /// List holding `0..n`.
    pub fn identity(n: u8) -> Self {
        Self {
            list: (0..n).collect(),
        }
    }

    /// Most recently used entry.
    #[inline]
    pub fn front(&self) -> u8 {
        self.list[0]
    }

    /// Take the entry at `pos`, move it to the front and return it.
    ///
    /// `pos` must index an entry of the list.
    #[inline]
    pub fn move_to_front(&mut self, pos: usize) -> u8 {
        let value = self.list[pos];
        self.list.copy_within(0..pos, 1);
        self.list[0] = value;
        value
    }
}

/// Accumulates RUNA/RUNB digits into a zero-run length.
///
/// The digits form a bijective base-2 number, least significant first:
/// RUNA adds `w` and RUNB adds `2w`, with `w` doubling after each digit.
#[derive(Debug, Clone)]
pub struct RunLength {
    total: usize,
    weight: usize,
}

impl RunLength {
    /// Empty run.
    pub fn new() -> Self {
        Self {
            total: 0,
            weight: 1,
        }
    }

    /// Add one digit. Fails once the run alone exceeds `limit`.
    #[inline]
    pub fn push(&mut self, symbol: u16, limit: usize) -> Result<()> {
        debug_assert!(symbol == RUNA || symbol == RUNB);
        self.total += self.weight << symbol;
        self.weight <<= 1;
        if self.total > limit {
            return Err(BzError::block_overrun(limit));
        }
        Ok(())
    }

    /// Finish the pending run, if any, and reset.
    #[inline]
    pub fn take(&mut self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let total = self.total;
        *self = Self::new();
        Some(total)
    }
}

/// Decode a block's symbol stream into the pre-BWT byte array.
///
/// `in_use` lists the byte values present in the block in ascending order,
/// which is also the initial MTF order. `selectors` picks the coding group
/// for each run of 50 symbols. The output may not exceed `limit` bytes.
pub fn decode_symbols<R: Read>(
    reader: &mut BitReader<R>,
    in_use: &[u8],
    selectors: &[u8],
    groups: &[HuffmanGroup],
    limit: usize,
) -> Result<BwtBlock> {
    let eob = (in_use.len() + 1) as u16;
    let mut mtf = MtfList::new(in_use);
    let mut data = Vec::with_capacity(limit.min(1 << 16));
    let mut counts = [0u32; 256];
    let mut run = RunLength::new();

    let mut selectors = selectors.iter();
    let mut group = next_group(&mut selectors, groups, reader.bit_position())?;
    let mut group_left = SYMBOLS_PER_GROUP;

    loop {
        if group_left == 0 {
            group = next_group(&mut selectors, groups, reader.bit_position())?;
            group_left = SYMBOLS_PER_GROUP;
        }
        group_left -= 1;

        let symbol = group.decode_symbol(reader)?;
        if symbol == RUNA || symbol == RUNB {
            run.push(symbol, limit)?;
            continue;
        }

        if let Some(count) = run.take() {
            if data.len() + count > limit {
                return Err(BzError::block_overrun(limit));
            }
            let byte = mtf.front();
            data.resize(data.len() + count, byte);
            counts[byte as usize] += count as u32;
        }

        if symbol == eob {
            break;
        }
        if symbol > eob {
            return Err(BzError::corrupted(reader.bit_position(), "symbol beyond end of block"));
        }

        if data.len() >= limit {
            return Err(BzError::block_overrun(limit));
        }
        let byte = mtf.move_to_front((symbol - 1) as usize);
        data.push(byte);
        counts[byte as usize] += 1;
    }

    Ok(BwtBlock {
        data,
        counts,
        end_bit: reader.bit_position(),
    })
}

fn next_group<'a>(
    selectors: &mut std::slice::Iter<'_, u8>,
    groups: &'a [HuffmanGroup],
    bit_position: u64,
) -> Result<&'a HuffmanGroup> {
    let selector = selectors
        .next()
        .ok_or_else(|| BzError::corrupted(bit_position, "ran out of selectors"))?;
    groups
        .get(*selector as usize)
        .ok_or_else(|| BzError::corrupted(bit_position, "selector out of range"))
}
