//! Inverse Burrows-Wheeler Transform for BZip2.
//!
//! The symbol decoder yields the last column of the sorted rotation matrix
//! together with `origPtr`, the row holding the original block. A stable
//! counting sort over the byte values rebuilds the first column implicitly:
//! `tt[cftab[b]++] = i` links every row to the row of its successor in the
//! original text, so following `tt` from `tt[origPtr]` replays the block.
//!
//! [`BlockOutput`] runs that walk lazily and undoes the two steps the encoder
//! applied before sorting: the optional randomization and the initial
//! run-length encoding (4 equal bytes followed by a repeat count).

use crate::randomize::Randomizer;
use unbz_core::crc::Bzip2Crc;
use unbz_core::error::{BzError, Result};

/// Last column of the sorted rotations, with its byte histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BwtBlock {
    pub(crate) data: Vec<u8>,
    pub(crate) counts: [u32; 256],
    /// Bit position just past the end-of-block symbol; zero for blocks
    /// built in memory.
    pub(crate) end_bit: u64,
}

impl BwtBlock {
    /// Wrap a last column, counting its bytes.
    pub fn from_data(data: Vec<u8>) -> Self {
        let mut counts = [0u32; 256];
        for &byte in &data {
            counts[byte as usize] += 1;
        }
        Self {
            data,
            counts,
            end_bit: 0,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a block with no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_origin(&self, orig_ptr: usize) -> Result<()> {
        if orig_ptr >= self.len() {
            return Err(BzError::corrupted(
                self.end_bit,
                format!("origPtr {} outside block of {} bytes", orig_ptr, self.len()),
            ));
        }
        Ok(())
    }
}

/// Build the successor table `tt` by stable counting sort.
pub fn build_position_table(block: &BwtBlock) -> Vec<u32> {
    let mut cftab = [0u32; 256];
    let mut total = 0u32;
    for (slot, &count) in cftab.iter_mut().zip(block.counts.iter()) {
        *slot = total;
        total += count;
    }

    let mut tt = vec![0u32; block.data.len()];
    for (i, &byte) in block.data.iter().enumerate() {
        let slot = &mut cftab[byte as usize];
        tt[*slot as usize] = i as u32;
        *slot += 1;
    }
    tt
}

/// Invert a bare BWT without the run-length stage.
pub fn inverse_transform(data: &[u8], orig_ptr: usize) -> Result<Vec<u8>> {
    let block = BwtBlock::from_data(data.to_vec());
    if block.is_empty() {
        return Ok(Vec::new());
    }
    block.check_origin(orig_ptr)?;

    let tt = build_position_table(&block);
    let mut result = Vec::with_capacity(block.len());
    let mut pos = tt[orig_ptr] as usize;
    for _ in 0..block.len() {
        result.push(block.data[pos]);
        pos = tt[pos] as usize;
    }
    Ok(result)
}

/// Lazily produced output of one block.
///
/// Bytes come out of the BWT chain, lose the randomization mask when the
/// block is flagged, then go through run-length expansion. Every emitted
/// byte feeds the block CRC.
#[derive(Debug)]
pub struct BlockOutput {
    data: Vec<u8>,
    tt: Vec<u32>,
    pos: usize,
    /// Chain bytes not yet taken.
    remaining: usize,
    randomizer: Option<Randomizer>,
    last: u8,
    /// Consecutive copies of `last` seen, 0-4.
    run_len: u8,
    /// Copies of `last` still owed from a count byte.
    pending: u8,
    crc: Bzip2Crc,
    produced: u64,
}

impl BlockOutput {
    /// Prepare the output of `block` starting from row `orig_ptr`.
    ///
    /// Fails when `orig_ptr` does not name a row of the block; the error
    /// carries the position where the block's symbol stream ended.
    pub fn new(block: BwtBlock, orig_ptr: usize, randomized: bool) -> Result<Self> {
        block.check_origin(orig_ptr)?;
        let tt = build_position_table(&block);
        let pos = tt[orig_ptr] as usize;

        Ok(Self {
            remaining: block.data.len(),
            data: block.data,
            tt,
            pos,
            randomizer: randomized.then(Randomizer::new),
            last: 0,
            run_len: 0,
            pending: 0,
            crc: Bzip2Crc::new(),
            produced: 0,
        })
    }

    /// Whether every byte of the block has been produced.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0 && self.pending == 0
    }

    /// CRC over the bytes produced so far.
    pub fn crc(&self) -> u32 {
        self.crc.value()
    }

    /// Number of bytes produced so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    #[inline]
    fn next_raw(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let mut byte = self.data[self.pos];
        self.pos = self.tt[self.pos] as usize;
        if let Some(randomizer) = self.randomizer.as_mut() {
            byte ^= randomizer.next_mask();
        }
        Some(byte)
    }

    /// Fill `out` with as many bytes as are left; returns the count.
    ///
    /// A short count means the block is exhausted.
    pub fn fill(&mut self, out: &mut [u8]) -> usize {
        let mut n = 0;
        while n < out.len() {
            if self.pending > 0 {
                let count = (self.pending as usize).min(out.len() - n);
                out[n..n + count].fill(self.last);
                self.crc.update_repeated(self.last, count);
                self.produced += count as u64;
                self.pending -= count as u8;
                n += count;
                continue;
            }
            match self.next() {
                Some(byte) => {
                    out[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    /// Append the rest of the block to `out`.
    pub fn drain_into(&mut self, out: &mut Vec<u8>) {
        let mut chunk = [0u8; 8192];
        loop {
            let n = self.fill(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }
}

impl Iterator for BlockOutput {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            if self.pending > 0 {
                self.pending -= 1;
                self.crc.update_byte(self.last);
                self.produced += 1;
                return Some(self.last);
            }

            let byte = self.next_raw()?;
            if self.run_len == 4 {
                self.pending = byte;
                self.run_len = 0;
                continue;
            }
            if self.run_len > 0 && byte == self.last {
                self.run_len += 1;
            } else {
                self.last = byte;
                self.run_len = 1;
            }
            self.crc.update_byte(byte);
            self.produced += 1;
            return Some(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Naive forward BWT: last column of the sorted rotations.
    fn transform(data: &[u8]) -> (Vec<u8>, usize) {
        let n = data.len();
        let mut rows: Vec<usize> = (0..n).collect();
        rows.sort_by(|&a, &b| {
            (0..n)
                .map(|i| data[(a + i) % n].cmp(&data[(b + i) % n]))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let orig_ptr = rows.iter().position(|&r| r == 0).unwrap();
        let last = rows.iter().map(|&r| data[(r + n - 1) % n]).collect();
        (last, orig_ptr)
    }

    /// Encoder-side run-length stage: runs of 4-255 become 4 bytes + count.
    fn rle1(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let byte = data[i];
            let mut run = 1;
            while i + run < data.len() && data[i + run] == byte && run < 255 {
                run += 1;
            }
            if run >= 4 {
                out.extend_from_slice(&[byte; 4]);
                out.push((run - 4) as u8);
            } else {
                out.extend(std::iter::repeat_n(byte, run));
            }
            i += run;
        }
        out
    }

    fn output_for(plain: &[u8]) -> BlockOutput {
        let (last, orig_ptr) = transform(&rle1(plain));
        BlockOutput::new(BwtBlock::from_data(last), orig_ptr, false).unwrap()
    }

    #[test]
    fn test_bwt_banana() {
        let (last, ptr) = transform(b"banana");
        assert_eq!(last, b"nnbaaa");
        assert_eq!(ptr, 3);
        assert_eq!(inverse_transform(&last, ptr).unwrap(), b"banana");
    }

    #[test]
    fn test_bwt_roundtrip() {
        let test_cases = [
            b"hello world".as_slice(),
            b"abracadabra",
            b"mississippi",
            b"aaaaa",
            b"abcde",
            b"the quick brown fox jumps over the lazy dog",
        ];

        for data in test_cases {
            let (last, ptr) = transform(data);
            let recovered = inverse_transform(&last, ptr).unwrap();
            assert_eq!(recovered, data, "Failed for: {:?}", data);
        }
    }

    #[test]
    fn test_single_byte_block() {
        let output = BlockOutput::new(BwtBlock::from_data(vec![b'x']), 0, false).unwrap();
        assert_eq!(output.collect::<Vec<u8>>(), b"x");
    }

    #[test]
    fn test_origin_out_of_range() {
        assert!(inverse_transform(b"abc", 3).is_err());
        let err = BlockOutput::new(BwtBlock::from_data(Vec::new()), 0, false).unwrap_err();
        assert!(matches!(err, BzError::Corrupted { .. }));
    }

    #[test]
    fn test_origin_error_reports_stream_position() {
        let mut block = BwtBlock::from_data(b"abc".to_vec());
        block.end_bit = 4321;
        match BlockOutput::new(block, 3, false) {
            Err(BzError::Corrupted { bit_position, .. }) => assert_eq!(bit_position, 4321),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_position_table() {
        let block = BwtBlock::from_data(b"nnbaaa".to_vec());
        assert_eq!(block.counts[b'a' as usize], 3);
        assert_eq!(build_position_table(&block), vec![3, 4, 5, 2, 0, 1]);
    }

    #[test]
    fn test_run_expansion() {
        let plain = b"abbbbbbbbbbbbbbbbbbbbbcccccdddd".to_vec();
        let mut output = output_for(&plain);
        let mut decoded = Vec::new();
        output.drain_into(&mut decoded);
        assert_eq!(decoded, plain);
        assert!(output.is_exhausted());
        assert_eq!(output.produced(), plain.len() as u64);
        assert_eq!(output.crc(), Bzip2Crc::compute(&plain));
    }

    #[test]
    fn test_long_run_and_zero_count() {
        // A run of exactly 4 is stored as 4 bytes plus a zero count.
        let mut plain = vec![b'z'; 4];
        plain.extend_from_slice(&[b'q'; 259]);
        plain.push(b'!');
        let decoded: Vec<u8> = output_for(&plain).collect();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn test_fill_in_small_chunks() {
        let plain: Vec<u8> = (0..40u8).flat_map(|i| vec![i % 7; (i % 9) as usize + 1]).collect();
        let mut output = output_for(&plain);
        let mut decoded = Vec::new();
        let mut chunk = [0u8; 3];
        loop {
            let n = output.fill(&mut chunk);
            decoded.extend_from_slice(&chunk[..n]);
            if n < chunk.len() {
                break;
            }
        }
        assert_eq!(decoded, plain);
        assert_eq!(output.crc(), Bzip2Crc::compute(&plain));
    }

    #[test]
    fn test_randomized_block() {
        // Flip the bits an old encoder would have flipped, then decode.
        let plain: Vec<u8> = (0..1500u32).map(|i| b"abcdefgh"[(i % 8) as usize]).collect();
        let mut masked = rle1(&plain);
        let mut randomizer = Randomizer::new();
        for byte in masked.iter_mut() {
            *byte ^= randomizer.next_mask();
        }
        let (last, orig_ptr) = transform(&masked);

        let output = BlockOutput::new(BwtBlock::from_data(last), orig_ptr, true).unwrap();
        assert_eq!(output.collect::<Vec<u8>>(), plain);
    }
}
