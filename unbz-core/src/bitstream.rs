//! Bit-level input for the bzip2 decoder.
//!
//! # Bit Ordering
//!
//! bzip2 packs fields MSB-first: the first bit of a field is the most
//! significant bit of the first byte it occupies. This is the opposite of
//! DEFLATE, so the reader keeps its accumulator left-aligned on the newest
//! byte and extracts from the high end.
//!
//! # Example
//!
//! ```
//! use unbz_core::bitstream::BitReader;
//! use std::io::Cursor;
//!
//! let mut reader = BitReader::new(Cursor::new(vec![0b1011_0001, 0xFF]));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(9).unwrap(), 0b1_0001_1111);
//! assert_eq!(reader.bit_position(), 12);
//! ```

use crate::error::{BzError, Result};
use std::io::{ErrorKind, Read};

/// Maximum field width served by a single [`BitReader::read_bits`] call.
pub const MAX_READ_BITS: u8 = 32;

/// A big-endian bit reader that wraps any `Read` implementation.
///
/// Bytes are pulled from the source one at a time, only when the accumulator
/// cannot satisfy a request, so at most one partially consumed byte is held
/// beyond what the caller asked for. Wrap slow sources in a `BufReader`.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bit accumulator; the live bits are the low `live` bits.
    buffer: u64,
    /// Number of valid bits in the accumulator.
    live: u8,
    /// Total bits handed out (for error reporting).
    total_bits_read: u64,
    /// Bytes pulled from the source.
    bytes_consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            live: 0,
            total_bits_read: 0,
            bytes_consumed: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Bits still held in the accumulator are discarded.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Number of bits consumed by callers so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of whole bytes pulled from the underlying reader.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Pull one byte into the accumulator.
    ///
    /// A short read here is always fatal; there is no partial-field recovery.
    fn refill(&mut self) -> Result<()> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Err(BzError::unexpected_eoi(self.total_bits_read)),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.buffer = (self.buffer << 8) | byte[0] as u64;
        self.live += 8;
        self.bytes_consumed += 1;
        Ok(())
    }

    /// Read `count` bits (0-32), most significant bit first.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(
            count <= MAX_READ_BITS,
            "Cannot read more than 32 bits at once"
        );

        if count == 0 {
            return Ok(0);
        }

        while self.live < count {
            self.refill()?;
        }

        let shift = self.live - count;
        let mask = (1u64 << count) - 1;
        let value = ((self.buffer >> shift) & mask) as u32;

        self.live -= count;
        self.total_bits_read += count as u64;

        Ok(value)
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read a big-endian 32-bit field.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bits(32)
    }

    /// Read a 48-bit field (block and stream-end magics).
    pub fn read_u48(&mut self) -> Result<u64> {
        let high = self.read_bits(24)? as u64;
        let low = self.read_bits(24)? as u64;
        Ok((high << 24) | low)
    }

    /// Discard bits up to the next byte boundary of the source.
    pub fn align_to_byte(&mut self) {
        let remainder = self.live % 8;
        self.live -= remainder;
        self.total_bits_read += remainder as u64;
    }
}
