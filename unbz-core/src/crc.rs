//! CRC-32 as used by bzip2.
//!
//! bzip2 uses the CRC-32 polynomial 0x04C11DB7 but processes it
//! non-reflected (MSB-first), unlike ZIP/GZIP. The two variants share the
//! polynomial and nothing else: a table built for one gives garbage for the
//! other.
//!
//! - Polynomial: 0x04C11DB7
//! - Initial value: 0xFFFFFFFF
//! - Final XOR: 0xFFFFFFFF
//! - Reflected input/output: No
//!
//! The stream trailer carries a second checksum that folds every block CRC
//! together; see [`combine_stream_crc`].

/// bzip2 CRC-32 lookup table, built at compile time and never mutated.
pub const BZIP2_CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ 0x04C1_1DB7;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Running bzip2 CRC-32.
///
/// # Example
///
/// ```
/// use unbz_core::crc::Bzip2Crc;
///
/// let mut crc = Bzip2Crc::new();
/// crc.update(b"123456789");
/// assert_eq!(crc.finalize(), 0xFC891918);
/// ```
#[derive(Debug, Clone)]
pub struct Bzip2Crc {
    crc: u32,
}

impl Bzip2Crc {
    /// Create a new calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }

    /// Reset to the initial state (start of a block).
    pub fn reset(&mut self) {
        self.crc = 0xFFFF_FFFF;
    }

    /// Feed one byte.
    #[inline(always)]
    pub fn update_byte(&mut self, byte: u8) {
        let index = ((self.crc >> 24) ^ byte as u32) as usize;
        self.crc = (self.crc << 8) ^ BZIP2_CRC_TABLE[index];
    }

    /// Feed `count` copies of the same byte.
    #[inline]
    pub fn update_repeated(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.update_byte(byte);
        }
    }

    /// Feed a slice.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.update_byte(byte);
        }
    }

    /// Current CRC value without consuming the calculator.
    #[inline(always)]
    pub fn value(&self) -> u32 {
        !self.crc
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        !self.crc
    }

    /// Compute the CRC of a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Bzip2Crc {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold a finished block CRC into the running stream CRC.
///
/// The combined value starts at zero and is rotated left by one bit before
/// each block CRC is XORed in.
#[inline]
pub fn combine_stream_crc(combined: u32, block_crc: u32) -> u32 {
    combined.rotate_left(1) ^ block_crc
}
