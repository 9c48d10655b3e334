//! Helpers for crafting bzip2 bit streams in unit tests.

/// MSB-first bit writer, the mirror image of `BitReader`.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    acc: u8,
    nbits: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bits(&mut self, value: u64, count: u8) {
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.acc = (self.acc << 1) | bit as u8;
        self.nbits += 1;
        if self.nbits == 8 {
            self.bytes.push(self.acc);
            self.acc = 0;
            self.nbits = 0;
        }
    }

    /// Pad with zero bits to a byte boundary and return the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.acc <<= 8 - self.nbits;
            self.bytes.push(self.acc);
        }
        self.bytes
    }

    /// Delta-encode a code length list the way block tables store them.
    pub fn write_lengths(&mut self, lengths: &[u8]) {
        let mut current = lengths[0] as i32;
        self.write_bits(current as u64, 5);
        for &len in lengths {
            while current < len as i32 {
                self.write_bits(0b10, 2);
                current += 1;
            }
            while current > len as i32 {
                self.write_bits(0b11, 2);
                current -= 1;
            }
            self.write_bit(false);
        }
    }
}

/// Canonical code for every symbol, in the order the decoder assigns them.
pub fn canonical_codes(lengths: &[u8]) -> Vec<u32> {
    let max_len = lengths.iter().copied().max().unwrap_or(0);
    let mut codes = vec![0u32; lengths.len()];
    let mut code = 0u32;
    for len in 1..=max_len {
        for (sym, &l) in lengths.iter().enumerate() {
            if l == len {
                codes[sym] = code;
                code += 1;
            }
        }
        code <<= 1;
    }
    codes
}
