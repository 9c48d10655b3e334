//! Stream header and block boundary markers.
//!
//! A stream starts with `BZh` and an ASCII digit giving the block size in
//! units of 100k. After that the stream is a sequence of 48-bit markers:
//! each block starts with [`BLOCK_MAGIC`] and the stream ends with
//! [`EOS_MAGIC`] followed by the combined CRC. Markers are not byte-aligned.

use crate::config::DecoderConfig;
use crate::{BLOCK_MAGIC, BLOCK_SIZE_UNIT, BZIP2_MAGIC, BZIP2_VERSION, EOS_MAGIC};
use log::warn;
use std::io::Read;
use unbz_core::bitstream::BitReader;
use unbz_core::error::{BzError, Result};

/// Validated `BZh1`..`BZh9` stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    level: u8,
}

impl StreamHeader {
    /// Size of the header in bytes.
    pub const LEN: u64 = 4;

    /// Build a header from a block-size digit (1-9).
    pub fn new(level: u8) -> Result<Self> {
        if !(1..=9).contains(&level) {
            return Err(BzError::invalid_header(format!(
                "block size level {} out of range 1-9",
                level
            )));
        }
        Ok(Self { level })
    }

    /// Parse a header from its 4 raw bytes.
    pub fn parse(bytes: [u8; 4]) -> Result<Self> {
        if bytes[..2] != BZIP2_MAGIC {
            return Err(BzError::invalid_magic(BZIP2_MAGIC.to_vec(), bytes[..2].to_vec()));
        }
        if bytes[2] != BZIP2_VERSION {
            return Err(BzError::invalid_header(format!(
                "unsupported version byte {:#04x}",
                bytes[2]
            )));
        }
        match bytes[3] {
            b'1'..=b'9' => Self::new(bytes[3] - b'0'),
            other => Err(BzError::invalid_header(format!(
                "invalid block size digit {:#04x}",
                other
            ))),
        }
    }

    /// Read and validate the header from the start of a byte source.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                BzError::unexpected_eoi(0)
            } else {
                e.into()
            }
        })?;
        Self::parse(bytes)
    }

    /// Block-size digit (1-9).
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Maximum pre-BWT length of any block in this stream.
    pub fn block_size(&self) -> usize {
        self.level as usize * BLOCK_SIZE_UNIT
    }

    /// Check the header against a session's limits.
    pub fn check(&self, config: &DecoderConfig) -> Result<()> {
        if self.level > config.max_level {
            warn!(
                "stream block size level {} exceeds configured maximum {}",
                self.level, config.max_level
            );
            return Err(BzError::invalid_header(format!(
                "block size level {} exceeds configured maximum {}",
                self.level, config.max_level
            )));
        }
        Ok(())
    }

    /// Header bytes as they appear on the wire.
    pub fn to_bytes(&self) -> [u8; 4] {
        [BZIP2_MAGIC[0], BZIP2_MAGIC[1], BZIP2_VERSION, b'0' + self.level]
    }
}

/// What follows a block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Another compressed block.
    Block,
    /// Stream end; the combined CRC follows.
    StreamEnd,
}

impl Marker {
    /// Read the 48-bit marker at the current bit position.
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        match reader.read_u48()? {
            BLOCK_MAGIC => Ok(Self::Block),
            EOS_MAGIC => Ok(Self::StreamEnd),
            found => Err(BzError::bad_block_header(found)),
        }
    }
}
