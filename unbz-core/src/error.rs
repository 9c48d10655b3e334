//! Error types for unbz operations.
//!
//! Every failure the decoder can report is fatal for the current session.
//! The variants separate integrity failures (`CrcMismatch`) from structural
//! corruption and truncation so callers can produce useful diagnostics.

use std::fmt;
use std::io;
use thiserror::Error;

/// Which checksum failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcKind {
    /// Per-block CRC; the payload is the zero-based block index.
    Block(u64),
    /// Combined CRC stored after the stream-end marker.
    Stream,
}

impl fmt::Display for CrcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrcKind::Block(index) => write!(f, "block {}", index),
            CrcKind::Stream => f.write_str("stream"),
        }
    }
}

/// The main error type for unbz operations.
#[derive(Debug, Error)]
pub enum BzError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the `BZ` signature.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Invalid stream header (version byte or block-size digit).
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// The byte source ran dry in the middle of a structure.
    #[error("Unexpected end of input at bit position {bit_position}")]
    UnexpectedEndOfInput {
        /// Number of bits successfully consumed before the source ended.
        bit_position: u64,
    },

    /// A block started with neither the block magic nor the stream-end magic.
    #[error("Bad block header: found magic {found:#014x}")]
    BadBlockHeader {
        /// The 48-bit value found where a magic was expected.
        found: u64,
    },

    /// Code lengths for a Huffman group do not form a canonical code.
    #[error("Bad Huffman code lengths in group {group}: {message}")]
    BadHuffmanLengths {
        /// Index of the offending coding group.
        group: usize,
        /// What was wrong with the lengths.
        message: String,
    },

    /// Decoded block data exceeded the size announced by the stream header.
    #[error("Block overrun: decoded data exceeds the {limit} byte block limit")]
    BlockOverrun {
        /// Maximum pre-BWT length permitted by the header.
        limit: usize,
    },

    /// Block or stream CRC did not match the stored value.
    #[error("CRC mismatch ({kind}): expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// Which checksum failed.
        kind: CrcKind,
        /// CRC stored in the stream.
        expected: u32,
        /// CRC computed over the decoded data.
        computed: u32,
    },

    /// Structural corruption not covered by a more specific variant.
    #[error("Corrupted data at bit position {bit_position}: {message}")]
    Corrupted {
        /// Bit position where corruption was detected.
        bit_position: u64,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for unbz operations.
pub type Result<T> = std::result::Result<T, BzError>;

impl BzError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected end-of-input error.
    pub fn unexpected_eoi(bit_position: u64) -> Self {
        Self::UnexpectedEndOfInput { bit_position }
    }

    /// Create a bad block header error.
    pub fn bad_block_header(found: u64) -> Self {
        Self::BadBlockHeader { found }
    }

    /// Create a bad Huffman lengths error.
    pub fn bad_huffman_lengths(group: usize, message: impl Into<String>) -> Self {
        Self::BadHuffmanLengths {
            group,
            message: message.into(),
        }
    }

    /// Create a block overrun error.
    pub fn block_overrun(limit: usize) -> Self {
        Self::BlockOverrun { limit }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(kind: CrcKind, expected: u32, computed: u32) -> Self {
        Self::CrcMismatch {
            kind,
            expected,
            computed,
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(bit_position: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            bit_position,
            message: message.into(),
        }
    }

    /// True for block or stream checksum failures.
    pub fn is_crc_error(&self) -> bool {
        matches!(self, Self::CrcMismatch { .. })
    }

    /// True when the input ended early, including a short read surfaced as I/O.
    pub fn is_truncation(&self) -> bool {
        match self {
            Self::UnexpectedEndOfInput { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

impl From<BzError> for io::Error {
    fn from(err: BzError) -> Self {
        match err {
            BzError::Io(e) => e,
            other => {
                let kind = if other.is_truncation() {
                    io::ErrorKind::UnexpectedEof
                } else {
                    io::ErrorKind::InvalidData
                };
                io::Error::new(kind, other)
            }
        }
    }
}
