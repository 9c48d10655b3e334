//! # unbz Core
//!
//! Core components for the unbz bzip2 decoder.
//!
//! - [`bitstream`]: MSB-first bit reader over any `Read`
//! - [`crc`]: bzip2's CRC-32 and the combined stream checksum
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI: unbz decompress / test / info                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec: unbz-bzip2                                       │
//! │     header, Huffman tables, MTF/RLE, inverse BWT        │
//! ├─────────────────────────────────────────────────────────┤
//! │ BitStream (this crate)                                  │
//! │     BitReader, bzip2 CRC, BzError                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use unbz_core::bitstream::BitReader;
//! use unbz_core::crc::Bzip2Crc;
//! use std::io::Cursor;
//!
//! let mut reader = BitReader::new(Cursor::new(vec![0xAB, 0xCD]));
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! assert_eq!(Bzip2Crc::compute(b"123456789"), 0xFC891918);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use crc::{Bzip2Crc, combine_stream_crc};
pub use error::{BzError, CrcKind, Result};
