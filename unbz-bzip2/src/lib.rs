//! BZip2 decompression for unbz.
//!
//! This crate provides a pure Rust, pull-based bzip2 decoder.
//!
//! A bzip2 block is undone by running the encoder's pipeline backwards:
//! 1. Huffman decoding - up to 6 tables, switched every 50 symbols
//! 2. Zero-run decoding - RUNA/RUNB bijective base-2 run lengths
//! 3. Inverse Move-to-Front - ranks back to bytes
//! 4. Inverse Burrows-Wheeler Transform - position table walk
//! 5. Run-length expansion - 4 equal bytes plus a count byte
//!
//! Each block carries a CRC of its decoded bytes and the stream trailer
//! carries a CRC combining all blocks. Both are verified.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{BufReader, Read};
//! use unbz_bzip2::BzDecoder;
//!
//! let file = BufReader::new(File::open("data.bz2").unwrap());
//! let mut decoder = BzDecoder::new(file).unwrap();
//! let mut text = String::new();
//! decoder.read_to_string(&mut text).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block;
pub mod bwt;
pub mod config;
mod decode;
pub mod header;
pub mod huffman;
mod mtf;
mod randomize;

#[cfg(test)]
mod test_support;

pub use config::DecoderConfig;
pub use decode::{BlockInfo, BzDecoder, decompress, decompress_with_config};
pub use header::StreamHeader;

/// BZip2 magic bytes ("BZ").
pub const BZIP2_MAGIC: [u8; 2] = [0x42, 0x5A];

/// Version byte following the magic ('h' for Huffman).
pub const BZIP2_VERSION: u8 = b'h';

/// Block header magic (BCD pi).
pub const BLOCK_MAGIC: u64 = 0x3141_5926_5359;

/// End of stream magic (BCD sqrt(pi)).
pub const EOS_MAGIC: u64 = 0x1772_4538_5090;

/// Block size unit; the header digit multiplies this.
pub const BLOCK_SIZE_UNIT: usize = 100_000;

/// Maximum block size (900k).
pub const MAX_BLOCK_SIZE: usize = 9 * BLOCK_SIZE_UNIT;
