//! BZip2 decoder.
//!
//! [`BzDecoder`] is a pull-based session over one stream. A block is decoded
//! up to its pre-BWT array when the previous block's output runs dry; its
//! bytes are then produced on demand. The block CRC is compared once the
//! block's last byte has been handed out, so everything returned before a
//! [`CrcMismatch`](BzError::CrcMismatch) is exactly what the block decoded to.

use crate::block::{BlockHeader, BlockTables};
use crate::bwt::BlockOutput;
use crate::config::DecoderConfig;
use crate::header::{Marker, StreamHeader};
use crate::mtf;
use log::debug;
use std::io::{self, Read};
use unbz_core::bitstream::BitReader;
use unbz_core::crc::combine_stream_crc;
use unbz_core::error::{BzError, CrcKind, Result};

/// Facts about one block, gathered while it is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Zero-based block index within the stream.
    pub index: u64,
    /// Position of the block magic, in bits from the start of the stream.
    pub bit_offset: u64,
    /// CRC stored in the block header.
    pub stored_crc: u32,
    /// Legacy randomization flag.
    pub randomized: bool,
    /// Row of the original text among the sorted rotations.
    pub orig_ptr: usize,
    /// Length of the pre-BWT array.
    pub bwt_len: usize,
    /// Number of Huffman coding groups.
    pub groups: usize,
    /// Number of selectors kept.
    pub selectors: usize,
    /// Decoded length, once the block has been fully produced.
    pub decoded_len: Option<u64>,
}

#[derive(Debug)]
enum State {
    /// Between blocks; the next marker has not been read.
    Boundary,
    /// Serving the output of the current block.
    Emitting { output: BlockOutput, stored_crc: u32 },
    /// Stream-end marker and combined CRC verified.
    Finished,
    /// An error ended the session.
    Failed,
}

/// BZip2 decoder.
#[derive(Debug)]
pub struct BzDecoder<R: Read> {
    reader: BitReader<R>,
    header: StreamHeader,
    config: DecoderConfig,
    state: State,
    combined_crc: u32,
    blocks_decoded: u64,
    last_block: Option<BlockInfo>,
}

impl<R: Read> BzDecoder<R> {
    /// Create a new decoder, reading and checking the stream header.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_config(reader, DecoderConfig::default())
    }

    /// Create a new decoder with explicit limits.
    pub fn with_config(mut reader: R, config: DecoderConfig) -> Result<Self> {
        let header = StreamHeader::read(&mut reader)?;
        Self::from_header(reader, header, config)
    }

    /// Create a decoder for a source positioned just after a header the
    /// caller already consumed.
    pub fn from_header(reader: R, header: StreamHeader, config: DecoderConfig) -> Result<Self> {
        header.check(&config)?;
        debug!(
            "bzip2 stream: level {}, block size {}",
            header.level(),
            header.block_size()
        );

        Ok(Self {
            reader: BitReader::new(reader),
            header,
            config,
            state: State::Boundary,
            combined_crc: 0,
            blocks_decoded: 0,
            last_block: None,
        })
    }

    /// The stream header.
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// The session's configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Get the block size.
    pub fn block_size(&self) -> usize {
        self.header.block_size()
    }

    /// Combined CRC over the blocks verified so far.
    pub fn combined_crc(&self) -> u32 {
        self.combined_crc
    }

    /// Number of blocks whose CRC has been verified.
    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }

    /// The block currently being served, or the last one finished.
    pub fn last_block_info(&self) -> Option<&BlockInfo> {
        self.last_block.as_ref()
    }

    /// Whether the stream-end marker has been reached and verified.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    /// Compressed bytes consumed so far, header included.
    pub fn compressed_bytes_read(&self) -> u64 {
        StreamHeader::LEN + self.reader.bytes_consumed()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Consume the decoder and return the underlying reader.
    ///
    /// After a finished stream the reader is positioned just past the
    /// combined CRC; any bytes that follow are untouched.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn stream_bit_position(&self) -> u64 {
        StreamHeader::LEN * 8 + self.reader.bit_position()
    }

    /// Record a failure so later calls do not resume mid-structure.
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.state = State::Failed;
        }
        result
    }

    fn failed(&self) -> BzError {
        BzError::corrupted(
            self.reader.bit_position(),
            "decoder stopped by an earlier error",
        )
    }

    /// Read the next marker and either open a block or finish the stream.
    fn start_block(&mut self) -> Result<()> {
        let bit_offset = self.stream_bit_position();
        match Marker::read(&mut self.reader)? {
            Marker::StreamEnd => self.finish_stream(),
            Marker::Block => self.begin_block(bit_offset),
        }
    }

    fn finish_stream(&mut self) -> Result<()> {
        let stored = self.reader.read_u32()?;
        if stored != self.combined_crc {
            return Err(BzError::crc_mismatch(
                CrcKind::Stream,
                stored,
                self.combined_crc,
            ));
        }
        self.reader.align_to_byte();
        debug!(
            "stream end: {} blocks, combined CRC {:#010x}",
            self.blocks_decoded, stored
        );
        self.state = State::Finished;
        Ok(())
    }

    fn begin_block(&mut self, bit_offset: u64) -> Result<()> {
        let index = self.blocks_decoded;
        let header = BlockHeader::read(&mut self.reader)?;
        if header.randomized && !self.config.allow_randomized {
            return Err(BzError::corrupted(
                self.reader.bit_position(),
                format!("block {} is randomized and randomized blocks are disabled", index),
            ));
        }

        let tables = BlockTables::read(&mut self.reader)?;
        let block = mtf::decode_symbols(
            &mut self.reader,
            &tables.in_use,
            &tables.selectors,
            &tables.groups,
            self.header.block_size(),
        )?;
        let bwt_len = block.len();
        let output = BlockOutput::new(block, header.orig_ptr, header.randomized)?;
        debug!(
            "block {}: stored CRC {:#010x}, randomized {}, origPtr {}, {} BWT bytes",
            index, header.stored_crc, header.randomized, header.orig_ptr, bwt_len
        );

        self.last_block = Some(BlockInfo {
            index,
            bit_offset,
            stored_crc: header.stored_crc,
            randomized: header.randomized,
            orig_ptr: header.orig_ptr,
            bwt_len,
            groups: tables.groups.len(),
            selectors: tables.selectors.len(),
            decoded_len: None,
        });
        self.state = State::Emitting {
            output,
            stored_crc: header.stored_crc,
        };
        Ok(())
    }

    /// Verify the exhausted block's CRC and fold it into the stream CRC.
    fn finish_block(&mut self) -> Result<()> {
        let State::Emitting { output, stored_crc } =
            std::mem::replace(&mut self.state, State::Boundary)
        else {
            return Ok(());
        };

        let index = self.blocks_decoded;
        let computed = output.crc();
        if let Some(info) = self.last_block.as_mut() {
            info.decoded_len = Some(output.produced());
        }
        if computed != stored_crc {
            return Err(BzError::crc_mismatch(
                CrcKind::Block(index),
                stored_crc,
                computed,
            ));
        }

        self.combined_crc = combine_stream_crc(self.combined_crc, computed);
        self.blocks_decoded += 1;
        debug!("block {}: {} bytes, CRC ok", index, output.produced());
        Ok(())
    }

    /// Read and decode the next block.
    ///
    /// If [`read_bytes`](Self::read_bytes) already served part of the
    /// current block, the rest of it is returned. `None` once the stream-end
    /// marker and combined CRC have been verified.
    pub fn read_block(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.state {
                State::Finished => return Ok(None),
                State::Failed => return Err(self.failed()),
                State::Emitting { .. } => break,
                State::Boundary => {
                    let result = self.start_block();
                    self.guard(result)?;
                }
            }
        }

        let mut data = Vec::new();
        if let State::Emitting { output, .. } = &mut self.state {
            output.drain_into(&mut data);
        }
        let result = self.finish_block();
        self.guard(result)?;
        Ok(Some(data))
    }

    /// Fill `buf` with decompressed bytes; returns the number written.
    ///
    /// `Ok(0)` for a non-empty buffer means the stream ended cleanly.
    /// Bytes written before a block boundary are returned before that
    /// boundary's checks run, so an error never discards served data.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut written = 0;
        loop {
            let block_done = match &mut self.state {
                State::Finished => return Ok(written),
                State::Failed => return Err(self.failed()),
                State::Boundary => false,
                State::Emitting { output, .. } => {
                    if !output.is_exhausted() {
                        written += output.fill(&mut buf[written..]);
                        if written == buf.len() {
                            return Ok(written);
                        }
                        continue;
                    }
                    true
                }
            };

            if written > 0 {
                return Ok(written);
            }
            let result = if block_done {
                self.finish_block()
            } else {
                self.start_block()
            };
            self.guard(result)?;
        }
    }
}

impl<R: Read> Read for BzDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(buf).map_err(io::Error::from)
    }
}

/// Decompress BZip2 data.
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    decompress_with_config(reader, DecoderConfig::default())
}

/// Decompress BZip2 data under explicit limits.
pub fn decompress_with_config<R: Read>(reader: R, config: DecoderConfig) -> Result<Vec<u8>> {
    let mut decoder = BzDecoder::with_config(reader, config)?;
    let mut output = Vec::new();

    while let Some(block) = decoder.read_block()? {
        output.extend_from_slice(&block);
    }

    Ok(output)
}
