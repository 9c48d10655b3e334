//! Info command implementation.

use crate::utils::format_size;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use unbz_bzip2::{BlockInfo, BzDecoder, DecoderConfig};

/// JSON view of one block.
#[derive(Debug, Serialize)]
struct BlockJson {
    index: u64,
    bit_offset: u64,
    crc: String,
    randomized: bool,
    orig_ptr: usize,
    bwt_len: usize,
    groups: usize,
    selectors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoded_len: Option<u64>,
}

impl From<&BlockInfo> for BlockJson {
    fn from(info: &BlockInfo) -> Self {
        Self {
            index: info.index,
            bit_offset: info.bit_offset,
            crc: format!("{:08x}", info.stored_crc),
            randomized: info.randomized,
            orig_ptr: info.orig_ptr,
            bwt_len: info.bwt_len,
            groups: info.groups,
            selectors: info.selectors,
            decoded_len: info.decoded_len,
        }
    }
}

/// JSON view of a whole stream.
#[derive(Debug, Serialize)]
struct StreamJson {
    file: String,
    level: u8,
    block_size: usize,
    compressed_size: u64,
    decompressed_size: u64,
    ratio: f64,
    combined_crc: String,
    blocks: Vec<BlockJson>,
}

/// Decode a file block by block and report what was found.
pub fn cmd_info(path: &Path, json: bool, config: DecoderConfig) -> Result<(), Box<dyn std::error::Error>> {
    let compressed_size = fs::metadata(path)?.len();
    let file = File::open(path)?;
    let mut decoder = BzDecoder::with_config(BufReader::new(file), config)?;

    let mut blocks = Vec::new();
    let mut decompressed_size = 0u64;
    while let Some(block) = decoder.read_block()? {
        decompressed_size += block.len() as u64;
        if let Some(info) = decoder.last_block_info() {
            blocks.push(info.clone());
        }
    }

    let ratio = if decompressed_size > 0 {
        compressed_size as f64 / decompressed_size as f64 * 100.0
    } else {
        0.0
    };

    if json {
        let report = StreamJson {
            file: path.display().to_string(),
            level: decoder.header().level(),
            block_size: decoder.block_size(),
            compressed_size,
            decompressed_size,
            ratio,
            combined_crc: format!("{:08x}", decoder.combined_crc()),
            blocks: blocks.iter().map(BlockJson::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("Level: {} (block size {})", decoder.header().level(), format_size(decoder.block_size() as u64));
    println!("Compressed: {}", format_size(compressed_size));
    println!("Decompressed: {}", format_size(decompressed_size));
    println!("Ratio: {:.1}%", ratio);
    println!("Combined CRC: {:08x}", decoder.combined_crc());
    println!();
    println!(
        "{:>5} {:>12} {:>8} {:>10} {:>10} {:>6} {:>9}  Flags",
        "Block", "Bit offset", "CRC", "BWT len", "Output", "Groups", "Selectors",
    );
    println!("{}", "-".repeat(76));
    for info in &blocks {
        println!(
            "{:>5} {:>12} {:08x} {:>10} {:>10} {:>6} {:>9}  {}",
            info.index,
            info.bit_offset,
            info.stored_crc,
            info.bwt_len,
            info.decoded_len.unwrap_or(0),
            info.groups,
            info.selectors,
            if info.randomized { "randomized" } else { "" },
        );
    }
    println!("{}", "-".repeat(76));
    println!("{} blocks", blocks.len());
    Ok(())
}
