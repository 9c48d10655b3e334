//! Test command implementation.

use crate::utils::format_size;
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use unbz_bzip2::{BzDecoder, DecoderConfig};
use unbz_core::BzError;

/// Decode a file fully, discarding the output.
fn verify(path: &Path, config: DecoderConfig) -> Result<(u64, u64), BzError> {
    let file = File::open(path)?;
    let mut decoder = BzDecoder::with_config(BufReader::new(file), config)?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = decoder.read_bytes(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    debug!(
        "{}: combined CRC {:08x}",
        path.display(),
        decoder.combined_crc()
    );
    Ok((decoder.blocks_decoded(), total))
}

fn failure_kind(error: &BzError) -> &'static str {
    if error.is_crc_error() {
        "checksum"
    } else if error.is_truncation() {
        "truncated"
    } else if matches!(error, BzError::Io(_)) {
        "io"
    } else {
        "corrupt"
    }
}

/// Test the integrity of each file.
pub fn cmd_test(files: &[PathBuf], config: DecoderConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut ok_count = 0usize;
    let mut errors: Vec<(String, String)> = Vec::new();

    for path in files {
        match verify(path, config) {
            Ok((blocks, size)) => {
                ok_count += 1;
                println!(
                    "  OK: {} ({} blocks, {})",
                    path.display(),
                    blocks,
                    format_size(size)
                );
            }
            Err(e) => {
                println!("  FAILED ({}): {} - {}", failure_kind(&e), path.display(), e);
                errors.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    println!();
    println!("Test results:");
    println!("  Total files: {}", files.len());
    println!("  OK: {}", ok_count);
    println!("  Errors: {}", errors.len());

    if !errors.is_empty() {
        println!();
        println!("Errors:");
        for (name, error) in &errors {
            println!("  {}: {}", name, error);
        }
        std::process::exit(2);
    }

    println!();
    println!("All files OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unbz_core::CrcKind;

    #[test]
    fn test_failure_kind() {
        let crc = BzError::crc_mismatch(CrcKind::Stream, 1, 2);
        assert_eq!(failure_kind(&crc), "checksum");
        assert_eq!(failure_kind(&BzError::unexpected_eoi(12)), "truncated");
        assert_eq!(failure_kind(&BzError::bad_block_header(0)), "corrupt");
    }
}
