//! Decompress command implementation.

use crate::utils::{create_progress_bar, format_size};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use unbz_bzip2::{BzDecoder, DecoderConfig};

const BUFFER_SIZE: usize = 64 * 1024;

/// Options for the decompress command.
pub struct DecompressOptions {
    pub output: Option<PathBuf>,
    pub keep: bool,
    pub force: bool,
    pub stdout: bool,
    pub progress: bool,
}

/// Derive the output path for a compressed input.
pub fn output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = name.to_ascii_lowercase();

    let new_name = if let Some(stem) = strip_suffix(&name, &lower, ".tbz2")
        .or_else(|| strip_suffix(&name, &lower, ".tbz"))
    {
        format!("{}.tar", stem)
    } else if let Some(stem) = strip_suffix(&name, &lower, ".bz2")
        .or_else(|| strip_suffix(&name, &lower, ".bz"))
    {
        stem.to_string()
    } else {
        format!("{}.out", name)
    };

    input.with_file_name(new_name)
}

fn strip_suffix<'a>(name: &'a str, lower: &str, suffix: &str) -> Option<&'a str> {
    if lower.ends_with(suffix) && name.len() > suffix.len() {
        Some(&name[..name.len() - suffix.len()])
    } else {
        None
    }
}

/// Decompress a single `.bz2` file.
pub fn cmd_decompress(
    input: &Path,
    options: &DecompressOptions,
    config: DecoderConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let compressed_len = fs::metadata(input)?.len();
    let file = File::open(input)?;
    let mut decoder = BzDecoder::with_config(BufReader::new(file), config)?;
    debug!(
        "{}: level {}, block size {}",
        input.display(),
        decoder.header().level(),
        decoder.block_size()
    );

    if options.stdout {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let written = pump(&mut decoder, &mut out, compressed_len, options.progress)?;
        out.flush()?;
        info!("{}: {} written to stdout", input.display(), format_size(written));
        return Ok(());
    }

    let target = options.output.clone().unwrap_or_else(|| output_path(input));
    if target.exists() && !options.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )
        .into());
    }

    let result = write_file(&target, &mut decoder, compressed_len, options.progress);

    let written = match result {
        Ok(written) => written,
        Err(e) => {
            // Never leave a partial file behind.
            let _ = fs::remove_file(&target);
            return Err(e);
        }
    };

    println!(
        "{}: {} -> {} ({})",
        input.display(),
        format_size(compressed_len),
        format_size(written),
        target.display()
    );

    if !options.keep {
        fs::remove_file(input)?;
    }
    Ok(())
}

fn write_file<R: Read>(
    target: &Path,
    decoder: &mut BzDecoder<R>,
    compressed_len: u64,
    progress: bool,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut out = BufWriter::new(File::create(target)?);
    let written = pump(decoder, &mut out, compressed_len, progress)?;
    out.flush()?;
    Ok(written)
}

/// Copy every decoded byte to `out`, reporting compressed progress.
fn pump<R: Read, W: Write>(
    decoder: &mut BzDecoder<R>,
    out: &mut W,
    compressed_len: u64,
    progress: bool,
) -> Result<u64, Box<dyn std::error::Error>> {
    let pb = create_progress_bar(compressed_len, progress);
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match decoder.read_bytes(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                pb.abandon_with_message("failed");
                return Err(e.into());
            }
        };
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        written += n as u64;
        pb.set_position(decoder.compressed_bytes_read());
    }

    pb.finish_with_message(format!("{} blocks", decoder.blocks_decoded()));
    Ok(written)
}
