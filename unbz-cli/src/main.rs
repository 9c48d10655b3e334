//! unbz CLI - Pure Rust bzip2 decompressor
//!
//! Decompresses, verifies and inspects `.bz2` streams.

mod commands;
mod utils;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{DecompressOptions, cmd_completions, cmd_decompress, cmd_info, cmd_test};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;
use unbz_bzip2::DecoderConfig;

#[derive(Parser)]
#[command(name = "unbz")]
#[command(author, version, about = "Pure Rust bzip2 decompressor")]
#[command(long_about = "
unbz decodes bzip2 streams block by block, verifying every block CRC and
the combined stream CRC.

Examples:
  unbz decompress data.bz2
  unbz decompress data.bz2 --stdout > data
  unbz test a.bz2 b.bz2
  unbz info data.bz2 --json
  unbz completions bash
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Largest block size level (1-9) to accept
    #[arg(long, global = true, default_value_t = 9, value_parser = clap::value_parser!(u8).range(1..=9))]
    max_level: u8,

    /// Reject legacy randomized blocks
    #[arg(long, global = true)]
    no_randomized: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompress a .bz2 file
    #[command(alias = "d")]
    Decompress {
        /// Compressed input file
        file: PathBuf,

        /// Output file (default: input name without .bz2)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the input file
        #[arg(short, long)]
        keep: bool,

        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,

        /// Write to standard output (implies --keep)
        #[arg(short = 'c', long)]
        stdout: bool,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Test integrity of .bz2 files
    #[command(alias = "t")]
    Test {
        /// Files to test
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show stream and per-block information
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    // Without a terminal there is nowhere useful to log to.
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = DecoderConfig::new(cli.max_level).with_randomized(!cli.no_randomized);

    let result = match cli.command {
        Commands::Decompress {
            file,
            output,
            keep,
            force,
            stdout,
            progress,
        } => cmd_decompress(
            &file,
            &DecompressOptions {
                output,
                keep,
                force,
                stdout,
                progress,
            },
            config,
        ),
        Commands::Test { files } => cmd_test(&files, config),
        Commands::Info { file, json } => cmd_info(&file, json, config),
        Commands::Completions { shell } => {
            cmd_completions(shell, &mut Cli::command());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
