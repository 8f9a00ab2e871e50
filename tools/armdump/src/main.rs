//! arm-dump — disassemble a 32-bit ARM ELF image.
//!
//! Loads the executable segments of a little-endian `EM_ARM` ELF,
//! then lists instructions from the entry point (or `--start` /
//! `--symbol`), annotating branch and literal targets with symbols.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arm_dump::elf::{self, EM_ARM};
use arm_dump::listing::{build_image, resolve_start, symbol_map, write_listing};

#[derive(Parser)]
#[command(name = "arm-dump")]
#[command(about = "Disassemble 32-bit ARM ELF images", long_about = None)]
struct Cli {
    /// Path to the ELF file
    elf: PathBuf,

    /// Start address (hex)
    #[arg(long, value_parser = parse_hex)]
    start: Option<u32>,

    /// Start at this symbol
    #[arg(short, long)]
    symbol: Option<String>,

    /// Maximum number of instructions
    #[arg(short, long, default_value_t = 64)]
    count: usize,

    /// Print the raw instruction word before each mnemonic
    #[arg(long)]
    raw: bool,

    /// Do not annotate addresses with symbols
    #[arg(long)]
    no_symbols: bool,

    /// Write the listing to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(s, 16).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let data = fs::read(&cli.elf)
        .with_context(|| format!("failed to read {}", cli.elf.display()))?;
    let info = elf::parse(&data).context("ELF parse error")?;
    if info.e_machine != EM_ARM {
        bail!("unsupported ELF e_machine {}, expected ARM", info.e_machine);
    }

    let image = build_image(&info)?;
    let symbols = symbol_map(&info.symbols);
    let start = resolve_start(&info, cli.start, cli.symbol.as_deref())?;
    info!(
        "{} symbol(s), listing from {start:#010x}",
        symbols.len()
    );

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let f = fs::File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let syms = (!cli.no_symbols).then_some(&symbols);
    let n = write_listing(&mut *out, &image, syms, start, cli.count, cli.raw)?;
    out.flush().context("flush failed")?;
    info!("{n} instruction(s)");
    Ok(())
}
