use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::fmt::Write as _;
use std::path::Path;

use a32dis::{disassemble_with, format_instr, DisasmConfig, Disassembly};

mod model;
use model::{load_raw_bin, Image, LoadWindow};

#[derive(Parser, Debug)]
#[command(author, version, about = "ARM A32 disassembler CLI", long_about=None)]
struct Cli {
    /// Load address for the binary in target address space
    #[arg(long, default_value_t = 0u32, value_parser = parse_u32)]
    base: u32,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Read instruction words as big-endian
    #[arg(long)]
    big_endian: bool,
    /// Input binary path (not needed for `word`)
    #[arg(value_name = "BINFILE")]
    input: Option<String>,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments with their word-slot counts
    Sections,
    /// Linear listing of every 4-byte slot
    List {
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Decode instruction words given on the command line
    Word {
        /// Words (hex or dec)
        #[arg(required = true, value_parser = parse_u32)]
        words: Vec<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, serde::Serialize)]
struct LineOut { addr: u32, raw: u32, text: String, decoded: bool }

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(&hex.replace('_', ""), 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = DisasmConfig { little_endian: !cli.big_endian, ..DisasmConfig::default() };

    if let Command::Word { words } = &cli.cmd {
        for &raw in words {
            match format_instr(raw) {
                Ok(text) => println!("{raw:#010x}: {text}"),
                Err(err) => println!("{raw:#010x}: .word {raw:#010x} ; {err}"),
            }
        }
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else { anyhow::bail!("BINFILE is required for this command") };
    let img = load_raw_bin(Path::new(input), LoadWindow { base: cli.base, skip: cli.skip, len: cli.len })?;

    match cli.cmd {
        Command::Sections => {
            println!("{:<10} {:<12} {:<12} {:>6} {:>5}", "name", "start", "end", "words", "tail");
            for s in &img.segments {
                println!("{:<10} {:#010x}   {:#010x}   {:>6} {:>5}", s.name, s.base, s.end(), s.word_count(), s.tail_len());
            }
        }
        Command::List { show_bytes, format, out } => {
            let lines = listing_lines(&img, &cfg)?;
            let buf = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&lines)?,
                OutputFormat::Text => render_text(&img, &lines, show_bytes),
            };
            if let Some(path) = out { std::fs::write(path, buf)?; } else { print!("{}", buf); }
        }
        Command::Word { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn listing_lines(img: &Image, cfg: &DisasmConfig) -> Result<Vec<LineOut>> {
    let mut lines = Vec::new();
    for s in &img.segments {
        let dis: Disassembly = disassemble_with(&s.bytes, cfg)?;
        tracing::info!(segment = %s.name, words = dis.len(), failed = dis.failures().len(), "segment disassembled");
        for (i, insn) in dis.iter().enumerate() {
            lines.push(LineOut { addr: s.slot_addr(i), raw: insn.raw, text: insn.text.clone(), decoded: insn.is_decoded() });
        }
    }
    Ok(lines)
}

fn render_text(img: &Image, lines: &[LineOut], show_bytes: bool) -> String {
    let mut buf = String::new();
    for l in lines {
        let _ = write!(buf, "{:#010x}: ", l.addr);
        if show_bytes {
            for b in img.slot(l.addr).unwrap_or_default() { let _ = write!(buf, "{:02x} ", b); }
            buf.push_str("  ");
        }
        if l.decoded {
            let _ = writeln!(buf, "{}", l.text);
        } else {
            let _ = writeln!(buf, ".word {:#010x}", l.raw);
        }
    }
    buf
}
