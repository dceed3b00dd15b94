//! CLI for arwtool: trace, remove, store and restore the version stack of ARW files.

#![cfg(feature = "cli")]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arwtool::{
    locate, remove_version_stack, restore_version_stack, sniff_endian, store_version_stack,
    trace, Config, Endian, DEFAULT_DUMP_WIDTH, MAX_DUMP_WIDTH,
};
use clap::{Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error>;

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Parser)]
#[command(name = "arwtool")]
#[command(about = "Inspect and edit the version stack of Sony ARW raw files", long_about = None)]
struct Args {
    /// Byte order of the container's fixed-width fields (auto: from the II/MM mark)
    #[arg(long, value_enum, default_value_t = ByteOrder::Little, global = true)]
    byte_order: ByteOrder,

    /// Log more (-v: info, -vv: debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ByteOrder {
    Little,
    Big,
    Auto,
}

#[derive(Subcommand)]
enum Command {
    /// Print the directory walk with addresses, tag values and data dumps
    Trace {
        file: PathBuf,
        /// Output one JSON object instead of the text dump
        #[arg(long)]
        json: bool,
        /// Pretty-print JSON (use with --json)
        #[arg(long)]
        pretty: bool,
        /// Bytes shown per tag data dump
        #[arg(long, default_value_t = DEFAULT_DUMP_WIDTH, value_parser = parse_dump_width)]
        dump_width: usize,
    },
    /// Clear the version stack pointer and truncate the stack off the file
    RemoveVersionstack { file: PathBuf },
    /// Copy the version stack bytes into OUT
    StoreVersionstack { file: PathBuf, out: PathBuf },
    /// Re-attach a version stack previously stored in IN
    RestoreVersionstack {
        file: PathBuf,
        #[arg(value_name = "IN")]
        input: PathBuf,
    },
}

fn parse_dump_width(s: &str) -> Result<usize, String> {
    let width: usize = s.parse().map_err(|e| format!("{e}"))?;
    if width > MAX_DUMP_WIDTH {
        return Err(format!("must be at most {MAX_DUMP_WIDTH}"));
    }
    Ok(width)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arwtool={level}")));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("arwtool: {e}");
            ExitCode::FAILURE
        }
    }
}

fn open(path: &Path, write: bool) -> Result<File, BoxError> {
    OpenOptions::new()
        .read(true)
        .write(write)
        .open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e).into())
}

/// Both paths name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn resolve_endian(choice: ByteOrder, file: &mut File) -> Result<Endian, BoxError> {
    Ok(match choice {
        ByteOrder::Little => Endian::Little,
        ByteOrder::Big => Endian::Big,
        ByteOrder::Auto => match sniff_endian(file)? {
            Some(endian) => endian,
            None => {
                warn!("no II/MM byte order mark, assuming little-endian");
                Endian::Little
            }
        },
    })
}

fn run(args: &Args) -> Result<(), BoxError> {
    match &args.command {
        Command::Trace {
            file,
            json,
            pretty,
            dump_width,
        } => {
            let mut raw = open(file, false)?;
            let endian = resolve_endian(args.byte_order, &mut raw)?;
            let config = Config::default()
                .with_endian(endian)
                .with_dump_width(*dump_width);
            if *json {
                print_json(file, &mut raw, &config, *pretty)
            } else {
                let stdout = io::stdout();
                let mut out = BufWriter::new(stdout.lock());
                trace::trace(&mut raw, &mut out, &config)?;
                out.flush()?;
                Ok(())
            }
        }
        Command::RemoveVersionstack { file } => {
            let mut raw = open(file, true)?;
            let endian = resolve_endian(args.byte_order, &mut raw)?;
            let removed = remove_version_stack(&mut raw, endian)?;
            raw.sync_all()?;
            info!(file = %file.display(), removed, "done");
            Ok(())
        }
        Command::StoreVersionstack { file, out } => {
            let mut raw = BufReader::new(open(file, false)?);
            if same_file(file, out) {
                return Err(format!("Refusing to store {} into itself", file.display()).into());
            }
            let endian = resolve_endian(args.byte_order, raw.get_mut())?;
            // Stage next to OUT so an existing file is only replaced on success.
            let dir = match out.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let staged = NamedTempFile::new_in(dir)
                .map_err(|e| format!("Failed to open {}: {}", out.display(), e))?;
            let mut sink = BufWriter::new(staged);
            let bytes = store_version_stack(&mut raw, &mut sink, endian)?;
            let staged = sink.into_inner().map_err(|e| e.into_error())?;
            staged
                .persist(out)
                .map_err(|e| format!("Failed to write {}: {}", out.display(), e.error))?;
            info!(file = %file.display(), out = %out.display(), bytes, "done");
            Ok(())
        }
        Command::RestoreVersionstack { file, input } => {
            let mut raw = open(file, true)?;
            let endian = resolve_endian(args.byte_order, &mut raw)?;
            let mut blob = BufReader::new(open(input, false)?);
            let len = restore_version_stack(&mut raw, &mut blob, endian)?;
            raw.sync_all()?;
            info!(file = %file.display(), len, "done");
            Ok(())
        }
    }
}

fn print_json(path: &Path, raw: &mut File, config: &Config, pretty: bool) -> Result<(), BoxError> {
    let bytes = fs::read(path)?;
    let walk = arwtool::walk_directories(raw, config.endian)?;
    let state = locate(raw, config.endian)?;

    let mut out = IndexMap::<String, serde_json::Value>::new();
    out.insert("path".to_string(), serde_json::Value::String(path.display().to_string()));
    out.insert("sha256".to_string(), serde_json::Value::String(sha256_hex(&bytes)));
    out.insert("size_bytes".to_string(), serde_json::to_value(bytes.len())?);
    out.insert("byte_order".to_string(), serde_json::to_value(config.endian)?);
    out.insert("pointer_offset".to_string(), serde_json::to_value(state.pointer_offset)?);
    out.insert("version_stack_start".to_string(), serde_json::to_value(state.start)?);
    out.insert(
        "version_stack_bytes".to_string(),
        serde_json::to_value(
            state
                .is_present()
                .then(|| (bytes.len() as u64).saturating_sub(u64::from(state.start))),
        )?,
    );
    out.insert("walk".to_string(), serde_json::to_value(&walk)?);
    let json_str = if pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };
    println!("{}", json_str);
    Ok(())
}
