//! protoweave - Inspect Protocol Buffers wire-format payloads
//!
//! This tool decodes serialized protobuf messages without a schema and
//! prints their field structure, either as an indented tree or as a
//! one-line summary per message.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use protoweave_core::{decode_raw, Cursor, RawMessage};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Inspect Protocol Buffers wire-format payloads without a schema
#[derive(Parser, Debug)]
#[command(name = "protoweave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value = "tree")]
    format: OutputFormat,

    /// Maximum depth at which length-delimited payloads are tried as messages
    #[arg(long, default_value = "16")]
    max_depth: usize,

    /// Treat input as a sequence of varint length-prefixed messages
    #[arg(long)]
    delimited: bool,

    /// Skip inputs whose content was already inspected
    #[arg(long)]
    skip_duplicates: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a single file holding a serialized message
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of serialized messages to process
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Hex-encoded message given on the command line
    #[arg(long)]
    hex: Option<String>,
}

/// Output format for decoded messages
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Indented field tree
    Tree,
    /// One line per message (for scripting)
    Summary,
}

/// Tracks inspected inputs by content digest
#[derive(Default)]
struct DigestRegistry {
    /// Digests of every input seen so far
    seen: HashSet<String>,
    /// Statistics
    stats: InspectStats,
}

#[derive(Default)]
struct InspectStats {
    inputs: usize,
    duplicates_skipped: usize,
    messages_decoded: usize,
    failed: usize,
}

impl DigestRegistry {
    fn new() -> Self {
        Self::default()
    }

    /// Compute a short hash of the content (first 8 chars of blake3)
    fn content_hash(content: &[u8]) -> String {
        let hash = blake3::hash(content);
        hash.to_hex()[..8].to_string()
    }

    /// Record a digest; returns false if it was already seen
    fn record(&mut self, digest: &str) -> bool {
        self.stats.inputs += 1;
        self.seen.insert(digest.to_string())
    }

    fn print_summary(&self) {
        info!(
            "Summary: {} inputs, {} duplicates skipped, {} messages decoded, {} failed",
            self.stats.inputs,
            self.stats.duplicates_skipped,
            self.stats.messages_decoded,
            self.stats.failed
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let mut registry = DigestRegistry::new();

    // Dispatch based on input mode
    if let Some(ref file) = cli.input.file {
        process_single_file(&cli, file, &mut registry)?;
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, directory, &mut registry)?;
    } else if let Some(ref text) = cli.input.hex {
        let data = parse_hex(text)?;
        inspect(&cli, "<hex>", &data, &mut registry)?;
    } else {
        bail!("One of --file, --directory or --hex must be specified")
    }

    registry.print_summary();
    Ok(())
}

/// Decode a hex string, ignoring whitespace and an optional `0x` prefix
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    hex::decode(digits).with_context(|| format!("Invalid hex input: {}", text))
}

/// Process a single message file
fn process_single_file(cli: &Cli, file: &Path, registry: &mut DigestRegistry) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    trace!("Reading {}", file.display());
    let data = fs::read(file)
        .with_context(|| format!("Failed to read input file: {}", file.display()))?;
    inspect(cli, &file.display().to_string(), &data, registry)
}

/// Process a directory of message files recursively
fn process_directory(cli: &Cli, directory: &Path, registry: &mut DigestRegistry) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let files = collect_inputs(directory);
    for path in &files {
        debug!("Processing: {}", path.display());
        if let Err(e) = process_single_file(cli, path, registry) {
            // Log error but continue with other files
            warn!("Error processing {}: {:#}", path.display(), e);
            registry.stats.failed += 1;
        }
    }

    info!("Processed {} files", files.len());
    Ok(())
}

/// Files under `directory` worth decoding, in walk order
fn collect_inputs(directory: &Path) -> Vec<PathBuf> {
    WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            // Skip hidden files
            !path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
        })
        .filter(|path| {
            let keep = is_likely_payload(path);
            if !keep {
                trace!("Skipping non-payload: {}", path.display());
            }
            keep
        })
        .collect()
}

/// Heuristic to skip text and source files that cannot be wire data
fn is_likely_payload(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let skip_extensions = [
            "txt", "md", "json", "yaml", "yml", "xml", "html", "css", "js", "ts", "py", "rb", "go",
            "rs", "c", "h", "cpp", "hpp", "java", "proto", "toml", "ini", "cfg", "conf", "log",
            "csv", "svg", "sh", "bash",
        ];
        if skip_extensions.contains(&ext.to_lowercase().as_str()) {
            return false;
        }
    }
    true
}

/// Split a buffer of varint length-prefixed messages
fn split_delimited(data: &[u8]) -> Result<Vec<&[u8]>> {
    let mut cursor = Cursor::new(data);
    let mut messages = Vec::new();
    while !cursor.is_exhausted() {
        let offset = cursor.position();
        let message = cursor
            .read_length_delimited()
            .with_context(|| format!("Bad length prefix at offset {}", offset))?;
        messages.push(message);
    }
    Ok(messages)
}

/// Decode and print every message in one input
fn inspect(cli: &Cli, label: &str, data: &[u8], registry: &mut DigestRegistry) -> Result<()> {
    let digest = DigestRegistry::content_hash(data);
    if !registry.record(&digest) && cli.skip_duplicates {
        debug!("Skipping duplicate: {} (hash: {})", label, digest);
        registry.stats.duplicates_skipped += 1;
        return Ok(());
    }

    let messages = if cli.delimited {
        split_delimited(data)?
    } else {
        vec![data]
    };

    for (index, payload) in messages.iter().enumerate() {
        let message = decode_raw(payload, cli.max_depth)
            .with_context(|| format!("Failed to decode message {} of {}", index, label))?;
        registry.stats.messages_decoded += 1;
        println!("{}", render(cli.format, label, index, payload.len(), &digest, &message));
    }
    Ok(())
}

fn render(
    format: OutputFormat,
    label: &str,
    index: usize,
    size: usize,
    digest: &str,
    message: &RawMessage,
) -> String {
    match format {
        OutputFormat::Tree => format!("# {} [{}] ({} bytes)\n{}", label, index, size, message),
        OutputFormat::Summary => format!(
            "{}\t{}\t{} bytes\t{} fields\tdepth {}\t{}",
            label,
            index,
            size,
            message.total_fields(),
            message.depth(),
            digest
        ),
    }
}
