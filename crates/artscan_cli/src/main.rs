use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use artscan_core::{AddError, AddOutcome, ArtifactStore, RawArtifact, ReferenceTables, Slot};
use artscan_render::ExportFormat;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding the reference tables.
    #[arg(long, value_name = "DIR", default_value = "data")]
    data: PathBuf,
    /// Durable record store; omit for a memory-only run.
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate raw recognizer output and add the plausible records.
    Ingest {
        /// JSON array of raw-field records.
        #[arg(value_name = "SCANS.JSON")]
        scans: PathBuf,
        /// Abort on the first rejected record instead of skipping it.
        #[arg(long)]
        strict: bool,
    },
    /// Re-export the accepted set in one of the supported schemas.
    Export {
        #[arg(long, value_enum)]
        format: FormatArg,
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Print per-rarity and per-slot counts of the accepted set.
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Canonical,
    Good,
    GenshinArt,
    MingyuLab,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Canonical => Self::Canonical,
            FormatArg::Good => Self::Good,
            FormatArg::GenshinArt => Self::GenshinArt,
            FormatArg::MingyuLab => Self::MingyuLab,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(message) = run(&cli) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let tables = ReferenceTables::load_from_dir(&cli.data).map_err(|e| e.to_string())?;

    let mut store = match cli.db.as_ref() {
        Some(path) => ArtifactStore::open(path, &tables).map_err(|e| e.to_string())?,
        None => ArtifactStore::in_memory(),
    };

    match &cli.command {
        Command::Ingest { scans, strict } => ingest(&mut store, &tables, scans, *strict),
        Command::Export { format, output } => {
            artscan_render::write_export(store.records(), (*format).into(), output)
                .map_err(|e| e.to_string())?;
            println!("wrote {} records to {}", store.len(), output.display());
            Ok(())
        }
        Command::Stats => {
            print_stats(&store);
            Ok(())
        }
    }
}

fn ingest(
    store: &mut ArtifactStore,
    tables: &ReferenceTables,
    scans: &PathBuf,
    strict: bool,
) -> Result<(), String> {
    let bytes = fs::read(scans).map_err(|e| format!("failed to read {}: {e}", scans.display()))?;
    let raws: Vec<RawArtifact> = serde_json::from_slice(&bytes)
        .map_err(|e| format!("failed to parse {}: {e}", scans.display()))?;

    let mut accepted = 0usize;
    let mut duplicates = 0usize;
    let mut rejected = 0usize;
    for (index, raw) in raws.iter().enumerate() {
        match store.add(raw, None, tables) {
            Ok(AddOutcome::Accepted) => accepted += 1,
            Ok(AddOutcome::Duplicate) => duplicates += 1,
            Err(AddError::Construction(e)) => {
                rejected += 1;
                warn!(record = index, name = %raw.name, error = %e, "rejected scan");
                if strict {
                    return Err(format!("record {index} ({}): {e}", raw.name));
                }
            }
            // A store write failure leaves memory and disk consistent
            // but there is no point continuing the run.
            Err(AddError::Store(e)) => return Err(e.to_string()),
        }
    }

    println!(
        "{accepted} accepted, {duplicates} duplicate, {rejected} rejected ({} total in store)",
        store.len()
    );
    Ok(())
}

fn print_stats(store: &ArtifactStore) {
    let mut by_rarity = [0usize; 5];
    let mut by_slot = [0usize; 5];
    for record in store.records() {
        by_rarity[record.rarity() as usize - 1] += 1;
        by_slot[record.slot().index()] += 1;
    }

    println!("records: {}", store.len());
    for (index, count) in by_rarity.iter().enumerate().rev() {
        if *count > 0 {
            println!("  {} star: {count}", index + 1);
        }
    }
    for slot in Slot::ALL {
        let count = by_slot[slot.index()];
        if count > 0 {
            println!("  {}: {count}", slot.display_name());
        }
    }
}
