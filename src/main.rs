//! CLI entrypoint for `pwreconcile`.
//!
//! Validates the two input tables, reconciles them either interactively or
//! with a fixed disposition, prints a summary and writes the merged table
//! when it is non-empty.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{LevelFilter, error};
use pwreconcile::{
    engine::Engine,
    export::{Outcome, save_records},
    io::{DEFAULT_MMAP_THRESHOLD_BYTES, check_source},
    prompt::ConsoleResolver,
    reconcile::{Disposition, FixedResolver, Reconciliation, Resolver},
    record::KeyEncoding,
    report::render_summary,
};

#[derive(Parser, Debug)]
#[command(
    name = "pwreconcile",
    version,
    about = "Reconcile two password manager CSV exports"
)]
struct Args {
    /// CSV export being imported
    importing: PathBuf,

    /// Master CSV export
    master: PathBuf,

    /// Destination for the merged CSV
    output: PathBuf,

    /// Resolve every conflict the same way instead of prompting
    #[arg(long = "resolve", value_enum)]
    resolve: Option<ResolveChoice>,

    /// How identity fields are combined into a key
    #[arg(long = "key-encoding", value_enum, default_value_t = KeyEncodingChoice::Joined)]
    key_encoding: KeyEncodingChoice,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress progress and summary output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolveChoice {
    Importing,
    Master,
    Both,
    Skip,
}

impl From<ResolveChoice> for Disposition {
    fn from(c: ResolveChoice) -> Self {
        match c {
            ResolveChoice::Importing => Disposition::KeepImporting,
            ResolveChoice::Master => Disposition::KeepMaster,
            ResolveChoice::Both => Disposition::KeepBoth,
            ResolveChoice::Skip => Disposition::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeyEncodingChoice {
    Joined,
    LengthPrefixed,
}

impl From<KeyEncodingChoice> for KeyEncoding {
    fn from(c: KeyEncodingChoice) -> Self {
        match c {
            KeyEncodingChoice::Joined => KeyEncoding::Joined,
            KeyEncodingChoice::LengthPrefixed => KeyEncoding::LengthPrefixed,
        }
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    check_source(&args.importing)?;
    check_source(&args.master)?;
    Ok(())
}

fn resolve(engine: &Engine, choice: Option<ResolveChoice>) -> Result<Reconciliation> {
    let mut resolver: Box<dyn Resolver> = match choice {
        Some(c) => Box::new(FixedResolver(c.into())),
        None => Box::new(ConsoleResolver::stdio()),
    };
    engine.reconcile(resolver.as_mut())
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    // Configure color policy
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        error!("{}", e);
        std::process::exit(2);
    }

    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };
    let mut engine = Engine::with_encoding(args.key_encoding.into());
    if !args.quiet {
        for path in [&args.importing, &args.master] {
            println!("Reading {}...", path.display());
        }
    }
    if let Err(e) =
        engine.load_from_file_paths_with_threshold(&args.importing, &args.master, threshold)
    {
        error!("failed to load inputs: {:#}", e);
        std::process::exit(3);
    }

    let result = match resolve(&engine, args.resolve) {
        Ok(r) => r,
        Err(e) => {
            error!("{:#}; nothing was written", e);
            std::process::exit(4);
        }
    };

    if !args.quiet {
        println!("{}", render_summary(&engine.statistics(&result)));
    }

    match save_records(&result.records, &args.output) {
        Ok(Outcome::Written { path, records }) => {
            if !args.quiet {
                println!(
                    "\nReconciliation complete! Output written to {}",
                    path.display()
                );
                println!("Total records in output: {}", records);
            }
        }
        Ok(Outcome::NothingToWrite) => {
            println!("\nNo records to write to output file.");
        }
        Err(e) => {
            error!("failed to write {}: {:#}", args.output.display(), e);
            std::process::exit(5);
        }
    }
}
