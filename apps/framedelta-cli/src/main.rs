mod synth;

use anyhow::Context;
use clap::{Parser, Subcommand};
use framedelta_kernel::{IterSource, SnapshotSource, Timeline};
use framedelta_persist::{JsonLinesSource, OutputConfig, OutputStore, SizeReport, write_step};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use synth::{SynthConfig, SynthMatch};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "framedelta", about = "Delta-encode recorded match snapshots")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Explicit tracing filter (overrides --verbose), e.g. "framedelta_kernel=trace"
    #[arg(long)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON-lines snapshot stream and write JSON + compact output
    Encode {
        /// Input file, one JSON array of observations per line
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
        /// Compress the compact encoding with zstd
        #[arg(long)]
        compress: bool,
        /// zstd compression level
        #[arg(long, default_value = "3")]
        level: i32,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Compare naive full-snapshot recording against delta encoding
    Compare {
        /// Input file, one JSON array of observations per line
        #[arg(short, long)]
        input: PathBuf,
        /// zstd compression level
        #[arg(long, default_value = "3")]
        level: i32,
    },
    /// Generate a deterministic synthetic match as JSON lines
    Synth {
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Number of steps
        #[arg(short = 'n', long, default_value = "1000")]
        steps: usize,
        /// Number of players
        #[arg(short, long, default_value = "10")]
        players: usize,
    },
    /// Verify an output directory and print its summary
    Inspect {
        /// Output directory written by `encode`
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_filter {
        Some(filter) => EnvFilter::try_new(filter).context("invalid --log-filter")?,
        None if cli.verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Encode {
            input,
            out,
            compress,
            level,
            pretty,
        } => {
            let source = JsonLinesSource::open(&input)
                .with_context(|| format!("opening {}", input.display()))?;
            let start = Instant::now();
            let encoded = Timeline::run(source)
                .with_context(|| format!("encoding {}", input.display()))?;
            let elapsed = start.elapsed();
            encoded.validate().context("encoded match failed validation")?;

            let config = OutputConfig {
                compress,
                zstd_level: level,
                pretty_json: pretty,
            };
            let store = OutputStore::write(&out, &encoded, &config)
                .with_context(|| format!("writing {}", out.display()))?;

            println!("{}", encoded.stats());
            println!("Encoded in {elapsed:?}");
            for artifact in &store.manifest().artifacts {
                println!("  {:<16} {:>12} bytes", artifact.filename, artifact.bytes);
            }
        }
        Commands::Compare { input, level } => {
            let mut source = JsonLinesSource::open(&input)
                .with_context(|| format!("opening {}", input.display()))?;
            let mut steps = Vec::new();
            while let Some(step) = source
                .next_step()
                .with_context(|| format!("reading {}", input.display()))?
            {
                steps.push(step);
            }

            let start = Instant::now();
            let encoded = Timeline::run(IterSource::from_steps(steps.clone()))?;
            let delta_elapsed = start.elapsed();

            let start = Instant::now();
            let report = SizeReport::measure(&steps, &encoded, level)?;
            let measure_elapsed = start.elapsed();
            tracing::debug!(naive_bytes = report.naive_json, "size report built");

            println!("{}", encoded.stats());
            println!("{report}");
            println!("delta encoding {delta_elapsed:?}, serializing all forms {measure_elapsed:?}");
        }
        Commands::Synth {
            out,
            seed,
            steps,
            players,
        } => {
            let config = SynthConfig {
                seed,
                steps,
                players,
                ..SynthConfig::default()
            };
            let file = std::fs::File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            let mut writer = BufWriter::new(file);
            for step in SynthMatch::new(config) {
                write_step(&mut writer, &step)?;
            }
            writer.flush()?;
            println!("Synthetic match: seed={seed}, steps={steps}, players={players} -> {}", out.display());
        }
        Commands::Inspect { dir } => {
            let store =
                OutputStore::open(&dir).with_context(|| format!("opening {}", dir.display()))?;
            store.verify_integrity().context("integrity check failed")?;
            let encoded = store.load()?;

            let manifest = store.manifest();
            println!(
                "Manifest: schema=v{} steps={} players={} equipment_kinds={}",
                manifest.schema_version, manifest.steps, manifest.players, manifest.equipment_kinds
            );
            println!("{}", encoded.stats());
            for record in encoded.players.records() {
                println!("  {:>4}  {:<20}  {}", record.id.0, record.stable_key.0, record.name);
            }
            for record in encoded.equipment.records() {
                println!("  {:>4}  {}", record.id.0, record.name);
            }
            println!("Integrity: OK");
        }
    }

    Ok(())
}
