use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};

use voxatlas_core::{
    BenchmarkCollector, CharacteristicsCollector, Collector, CollectorConfig, DatabaseConfig,
    DatasetCollector, Loader, ModelCollector, PaperCollector, Storage,
};

#[derive(Parser)]
#[command(
    name = "vxa",
    about = "Speech system metadata collection and cataloging",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store schema (engine and credentials come from the
    /// environment)
    Init,
    /// Run collectors and write interchange files
    Collect {
        /// Which source to collect
        #[arg(value_enum)]
        source: Source,
        /// Directory for the data/summary file pairs
        #[arg(short, long, default_value = "data")]
        out: PathBuf,
        /// Listing page size per source
        #[arg(long)]
        limit: Option<usize>,
        /// Description file (`Name | description` lines) for the
        /// characteristics source
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Load interchange files from a directory into the store
    Load {
        #[arg(default_value = "data")]
        dir: PathBuf,
    },
    /// Show row counts per table
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Models,
    Datasets,
    Papers,
    Benchmarks,
    Characteristics,
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => run_init().await,
        Commands::Collect {
            source,
            out,
            limit,
            input,
        } => run_collect(source, &out, limit, input.as_deref()).await,
        Commands::Load { dir } => run_load(&dir).await,
        Commands::Status => run_status().await,
    }
}

async fn run_init() -> Result<()> {
    let config = DatabaseConfig::from_env();
    Storage::open(&config).await?;
    println!("store initialized ({})", config.engine);
    Ok(())
}

async fn run_collect(
    source: Source,
    out: &std::path::Path,
    limit: Option<usize>,
    input: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = CollectorConfig::default();
    if let Some(limit) = limit {
        config = config.with_page_limit(limit);
    }

    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();

    if matches!(source, Source::Models | Source::All) {
        collectors.push(Box::new(ModelCollector::new(&config)?));
    }
    if matches!(source, Source::Datasets | Source::All) {
        collectors.push(Box::new(DatasetCollector::new(&config)?));
    }
    if matches!(source, Source::Papers | Source::All) {
        // The paper search endpoint asks for a gentler cadence.
        let config = config.clone().with_delay_ms(2000);
        collectors.push(Box::new(PaperCollector::new(&config)?));
    }
    if matches!(source, Source::Benchmarks | Source::All) {
        collectors.push(Box::new(BenchmarkCollector::new(&config)?));
    }
    if matches!(source, Source::Characteristics | Source::All) {
        match input {
            Some(input) => collectors.push(Box::new(CharacteristicsCollector::new(input))),
            None if source == Source::Characteristics => {
                bail!("the characteristics source needs --input <descriptions file>")
            }
            None => {}
        }
    }

    for collector in collectors {
        let output = collector.collect(out).await?;
        println!(
            "{}: {} records -> {}",
            collector.name(),
            output.record_count,
            output.paths.data.display()
        );
    }

    Ok(())
}

async fn run_load(dir: &std::path::Path) -> Result<()> {
    let storage = Storage::open(&DatabaseConfig::from_env()).await?;
    let mut loader = Loader::new(&storage);

    let stats = loader.load_directory(dir).await?;
    println!("loaded {} records ({} skipped)", stats.loaded, stats.skipped);
    Ok(())
}

async fn run_status() -> Result<()> {
    let storage = Storage::open(&DatabaseConfig::from_env()).await?;

    for (table, count) in storage.table_counts().await? {
        println!("{table:<28} {count}");
    }
    Ok(())
}
