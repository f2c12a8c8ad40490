//! Chronostore CLI
//!
//! Loads tagged measurements from CSV into the in-memory store and prints
//! per-tag daily summaries.

use anyhow::Context;
use chronostore::config::{generate_default_config, Config};
use chronostore::import::CsvImporter;
use chronostore::storage::*;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chronostore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Embeddable time-series store: import tagged readings and roll them up by day")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV of `timestamp,tag,v1..vD` rows and print daily summaries
    Summarize {
        /// Path to CSV file
        path: PathBuf,
        /// Vector components per row (default from config)
        #[arg(short, long)]
        dimension: Option<usize>,
        /// Aggregation function (avg, sum, min, max, last, count)
        #[arg(short, long, default_value = "avg")]
        aggregation: String,
        /// Vector component to summarise
        #[arg(long, default_value = "0")]
        component: usize,
        /// CSV has no header row
        #[arg(long)]
        no_header: bool,
    },

    /// Print a default config file
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_logging(&config);

    match cli.command {
        Commands::Summarize {
            path,
            dimension,
            aggregation,
            component,
            no_header,
        } => {
            let aggregation: AggregationType =
                aggregation.parse().map_err(anyhow::Error::msg)?;
            let dimension = dimension.unwrap_or(config.storage.dimension);
            summarize(&config, &path, dimension, aggregation, component, !no_header)
        }
        Commands::Config => {
            print!("{}", generate_default_config());
            Ok(())
        }
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("chronostore={}", config.logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn summarize(
    config: &Config,
    path: &Path,
    dimension: usize,
    aggregation: AggregationType,
    component: usize,
    has_header: bool,
) -> anyhow::Result<()> {
    let table = Arc::new(LookupTable::<String>::with_capacity(
        config.storage.lookup_capacity,
    ));
    let mut readings =
        TaggedTemporalData::with_capacity(&table, dimension, config.storage.series_capacity);

    let result = CsvImporter::new()
        .with_header(has_header)
        .import_file(path, &mut readings)
        .with_context(|| format!("importing {:?}", path))?;

    tracing::info!(
        "Imported {} of {} rows ({} failed)",
        result.rows_imported,
        result.rows_processed,
        result.rows_failed
    );
    for error in result.errors.iter().take(10) {
        tracing::warn!("{}", error);
    }

    let offset = config.storage.bucket_offset()?;

    for tag in readings.tags_present()? {
        let mut days: DailyBucketStore<Vec<f64>> = DailyBucketStore::new().with_offset(offset);
        let records = readings.records_for(tag.as_str())?;
        days.aggregate(records.into_iter().map(|(m, row)| (m, row.to_vec())));

        println!("{}", tag);
        for (date, value) in days.summarize_component(component, aggregation) {
            println!("  {}  {}={:.3}", date, aggregation, value);
        }
    }

    Ok(())
}
