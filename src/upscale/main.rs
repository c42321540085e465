//! Administrative upscaling pipeline.
//!
//! Reverse-looks-up every survey point against a reference-point
//! gazetteer and appends the nearest point's `county` and `district`
//! labels.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use larkspur::dispatch::Dispatcher;
use larkspur::gazetteer::Gazetteer;
use larkspur::merge::merge;
use larkspur::output::write_table;
use larkspur::resolve::{NearestLabelResolver, PointResolver};
use larkspur::survey::load_survey_table;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "upscale")]
#[command(about = "Add county/district labels to survey GPS points by reverse lookup")]
struct Args {
    /// Reference-point gazetteer CSV (plain or .gz)
    #[arg(short, long)]
    gazetteer: PathBuf,

    /// Input survey CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,

    /// Survey identifier column
    #[arg(long, default_value = "surveyId")]
    id_column: String,

    /// Worker threads (0 = all cores)
    #[arg(short, long, default_value = "0")]
    jobs: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Processing started");
    info!("Gazetteer: {}", args.gazetteer.display());
    info!("Input: {}", args.input.display());
    let start = Instant::now();

    let gazetteer = Gazetteer::load(&args.gazetteer).context("loading gazetteer")?;
    let resolver = NearestLabelResolver::new(gazetteer);
    info!(
        "Nearest-label resolver ready with {} reference points",
        resolver.gazetteer().len()
    );

    let table =
        load_survey_table(&args.input, &args.id_column).context("loading survey table")?;

    let dispatcher = Dispatcher::new(args.jobs).context("building worker pool")?;
    let resolutions = dispatcher.resolve_all(table.points(), &resolver);

    let table = merge(table, resolver.columns(), &resolutions).context("merging resolutions")?;
    write_table(&table, &args.output).context("writing output table")?;

    info!(
        "Processing completed in {:.2} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
