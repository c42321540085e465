//! Bioregion enrichment pipeline.
//!
//! Resolves every survey point against a labelled polygon collection
//! and appends the containing region's label as `polygon_id`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use larkspur::bioregion::{load_bioregions, BioregionIndex};
use larkspur::dispatch::Dispatcher;
use larkspur::merge::merge;
use larkspur::output::write_table;
use larkspur::resolve::{ContainmentResolver, PointResolver};
use larkspur::survey::load_survey_table;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "enrich")]
#[command(about = "Assign bioregion labels to survey GPS points")]
struct Args {
    /// GeoJSON polygon collection (WGS84)
    #[arg(short, long)]
    polygons: PathBuf,

    /// Input survey CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,

    /// Feature property holding the region label
    #[arg(long, default_value = "short_name")]
    label_field: String,

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

    info!("Bioregion extraction started");
    info!("Polygons: {}", args.polygons.display());
    info!("Input: {}", args.input.display());
    let start = Instant::now();

    let regions = load_bioregions(&args.polygons, &args.label_field)
        .context("loading region catalog")?;
    let index = BioregionIndex::build(regions);
    let resolver = ContainmentResolver::new(index);
    info!(
        "Containment resolver ready with {} regions",
        resolver.index().len()
    );

    let table =
        load_survey_table(&args.input, &args.id_column).context("loading survey table")?;

    let dispatcher = Dispatcher::new(args.jobs).context("building worker pool")?;
    let resolutions = dispatcher.resolve_all(table.points(), &resolver);

    let table = merge(table, resolver.columns(), &resolutions).context("merging resolutions")?;
    write_table(&table, &args.output).context("writing output table")?;

    info!("Elapsed time: {:.2} seconds", start.elapsed().as_secs_f64());
    info!("Done!");
    Ok(())
}
