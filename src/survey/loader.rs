//! Survey CSV loader with dedup by survey id.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hashbrown::HashSet;
use tracing::info;

use crate::error::{EnrichError, Result};
use crate::survey::{SurveyPoint, SurveyTable};

/// Columns that must parse as integers when present.
const INTEGER_COLUMNS: &[&str] = &["speciesId"];

/// Load a survey table from CSV.
///
/// Requires `lat`, `lon` and `id_column` headers. Duplicate survey ids
/// are dropped, keeping the first occurrence in file order. Any
/// mistyped required or integer-typed cell aborts the load.
pub fn load_survey_table(path: &Path, id_column: &str) -> Result<SurveyTable> {
    info!("Loading survey table from {}", path.display());

    let file = File::open(path).map_err(|source| EnrichError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let table = read_survey_table(file, path, id_column)?;

    info!(
        "Loaded {} unique surveys from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

fn read_survey_table<R: Read>(reader: R, path: &Path, id_column: &str) -> Result<SurveyTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let csv_err = |source| EnrichError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = csv_reader.headers().map_err(csv_err)?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EnrichError::InputFormat(format!("required column '{name}' not found")))
    };

    let id_idx = column(id_column)?;
    let lat_idx = column("lat")?;
    let lon_idx = column("lon")?;

    // Integer-typed columns are optional but must parse when present.
    let int_columns: Vec<(usize, &str)> = INTEGER_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name).map(|i| (i, *name)))
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    let mut points = Vec::new();
    let mut total = 0usize;

    for (row_no, result) in csv_reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        total += 1;

        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let id = cell(id_idx).to_string();
        if !seen.insert(id.clone()) {
            // First occurrence wins.
            continue;
        }

        let parse_f64 = |idx: usize, name: &str| {
            cell(idx).parse::<f64>().map_err(|_| {
                EnrichError::InputFormat(format!(
                    "column '{name}' row {}: expected float, got '{}'",
                    row_no + 1,
                    cell(idx)
                ))
            })
        };

        let lat = parse_f64(lat_idx, "lat")?;
        let lon = parse_f64(lon_idx, "lon")?;

        for &(idx, name) in &int_columns {
            cell(idx).parse::<i64>().map_err(|_| {
                EnrichError::InputFormat(format!(
                    "column '{name}' row {}: expected integer, got '{}'",
                    row_no + 1,
                    cell(idx)
                ))
            })?;
        }

        points.push(SurveyPoint { id, lat, lon });
        rows.push(record);
    }

    info!(
        "{} rows read, {} duplicate survey ids dropped",
        total,
        total - rows.len()
    );

    Ok(SurveyTable {
        headers,
        rows,
        points,
    })
}
