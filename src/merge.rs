//! Keyed left-join of resolutions onto the survey table.

use tracing::info;

use crate::error::{EnrichError, Result};
use crate::resolve::{ResolutionMap, ResolutionStatus};
use crate::survey::SurveyTable;

/// Append the resolver's columns to the table, joining by survey id.
///
/// Every input row appears exactly once in the result, in its original
/// position. `Unresolved` and `Failed` points get empty (null) cells
/// rather than dropped rows. Successive passes compose: existing columns
/// are never touched, and a name collision with one of `columns` aborts.
pub fn merge(
    table: SurveyTable,
    columns: &[&'static str],
    resolutions: &ResolutionMap,
) -> Result<SurveyTable> {
    for column in columns {
        if table.headers.iter().any(|h| h == *column) {
            return Err(EnrichError::InputFormat(format!(
                "output column '{column}' already present in the table"
            )));
        }
    }

    let mut headers = table.headers.clone();
    for column in columns {
        headers.push_field(column);
    }

    let nulls = vec![String::new(); columns.len()];
    let mut rows = Vec::with_capacity(table.rows.len());

    for (mut row, point) in table.rows.into_iter().zip(&table.points) {
        let values = match resolutions.get(&point.id) {
            Some(ResolutionStatus::Resolved(values)) => values,
            // Unresolved, failed or absent: null cells, never a dropped row.
            _ => &nulls,
        };

        for value in values {
            row.push_field(value);
        }
        rows.push(row);
    }

    info!(
        "Merged {} columns onto {} rows",
        columns.len(),
        rows.len()
    );

    Ok(SurveyTable {
        headers,
        rows,
        points: table.points,
    })
}
