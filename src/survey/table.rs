//! In-memory survey table kept as raw CSV records.

use csv::StringRecord;

/// Minimal point extracted from a survey row.
///
/// `id` is the raw cell text of the survey identifier column, so integer
/// and string keys round-trip unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

/// A deduplicated survey table.
///
/// Rows keep their original cell text and column order; enrichment only
/// ever appends columns. `points` is aligned 1:1 with `rows`, so row `i`
/// belongs to `points[i].id`.
#[derive(Debug)]
pub struct SurveyTable {
    pub(crate) headers: StringRecord,
    pub(crate) rows: Vec<StringRecord>,
    pub(crate) points: Vec<SurveyPoint>,
}

impl SurveyTable {
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Number of rows (= number of unique survey ids).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Unique points to resolve, in original row order.
    pub fn points(&self) -> &[SurveyPoint] {
        &self.points
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }
}
