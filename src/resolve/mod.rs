//! Point resolution contract shared by both enrichment strategies.

mod containment;
mod nearest;

use std::collections::HashMap;

pub use containment::ContainmentResolver;
pub use nearest::NearestLabelResolver;

use crate::survey::SurveyPoint;

/// Outcome of resolving one point.
///
/// `Unresolved` is not an error: the point legitimately falls outside
/// every known region. `Failed` records a lookup that could not be
/// performed; both surface as null cells in the output, but tests and
/// diagnostics can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionStatus {
    /// One value per resolver output column.
    Resolved(Vec<String>),
    Unresolved,
    Failed(String),
}

/// Resolutions keyed by survey id. Exactly one entry per unique point,
/// so completion order never affects the output.
pub type ResolutionMap = HashMap<String, ResolutionStatus>;

/// A strategy mapping one point to attribute values.
///
/// Implementations are shared read-only across the worker pool and must
/// never let a per-point failure escape `resolve`.
pub trait PointResolver: Sync {
    /// Names of the columns this resolver appends, in output order.
    fn columns(&self) -> &'static [&'static str];

    /// Resolve a single point. `Resolved` values match `columns()` in
    /// arity and order.
    fn resolve(&self, point: &SurveyPoint) -> ResolutionStatus;
}

/// Reject coordinates no lookup can answer for.
fn check_coordinates(point: &SurveyPoint) -> Result<(), String> {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(format!(
            "non-finite coordinates ({}, {})",
            point.lat, point.lon
        ));
    }
    if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
        return Err(format!(
            "coordinates ({}, {}) outside WGS84 bounds",
            point.lat, point.lon
        ));
    }
    Ok(())
}
