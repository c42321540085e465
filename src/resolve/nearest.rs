//! Nearest-reference-point administrative resolution.

use tracing::warn;

use super::{check_coordinates, PointResolver, ResolutionStatus};
use crate::gazetteer::Gazetteer;
use crate::survey::SurveyPoint;

/// Resolves a point to the county/district of the nearest gazetteer
/// reference point.
///
/// This is a proximity approximation, not boundary containment. Lookup
/// failures never escape this resolver: they are logged and degrade to
/// a null result so the batch continues.
pub struct NearestLabelResolver {
    gazetteer: Gazetteer,
}

impl NearestLabelResolver {
    pub fn new(gazetteer: Gazetteer) -> Self {
        Self { gazetteer }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }
}

impl PointResolver for NearestLabelResolver {
    fn columns(&self) -> &'static [&'static str] {
        &["county", "district"]
    }

    fn resolve(&self, point: &SurveyPoint) -> ResolutionStatus {
        if let Err(reason) = check_coordinates(point) {
            warn!(
                "Error processing point ({}, {}): {}",
                point.lat, point.lon, reason
            );
            return ResolutionStatus::Failed(reason);
        }

        match self.gazetteer.nearest(point.lon, point.lat) {
            Some(labels) => ResolutionStatus::Resolved(vec![
                labels.county.clone(),
                labels.district.clone(),
            ]),
            None => ResolutionStatus::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const REFERENCES: &str = "\
lat,lon,name,admin1,admin2,cc
48.85341,2.3488,Paris,Ile-de-France,Paris,FR
51.50853,-0.12574,London,England,Greater London,GB
";

    fn resolver(data: &str) -> NearestLabelResolver {
        let gazetteer =
            Gazetteer::read_from(data.as_bytes(), &PathBuf::from("refs.csv")).unwrap();
        NearestLabelResolver::new(gazetteer)
    }

    fn point(lat: f64, lon: f64) -> SurveyPoint {
        SurveyPoint {
            id: "1".to_string(),
            lat,
            lon,
        }
    }

    #[test]
    fn test_nearest_labels_resolve() {
        let r = resolver(REFERENCES);
        assert_eq!(
            r.resolve(&point(48.85, 2.35)),
            ResolutionStatus::Resolved(vec!["Ile-de-France".to_string(), "Paris".to_string()])
        );
    }

    #[test]
    fn test_malformed_coordinates_degrade_to_failed() {
        let r = resolver(REFERENCES);
        assert!(matches!(
            r.resolve(&point(f64::NAN, 2.35)),
            ResolutionStatus::Failed(_)
        ));
    }

    #[test]
    fn test_empty_gazetteer_is_unresolved() {
        let r = resolver("lat,lon,name,admin1,admin2\n");
        assert_eq!(
            r.resolve(&point(48.85, 2.35)),
            ResolutionStatus::Unresolved
        );
    }
}
