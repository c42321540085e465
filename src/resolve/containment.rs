//! Polygon-membership resolution.

use geo::{Contains, Point};

use super::{check_coordinates, PointResolver, ResolutionStatus};
use crate::bioregion::BioregionIndex;
use crate::survey::SurveyPoint;

/// Resolves a point to the label of the bioregion containing it.
///
/// Candidates come from the spatial index in catalog insertion order and
/// the first one passing the exact containment test wins. When
/// overlapping regions both contain the point this first-match rule is
/// the documented tie-break, not an error.
pub struct ContainmentResolver {
    index: BioregionIndex,
}

impl ContainmentResolver {
    pub fn new(index: BioregionIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &BioregionIndex {
        &self.index
    }
}

impl PointResolver for ContainmentResolver {
    fn columns(&self) -> &'static [&'static str] {
        &["polygon_id"]
    }

    fn resolve(&self, point: &SurveyPoint) -> ResolutionStatus {
        if let Err(reason) = check_coordinates(point) {
            return ResolutionStatus::Failed(reason);
        }

        let query = Point::new(point.lon, point.lat);
        for region in self.index.candidates(point.lon, point.lat) {
            if region.geometry.contains(&query) {
                return ResolutionStatus::Resolved(vec![region.label.clone()]);
            }
        }

        // Outside all known regions.
        ResolutionStatus::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bioregion::Bioregion;
    use geo::{polygon, MultiPolygon};

    fn region(label: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bioregion {
        Bioregion {
            label: label.to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: min_x, y: min_y),
                (x: max_x, y: min_y),
                (x: max_x, y: max_y),
                (x: min_x, y: max_y),
            ]]),
        }
    }

    fn point(id: &str, lat: f64, lon: f64) -> SurveyPoint {
        SurveyPoint {
            id: id.to_string(),
            lat,
            lon,
        }
    }

    fn resolver(regions: Vec<Bioregion>) -> ContainmentResolver {
        ContainmentResolver::new(BioregionIndex::build(regions))
    }

    #[test]
    fn test_paris_point_resolves() {
        let r = resolver(vec![region("Western-Europe", -5.0, 42.0, 9.0, 52.0)]);
        assert_eq!(
            r.resolve(&point("1", 48.85, 2.35)),
            ResolutionStatus::Resolved(vec!["Western-Europe".to_string()])
        );
    }

    #[test]
    fn test_mid_ocean_point_is_unresolved() {
        let r = resolver(vec![region("Western-Europe", -5.0, 42.0, 9.0, 52.0)]);
        assert_eq!(
            r.resolve(&point("2", 0.0, 0.0)),
            ResolutionStatus::Unresolved
        );
    }

    #[test]
    fn test_overlap_tie_break_takes_first_region() {
        let r = resolver(vec![
            region("R1", 0.0, 0.0, 10.0, 10.0),
            region("R2", 2.0, 2.0, 12.0, 12.0),
        ]);
        assert_eq!(
            r.resolve(&point("1", 5.0, 5.0)),
            ResolutionStatus::Resolved(vec!["R1".to_string()])
        );
    }

    #[test]
    fn test_bbox_hit_outside_geometry_is_unresolved() {
        // Triangle whose bbox covers the query point but whose geometry
        // does not.
        let triangle = Bioregion {
            label: "tri".to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 0.0, y: 10.0),
            ]]),
        };
        let r = resolver(vec![triangle]);
        assert_eq!(
            r.resolve(&point("1", 9.0, 9.0)),
            ResolutionStatus::Unresolved
        );
    }

    #[test]
    fn test_malformed_coordinates_fail() {
        let r = resolver(vec![region("R1", 0.0, 0.0, 10.0, 10.0)]);
        assert!(matches!(
            r.resolve(&point("1", 999.0, 0.0)),
            ResolutionStatus::Failed(_)
        ));
    }

    #[test]
    fn test_label_stability_for_identical_coordinates() {
        let r = resolver(vec![
            region("R1", 0.0, 0.0, 10.0, 10.0),
            region("R2", 0.0, 0.0, 10.0, 10.0),
        ]);
        let a = r.resolve(&point("a", 5.0, 5.0));
        let b = r.resolve(&point("b", 5.0, 5.0));
        assert_eq!(a, b);
        assert_eq!(a, ResolutionStatus::Resolved(vec!["R1".to_string()]));
    }
}
