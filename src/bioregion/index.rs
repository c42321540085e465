//! R-tree spatial index over bioregion bounding boxes.

use std::sync::Arc;

use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use super::Bioregion;

/// Wrapper for R-tree indexing of bioregions.
///
/// `rank` records the region's position in catalog insertion order;
/// candidate enumeration is sorted by it so the first-match tie-break on
/// overlapping regions is deterministic.
#[derive(Clone)]
struct IndexedRegion {
    region: Arc<Bioregion>,
    rank: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    fn new(region: Bioregion, rank: usize) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = region.bbox()?;
        Some(Self {
            region: Arc::new(region),
            rank,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Read-only spatial index over a bioregion catalog.
///
/// Built once per run and never mutated; a changed catalog means a full
/// rebuild.
pub struct BioregionIndex {
    tree: RTree<IndexedRegion>,
}

impl BioregionIndex {
    /// Build the index from a region catalog.
    ///
    /// Regions with an empty geometry (no bounding box) are dropped.
    pub fn build(regions: Vec<Bioregion>) -> Self {
        info!("Building spatial index for {} regions...", regions.len());

        let indexed: Vec<IndexedRegion> = regions
            .into_iter()
            .enumerate()
            .filter_map(|(rank, region)| IndexedRegion::new(region, rank))
            .collect();

        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// Regions whose bounding boxes contain the query position, in
    /// catalog insertion order.
    pub fn candidates(&self, lon: f64, lat: f64) -> Vec<Arc<Bioregion>> {
        let query_envelope = AABB::from_point([lon, lat]);

        let mut hits: Vec<&IndexedRegion> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .collect();
        hits.sort_by_key(|ir| ir.rank);

        hits.into_iter().map(|ir| Arc::clone(&ir.region)).collect()
    }

    /// Get total number of indexed regions
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(label: &str, min: f64, max: f64) -> Bioregion {
        Bioregion {
            label: label.to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: min, y: min),
                (x: max, y: min),
                (x: max, y: max),
                (x: min, y: max),
            ]]),
        }
    }

    #[test]
    fn test_candidates_in_insertion_order() {
        // Both squares cover (1, 1); enumeration must follow catalog order.
        let index = BioregionIndex::build(vec![
            square("first", 0.0, 4.0),
            square("second", -2.0, 2.0),
            square("elsewhere", 10.0, 12.0),
        ]);

        let candidates = index.candidates(1.0, 1.0);
        let labels: Vec<&str> = candidates.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
    }

    #[test]
    fn test_miss_returns_no_candidates() {
        let index = BioregionIndex::build(vec![square("only", 0.0, 1.0)]);
        assert!(index.candidates(50.0, 50.0).is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_empty_catalog() {
        let index = BioregionIndex::build(vec![]);
        assert!(index.is_empty());
        assert!(index.candidates(0.0, 0.0).is_empty());
    }
}
