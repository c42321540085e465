//! Bioregion catalog and spatial index.
//!
//! Loads the labelled polygon collection once per run and builds an
//! R-tree over it for fast candidate retrieval. Both structures are
//! immutable after construction and shared read-only across workers.

mod catalog;
mod index;

pub use catalog::{load_bioregions, Bioregion};
pub use index::BioregionIndex;
