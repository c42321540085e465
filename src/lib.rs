//! Larkspur - spatial enrichment for biodiversity survey tables.
//!
//! This library provides the shared pipeline for the enrich and upscale
//! binaries: load a survey CSV, resolve every unique GPS point against a
//! region catalog or gazetteer in parallel, and join the results back
//! onto the table.

pub mod bioregion;
pub mod dispatch;
pub mod error;
pub mod gazetteer;
pub mod merge;
pub mod output;
pub mod resolve;
pub mod survey;

pub use error::{EnrichError, Result};
pub use resolve::{PointResolver, ResolutionMap, ResolutionStatus};
