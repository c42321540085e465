//! Error taxonomy for the enrichment pipeline.
//!
//! Fatal errors (load, merge, write) surface here. Per-point lookup
//! failures are not errors: they live in
//! [`ResolutionStatus::Failed`](crate::resolve::ResolutionStatus) and
//! degrade to null output cells.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// A required column is missing, a typed column failed to parse, or
    /// an output column would collide with an existing one.
    #[error("input format error: {0}")]
    InputFormat(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed region file {path}: {message}")]
    Geometry { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, EnrichError>;
