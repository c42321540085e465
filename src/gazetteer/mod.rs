//! Administrative reference-point gazetteer.
//!
//! Loads a geonames-style reference catalog (`lat`, `lon`, `name`,
//! `admin1`, `admin2` columns, optionally gzipped) and answers
//! nearest-neighbour queries with the reference point's administrative
//! labels. `admin1` maps to county, `admin2` to district.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use tracing::{debug, info};

use crate::error::{EnrichError, Result};

/// Administrative labels attached to a reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminLabels {
    pub county: String,
    pub district: String,
}

#[derive(Debug)]
struct ReferencePoint {
    name: String,
    labels: AdminLabels,
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Immutable nearest-neighbour gazetteer.
#[derive(Debug)]
pub struct Gazetteer {
    tree: RTree<IndexedPoint>,
    records: Vec<ReferencePoint>,
}

impl Gazetteer {
    /// Load the gazetteer from a reference-point CSV (plain or `.gz`).
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading gazetteer from {}", path.display());

        let file = File::open(path).map_err(|source| EnrichError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let gazetteer = Self::read_from(reader, path)?;
        info!("Gazetteer loaded with {} reference points", gazetteer.len());
        Ok(gazetteer)
    }

    pub(crate) fn read_from<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let csv_err = |source| EnrichError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let headers = csv_reader.headers().map_err(csv_err)?.clone();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                EnrichError::InputFormat(format!("gazetteer column '{name}' not found"))
            })
        };

        let lat_idx = column("lat")?;
        let lon_idx = column("lon")?;
        let name_idx = column("name")?;
        let admin1_idx = column("admin1")?;
        let admin2_idx = column("admin2")?;

        let mut records = Vec::new();
        let mut nodes = Vec::new();

        for result in csv_reader.records() {
            let record = result.map_err(csv_err)?;
            let cell = |idx: usize| record.get(idx).unwrap_or("");

            let (Ok(lat), Ok(lon)) = (cell(lat_idx).parse::<f64>(), cell(lon_idx).parse::<f64>())
            else {
                debug!(
                    "Skipping gazetteer entry '{}': unparseable coordinates",
                    cell(name_idx)
                );
                continue;
            };
            if !lat.is_finite() || !lon.is_finite() {
                debug!(
                    "Skipping gazetteer entry '{}': non-finite coordinates",
                    cell(name_idx)
                );
                continue;
            }

            nodes.push(IndexedPoint::new([lon, lat], records.len()));
            records.push(ReferencePoint {
                name: cell(name_idx).to_string(),
                labels: AdminLabels {
                    county: cell(admin1_idx).to_string(),
                    district: cell(admin2_idx).to_string(),
                },
            });
        }

        Ok(Self {
            tree: RTree::bulk_load(nodes),
            records,
        })
    }

    /// Labels of the nearest reference point, or `None` on an empty
    /// gazetteer.
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<&AdminLabels> {
        let node = self.tree.nearest_neighbor(&[lon, lat])?;
        let reference = &self.records[node.data];
        debug!(
            "Nearest reference for ({}, {}): {}",
            lat, lon, reference.name
        );
        Some(&reference.labels)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
