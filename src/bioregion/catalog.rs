//! Bioregion extraction from GeoJSON.

use std::fs;
use std::path::Path;

use geo::MultiPolygon;
use geojson::GeoJson;
use tracing::{debug, info};

use crate::error::{EnrichError, Result};

/// A single labelled bioregion polygon.
#[derive(Debug, Clone)]
pub struct Bioregion {
    pub label: String,
    pub geometry: MultiPolygon<f64>,
}

impl Bioregion {
    /// Get the bounding box of this region
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        use geo::BoundingRect;
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Load bioregions from a GeoJSON FeatureCollection.
///
/// Takes the region label from the `label_field` property of each
/// feature. RFC 7946 pins GeoJSON to WGS84 lon/lat, which is the run's
/// coordinate reference; a file declaring a legacy `crs` member naming
/// any other reference is rejected rather than reprojected.
pub fn load_bioregions(path: &Path, label_field: &str) -> Result<Vec<Bioregion>> {
    info!("Loading bioregions from {}", path.display());

    let raw = fs::read_to_string(path).map_err(|source| EnrichError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let geometry_err = |message: String| EnrichError::Geometry {
        path: path.to_path_buf(),
        message,
    };

    let geojson: GeoJson = raw
        .parse()
        .map_err(|e: geojson::Error| geometry_err(e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(geometry_err("expected a FeatureCollection".to_string())),
    };

    check_crs(&collection).map_err(geometry_err)?;

    let mut regions = Vec::new();

    for (i, feature) in collection.features.into_iter().enumerate() {
        let label = feature
            .properties
            .as_ref()
            .and_then(|p| p.get(label_field))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                geometry_err(format!("feature {i} has no string property '{label_field}'"))
            })?
            .to_string();

        let geometry = feature
            .geometry
            .ok_or_else(|| geometry_err(format!("feature {i} ('{label}') has no geometry")))?;

        let geometry = geo_types::Geometry::<f64>::try_from(geometry)
            .map_err(|e| geometry_err(format!("feature {i} ('{label}'): {e}")))?;

        let geometry = match geometry {
            geo_types::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            geo_types::Geometry::MultiPolygon(mp) => mp,
            other => {
                debug!(
                    "Skipping feature '{}': unsupported geometry type {}",
                    label,
                    geometry_kind(&other)
                );
                continue;
            }
        };

        regions.push(Bioregion { label, geometry });
    }

    info!("Loaded {} bioregions", regions.len());
    Ok(regions)
}

/// Reject legacy `crs` members that name anything other than WGS84.
fn check_crs(collection: &geojson::FeatureCollection) -> std::result::Result<(), String> {
    let crs = collection
        .foreign_members
        .as_ref()
        .and_then(|m| m.get("crs"));

    let Some(crs) = crs else {
        return Ok(());
    };

    let name = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("");

    if name.contains("CRS84") || name.contains("4326") {
        Ok(())
    } else {
        Err(format!(
            "region file declares CRS '{name}'; reproject to WGS84 (EPSG:4326) first"
        ))
    }
}

fn geometry_kind(geometry: &geo_types::Geometry<f64>) -> &'static str {
    match geometry {
        geo_types::Geometry::Point(_) => "Point",
        geo_types::Geometry::Line(_) => "Line",
        geo_types::Geometry::LineString(_) => "LineString",
        geo_types::Geometry::MultiPoint(_) => "MultiPoint",
        geo_types::Geometry::MultiLineString(_) => "MultiLineString",
        geo_types::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo_types::Geometry::Rect(_) => "Rect",
        geo_types::Geometry::Triangle(_) => "Triangle",
        geo_types::Geometry::Polygon(_) | geo_types::Geometry::MultiPolygon(_) => "Polygon",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "short_name": "atlantic" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [
                            [[-10.0, 40.0], [5.0, 40.0], [5.0, 55.0], [-10.0, 55.0], [-10.0, 40.0]]
                        ]
                    }
                }
            ]
        })
    }

    fn write_temp(content: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_feature_collection() {
        let file = write_temp(&collection());
        let regions = load_bioregions(file.path(), "short_name").unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].label, "atlantic");
        let (min_x, min_y, max_x, max_y) = regions[0].bbox().unwrap();
        assert_eq!((min_x, min_y, max_x, max_y), (-10.0, 40.0, 5.0, 55.0));
    }

    #[test]
    fn test_missing_label_field_is_fatal() {
        let file = write_temp(&collection());
        let err = load_bioregions(file.path(), "name").unwrap_err();
        assert!(matches!(err, EnrichError::Geometry { .. }));
    }

    #[test]
    fn test_foreign_crs_is_rejected() {
        let mut fc = collection();
        fc["crs"] = json!({
            "type": "name",
            "properties": { "name": "urn:ogc:def:crs:EPSG::3035" }
        });
        let file = write_temp(&fc);
        let err = load_bioregions(file.path(), "short_name").unwrap_err();
        assert!(matches!(err, EnrichError::Geometry { .. }));
    }
}
