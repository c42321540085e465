//! Dataset manifest describing the remote file share layout.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Manifest {
    /// Landing-page URL template; `{}` is replaced by the relative file
    /// path.
    pub url_struct: String,
    /// Variables files can be selected by.
    pub variables: Vec<String>,
    pub metadata: MetadataFiles,
    #[serde(default)]
    pub rasters: HashMap<String, String>,
    #[serde(default)]
    pub presence_only: HashMap<String, VariantFiles>,
    #[serde(default)]
    pub presence_absence: HashMap<String, VariantFiles>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataFiles {
    /// Presence-only metadata files
    pub po: Vec<String>,
    /// Presence-absence metadata files
    pub pa: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct VariantFiles {
    #[serde(default)]
    pub csvs: Vec<String>,
    #[serde(default)]
    pub cubes: Vec<String>,
}

impl VariantFiles {
    /// Cube archives when requested and available, CSVs otherwise.
    pub fn select(&self, cubes: bool) -> &[String] {
        if cubes && !self.cubes.is_empty() {
            &self.cubes
        } else {
            &self.csvs
        }
    }
}

impl Manifest {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read manifest file")?;
        let manifest: Manifest = toml::from_str(&content).context("Failed to parse manifest file")?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = toml::from_str(
            r#"
            url_struct = "https://example.org/files/?p=/{}"
            variables = ["climate", "elevation"]

            [metadata]
            po = ["PresenceOnlyOccurrences/PO_metadata_train.csv"]
            pa = ["PresenceAbsenceSurveys/PA_metadata_train.csv"]

            [rasters]
            climate = "EnvironmentalRasters/Climate.zip"

            [presence_absence.climate]
            csvs = ["BioclimTimeSeries/values/PA-train-bioclimatic-average.csv"]
            cubes = ["BioclimTimeSeries/cubes/PA-train-bioclimatic-monthly.zip"]
            "#,
        )
        .unwrap();

        assert_eq!(manifest.variables.len(), 2);
        assert_eq!(manifest.metadata.po.len(), 1);

        let climate = &manifest.presence_absence["climate"];
        assert_eq!(climate.select(false).len(), 1);
        assert!(climate.select(true)[0].ends_with(".zip"));
    }

    #[test]
    fn test_cube_selection_falls_back_to_csvs() {
        let files = VariantFiles {
            csvs: vec!["a.csv".to_string()],
            cubes: vec![],
        };
        assert_eq!(files.select(true), files.select(false));
    }
}
