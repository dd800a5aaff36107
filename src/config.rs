// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! User settings: map tiles, display precision, marker handling and preview output.
//!
//! Settings come from the JSON file named by `EOVMAP_CONFIG`; every key is
//! optional and falls back to the defaults below.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "EOVMAP_CONFIG";

/// Top-level settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub map: MapSettings,
    pub precision: PrecisionSettings,
    pub markers: MarkerMode,
    pub preview: PreviewSettings,
}

/// Tile layer and initial view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Leaflet tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url: String,
    pub attribution: String,
    pub layer_name: String,
    pub zoom: u8,
    /// Center of the map shown before any conversion, `[lat, lon]`.
    pub default_center: [f64; 2],
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_url:
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                    .to_string(),
            attribution: "Esri".to_string(),
            layer_name: "Esri Satellite".to_string(),
            zoom: 13,
            default_center: [47.504105491592426, 19.046773410517797],
        }
    }
}

/// Decimals used when writing converted values back into the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionSettings {
    pub wgs_decimals: usize,
    pub eov_decimals: usize,
}

impl Default for PrecisionSettings {
    fn default() -> Self {
        Self {
            wgs_decimals: 6,
            eov_decimals: 2,
        }
    }
}

/// What happens to existing markers when a new conversion succeeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerMode {
    /// The new point replaces all displayed points.
    #[default]
    Replace,
    /// The new point is appended and every point stays on the map.
    Accumulate,
}

/// Where the rendered map is written and whether it is opened automatically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub path: PathBuf,
    pub open_browser: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir().join("eovmap-preview.html"),
            open_browser: true,
        }
    }
}

impl AppConfig {
    /// Read settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not valid settings JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Load settings from `EOVMAP_CONFIG`, falling back to defaults.
    pub fn load() -> Self {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)).unwrap_or_else(|err| {
                tracing::warn!("{err:#}; using default settings");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"markers":"accumulate","map":{"zoom":15},"precision":{"wgs_decimals":8}}"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.markers, MarkerMode::Accumulate);
        assert_eq!(config.map.zoom, 15);
        assert_eq!(config.map.attribution, "Esri");
        assert_eq!(config.precision.wgs_decimals, 8);
        assert_eq!(config.precision.eov_decimals, 2);
        assert!(config.preview.open_browser);
    }

    #[test]
    fn invalid_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();

        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn settings_round_trip_through_json() {
        let config = AppConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
