use crate::data::DatasetId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "INCIDENT_MAP_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "incident-map.toml";

/// Application configuration, read from TOML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the dataset files
    pub data_dir: PathBuf,
    pub center_lat: f64,
    pub center_lon: f64,
    /// Slippy-map zoom level of the initial view
    pub zoom_level: u8,
    /// Name of the base layer in the layer control
    pub base_layer: String,
    /// Draw the severity chart panel
    pub show_chart: bool,
    /// Per-dataset file overrides keyed by dataset key (`roads`, `community_points`, ...),
    /// relative to `data_dir` unless absolute
    pub files: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            center_lat: -37.2,
            center_lon: -72.5,
            zoom_level: 8,
            base_layer: "Graticule".to_string(),
            show_chart: true,
            files: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load from an explicit path, else `$INCIDENT_MAP_CONFIG`, else
    /// `./incident-map.toml`. Only an explicit path is required to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidates = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(DEFAULT_CONFIG_FILE)));
        for path in candidates {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resource path of every dataset, in the fixed dataset order
    pub fn sources(&self) -> Vec<(DatasetId, PathBuf)> {
        DatasetId::ALL
            .into_iter()
            .map(|id| {
                let file = self
                    .files
                    .get(id.key())
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(id.default_file()));
                (id, self.data_dir.join(file))
            })
            .collect()
    }
}
