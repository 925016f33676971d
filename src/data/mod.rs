//! The six datasets and their loading.

mod loader;

pub use loader::{load_dataset, spawn_loaders, LoadError, LoadOutcome};

use geojson::{Feature, GeoJson};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed, known-at-build-time datasets
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetId {
    Boundaries,
    Roads,
    Hydrography,
    Centers,
    CommunityPoints,
    CommunityPolygons,
}

impl DatasetId {
    pub const ALL: [DatasetId; 6] = [
        DatasetId::Boundaries,
        DatasetId::Roads,
        DatasetId::Hydrography,
        DatasetId::Centers,
        DatasetId::CommunityPoints,
        DatasetId::CommunityPolygons,
    ];

    /// File name under the data directory
    pub const fn default_file(self) -> &'static str {
        match self {
            DatasetId::Boundaries => "limites_administrativos.geojson",
            DatasetId::Roads => "red_vial.geojson",
            DatasetId::Hydrography => "red_hidrografica.geojson",
            DatasetId::Centers => "centros_poblados.geojson",
            DatasetId::CommunityPoints => "reportes_focos.geojson",
            DatasetId::CommunityPolygons => "reportes_poligonos.geojson",
        }
    }

    /// Name shown in the layer control
    pub const fn display_name(self) -> &'static str {
        match self {
            DatasetId::Boundaries => "Administrative boundaries",
            DatasetId::Roads => "Road network",
            DatasetId::Hydrography => "Hydrography",
            DatasetId::Centers => "Population centers",
            DatasetId::CommunityPoints => "Community-reported hotspots",
            DatasetId::CommunityPolygons => "Community-reported extent",
        }
    }

    /// Community datasets feed the severity chart and the analysis hook
    pub const fn is_community(self) -> bool {
        matches!(self, DatasetId::CommunityPoints | DatasetId::CommunityPolygons)
    }

    /// Attribute holding the severity category, for community datasets
    pub const fn severity_property(self) -> Option<&'static str> {
        match self {
            DatasetId::CommunityPoints => Some("Intensidad aparente"),
            DatasetId::CommunityPolygons => Some("Severidad aparente"),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            DatasetId::Boundaries => "boundaries",
            DatasetId::Roads => "roads",
            DatasetId::Hydrography => "hydrography",
            DatasetId::Centers => "centers",
            DatasetId::CommunityPoints => "community_points",
            DatasetId::CommunityPolygons => "community_polygons",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A loaded dataset: features in file order
#[derive(Clone, Debug)]
pub struct Dataset {
    pub id: DatasetId,
    pub features: Vec<Feature>,
}

impl Dataset {
    /// Flatten any GeoJSON document into features.
    /// A bare geometry becomes one feature without attributes.
    pub fn from_geojson(id: DatasetId, geojson: GeoJson) -> Self {
        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
        };
        Self { id, features }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_reports_are_community() {
        let community: Vec<_> = DatasetId::ALL.into_iter().filter(|d| d.is_community()).collect();
        assert_eq!(community, vec![DatasetId::CommunityPoints, DatasetId::CommunityPolygons]);
        assert_eq!(DatasetId::Roads.severity_property(), None);
    }

    #[test]
    fn test_bare_geometry_becomes_one_feature() {
        let geojson: GeoJson = r#"{"type":"Point","coordinates":[-72.5,-37.2]}"#.parse().unwrap();
        let dataset = Dataset::from_geojson(DatasetId::Centers, geojson);
        assert_eq!(dataset.features.len(), 1);
        assert!(dataset.features[0].properties.is_none());
    }
}
