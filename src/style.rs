//! Visual style descriptors for the six dataset layers.

use crate::data::DatasetId;
use ratatui::style::Color;

/// Polygon fill
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    pub color: Color,
    pub opacity: f32,
}

/// Style descriptor consumed by the map renderer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStyle {
    /// Stroke color
    pub color: Color,
    /// Stroke weight in pixels
    pub weight: u8,
    /// Stroke opacity
    pub opacity: f32,
    /// Polygon fill, `None` renders outlines only
    pub fill: Option<Fill>,
    /// Circle marker radius for point features, `None` for plain geometries
    pub radius: Option<u8>,
}

impl LayerStyle {
    /// Stroke-only path with the usual vector defaults: full opacity and a
    /// light fill in the stroke color when the geometry is a polygon.
    const fn path(color: Color, weight: u8) -> Self {
        Self {
            color,
            weight,
            opacity: 1.0,
            fill: Some(Fill { color, opacity: 0.2 }),
            radius: None,
        }
    }

    /// Color used for the bulk of the layer: the fill for markers, else the stroke
    pub fn primary_color(&self) -> Color {
        match (self.radius, self.fill) {
            (Some(_), Some(fill)) => fill.color,
            _ => self.color,
        }
    }
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub const BOUNDARY_GRAY: Color = hex(0x444444);
pub const ROAD_ORANGE: Color = hex(0xd95f0e);
pub const RIVER_BLUE: Color = hex(0x3182bd);
pub const CENTER_GRAY: Color = hex(0x555555);
pub const HOTSPOT_RED: Color = hex(0xe31a1c);
pub const EXTENT_ORANGE: Color = hex(0xff7f00);
const WHITE: Color = hex(0xffffff);

/// Administrative boundaries: unfilled outlines
pub fn boundaries() -> LayerStyle {
    LayerStyle {
        fill: None,
        ..LayerStyle::path(BOUNDARY_GRAY, 1)
    }
}

pub fn roads() -> LayerStyle {
    LayerStyle::path(ROAD_ORANGE, 1)
}

pub fn hydrography() -> LayerStyle {
    LayerStyle::path(RIVER_BLUE, 1)
}

/// Population centers: small gray circle markers
pub fn population_centers() -> LayerStyle {
    LayerStyle {
        color: WHITE,
        weight: 1,
        opacity: 1.0,
        fill: Some(Fill {
            color: CENTER_GRAY,
            opacity: 0.9,
        }),
        radius: Some(4),
    }
}

/// Community hotspots: larger, redder markers than population centers
pub fn community_points() -> LayerStyle {
    LayerStyle {
        color: WHITE,
        weight: 2,
        opacity: 1.0,
        fill: Some(Fill {
            color: HOTSPOT_RED,
            opacity: 0.95,
        }),
        radius: Some(10),
    }
}

pub fn community_polygons() -> LayerStyle {
    LayerStyle {
        fill: Some(Fill {
            color: EXTENT_ORANGE,
            opacity: 0.35,
        }),
        ..LayerStyle::path(EXTENT_ORANGE, 3)
    }
}

/// Style rule for a dataset
pub fn for_dataset(id: DatasetId) -> LayerStyle {
    match id {
        DatasetId::Boundaries => boundaries(),
        DatasetId::Roads => roads(),
        DatasetId::Hydrography => hydrography(),
        DatasetId::Centers => population_centers(),
        DatasetId::CommunityPoints => community_points(),
        DatasetId::CommunityPolygons => community_polygons(),
    }
}
