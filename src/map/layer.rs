use crate::data::Dataset;
use crate::map::projection::Viewport;
use crate::map::spatial::{BBox, FeatureGrid};
use crate::style::LayerStyle;
use geojson::{Feature, Geometry, Value};

/// Grid cell size for hit-test lookups, in degrees
const INDEX_CELL_SIZE: f64 = 0.25;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Drawable part of a feature geometry
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(f64, f64),
    Line(LineString),
    /// Exterior ring first, then holes
    Polygon(Vec<LineString>),
}

impl Shape {
    fn extend_bbox(&self, bbox: &mut Option<BBox>) {
        let mut add = |&(lon, lat): &(f64, f64)| {
            *bbox = Some(match *bbox {
                None => (lon, lat, lon, lat),
                Some((min_lon, min_lat, max_lon, max_lat)) => {
                    (min_lon.min(lon), min_lat.min(lat), max_lon.max(lon), max_lat.max(lat))
                }
            });
        };
        match self {
            Shape::Point(lon, lat) => add(&(*lon, *lat)),
            Shape::Line(line) => line.iter().for_each(add),
            Shape::Polygon(rings) => rings.iter().flatten().for_each(add),
        }
    }
}

/// One feature as the map sees it: shapes plus its bound popup
#[derive(Clone, Debug)]
pub struct LayerFeature {
    pub shapes: Vec<Shape>,
    pub popup: Option<String>,
}

impl LayerFeature {
    fn bbox(&self) -> Option<BBox> {
        let mut bbox = None;
        for shape in &self.shapes {
            shape.extend_bbox(&mut bbox);
        }
        bbox
    }
}

/// Renderable projection of one dataset. Immutable once built.
pub struct Layer {
    pub name: String,
    pub style: LayerStyle,
    pub features: Vec<LayerFeature>,
    index: FeatureGrid,
}

impl Layer {
    /// Build a layer from a loaded dataset, binding each feature's popup
    pub fn from_dataset<P>(name: &str, dataset: &Dataset, style: LayerStyle, popup: P) -> Self
    where
        P: Fn(&Feature) -> Option<String>,
    {
        let features: Vec<LayerFeature> = dataset
            .features
            .iter()
            .map(|feature| {
                let mut shapes = Vec::new();
                if let Some(ref geometry) = feature.geometry {
                    collect_shapes(geometry, &mut shapes);
                }
                LayerFeature {
                    shapes,
                    popup: popup(feature),
                }
            })
            .collect();
        let index = FeatureGrid::build(features.iter().map(LayerFeature::bbox), INDEX_CELL_SIZE);

        Self {
            name: name.to_string(),
            style,
            features,
            index,
        }
    }

    /// Pixel radius of circle markers on the braille canvas
    pub fn marker_radius(&self) -> i32 {
        self.style.radius.map_or(1, |r| (r as i32 + 1) / 3).max(1)
    }

    /// Topmost feature with a popup under the pixel, if any
    pub fn hit_test(&self, viewport: &Viewport, px: i32, py: i32) -> Option<&LayerFeature> {
        let marker_tolerance = (self.marker_radius() + 1) as f64;
        let line_tolerance = (self.style.weight as f64).max(1.0) + 1.0;
        let (lon, lat) = viewport.unproject(px, py);
        let radius = viewport.pixels_to_degrees(marker_tolerance.max(line_tolerance));
        let filled = self.style.fill.is_some();
        let click = (px as f64, py as f64);

        self.index
            .query_point(lon, lat, radius)
            .into_iter()
            .rev()
            .filter_map(|idx| self.features.get(idx))
            .filter(|feature| feature.popup.is_some())
            .find(|feature| {
                feature.shapes.iter().any(|shape| match shape {
                    Shape::Point(plon, plat) => {
                        let (x, y) = viewport.project(*plon, *plat);
                        distance(click, (x as f64, y as f64)) <= marker_tolerance
                    }
                    Shape::Line(line) => near_path(viewport, line, click, line_tolerance),
                    Shape::Polygon(rings) => {
                        (filled && contains(rings, lon, lat))
                            || rings.iter().any(|ring| near_path(viewport, ring, click, line_tolerance))
                    }
                })
            })
    }
}

/// Flatten a geometry into drawable shapes
fn collect_shapes(geometry: &Geometry, shapes: &mut Vec<Shape>) {
    fn line(coords: &[Vec<f64>]) -> LineString {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    }

    match &geometry.value {
        Value::Point(coords) if coords.len() >= 2 => shapes.push(Shape::Point(coords[0], coords[1])),
        Value::MultiPoint(points) => {
            for coords in points.iter().filter(|c| c.len() >= 2) {
                shapes.push(Shape::Point(coords[0], coords[1]));
            }
        }
        Value::LineString(coords) => shapes.push(Shape::Line(line(coords))),
        Value::MultiLineString(lines) => {
            for coords in lines {
                shapes.push(Shape::Line(line(coords)));
            }
        }
        Value::Polygon(rings) => shapes.push(Shape::Polygon(rings.iter().map(|r| line(r)).collect())),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                shapes.push(Shape::Polygon(rings.iter().map(|r| line(r)).collect()));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_shapes(g, shapes);
            }
        }
        _ => {}
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Distance from `p` to the segment `a`-`b`
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    distance(p, (a.0 + t * dx, a.1 + t * dy))
}

fn near_path(viewport: &Viewport, path: &LineString, click: (f64, f64), tolerance: f64) -> bool {
    let projected: Vec<(f64, f64)> = path
        .iter()
        .map(|&(lon, lat)| {
            let (x, y) = viewport.project(lon, lat);
            (x as f64, y as f64)
        })
        .collect();
    match projected.as_slice() {
        [single] => distance(click, *single) <= tolerance,
        _ => projected
            .windows(2)
            .any(|seg| segment_distance(click, seg[0], seg[1]) <= tolerance),
    }
}

/// Even-odd containment over all rings, so holes are excluded
fn contains(rings: &[LineString], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}
