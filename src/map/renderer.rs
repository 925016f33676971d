use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_line, draw_thick_line, fill_polygon, stipple_step};
use crate::map::layer::{Layer, LayerFeature, LineString, Shape};
use crate::map::projection::Viewport;
use ratatui::style::Color;

/// Handle of a layer mounted on the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

struct MountedLayer {
    layer: Layer,
    visible: bool,
}

/// One layer drawn to its own canvas
pub struct RenderedLayer {
    pub canvas: BrailleCanvas,
    pub color: Color,
}

/// Everything the map widget needs for one frame, back to front
pub struct MapFrame {
    pub base: RenderedLayer,
    pub layers: Vec<RenderedLayer>,
}

/// The map surface: base graticule plus overlays in mount order
pub struct MapSurface {
    pub base_name: String,
    layers: Vec<MountedLayer>,
}

impl MapSurface {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            layers: Vec::new(),
        }
    }

    /// Mount a layer on top of the existing ones
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        self.layers.push(MountedLayer { layer, visible: true });
        LayerId(self.layers.len() - 1)
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.layers.get(id.0).is_some_and(|m| m.visible)
    }

    /// Show or hide a layer; unknown ids are ignored
    pub fn toggle(&mut self, id: LayerId) {
        if let Some(mounted) = self.layers.get_mut(id.0) {
            mounted.visible = !mounted.visible;
        }
    }

    /// Popup of the topmost visible feature under a pixel
    pub fn popup_at(&self, viewport: &Viewport, px: i32, py: i32) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .filter(|m| m.visible)
            .find_map(|m| m.layer.hit_test(viewport, px, py))
            .and_then(|feature| feature.popup.as_deref())
    }

    /// Render the base graticule and every visible layer
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport) -> MapFrame {
        let mut canvas = BrailleCanvas::new(width, height);
        draw_graticule(&mut canvas, viewport);
        let base = RenderedLayer {
            canvas,
            color: Color::DarkGray,
        };

        let layers = self
            .layers
            .iter()
            .filter(|m| m.visible)
            .map(|m| {
                let mut canvas = BrailleCanvas::new(width, height);
                draw_layer(&mut canvas, &m.layer, viewport);
                RenderedLayer {
                    canvas,
                    color: m.layer.style.primary_color(),
                }
            })
            .collect();

        MapFrame { base, layers }
    }
}

fn draw_layer(canvas: &mut BrailleCanvas, layer: &Layer, viewport: &Viewport) {
    let thick = layer.style.weight >= 2;
    let fill_step = layer.style.fill.map(|fill| stipple_step(fill.opacity));
    let radius = layer.marker_radius();

    for LayerFeature { shapes, .. } in &layer.features {
        for shape in shapes {
            match shape {
                Shape::Point(lon, lat) => {
                    let (px, py) = viewport.project(*lon, *lat);
                    if viewport.is_visible(px, py) {
                        draw_circle(canvas, px, py, radius);
                    }
                }
                Shape::Line(line) => draw_linestring(canvas, line, viewport, thick),
                Shape::Polygon(rings) => {
                    if let Some(step) = fill_step {
                        let projected: Vec<Vec<(i32, i32)>> =
                            rings.iter().map(|ring| project_ring(ring, viewport)).collect();
                        fill_polygon(canvas, &projected, step);
                    }
                    for ring in rings {
                        draw_linestring(canvas, ring, viewport, thick);
                    }
                }
            }
        }
    }
}

/// Project a ring, closing it if the source left it open
fn project_ring(ring: &LineString, viewport: &Viewport) -> Vec<(i32, i32)> {
    let mut points: Vec<(i32, i32)> = ring.iter().map(|&(lon, lat)| viewport.project(lon, lat)).collect();
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last {
            points.push(first);
        }
    }
    points
}

/// Draw a linestring with viewport culling
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport, thick: bool) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            if viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                if thick {
                    draw_thick_line(canvas, prev_x, prev_y, px, py);
                } else {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }
        }

        prev = Some((px, py));
    }
}

/// Graticule step in degrees: the largest "nice" step giving a handful of lines
fn graticule_step(span: f64) -> f64 {
    const STEPS: [f64; 9] = [0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0];
    STEPS
        .iter()
        .copied()
        .find(|step| span / step <= 8.0)
        .unwrap_or(30.0)
}

/// Dotted meridians and parallels standing in for a tile background
fn draw_graticule(canvas: &mut BrailleCanvas, viewport: &Viewport) {
    let (west, south, east, north) = viewport.visible_bounds();
    let step = graticule_step((east - west).max(north - south));
    let width = canvas.pixel_width() as i32;
    let height = canvas.pixel_height() as i32;

    let mut lon = (west / step).ceil() * step;
    while lon <= east {
        let (x, _) = viewport.project(lon, viewport.center_lat);
        for y in (0..height).step_by(3) {
            canvas.set_pixel_signed(x, y);
        }
        lon += step;
    }

    let mut lat = (south / step).ceil() * step;
    while lat <= north {
        let (_, y) = viewport.project(viewport.center_lon, lat);
        for x in (0..width).step_by(3) {
            canvas.set_pixel_signed(x, y);
        }
        lat += step;
    }
}
