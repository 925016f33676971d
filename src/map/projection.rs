use std::f64::consts::PI;

/// Smallest allowed viewport scale (world widths per canvas width)
const MIN_ZOOM: f64 = 0.5;
/// Largest allowed viewport scale, web zoom level 19
const MAX_ZOOM: f64 = 131_072.0;
const ZOOM_STEP: f64 = 1.5;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Create a view at a slippy-map zoom level (0 = whole world).
    ///
    /// A terminal canvas is roughly a quarter of a browser map's pixel width,
    /// so level `n` maps to a scale of `2^n / 4`.
    pub fn at_level(center_lat: f64, center_lon: f64, level: u8, width: usize, height: usize) -> Self {
        let zoom = (2f64.powi(level as i32) / 4.0).clamp(MIN_ZOOM, MAX_ZOOM);
        Self::new(center_lon, center_lat, zoom, width, height)
    }

    /// Approximate slippy-map zoom level for the current scale
    pub fn web_level(&self) -> f64 {
        (self.zoom * 4.0).log2()
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * self.center_lat.to_radians().cos();

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        // Clamp latitude
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    /// Zoom by factor towards a specific pixel location
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        // Get the geographic coordinates under the mouse
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // Shift the center so the same point stays under the mouse
        let (new_px, new_py) = self.project(lon, lat);
        let (cx, cy) = self.center_mercator();
        let scale = self.scale();
        let x = cx + (new_px - px) as f64 / scale;
        let y = cy + (new_py - py) as f64 / scale;
        let (center_lon, center_lat) = mercator_to_lonlat(x, y);
        self.center_lon = center_lon;
        self.center_lat = center_lat.clamp(-85.0, 85.0);
    }

    fn scale(&self) -> f64 {
        self.zoom * self.width.max(1) as f64
    }

    fn center_mercator(&self) -> (f64, f64) {
        lonlat_to_mercator(self.center_lon, self.center_lat)
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let (center_x, center_y) = self.center_mercator();

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        mercator_to_lonlat(x, y)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = lonlat_to_mercator(lon, lat);
        let (center_x, center_y) = self.center_mercator();
        let scale = self.scale();

        let px = ((x - center_x) * scale + self.width as f64 / 2.0).round() as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0).round() as i32;

        (px, py)
    }

    /// Geographic bounds of the canvas as (min_lon, min_lat, max_lon, max_lat)
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        (west, south, east, north)
    }

    /// Degrees of longitude covered by `pixels` braille pixels
    pub fn pixels_to_degrees(&self, pixels: f64) -> f64 {
        pixels * 360.0 / self.scale()
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}

/// Web Mercator, normalized to [0, 1] on both axes
fn lonlat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat.clamp(-85.0511, 85.0511) * PI / 180.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    (lon, lat_rad * 180.0 / PI)
}
