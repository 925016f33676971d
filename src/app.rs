use crate::config::Config;
use crate::data::LoadOutcome;
use crate::map::{MapSurface, Viewport};
use crate::session::{AnalysisHook, Session};
use crate::ui;
use std::sync::mpsc::Receiver;

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub session: Session,
    /// Whether the chart panel exists at all
    pub show_chart: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Set once a press turns into a drag, so the release is not a click
    dragged: bool,
    /// Popup text of the inspected feature
    pub popup: Option<String>,
    home: (f64, f64, u8),
}

impl App {
    pub fn new(config: &Config, width: usize, height: usize, hook: Option<AnalysisHook>) -> Self {
        let (pixel_width, pixel_height) = pixel_size(width, height);
        let home = (config.center_lat, config.center_lon, config.zoom_level);

        Self {
            viewport: Viewport::at_level(home.0, home.1, home.2, pixel_width, pixel_height),
            session: Session::new(MapSurface::new(config.base_layer.clone()), hook),
            show_chart: config.show_chart,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
            popup: None,
            home,
        }
    }

    /// Apply every loader outcome that has arrived, one at a time
    pub fn drain_loads(&mut self, rx: &Receiver<LoadOutcome>) {
        while let Ok(outcome) = rx.try_recv() {
            self.session.apply(outcome);
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = pixel_size(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom in
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    /// Zoom out
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixels(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixels(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Back to the initial view; loaded layers stay as they are
    pub fn reset_view(&mut self) {
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.viewport = Viewport::at_level(self.home.0, self.home.1, self.home.2, width, height);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Esc closes an open popup first
    pub fn escape(&mut self) {
        if self.popup.take().is_none() {
            self.quit();
        }
    }

    /// Toggle the overlay at a control position (keys 1-9)
    pub fn toggle_overlay(&mut self, position: usize) {
        self.session.toggle_overlay(position);
    }

    /// Expand or collapse the layer control once it exists
    pub fn toggle_control(&mut self) {
        if let Some(control) = self.session.control_mut() {
            control.toggle_collapsed();
        }
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.viewport.web_level())
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.2}°{}, {:.2}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Begin a potential drag or click
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    /// A release without a drag in between is a click: inspect what is under it
    pub fn release(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.inspect_at(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| to_pixels(col, row))
    }

    /// Open the popup of the feature under a screen position, or close it when nothing is there
    pub fn inspect_at(&mut self, col: u16, row: u16) {
        let (px, py) = to_pixels(col, row);
        self.inspect_pixel(px, py);
    }

    /// Inspect under the mouse, or the map center without one
    pub fn inspect_cursor(&mut self) {
        let (px, py) = self
            .mouse_pixel_pos()
            .unwrap_or((self.viewport.width as i32 / 2, self.viewport.height as i32 / 2));
        self.inspect_pixel(px, py);
    }

    fn inspect_pixel(&mut self, px: i32, py: i32) {
        self.popup = self
            .session
            .surface
            .popup_at(&self.viewport, px, py)
            .map(str::to_string);
    }
}

/// Braille pixel size of the map canvas for a terminal size
fn pixel_size(width: usize, height: usize) -> (usize, usize) {
    let (cols, rows) = ui::map_inner_size(width as u16, height as u16);
    (cols as usize * 2, rows as usize * 4)
}

/// Convert terminal coords to braille pixel coords.
/// Each terminal cell is 2 braille pixels wide, 4 tall; the map border is a 1 cell offset.
fn to_pixels(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, DatasetId};
    use std::sync::mpsc;

    fn hotspot_at_center() -> LoadOutcome {
        let geometry = geojson::Geometry::new(geojson::Value::Point(vec![-72.5, -37.2]));
        let mut feature = geojson::Feature::from(geometry);
        let mut props = geojson::JsonObject::new();
        props.insert("descripcion".to_string(), serde_json::json!("Columna de humo"));
        feature.properties = Some(props);
        LoadOutcome {
            id: DatasetId::CommunityPoints,
            result: Ok(Dataset {
                id: DatasetId::CommunityPoints,
                features: vec![feature],
            }),
        }
    }

    #[test]
    fn test_drained_outcomes_reach_the_session() {
        let mut app = App::new(&Config::default(), 120, 40, None);
        let (tx, rx) = mpsc::channel();
        tx.send(hotspot_at_center()).unwrap();
        app.drain_loads(&rx);
        assert_eq!(app.session.progress(), (1, 6));
    }

    #[test]
    fn test_click_opens_popup_and_escape_closes_it() {
        let mut app = App::new(&Config::default(), 120, 40, None);
        let (tx, rx) = mpsc::channel();
        tx.send(hotspot_at_center()).unwrap();
        app.drain_loads(&rx);

        app.inspect_cursor();
        assert_eq!(
            app.popup.as_deref(),
            Some("Community report (hotspot)\nDescription: Columna de humo")
        );
        app.escape();
        assert!(app.popup.is_none());
        assert!(!app.should_quit);
        app.escape();
        assert!(app.should_quit);
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut app = App::new(&Config::default(), 120, 40, None);
        let center_lon = app.viewport.center_lon;
        app.press(10, 10);
        app.handle_drag(12, 10);
        app.release(12, 10);
        assert!(app.popup.is_none());
        assert!(app.viewport.center_lon < center_lon);
    }

    #[test]
    fn test_reset_restores_home_view() {
        let mut app = App::new(&Config::default(), 120, 40, None);
        app.pan(40, 12);
        app.zoom_in();
        app.reset_view();
        assert!((app.viewport.center_lat + 37.2).abs() < 1e-9);
        assert_eq!(app.zoom_level(), "z8.0");
    }
}
