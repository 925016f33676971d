use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::chart::SeverityChart;
use crate::map::{MapFrame, RenderedLayer};
use crate::style;
use crate::tally::Severity;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

/// Width of the legend/layers/chart column
const SIDEBAR_WIDTH: u16 = 36;

/// Split the screen into map, sidebar and status bar
fn screen_areas(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map and sidebar
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
        .split(rows[0]);
    (columns[0], columns[1], rows[1])
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Incident Map ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Character size of the map canvas inside its border for a terminal size
pub fn map_inner_size(width: u16, height: u16) -> (u16, u16) {
    let (map, _, _) = screen_areas(Rect::new(0, 0, width, height));
    let inner = map_block().inner(map);
    (inner.width, inner.height)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let (map, sidebar, status) = screen_areas(frame.area());

    render_map(frame, app, map);
    render_sidebar(frame, app, sidebar);
    render_status_bar(frame, app, status);

    if let Some(text) = &app.popup {
        render_popup(frame, text, map);
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let map_frame = app
        .session
        .surface
        .render(inner.width as usize, inner.height as usize, &viewport);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    frame.render_widget(MapWidget { frame: map_frame, cursor_pos }, inner);
}

/// Braille layers stacked back to front, plus the mouse cursor
struct MapWidget {
    frame: MapFrame,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        if canvas.is_blank() {
            return;
        }
        for row in 0..area.height {
            for col in 0..area.width {
                if let Some(ch) = canvas.glyph(col as usize, row as usize) {
                    buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let MapFrame { base, layers } = &self.frame;
        Self::render_layer(&base.canvas, base.color, area, buf);
        for RenderedLayer { canvas, color } in layers {
            Self::render_layer(canvas, *color, area, buf);
        }

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let chart = app.session.chart().filter(|_| app.show_chart);
    let mut constraints = vec![Constraint::Length(6), Constraint::Min(3)];
    if chart.is_some() {
        constraints.push(Constraint::Length(12));
    }
    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_legend(frame, panels[0]);
    render_layer_control(frame, app, panels[1]);
    if let Some(chart) = chart {
        render_severity_chart(frame, chart, panels[2]);
    }
}

fn render_legend(frame: &mut Frame, area: Rect) {
    let entry = |symbol: &'static str, color: Color, label: &'static str| {
        Line::from(vec![
            Span::styled(symbol, Style::default().fg(color)),
            Span::raw(" "),
            Span::raw(label),
        ])
    };
    let lines = vec![
        entry("●", style::HOTSPOT_RED, "Reported hotspot"),
        entry("■", style::EXTENT_ORANGE, "Reported extent"),
        entry("▬", style::ROAD_ORANGE, "Road network"),
        entry("▬", style::RIVER_BLUE, "Hydrography"),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel("Legend")), area);
}

fn render_layer_control(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let lines = match app.session.control() {
        None => {
            let (reported, expected) = app.session.progress();
            vec![Line::styled(format!("Loading layers {reported}/{expected}"), dim)]
        }
        Some(control) if control.collapsed => {
            vec![Line::styled(format!("{} overlays, L to expand", control.overlays.len()), dim)]
        }
        Some(control) => {
            let mut lines = vec![Line::from(format!("(•) {}", control.base))];
            for (position, (name, layer)) in control.overlays.iter().enumerate() {
                let visible = app.session.surface.is_visible(*layer);
                let mark = if visible { "[x]" } else { "[ ]" };
                let line_style = if visible { Style::default().fg(Color::Green) } else { dim };
                lines.push(Line::styled(format!("{mark} {} {name}", position + 1), line_style));
            }
            lines
        }
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Layers")), area);
}

fn render_severity_chart(frame: &mut Frame, chart: &SeverityChart, area: Rect) {
    let colors = [style::HOTSPOT_RED, style::EXTENT_ORANGE];
    let mut bar_chart = BarChart::default()
        .block(panel("Severity (points / polygons)"))
        .max(chart.max_count().max(1))
        .bar_width(4)
        .bar_gap(0)
        .group_gap(2);

    for severity in Severity::ALL {
        let bars: Vec<Bar> = chart
            .series()
            .iter()
            .zip(colors)
            .map(|((_, counts), color)| {
                Bar::default()
                    .value(counts.get(severity))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            })
            .collect();
        bar_chart = bar_chart.data(BarGroup::default().label(Line::from(severity.label())).bars(&bars));
    }

    frame.render_widget(bar_chart, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_popup(frame: &mut Frame, text: &str, map: Rect) {
    let area = centered_rect(70, 50, map);
    let block = Block::default()
        .title(" Feature ")
        .title_bottom(Line::styled(" Esc to close ", Style::default().fg(Color::DarkGray)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text.to_string()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (reported, expected) = app.session.progress();
    let layers_color = if reported == expected { Color::Green } else { Color::Magenta };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("layers {reported}/{expected}"), Style::default().fg(layers_color)),
        Span::styled(
            " | hjkl:pan +/-:zoom i:inspect 1-9:toggle L:layers r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_map_inner_size_leaves_room_for_sidebar() {
        assert_eq!(map_inner_size(120, 40), (120 - SIDEBAR_WIDTH - 2, 40 - 1 - 2));
    }

    #[test]
    fn test_loading_state_is_shown_until_control_exists() {
        let app = App::new(&Config::default(), 120, 40, None);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Loading layers 0/6"));
        assert!(text.contains("layers 0/6"));
        assert!(text.contains("Reported hotspot"));
        assert!(text.contains("Reported extent"));
        assert!(!text.contains("Severity"));
    }
}
