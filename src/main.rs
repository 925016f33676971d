use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use incident_map::app::App;
use incident_map::cli::CliArgs;
use incident_map::config::Config;
use incident_map::data::{spawn_loaders, DatasetId};
use incident_map::session::AnalysisHook;
use incident_map::{headless, ui};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    init_tracing(args.headless, &args.log_file)?;
    info!(data_dir = %config.data_dir.display(), "starting");

    if args.headless {
        return headless::run(&config, args.json, Some(analysis_hook()));
    }

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &config);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// The map UI owns the terminal, so it logs to a file; headless runs log to stderr
fn init_tracing(headless: bool, log_file: &Path) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if headless {
        builder.with_writer(std::io::stderr).try_init()
    } else {
        let file = File::create(log_file)
            .with_context(|| format!("creating log file {}", log_file.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
    };
    installed.map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))
}

/// Stand-in for downstream analysis that refreshes after each community dataset
fn analysis_hook() -> AnalysisHook {
    Box::new(|id: DatasetId| info!(dataset = %id, "analysis data updated"))
}

/// Handle mouse events for panning, zooming and inspecting
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.escape(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Enter | KeyCode::Char('i') => app.inspect_cursor(),
        KeyCode::Char('L') => app.toggle_control(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(position) = c.to_digit(10) {
                app.toggle_overlay(position as usize);
            }
        }

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: &Config) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config, size.width as usize, size.height as usize, Some(analysis_hook()));

    let (tx, rx) = mpsc::channel();
    spawn_loaders(config.sources(), tx);

    loop {
        app.drain_loads(&rx);

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key.code),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
