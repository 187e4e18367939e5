mod app;
mod braille;
mod data;
mod map;
mod panel;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use map::{ROTATE_STEP, TILT_STEP};
use naip_map::config::{Args, ViewerConfig};
use naip_map::registry::MosaicRegistry;
use naip_map::Shell;
use ratatui::DefaultTerminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args)?;

    let registry = MosaicRegistry::default();
    let config = ViewerConfig::from_args(&args, &registry)?;
    let base_style = config.load_base_style().context("failed to load base style")?;
    let location = config.open_location()?;
    let shell = Shell::new(
        base_style,
        registry,
        config.settings.clone(),
        config.shell.clone(),
        location,
    );

    if args.print_style {
        println!("{}", serde_json::to_string_pretty(shell.style())?);
        return Ok(());
    }

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, shell, &config);

    // Disable mouse capture and restore terminal
    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();

    // The final location, to share or pass back with --url
    println!("{}", result?);
    Ok(())
}

/// Style export logs to stderr; the interactive map owns the terminal, so it
/// only logs when given a file.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if args.print_style {
        builder.with_writer(io::stderr).try_init()
    } else if let Some(path) = &args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
    } else {
        return Ok(());
    };
    installed.map_err(|err| anyhow!("failed to install logger: {err}"))
}

/// Handle mouse events for panning, zooming and the selector panel
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Bearing and pitch
        KeyCode::Char('[') => app.rotate(-ROTATE_STEP),
        KeyCode::Char(']') => app.rotate(ROTATE_STEP),
        KeyCode::Char('<') | KeyCode::Char(',') => app.tilt(-TILT_STEP),
        KeyCode::Char('>') | KeyCode::Char('.') => app.tilt(TILT_STEP),

        // Mosaic selection
        KeyCode::Char(c @ '1'..='9') => app.select_epoch_index(c as usize - '1' as usize),
        KeyCode::Char('e') | KeyCode::Tab => app.cycle_epoch(1),
        KeyCode::Char('E') | KeyCode::BackTab => app.cycle_epoch(-1),

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ => {}
    }
}

/// Event loop; returns the final href
fn run(terminal: &mut DefaultTerminal, shell: Shell, config: &ViewerConfig) -> Result<String> {
    let size = terminal.size()?;
    let mut app = App::new(
        shell,
        config.data_root.clone(),
        config.hint_zoom,
        size.width,
        size.height,
    );
    info!(href = %app.shell.href(), "viewer started");

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }
    }

    Ok(app.shell.href())
}
