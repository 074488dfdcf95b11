//! mapstack - Map Layer Inspector
//!
//! A terminal front end over the map editor's state: shows the layer order
//! table, which layers are attached to the map and where each new layer
//! would be inserted, along with the editor mode, reference layer toggles
//! OD data and the loaded route.

use std::fs::File;
use std::io;
use std::sync::Mutex;

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use mapstack::application::{App, AppMode, EditorState};
use mapstack::infrastructure::{EditorConfig, FileRepository};
use mapstack::presentation::{render_ui, InputHandler};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

/// Parses arguments, sets up logging and state, then runs the UI.
///
/// Logs go to a file so they don't draw over the terminal UI.
fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = EditorConfig::from_args(&args)?;

    let log_file = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .try_init();

    let editor = EditorState::from_config(&config).context("building editor state")?;
    let mut app = App::new(editor, FileRepository::new(config.save_dir.clone()));
    app.toggle_map();
    if let Some(od_path) = &config.od_path {
        app.load_od(od_path);
    }
    if let Some(route_path) = &config.route_path {
        app.load_route(route_path);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}

/// Main application event loop.
///
/// Continues running until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if app.mode == AppMode::Normal => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
