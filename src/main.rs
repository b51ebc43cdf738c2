//! mangaterm - Browse and read manga from the terminal
//!
//! A terminal UI application that searches a MangaDex proxy, shows manga
//! details and chapter lists, and steps through chapters in a reader.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use mangaterm::app::{App, AppState};
use mangaterm::cli::{Cli, StartupConfig};
use mangaterm::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match &app.state {
        AppState::Loading => render_loading(frame),
        AppState::Home => ui::render_home(frame, app),
        AppState::Details(_) => ui::render_details(frame, app),
        AppState::Reader(_) => ui::render_reader(frame, app),
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while data is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading manga...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

async fn run(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result: Result<(), Box<dyn std::error::Error>> = loop {
        // Render UI (shows the loading indicator while an action is queued)
        if let Err(e) = terminal.draw(|f| render_ui(f, app)) {
            break Err(e.into());
        }

        if app.is_busy() {
            app.process_pending().await;
            continue;
        }

        // Poll for keyboard events with 100ms timeout
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        app.tick(Instant::now());

        // Check if we should quit
        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    match logging::init(config.log_file.as_deref()) {
        Ok(path) => tracing::info!(log_file = %path.display(), base_url = %config.base_url, "starting"),
        Err(e) => eprintln!("warning: logging disabled: {}", e),
    }

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    let mut app = App::with_startup_config(config);
    match run(&mut app).await {
        Ok(()) => {
            tracing::info!("exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "terminal error");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
