//! campboard - drag-and-drop bunk assignment board for the terminal.
//!
//! Campers and counselors are dragged with the mouse between the unassigned
//! pools and bunk rosters grouped by cabin. Every drop becomes one write
//! against the camp data service, followed by a refresh.

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use campboard_core::config::Config;

use app::{App, AppState, BoardLayout};
use ui::input::{handle_key, handle_mouse};
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "campboard.log";

const USAGE: &str = "Usage: campboard [--event <id>]

Options:
  --event <id>   Event to open (overrides CAMPBOARD_EVENT_ID and the config file)
  -h, --help     Show this help
  -V, --version  Show the version

Environment:
  CAMPBOARD_API_URL    Base URL of the camp data service
  CAMPBOARD_EVENT_ID   Event to open
  CAMPBOARD_TOKEN      Bearer token for the service
  RUST_LOG             Log filter (default: warn)";

/// Initialize the tracing subscriber. The terminal belongs to the UI, so logs
/// go to a daily rolling file. The returned guard flushes it on drop.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match Config::log_dir() {
        Ok(dir) => dir,
        Err(_) => return None,
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run { event: Option<String> },
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut event = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--event" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--event needs a value"))?;
                event = Some(value.clone());
            }
            other => {
                if let Some(value) = other.strip_prefix("--event=") {
                    event = Some(value.to_string());
                } else {
                    anyhow::bail!("Unknown argument: {}\n\n{}", other, USAGE);
                }
            }
        }
    }
    Ok(Command::Run { event })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let event = match parse_args(&args)? {
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Command::Version => {
            println!("campboard {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Run { event } => event,
    };

    let _log_guard = init_tracing();
    info!("campboard starting");

    // Fail before touching the terminal if there is no event to show
    let mut app = App::new(event.as_deref())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Show the cached board immediately, then refresh
    app.load_from_cache();
    if app.is_cache_stale() {
        info!(event_id = app.event_id(), "Cache stale, refreshing");
    }
    app.refresh_background();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("campboard shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI, then hit-test the next events against what was drawn
        let mut layout = BoardLayout::default();
        terminal.draw(|f| layout = render(f, app))?;
        app.apply_layout(layout);

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    if handle_key(app, key)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::FocusLost => {
                    if app.cancel_drag() {
                        warn!("Focus lost mid-drag, gesture cancelled");
                    }
                }
                _ => {}
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("campboard")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_args_event() {
        assert_eq!(
            parse_args(&args(&["--event", "summer-1"])).expect("args"),
            Command::Run {
                event: Some("summer-1".to_string())
            }
        );
        assert_eq!(
            parse_args(&args(&["--event=summer-2"])).expect("args"),
            Command::Run {
                event: Some("summer-2".to_string())
            }
        );
        assert_eq!(
            parse_args(&args(&[])).expect("args"),
            Command::Run { event: None }
        );
    }

    #[test]
    fn test_parse_args_flags_and_errors() {
        assert_eq!(parse_args(&args(&["-h"])).expect("args"), Command::Help);
        assert_eq!(parse_args(&args(&["--version"])).expect("args"), Command::Version);
        assert!(parse_args(&args(&["--event"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}
