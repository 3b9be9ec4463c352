//! A whiskey log viewer with drag-to-refresh.
//!
//! Run the binary with a collection file to browse purchases and tastings.
//! Drag a pane down from its top with the mouse to reload the file.
//! Run with `--print-sample` to get a starter collection.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    refresh_runtime::{spawn_refresh, RefreshUpdate},
    state::AppState,
};
use crate::core::collection::{Collection, CollectionLoader, SAMPLE_COLLECTION};

/// Animation frame interval (20 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Whiskey log viewer with drag-to-refresh")]
struct Cli {
    /// Collection file to open.
    #[arg(default_value = "collection.toml")]
    path: PathBuf,

    /// Pull distance (logical px) past which a release reloads.
    #[arg(long)]
    threshold: Option<f64>,

    /// Drag damping factor, 0 < r <= 1.
    #[arg(long)]
    resistance: Option<f64>,

    /// Start with pull-to-refresh disabled.
    #[arg(long = "no-pull")]
    no_pull: bool,

    /// Artificial delay before each reload, in milliseconds.
    #[arg(long = "refresh-delay-ms", default_value_t = 0)]
    refresh_delay_ms: u64,

    /// Write logs here instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Print a sample collection file and exit.
    #[arg(long = "print-sample")]
    print_sample: bool,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    if cli.print_sample {
        print!("{SAMPLE_COLLECTION}");
        return Ok(());
    }

    // ── settings: config file, then CLI overrides ─────────────
    let mut user_config = config::AppConfig::load();
    if let Some(threshold) = cli.threshold {
        user_config.threshold = threshold;
    }
    if let Some(resistance) = cli.resistance {
        user_config.resistance = resistance;
    }
    if cli.no_pull {
        user_config.pull_enabled = false;
    }
    user_config.pull_config().validate()?;

    let loader = Arc::new(
        CollectionLoader::new(cli.path.clone())
            .with_delay(Duration::from_millis(cli.refresh_delay_ms)),
    );
    let mut state = AppState::new(cli.path.clone(), user_config)?;

    // ── initial load (without the artificial delay) ───────────
    match CollectionLoader::new(cli.path.clone()).load().await {
        Ok(collection) => state.replace_collection(collection),
        Err(err) => {
            tracing::warn!("initial load failed: {err}");
            state.status_message = Some(format!("{err} (pull down to retry)"));
        }
    }

    // ── terminal setup ────────────────────────────────────────
    let mut terminal = setup_terminal()?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(250));
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<RefreshUpdate<Collection>>();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // ── event loop ────────────────────────────────────────────
    let outcome: Result<()> = loop {
        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &mut state)) {
            break Err(err.into());
        }

        // Handlers only hand out the ticket; the action runs here.
        if let Some(ticket) = state.pending_refresh.take() {
            spawn_refresh(refresh_tx.clone(), ticket, Arc::clone(&loader));
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Pointer(p) => handler::handle_pointer(&mut state, p),
                    AppEvent::Wheel { column, row, down } => {
                        handler::handle_wheel(&mut state, column, row, down)
                    }
                    AppEvent::Resize(_, _) | AppEvent::Tick => {}
                }
            }

            Some(update) = refresh_rx.recv() => {
                state.apply_refresh(update.ticket, update.result, update.elapsed);
            }

            _ = frames.tick() => handler::handle_tick(&mut state),
        }

        if state.should_quit {
            break Ok(());
        }
    };

    // ── teardown ──────────────────────────────────────────────
    restore_terminal()?;
    terminal.show_cursor()?;

    outcome
}

// ───────────────────────────────────────── terminal ─────────

type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Raw mode, alternate screen, mouse capture.  A failure part-way through
/// leaves the terminal as it was found.
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    undo_on_error(
        (|| -> Result<Tui> {
            execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
            Ok(Terminal::new(CrosstermBackend::new(stderr()))?)
        })(),
        restore_terminal,
    )
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), LeaveAlternateScreen, DisableMouseCapture)
}

/// Run `undo` when `result` is an error, keeping the original error.
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce() -> io::Result<()>) -> Result<T> {
    if result.is_err() {
        if let Err(err) = undo() {
            tracing::warn!("terminal restore failed: {err}");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_setup_is_undone() {
        let undone = Cell::new(false);
        let result: Result<()> = undo_on_error(Err(anyhow::anyhow!("no tty")), || {
            undone.set(true);
            Ok(())
        });
        assert!(undone.get());
        assert_eq!(result.unwrap_err().to_string(), "no tty");
    }

    #[test]
    fn successful_setup_is_kept() {
        let undone = Cell::new(false);
        let result = undo_on_error(Ok(7), || {
            undone.set(true);
            Ok(())
        });
        assert!(!undone.get());
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn undo_error_does_not_mask_setup_error() {
        let result: Result<()> = undo_on_error(Err(anyhow::anyhow!("no tty")), || {
            Err(io::Error::other("still raw"))
        });
        assert_eq!(result.unwrap_err().to_string(), "no tty");
    }
}
