//! Rota CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`rota_engine`] (workflow and history store) and
//! [`rota_tui`] (rendering and key mapping), providing RAII-based terminal
//! management with guaranteed cleanup.
//!
//! ```text
//! main() -> HistoryStore::open -> TerminalSession::new() -> run_app() -> Workflow + TUI
//! ```
//!
//! # Event Loop
//!
//! The loop is blocking: draw, wait for the next terminal event, apply it,
//! repeat until the workflow asks to quit.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rota_engine::{HistoryStore, RotaConfig, UiOptions, Workflow, resolve_db_path, rota_dir};
use rota_tui::{draw, handle_event};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_rota_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than write over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_rota_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = rota_log_file_candidates();
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn rota_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.rota/logs/rota.log
    if let Some(dir) = rota_dir() {
        candidates.push(dir.join("logs").join("rota.log"));
    }

    // Fallback: ./.rota/logs/rota.log
    candidates.push(PathBuf::from(".rota").join("logs").join("rota.log"));

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode, bracketed paste and the alternate screen are restored on drop,
/// so the terminal stays usable after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = match RotaConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "Ignoring config: {err}");
            None
        }
    };
    let options = config
        .as_ref()
        .map(RotaConfig::ui_options)
        .unwrap_or_default();

    let db_path = resolve_db_path(config.as_ref());
    let store = HistoryStore::open(&db_path)
        .with_context(|| format!("failed to open history store at {}", db_path.display()))?;

    let mut workflow = Workflow::new(store);

    let run_result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut workflow, options)
    };

    if let Err(err) = workflow.into_store().close() {
        tracing::error!("Failed to close history store: {err}");
        eprintln!("Failed to close history store: {err}");
    }

    if let Err(err) = &run_result {
        tracing::error!("Terminal loop failed: {err:?}");
    }
    run_result
}

fn run_app<B>(terminal: &mut Terminal<B>, workflow: &mut Workflow, options: UiOptions) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|frame| draw(frame, workflow, options))?;

        let event = event::read()?;
        if handle_event(workflow, event) {
            tracing::info!("Quit requested");
            return Ok(());
        }
    }
}
