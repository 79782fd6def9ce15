//! Input handling for the Rota TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use rota_engine::{EditAction, InputKind, Intent, Workflow};

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Apply one terminal event to the workflow. Returns `true` once the
/// workflow wants to exit.
pub fn handle_event(workflow: &mut Workflow, event: Event) -> bool {
    if let Some(intent) = map_event(workflow, event) {
        debug!(?intent, "Intent");
        workflow.handle(intent);
    }
    workflow.should_quit()
}

/// Translate a terminal event into an intent for the current state.
#[must_use]
pub fn map_event(workflow: &Workflow, event: Event) -> Option<Intent> {
    match event {
        Event::Key(key) => {
            // Handle press + repeat events (ignore releases)
            if matches!(key.kind, KeyEventKind::Release) {
                return None;
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Some(Intent::Quit);
            }

            // Any other key dismisses a displayed error.
            if workflow.error().is_some() {
                return Some(Intent::Cancel);
            }

            match workflow.input_kind() {
                InputKind::List => map_list_key(key),
                InputKind::Text => map_text_key(key),
            }
        }
        Event::Paste(text) => match workflow.input_kind() {
            InputKind::Text if workflow.error().is_none() => Some(Intent::Edit(
                EditAction::Paste(normalize_line_endings(&text)),
            )),
            _ => None,
        },
        _ => None,
    }
}

fn map_list_key(key: KeyEvent) -> Option<Intent> {
    let intent = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Intent::NavigateUp,
        KeyCode::Down | KeyCode::Char('j') => Intent::NavigateDown,
        KeyCode::Enter => Intent::Confirm,
        KeyCode::Esc => Intent::Cancel,
        KeyCode::Char('a') => Intent::AddStudent,
        KeyCode::Char('h') => Intent::ToggleHidden,
        KeyCode::Char('H') => Intent::ToggleShowHidden,
        KeyCode::Char('/') => Intent::Filter,
        KeyCode::Char('q') => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}

fn map_text_key(key: KeyEvent) -> Option<Intent> {
    let intent = match key.code {
        KeyCode::Enter => Intent::Confirm,
        KeyCode::Esc => Intent::Cancel,
        KeyCode::Backspace => Intent::Edit(EditAction::Backspace),
        KeyCode::Delete => Intent::Edit(EditAction::Delete),
        KeyCode::Left => Intent::Edit(EditAction::Left),
        KeyCode::Right => Intent::Edit(EditAction::Right),
        KeyCode::Home => Intent::Edit(EditAction::Home),
        KeyCode::End => Intent::Edit(EditAction::End),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Intent::Edit(EditAction::Insert(c))
        }
        _ => return None,
    };
    Some(intent)
}
