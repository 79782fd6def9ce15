//! Per-state view model consumed by the shell.
//!
//! Styling is left to the renderer; this module decides only what text is
//! shown and in what order.

use rota_types::describe_date;

use crate::workflow::{Filter, Roster, Screen, Workflow};

/// One list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub primary: String,
    pub secondary: String,
    /// Rendered dimmed (hidden people).
    pub muted: bool,
}

/// Name filter line above the student list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterView {
    pub text: String,
    /// Cursor position in graphemes.
    pub cursor: usize,
    /// Keys are going to the filter rather than the list.
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<DisplayRow>,
    pub selected: usize,
    pub empty_message: &'static str,
    pub filter: Option<FilterView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView {
    pub prompt: String,
    pub text: String,
    /// Cursor position in graphemes.
    pub cursor: usize,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewBody {
    List(ListView),
    Text(TextView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub body: ViewBody,
    pub error: Option<String>,
}

impl View {
    /// Primary text of every list row; empty for text states.
    #[must_use]
    pub fn primary_texts(&self) -> Vec<&str> {
        match &self.body {
            ViewBody::List(list) => list.rows.iter().map(|r| r.primary.as_str()).collect(),
            ViewBody::Text(_) => Vec::new(),
        }
    }
}

impl Workflow {
    #[must_use]
    pub fn view(&self) -> View {
        let (title, body) = match self.screen() {
            Screen::SelectingStudent(picker) => {
                let muted = picker.roster == Roster::Hidden;
                let rows = picker
                    .visible()
                    .map(|c| DisplayRow {
                        primary: c.person.name.to_string(),
                        secondary: format!("Last assignment: {}", describe_date(c.last_activity)),
                        muted,
                    })
                    .collect();
                let (title, mut empty_message) = match picker.roster {
                    Roster::Eligible => (
                        "Select student",
                        "No students yet. Press 'a' to add one.",
                    ),
                    Roster::Hidden => ("Hidden people", "Nobody is hidden."),
                };
                let filter = picker.filter.draft().map(|draft| FilterView {
                    text: draft.text().to_string(),
                    cursor: draft.cursor(),
                    editing: picker.filter.is_editing(),
                });
                if !picker.candidates.is_empty() && !matches!(picker.filter, Filter::Off) {
                    empty_message = "No names match the filter.";
                }
                (
                    title.to_string(),
                    ViewBody::List(ListView {
                        rows,
                        selected: picker.selected,
                        empty_message,
                        filter,
                    }),
                )
            }
            Screen::SelectingCompanion(picker) => {
                let rows = picker
                    .candidates
                    .iter()
                    .map(|c| DisplayRow {
                        primary: c.person.name.to_string(),
                        secondary: format!(
                            "Last together: {} | Last assignment: {}",
                            describe_date(c.last_paired),
                            describe_date(c.last_activity)
                        ),
                        muted: false,
                    })
                    .collect();
                (
                    format!("Assign companion for: {}", picker.student.name),
                    ViewBody::List(ListView {
                        rows,
                        selected: picker.selected,
                        empty_message: "No one else is available.",
                        filter: None,
                    }),
                )
            }
            Screen::EnteringDate(entry) => (
                format!("Assigning {} with {}", entry.student.name, entry.companion.name),
                ViewBody::Text(TextView {
                    prompt: "Assignment date (YYYYMMDD):".to_string(),
                    text: entry.draft.text().to_string(),
                    cursor: entry.draft.cursor(),
                    placeholder: "YYYYMMDD",
                }),
            ),
            Screen::AddingStudent(entry) => (
                "Add new student".to_string(),
                ViewBody::Text(TextView {
                    prompt: "Name:".to_string(),
                    text: entry.draft.text().to_string(),
                    cursor: entry.draft.cursor(),
                    placeholder: "New student's name",
                }),
            ),
        };

        View {
            title,
            body,
            error: self.error().map(ToString::to_string),
        }
    }
}
