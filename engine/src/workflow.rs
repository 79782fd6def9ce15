//! Assignment workflow state machine.
//!
//! ```text
//! SelectingStudent --select--> SelectingCompanion --select--> EnteringDate
//!     ^   |   ^                        |                          |
//!     |  add  +--------cancel----------+          commit ---------+
//!     |   v                                                       |
//!  AddingStudent                                                  v
//!                                                         SelectingStudent
//! ```
//!
//! Each state owns its payload (candidate list, cursor, text buffer), so
//! leaving a state drops everything it loaded. Errors are held beside the
//! state that raised it until the next key acknowledges them.
//!
//! The student screen can also narrow its rows with a name [`Filter`]; while
//! the query is being typed the screen reads text instead of list keys.

use thiserror::Error;
use tracing::{debug, error, warn};

use rota_store::{HistoryStore, StoreError};
use rota_types::{
    AssignmentDate, CompanionCandidate, InvalidDateError, Person, PersonId, StudentCandidate,
};

use crate::draft::DraftInput;

/// Grapheme limit for the name buffer.
pub const NAME_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    InvalidDate(#[from] InvalidDateError),
}

/// Discrete user intents forwarded by the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    NavigateUp,
    NavigateDown,
    Confirm,
    Cancel,
    Quit,
    AddStudent,
    ToggleHidden,
    ToggleShowHidden,
    /// Start (or resume) typing a name filter on the student screen.
    Filter,
    Edit(EditAction),
}

/// Raw text editing, meaningful only in text-entry states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Which roster the student screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Roster {
    #[default]
    Eligible,
    Hidden,
}

/// Payload-free name of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    SelectingStudent,
    SelectingCompanion,
    EnteringDate,
    AddingStudent,
}

/// Whether the current state reads list navigation or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    List,
    Text,
}

/// Name filter on the student screen.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    #[default]
    Off,
    /// Query is being typed; keys go to the buffer.
    Editing(DraftInput),
    /// Query is fixed; keys navigate the matching rows.
    Applied(DraftInput),
}

impl Filter {
    #[must_use]
    pub fn draft(&self) -> Option<&DraftInput> {
        match self {
            Self::Off => None,
            Self::Editing(draft) | Self::Applied(draft) => Some(draft),
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// Case-insensitive substring match; an empty query matches everyone.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self.draft().map(DraftInput::text) {
            None | Some("") => true,
            Some(query) => name.to_lowercase().contains(&query.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentPicker {
    pub(crate) roster: Roster,
    pub(crate) candidates: Vec<StudentCandidate>,
    /// Index into the rows that pass the filter.
    pub(crate) selected: usize,
    pub(crate) filter: Filter,
}

impl StudentPicker {
    pub(crate) fn visible(&self) -> impl Iterator<Item = &StudentCandidate> {
        self.candidates
            .iter()
            .filter(|c| self.filter.matches(c.person.name.as_str()))
    }

    fn current(&self) -> Option<&StudentCandidate> {
        self.visible().nth(self.selected)
    }

    /// Typing into the name filter. Enter keeps the query, Esc drops it.
    fn edit_filter(&mut self, intent: Intent) {
        match intent {
            Intent::Edit(action) => {
                if let Filter::Editing(draft) = &mut self.filter {
                    apply_edit(draft, action);
                }
                self.selected = 0;
            }
            Intent::Confirm => {
                if let Filter::Editing(draft) = std::mem::take(&mut self.filter)
                    && !draft.text().is_empty()
                {
                    self.filter = Filter::Applied(draft);
                }
                self.reselect(None);
            }
            Intent::Cancel => {
                let current = self.current().map(|c| c.person.id);
                self.filter = Filter::Off;
                self.reselect(current);
            }
            _ => {}
        }
    }

    /// Point the cursor at `id` if it is visible, else clamp it.
    fn reselect(&mut self, id: Option<PersonId>) {
        let position = id.and_then(|id| self.visible().position(|c| c.person.id == id));
        let len = self.visible().count();
        self.selected = position.unwrap_or(self.selected).min(len.saturating_sub(1));
    }
}

#[derive(Debug, Clone)]
pub struct CompanionPicker {
    pub(crate) student: Person,
    pub(crate) candidates: Vec<CompanionCandidate>,
    pub(crate) selected: usize,
}

#[derive(Debug, Clone)]
pub struct DateEntry {
    pub(crate) student: Person,
    pub(crate) companion: Person,
    pub(crate) draft: DraftInput,
}

#[derive(Debug, Clone)]
pub struct NameEntry {
    pub(crate) draft: DraftInput,
}

#[derive(Debug, Clone)]
pub enum Screen {
    SelectingStudent(StudentPicker),
    SelectingCompanion(CompanionPicker),
    EnteringDate(DateEntry),
    AddingStudent(NameEntry),
}

impl Default for Screen {
    fn default() -> Self {
        Self::SelectingStudent(StudentPicker::default())
    }
}

impl Screen {
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        match self {
            Self::SelectingStudent(_) => WorkflowState::SelectingStudent,
            Self::SelectingCompanion(_) => WorkflowState::SelectingCompanion,
            Self::EnteringDate(_) => WorkflowState::EnteringDate,
            Self::AddingStudent(_) => WorkflowState::AddingStudent,
        }
    }
}

/// Today's local date as `YYYYMMDD`.
#[must_use]
pub fn today_stamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Drives the student → companion → date → commit loop over a [`HistoryStore`].
pub struct Workflow {
    store: HistoryStore,
    screen: Screen,
    error: Option<WorkflowError>,
    quit: bool,
    today: fn() -> String,
}

impl Workflow {
    /// Start on the student list, loaded from the store.
    pub fn new(store: HistoryStore) -> Self {
        Self::with_today(store, today_stamp)
    }

    /// Like [`Workflow::new`] with a custom source for the pre-filled date.
    pub fn with_today(store: HistoryStore, today: fn() -> String) -> Self {
        let mut workflow = Self {
            store,
            screen: Screen::default(),
            error: None,
            quit: false,
            today,
        };
        workflow.screen = workflow.student_screen(Roster::Eligible);
        workflow
    }

    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.screen.state()
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    #[must_use]
    pub fn input_kind(&self) -> InputKind {
        match &self.screen {
            Screen::SelectingStudent(picker) if picker.filter.is_editing() => InputKind::Text,
            Screen::SelectingStudent(_) | Screen::SelectingCompanion(_) => InputKind::List,
            Screen::EnteringDate(_) | Screen::AddingStudent(_) => InputKind::Text,
        }
    }

    /// Name filter on the student screen, if that is the current state.
    #[must_use]
    pub fn filter(&self) -> Option<&Filter> {
        match &self.screen {
            Screen::SelectingStudent(picker) => Some(&picker.filter),
            _ => None,
        }
    }

    /// Roster shown on the student screen, if that is the current state.
    #[must_use]
    pub fn roster(&self) -> Option<Roster> {
        match &self.screen {
            Screen::SelectingStudent(picker) => Some(picker.roster),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    #[must_use]
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Hand the store back for an explicit close at shutdown.
    pub fn into_store(self) -> HistoryStore {
        self.store
    }

    /// Apply one intent.
    ///
    /// While an error is displayed, quit still exits and every other intent
    /// only acknowledges the error.
    pub fn handle(&mut self, intent: Intent) {
        if self.quit {
            return;
        }
        if intent == Intent::Quit {
            debug!(state = ?self.state(), "Quit requested");
            self.quit = true;
            return;
        }
        if self.error.take().is_some() {
            return;
        }

        let from = self.state();
        let screen = std::mem::take(&mut self.screen);
        self.screen = match screen {
            Screen::SelectingStudent(picker) => self.on_student_list(picker, intent),
            Screen::SelectingCompanion(picker) => self.on_companion_list(picker, intent),
            Screen::EnteringDate(entry) => self.on_date_entry(entry, intent),
            Screen::AddingStudent(entry) => self.on_name_entry(entry, intent),
        };

        let to = self.state();
        if from != to {
            debug!(?from, ?to, "Workflow transition");
        }
    }

    fn fail(&mut self, err: impl Into<WorkflowError>) {
        let err = err.into();
        if matches!(&err, WorkflowError::Store(store) if store.is_io()) {
            error!(error = %err, "Store operation failed");
        } else {
            warn!(error = %err, "Workflow action rejected");
        }
        self.error = Some(err);
    }

    /// Freshly loaded student screen; on failure the list is empty and the
    /// error is displayed.
    fn student_screen(&mut self, roster: Roster) -> Screen {
        let listed = match roster {
            Roster::Eligible => self.store.list_eligible_students(),
            Roster::Hidden => self.store.list_hidden_people(),
        };
        let candidates = listed.unwrap_or_else(|err| {
            self.fail(err);
            Vec::new()
        });
        Screen::SelectingStudent(StudentPicker {
            roster,
            candidates,
            selected: 0,
            filter: Filter::Off,
        })
    }

    fn on_student_list(&mut self, mut picker: StudentPicker, intent: Intent) -> Screen {
        if picker.filter.is_editing() {
            picker.edit_filter(intent);
            return Screen::SelectingStudent(picker);
        }

        match intent {
            Intent::NavigateUp => picker.selected = picker.selected.saturating_sub(1),
            Intent::NavigateDown => {
                picker.selected = step_down(picker.selected, picker.visible().count());
            }
            Intent::Filter => {
                picker.filter = match std::mem::take(&mut picker.filter) {
                    Filter::Applied(draft) => Filter::Editing(draft),
                    _ => Filter::Editing(DraftInput::new(NAME_LIMIT)),
                };
            }
            Intent::Cancel if matches!(picker.filter, Filter::Applied(_)) => {
                let current = picker.current().map(|c| c.person.id);
                picker.filter = Filter::Off;
                picker.reselect(current);
            }
            Intent::Confirm if picker.roster == Roster::Eligible => {
                let Some(chosen) = picker.current() else {
                    return Screen::SelectingStudent(picker);
                };
                let student = chosen.person.clone();
                match self.store.list_eligible_companions(student.id) {
                    Ok(candidates) => {
                        return Screen::SelectingCompanion(CompanionPicker {
                            student,
                            candidates,
                            selected: 0,
                        });
                    }
                    Err(err) => self.fail(err),
                }
            }
            Intent::AddStudent => {
                return Screen::AddingStudent(NameEntry {
                    draft: DraftInput::new(NAME_LIMIT),
                });
            }
            Intent::ToggleHidden => {
                let Some(chosen) = picker.current() else {
                    return Screen::SelectingStudent(picker);
                };
                let person = &chosen.person;
                if let Err(err) = self.store.set_hidden(person.id, !person.hidden) {
                    self.fail(err);
                    return Screen::SelectingStudent(picker);
                }
                return self.refreshed(picker);
            }
            Intent::ToggleShowHidden => {
                let roster = match picker.roster {
                    Roster::Eligible => Roster::Hidden,
                    Roster::Hidden => Roster::Eligible,
                };
                return self.student_screen(roster);
            }
            Intent::Cancel if picker.roster == Roster::Hidden => {
                return self.student_screen(Roster::Eligible);
            }
            _ => {}
        }
        Screen::SelectingStudent(picker)
    }

    /// Reload the same roster, keeping the filter and the cursor in range.
    fn refreshed(&mut self, picker: StudentPicker) -> Screen {
        let mut screen = self.student_screen(picker.roster);
        if let Screen::SelectingStudent(fresh) = &mut screen {
            fresh.filter = picker.filter;
            fresh.selected = picker.selected;
            fresh.reselect(None);
        }
        screen
    }

    fn on_companion_list(&mut self, mut picker: CompanionPicker, intent: Intent) -> Screen {
        match intent {
            Intent::NavigateUp => picker.selected = picker.selected.saturating_sub(1),
            Intent::NavigateDown => {
                picker.selected = step_down(picker.selected, picker.candidates.len());
            }
            Intent::Confirm => {
                let Some(chosen) = picker.candidates.get(picker.selected) else {
                    return Screen::SelectingCompanion(picker);
                };
                let today = (self.today)();
                return Screen::EnteringDate(DateEntry {
                    companion: chosen.person.clone(),
                    student: picker.student,
                    draft: DraftInput::with_text(AssignmentDate::LEN, &today),
                });
            }
            Intent::Cancel => return self.student_screen(Roster::Eligible),
            _ => {}
        }
        Screen::SelectingCompanion(picker)
    }

    fn on_date_entry(&mut self, mut entry: DateEntry, intent: Intent) -> Screen {
        match intent {
            Intent::Edit(action) => apply_edit(&mut entry.draft, action),
            Intent::Confirm => {
                let date = match AssignmentDate::parse(entry.draft.text()) {
                    Ok(date) => date,
                    Err(err) => {
                        self.fail(err);
                        return Screen::EnteringDate(entry);
                    }
                };
                if let Err(err) =
                    self.store
                        .record_assignment(entry.student.id, entry.companion.id, date)
                {
                    self.fail(err);
                    return Screen::EnteringDate(entry);
                }
                return self.student_screen(Roster::Eligible);
            }
            Intent::Cancel => match self.store.list_eligible_companions(entry.student.id) {
                Ok(candidates) => {
                    let selected = candidates
                        .iter()
                        .position(|c| c.person.id == entry.companion.id)
                        .unwrap_or(0);
                    return Screen::SelectingCompanion(CompanionPicker {
                        student: entry.student,
                        candidates,
                        selected,
                    });
                }
                Err(err) => self.fail(err),
            },
            _ => {}
        }
        Screen::EnteringDate(entry)
    }

    fn on_name_entry(&mut self, mut entry: NameEntry, intent: Intent) -> Screen {
        match intent {
            Intent::Edit(action) => apply_edit(&mut entry.draft, action),
            Intent::Confirm => match self.store.add_person(entry.draft.text()) {
                Ok(person) => {
                    let mut screen = self.student_screen(Roster::Eligible);
                    if let Screen::SelectingStudent(picker) = &mut screen {
                        picker.selected = picker
                            .candidates
                            .iter()
                            .position(|c| c.person.id == person.id)
                            .unwrap_or(0);
                    }
                    return screen;
                }
                Err(err) => self.fail(err),
            },
            Intent::Cancel => return self.student_screen(Roster::Eligible),
            _ => {}
        }
        Screen::AddingStudent(entry)
    }
}

fn step_down(selected: usize, len: usize) -> usize {
    if selected + 1 < len {
        selected + 1
    } else {
        selected
    }
}

fn apply_edit(draft: &mut DraftInput, action: EditAction) {
    match action {
        EditAction::Insert(c) => draft.enter_char(c),
        EditAction::Paste(text) => draft.enter_text(&text),
        EditAction::Backspace => draft.delete_char(),
        EditAction::Delete => draft.delete_char_forward(),
        EditAction::Left => draft.move_cursor_left(),
        EditAction::Right => draft.move_cursor_right(),
        EditAction::Home => draft.move_cursor_home(),
        EditAction::End => draft.move_cursor_end(),
    }
}
