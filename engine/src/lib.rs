//! Core engine for Rota - the assignment workflow without TUI dependencies.
//!
//! The shell feeds [`Intent`]s into a [`Workflow`] and renders its [`View`];
//! the workflow talks to the [`HistoryStore`] for candidate lists and writes.

mod config;
mod draft;
mod view;
mod workflow;


pub use config::{
    AppConfig, ConfigError, DB_PATH_ENV, RotaConfig, StoreConfig, config_path, expand_env_vars,
    resolve_db_path, rota_dir,
};
pub use draft::DraftInput;
pub use view::{DisplayRow, FilterView, ListView, TextView, View, ViewBody};
pub use workflow::{
    CompanionPicker, DateEntry, EditAction, Filter, InputKind, Intent, NAME_LIMIT, NameEntry, Roster,
    Screen, StudentPicker, Workflow, WorkflowError, WorkflowState, today_stamp,
};

pub use rota_store::{HistoryStore, StoreError};
pub use rota_types::ui::UiOptions;
pub use rota_types::{
    AssignmentDate, CompanionCandidate, InvalidDateError, Person, PersonId, StudentCandidate,
};
