//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rota_engine::{AssignmentDate, HistoryStore, Intent, Workflow};
use tempfile::TempDir;

/// Date source pinned to 2024-03-15.
pub fn fixed_today() -> String {
    "20240315".to_string()
}

pub fn date(raw: &str) -> AssignmentDate {
    AssignmentDate::parse(raw).expect("valid date")
}

/// Temporary directory holding a not-yet-created database file.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("students.db");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> HistoryStore {
        HistoryStore::open(&self.path).expect("open store")
    }

    pub fn workflow(&self) -> Workflow {
        Workflow::with_today(self.open(), fixed_today)
    }
}

pub fn type_text(workflow: &mut Workflow, text: &str) {
    for c in text.chars() {
        workflow.handle(Intent::Edit(rota_engine::EditAction::Insert(c)));
    }
}

/// Add a student through the workflow, returning to the student list.
pub fn add_student(workflow: &mut Workflow, name: &str) {
    workflow.handle(Intent::AddStudent);
    type_text(workflow, name);
    workflow.handle(Intent::Confirm);
}
