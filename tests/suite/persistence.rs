//! History survives closing and reopening the database file.

use rota_engine::{Intent, StoreError, ViewBody, WorkflowError, WorkflowState};

use crate::common::{TempDb, add_student, date};

#[test]
fn open_creates_missing_directories_and_schema() {
    let db = TempDb::new();
    assert!(!db.path().exists());

    let store = db.open();
    assert!(db.path().exists());
    assert!(store.list_eligible_students().expect("list").is_empty());
    store.close().expect("close");
}

#[test]
fn reopening_keeps_people_hidden_flags_and_assignments() {
    let db = TempDb::new();
    {
        let mut store = db.open();
        let ana = store.add_person("Ana").expect("add");
        let bob = store.add_person("Bob").expect("add");
        let old = store.add_person("Old").expect("add");
        store
            .record_assignment(ana.id, bob.id, date("20240101"))
            .expect("record");
        store.set_hidden(old.id, true).expect("hide");
        store.close().expect("close");
    }

    let store = db.open();
    let students = store.list_eligible_students().expect("list");
    let names: Vec<&str> = students.iter().map(|c| c.person.name.as_str()).collect();
    assert_eq!(names, ["Ana", "Bob"]);
    assert_eq!(students[0].last_activity, Some(date("20240101")));

    let hidden = store.list_hidden_people().expect("hidden");
    assert_eq!(hidden.len(), 1);
    assert_eq!(hidden[0].person.name.as_str(), "Old");

    let companions = store
        .list_eligible_companions(students[0].person.id)
        .expect("companions");
    assert_eq!(companions.len(), 1);
    assert_eq!(companions[0].last_paired, Some(date("20240101")));
}

#[test]
fn bootstrap_is_idempotent() {
    let db = TempDb::new();
    for _ in 0..3 {
        let store = db.open();
        store.close().expect("close");
    }
    let mut store = db.open();
    store.add_person("Ana").expect("add");
    assert_eq!(store.list_eligible_students().expect("list").len(), 1);
}

#[test]
fn unique_names_hold_across_sessions() {
    let db = TempDb::new();
    {
        let mut store = db.open();
        store.add_person("Ana").expect("add");
        store.close().expect("close");
    }

    let mut store = db.open();
    let err = store.add_person("Ana").unwrap_err();
    assert!(matches!(err, StoreError::DuplicateName(name) if name == "Ana"));
}

#[test]
fn workflow_commit_is_durable() {
    let db = TempDb::new();
    {
        let mut workflow = db.workflow();
        add_student(&mut workflow, "Ana");
        add_student(&mut workflow, "Bob");

        workflow.handle(Intent::NavigateUp);
        workflow.handle(Intent::Confirm);
        workflow.handle(Intent::Confirm);
        workflow.handle(Intent::Confirm);
        assert_eq!(workflow.state(), WorkflowState::SelectingStudent);
        assert!(workflow.error().is_none());

        workflow.into_store().close().expect("close");
    }

    let workflow = db.workflow();
    let store = workflow.store();
    let students = store.list_eligible_students().expect("list");
    for student in &students {
        assert_eq!(student.last_activity, Some(date("20240315")));
        let history = store.assignments_for(student.person.id).expect("history");
        assert_eq!(history.len(), 1);
    }
}

#[test]
fn store_failure_on_commit_keeps_date_entry() {
    let db = TempDb::new();
    let mut workflow = db.workflow();
    add_student(&mut workflow, "Ana");
    add_student(&mut workflow, "Bob");

    workflow.handle(Intent::Confirm);
    workflow.handle(Intent::Confirm);
    assert_eq!(workflow.state(), WorkflowState::EnteringDate);

    let other = rusqlite::Connection::open(db.path()).expect("second connection");
    other
        .execute_batch("DROP TABLE assignments")
        .expect("drop assignments");
    drop(other);

    workflow.handle(Intent::Confirm);
    assert_eq!(workflow.state(), WorkflowState::EnteringDate);
    assert!(matches!(
        workflow.error(),
        Some(WorkflowError::Store(StoreError::Io { .. }))
    ));

    // Acknowledging keeps the typed date for another attempt.
    workflow.handle(Intent::Cancel);
    assert!(workflow.error().is_none());
    assert_eq!(workflow.state(), WorkflowState::EnteringDate);
    let ViewBody::Text(text) = workflow.view().body else {
        panic!("expected date entry");
    };
    assert_eq!(text.text, "20240315");
}

#[cfg(unix)]
#[test]
fn database_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let db = TempDb::new();
    db.open().close().expect("close");

    let mode = std::fs::metadata(db.path())
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
