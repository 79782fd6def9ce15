//! End-to-end rotation behavior over a file-backed store.

use rota_engine::{Intent, PersonId, ViewBody, WorkflowState};

use crate::common::{TempDb, add_student, date};

fn names(store: &rota_engine::HistoryStore) -> Vec<String> {
    store
        .list_eligible_students()
        .expect("list")
        .into_iter()
        .map(|c| c.person.name.to_string())
        .collect()
}

#[test]
fn a_week_of_pairings_rotates_everyone() {
    let db = TempDb::new();
    let mut store = db.open();
    let ids: Vec<PersonId> = ["Ana", "Bob", "Cid", "Dee"]
        .iter()
        .map(|name| store.add_person(name).expect("add").id)
        .collect();

    for day in ["20240101", "20240102", "20240103", "20240104"] {
        let students = store.list_eligible_students().expect("list");
        let main = students[0].person.id;
        let companions = store.list_eligible_companions(main).expect("companions");
        let assistant = companions[0].person.id;
        store
            .record_assignment(main, assistant, date(day))
            .expect("record");
    }

    // Everyone has been scheduled at least once.
    for id in &ids {
        let history = store.assignments_for(*id).expect("history");
        assert!(!history.is_empty(), "person {id} never scheduled");
    }
}

#[test]
fn hiding_keeps_history_for_ranking_others() {
    let db = TempDb::new();
    let mut store = db.open();
    let ana = store.add_person("Ana").expect("add").id;
    let bob = store.add_person("Bob").expect("add").id;
    let cid = store.add_person("Cid").expect("add").id;
    store
        .record_assignment(ana, bob, date("20240101"))
        .expect("record");

    store.set_hidden(bob, true).expect("hide");
    assert_eq!(names(&store), ["Cid", "Ana"]);

    let companions = store.list_eligible_companions(cid).expect("companions");
    let listed: Vec<PersonId> = companions.iter().map(|c| c.person.id).collect();
    assert_eq!(listed, [ana]);
    assert_eq!(companions[0].last_activity, Some(date("20240101")));

    assert_eq!(store.assignments_for(bob).expect("history").len(), 1);
}

#[test]
fn shell_flow_from_empty_roster() {
    let db = TempDb::new();
    let mut workflow = db.workflow();
    assert_eq!(workflow.view().primary_texts(), Vec::<&str>::new());

    add_student(&mut workflow, "Bob");
    add_student(&mut workflow, "Ana");
    assert_eq!(workflow.view().primary_texts(), ["Ana", "Bob"]);

    // Ana is selected after adding; pair her with Bob today.
    workflow.handle(Intent::Confirm);
    assert_eq!(workflow.state(), WorkflowState::SelectingCompanion);
    workflow.handle(Intent::Confirm);
    assert_eq!(workflow.state(), WorkflowState::EnteringDate);
    workflow.handle(Intent::Confirm);

    let view = workflow.view();
    let ViewBody::List(list) = view.body else {
        panic!("expected student list");
    };
    assert!(
        list.rows
            .iter()
            .all(|row| row.secondary == "Last assignment: 2024-03-15")
    );
}
