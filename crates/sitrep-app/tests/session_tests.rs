// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use sitrep_app::{
    CommitOutcome, DetailTab, EditField, FieldFilter, FilterCriteria, Incident, IncidentDraft,
    IncidentId, IncidentPatch, Permission, SessionCommand, SessionEvent, SessionState, UserId,
    filter_incidents,
};
use sitrep_testkit::IncidentFaker;

fn record(json: &str) -> Incident {
    serde_json::from_str(json).expect("decode fixture incident")
}

fn bay_fire_records() -> Vec<Incident> {
    vec![
        record(
            r#"{
                "_id": "1",
                "title": "Fire in Bay 4",
                "type": "Fire",
                "status": "Open",
                "severity": "High",
                "casualties": 3,
                "createdBy": "u-1"
            }"#,
        ),
        record(
            r#"{
                "_id": "2",
                "title": "Spill",
                "type": "Chemical",
                "status": "Closed",
                "severity": "Low"
            }"#,
        ),
    ]
}

fn requested_commit(events: &[SessionEvent]) -> Option<(u64, IncidentId, IncidentPatch)> {
    events.iter().find_map(|event| match event {
        SessionEvent::CommitRequested {
            request_id,
            incident_id,
            patch,
        } => Some((*request_id, incident_id.clone(), patch.clone())),
        _ => None,
    })
}

fn editing_session_on(id: &str) -> SessionState {
    let mut session = SessionState::new(bay_fire_records(), Vec::new());
    session.dispatch(SessionCommand::Select(IncidentId::from(id)));
    session.dispatch(SessionCommand::BeginEdit);
    session
}

#[test]
fn filtered_view_is_an_ordered_subsequence_of_the_store() {
    let mut faker = IncidentFaker::new(42);
    let users = faker.users(4);
    let records = faker.incidents(30, &users);

    let criteria = FilterCriteria {
        search: "e".to_owned(),
        kind: FieldFilter::All,
        status: FieldFilter::Value("Resolved".to_owned()),
    };
    let filtered = filter_incidents(&records, &criteria);

    // Every survivor matches, and survivors appear in store order.
    let mut cursor = 0;
    for incident in &filtered {
        assert!(criteria.matches(incident));
        let position = records[cursor..]
            .iter()
            .position(|candidate| candidate.id == incident.id)
            .expect("filtered record present downstream of the previous one");
        cursor += position + 1;
    }

    let everything = filter_incidents(&records, &FilterCriteria::default());
    assert_eq!(everything.len(), records.len());
}

#[test]
fn fire_search_matches_only_the_fire_record() {
    let mut session = SessionState::new(bay_fire_records(), Vec::new());
    session.dispatch(SessionCommand::SetSearch("fire".to_owned()));

    let filtered = session.filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id.get(), "1");
}

#[test]
fn selecting_a_then_b_leaves_exactly_b_selected() {
    let mut session = SessionState::new(bay_fire_records(), Vec::new());
    session.dispatch(SessionCommand::Select(IncidentId::from("1")));
    session.dispatch(SessionCommand::Select(IncidentId::from("2")));

    assert_eq!(session.selection.current_id(), Some(&IncidentId::from("2")));
    assert_eq!(session.detail_record().map(|r| r.id.get()), Some("2"));
}

#[test]
fn cancel_restores_the_source_severity_without_a_network_call() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::Severity,
        "Critical".to_owned(),
    ));

    let events = session.dispatch(SessionCommand::CancelEdit);
    assert!(requested_commit(&events).is_none());
    assert!(events.contains(&SessionEvent::EditCancelled));

    let overlay = session.overlay.as_ref().expect("overlay kept after cancel");
    assert_eq!(overlay.draft().severity, "High");
    assert!(!overlay.is_editing());
}

#[test]
fn numeric_input_commits_as_a_number_and_refreshes_the_store() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::AffectedPopulation,
        "12".to_owned(),
    ));

    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (request_id, incident_id, patch) =
        requested_commit(&events).expect("submit issues a commit request");
    assert_eq!(incident_id.get(), "1");
    assert_eq!(patch.affected_population, 12);

    // Server echoes the updated record, as the live endpoint does.
    let mut confirmed = bay_fire_records().remove(0);
    confirmed.affected_population = 12;
    let events = session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Succeeded {
            message: String::new(),
            data: Some(confirmed),
        },
    });
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::CommitSucceeded { message } if message == "incident updated"
    )));

    let stored = session
        .store
        .get(&IncidentId::from("1"))
        .expect("record still in store");
    assert_eq!(stored.affected_population, 12);
}

#[test]
fn committing_an_unchanged_draft_leaves_the_store_identical() {
    let original = bay_fire_records().remove(0);
    let mut session = editing_session_on("1");

    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (request_id, _, _) = requested_commit(&events).expect("submit issues a commit request");

    session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Succeeded {
            message: String::new(),
            data: None,
        },
    });

    let stored = session
        .store
        .get(&IncidentId::from("1"))
        .expect("record still in store");
    assert_eq!(*stored, original);
}

#[test]
fn invalid_numeric_input_rejects_the_draft_before_any_request() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::Casualties,
        "a few".to_owned(),
    ));

    let events = session.dispatch(SessionCommand::SubmitDraft);
    assert!(requested_commit(&events).is_none());
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::DraftRejected { message } if message.contains("casualties")
    )));

    let overlay = session.overlay.as_ref().expect("overlay survives rejection");
    assert!(overlay.is_editing());
    assert_eq!(overlay.draft().casualties, "a few");
}

#[test]
fn blank_numeric_input_commits_as_zero() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(EditField::Casualties, String::new()));

    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (_, _, patch) = requested_commit(&events).expect("submit issues a commit request");
    assert_eq!(patch.casualties, 0);
}

#[test]
fn membership_toggle_adds_once_and_removes_cleanly() {
    let mut session = editing_session_on("1");
    let user = UserId::from("u-7");

    session.dispatch(SessionCommand::ToggleMember(user.clone()));
    {
        let draft = session.overlay.as_ref().expect("overlay present").draft();
        assert_eq!(draft.members.len(), 1);
        assert_eq!(draft.members[0].user, user);
        assert_eq!(draft.members[0].permission, Permission::View);
    }

    session.dispatch(SessionCommand::SetMemberPermission(
        user.clone(),
        Permission::Admin,
    ));
    {
        let draft = session.overlay.as_ref().expect("overlay present").draft();
        assert_eq!(draft.members[0].permission, Permission::Admin);
    }

    session.dispatch(SessionCommand::ToggleMember(user.clone()));
    let draft = session.overlay.as_ref().expect("overlay present").draft();
    assert!(draft.members.is_empty());
}

#[test]
fn failed_commit_keeps_the_draft_and_reports_exactly_once() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::Summary,
        "half-written note".to_owned(),
    ));

    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (request_id, _, _) = requested_commit(&events).expect("submit issues a commit request");

    let events = session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Failed {
            message: "connection reset".to_owned(),
        },
    });
    let failures = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::CommitFailed { .. }))
        .count();
    assert_eq!(failures, 1);

    let overlay = session.overlay.as_ref().expect("overlay survives failure");
    assert!(overlay.is_editing());
    assert_eq!(overlay.draft().summary, "half-written note");
    assert_eq!(overlay.source().summary, "");

    // The failure already resolved the request; a duplicate resolution for
    // the same id must not produce a second notification.
    let replay = session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Failed {
            message: "connection reset".to_owned(),
        },
    });
    assert!(replay.is_empty());
}

#[test]
fn second_submit_while_committing_is_a_no_op() {
    let mut session = editing_session_on("1");
    let events = session.dispatch(SessionCommand::SubmitDraft);
    assert!(requested_commit(&events).is_some());

    let second = session.dispatch(SessionCommand::SubmitDraft);
    assert!(second.is_empty());
}

#[test]
fn selection_moved_during_commit_reconciles_after_resolve() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::Status,
        "Resolved".to_owned(),
    ));
    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (request_id, _, _) = requested_commit(&events).expect("submit issues a commit request");

    // Navigating away mid-commit defers the overlay rebuild.
    session.dispatch(SessionCommand::Select(IncidentId::from("2")));
    assert_eq!(
        session.overlay.as_ref().map(|o| o.source().id.get()),
        Some("1"),
    );

    let events = session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Succeeded {
            message: "saved".to_owned(),
            data: None,
        },
    });
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::CommitSucceeded { message } if message == "saved"
    )));

    // The commit landed in the store, and the overlay now follows the
    // current selection.
    assert_eq!(
        session
            .store
            .get(&IncidentId::from("1"))
            .map(|r| r.status.as_str()),
        Some("Resolved"),
    );
    assert_eq!(
        session.overlay.as_ref().map(|o| o.source().id.get()),
        Some("2"),
    );
    assert_eq!(session.active_tab, DetailTab::Overview);
}

#[test]
fn selection_moved_during_commit_reconciles_after_failure() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::Summary,
        "half-written note".to_owned(),
    ));
    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (request_id, _, _) = requested_commit(&events).expect("submit issues a commit request");

    // Navigating away mid-commit defers the overlay rebuild.
    session.dispatch(SessionCommand::Select(IncidentId::from("2")));
    assert_eq!(
        session.overlay.as_ref().map(|o| o.source().id.get()),
        Some("1"),
    );

    let events = session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Failed {
            message: "connection reset".to_owned(),
        },
    });
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::CommitFailed { message } if message == "connection reset"
    )));

    // The overlay follows the current selection even though the commit
    // failed; the draft typed against the departed record is gone.
    let overlay = session
        .overlay
        .as_ref()
        .expect("overlay rebuilt from selection");
    assert_eq!(overlay.source().id.get(), "2");
    assert!(!overlay.is_editing());
    assert_eq!(overlay.draft().summary, "");
}

#[test]
fn clearing_selection_abandons_the_commit_but_keeps_fresh_data() {
    let mut session = editing_session_on("1");
    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (request_id, _, _) = requested_commit(&events).expect("submit issues a commit request");

    session.dispatch(SessionCommand::ClearSelection);
    assert!(session.overlay.is_none());

    let mut confirmed = bay_fire_records().remove(0);
    confirmed.witnesses = 99;
    let events = session.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome: CommitOutcome::Succeeded {
            message: "saved".to_owned(),
            data: Some(confirmed),
        },
    });

    // No overlay to transition and no notification, but the server's copy
    // still refreshes the store.
    assert!(events.is_empty());
    assert_eq!(
        session.store.get(&IncidentId::from("1")).map(|r| r.witnesses),
        Some(99),
    );
}

#[test]
fn stale_resolution_does_not_touch_a_newer_commit() {
    let mut session = editing_session_on("1");
    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (first_request, _, _) = requested_commit(&events).expect("first commit request");

    session.dispatch(SessionCommand::ResolveCommit {
        request_id: first_request,
        outcome: CommitOutcome::Failed {
            message: "timed out".to_owned(),
        },
    });

    session.dispatch(SessionCommand::SetField(
        EditField::Witnesses,
        "4".to_owned(),
    ));
    let events = session.dispatch(SessionCommand::SubmitDraft);
    let (second_request, _, _) = requested_commit(&events).expect("second commit request");
    assert_ne!(first_request, second_request);

    // The first request's response finally arrives after the retry went
    // out. It must not resolve the newer commit.
    let events = session.dispatch(SessionCommand::ResolveCommit {
        request_id: first_request,
        outcome: CommitOutcome::Succeeded {
            message: "late".to_owned(),
            data: None,
        },
    });
    assert!(events.is_empty());
    let overlay = session.overlay.as_ref().expect("overlay present");
    assert_eq!(overlay.request_in_flight(), Some(second_request));
}

#[test]
fn tab_switching_preserves_overlay_and_selection() {
    let mut session = editing_session_on("1");
    session.dispatch(SessionCommand::SetField(
        EditField::Resources,
        "water tankers".to_owned(),
    ));

    session.dispatch(SessionCommand::SwitchTab(DetailTab::Agents));
    session.dispatch(SessionCommand::SwitchTab(DetailTab::Overview));

    assert_eq!(session.selection.current_id(), Some(&IncidentId::from("1")));
    let overlay = session.overlay.as_ref().expect("overlay untouched by tabs");
    assert!(overlay.is_editing());
    assert_eq!(overlay.draft().resources, "water tankers");
}

#[test]
fn draft_seeds_from_source_and_excludes_server_managed_fields() {
    let session = editing_session_on("1");
    let overlay = session.overlay.as_ref().expect("overlay present");
    let expected = IncidentDraft::from_source(overlay.source());
    assert_eq!(*overlay.draft(), expected);
    assert_eq!(overlay.draft().casualties, "3");
    assert_eq!(overlay.draft().created_by, "u-1");
}
