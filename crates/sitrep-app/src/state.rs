// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::draft::IncidentPatch;
use crate::filter::{FieldFilter, FilterCriteria, filter_incidents};
use crate::ids::{IncidentId, UserId};
use crate::model::{DetailTab, EditField, Incident, Permission, User};
use crate::overlay::EditOverlay;
use crate::selection::SelectionTracker;
use crate::store::RecordStore;

const COMMIT_SUCCESS_FALLBACK: &str = "incident updated";
const COMMIT_FAILURE_FALLBACK: &str = "failed to update incident";

/// Session coordinator: owns the record store, filter criteria, selection,
/// edit overlay, and detail tab, and is the single mutation path for all of
/// them. The front end feeds it commands and reacts to the returned events;
/// nothing else writes this state.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub store: RecordStore,
    pub criteria: FilterCriteria,
    pub selection: SelectionTracker,
    pub overlay: Option<EditOverlay>,
    pub active_tab: DetailTab,
    pub users: Vec<User>,
    pub status_line: Option<String>,
    next_request_id: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            store: RecordStore::default(),
            criteria: FilterCriteria::default(),
            selection: SelectionTracker::default(),
            overlay: None,
            active_tab: DetailTab::Overview,
            users: Vec::new(),
            status_line: None,
            next_request_id: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    ReplaceRecords(Vec<Incident>),
    ReplaceUsers(Vec<User>),
    SetSearch(String),
    SetKindFilter(FieldFilter),
    SetStatusFilter(FieldFilter),
    Select(IncidentId),
    ClearSelection,
    SwitchTab(DetailTab),
    NextTab,
    PrevTab,
    BeginEdit,
    CancelEdit,
    SetField(EditField, String),
    ToggleMember(UserId),
    SetMemberPermission(UserId, Permission),
    SubmitDraft,
    ResolveCommit {
        request_id: u64,
        outcome: CommitOutcome,
    },
    SetStatus(String),
    ClearStatus,
}

/// How a commit request came back from the update operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Succeeded {
        message: String,
        data: Option<Incident>,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RecordsReplaced(usize),
    UsersReplaced(usize),
    CriteriaChanged,
    SelectionChanged(Option<IncidentId>),
    TabChanged(DetailTab),
    EditStarted,
    EditCancelled,
    DraftChanged,
    DraftRejected {
        message: String,
    },
    CommitRequested {
        request_id: u64,
        incident_id: IncidentId,
        patch: IncidentPatch,
    },
    CommitSucceeded {
        message: String,
    },
    CommitFailed {
        message: String,
    },
    StatusUpdated(String),
    StatusCleared,
}

impl SessionState {
    pub fn new(records: Vec<Incident>, users: Vec<User>) -> Self {
        Self {
            store: RecordStore::new(records),
            users,
            ..Self::default()
        }
    }

    /// Current filtered list view, in store order.
    pub fn filtered(&self) -> Vec<&Incident> {
        filter_incidents(self.store.records(), &self.criteria)
    }

    /// Record backing the detail view. The overlay's own source wins so the
    /// detail view keeps showing last-known-good data even if the store
    /// entry vanished underneath the selection.
    pub fn detail_record(&self) -> Option<&Incident> {
        self.overlay
            .as_ref()
            .map(EditOverlay::source)
            .or_else(|| self.selection.current(&self.store))
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        match command {
            SessionCommand::ReplaceRecords(records) => {
                let count = records.len();
                self.store.replace_all(records);
                if !self.commit_in_flight() {
                    self.rebuild_overlay_from_selection();
                }
                vec![SessionEvent::RecordsReplaced(count)]
            }
            SessionCommand::ReplaceUsers(users) => {
                let count = users.len();
                self.users = users;
                vec![SessionEvent::UsersReplaced(count)]
            }
            SessionCommand::SetSearch(search) => {
                self.criteria.search = search;
                vec![SessionEvent::CriteriaChanged]
            }
            SessionCommand::SetKindFilter(filter) => {
                let status = self.set_status(&format!("type: {}", filter.label()));
                self.criteria.kind = filter;
                vec![SessionEvent::CriteriaChanged, status]
            }
            SessionCommand::SetStatusFilter(filter) => {
                let status = self.set_status(&format!("status: {}", filter.label()));
                self.criteria.status = filter;
                vec![SessionEvent::CriteriaChanged, status]
            }
            SessionCommand::Select(id) => {
                let changed = self.selection.current_id() != Some(&id);
                self.selection.select(Some(id.clone()));
                if !self.commit_in_flight() {
                    self.rebuild_overlay_from_selection();
                }
                let mut events = vec![SessionEvent::SelectionChanged(Some(id))];
                if changed {
                    self.active_tab = DetailTab::Overview;
                    events.push(SessionEvent::TabChanged(self.active_tab));
                }
                events
            }
            SessionCommand::ClearSelection => {
                // Dropping the overlay abandons any in-flight commit; its
                // late resolution can still refresh the store but will not
                // find an overlay to transition.
                self.selection.clear();
                self.overlay = None;
                vec![SessionEvent::SelectionChanged(None)]
            }
            SessionCommand::SwitchTab(tab) => {
                if self.selection.current_id().is_none() {
                    return Vec::new();
                }
                self.active_tab = tab;
                vec![SessionEvent::TabChanged(self.active_tab)]
            }
            SessionCommand::NextTab => self.rotate_tab(1),
            SessionCommand::PrevTab => self.rotate_tab(-1),
            SessionCommand::BeginEdit => {
                if self.overlay.as_mut().is_some_and(EditOverlay::begin_edit) {
                    let status = self.set_status("editing");
                    vec![SessionEvent::EditStarted, status]
                } else {
                    Vec::new()
                }
            }
            SessionCommand::CancelEdit => {
                if self.overlay.as_mut().is_some_and(EditOverlay::cancel) {
                    let status = self.set_status("edit cancelled");
                    vec![SessionEvent::EditCancelled, status]
                } else {
                    Vec::new()
                }
            }
            SessionCommand::SetField(field, value) => {
                match self.overlay.as_mut().and_then(EditOverlay::draft_mut) {
                    Some(draft) => {
                        draft.set_field(field, value);
                        vec![SessionEvent::DraftChanged]
                    }
                    None => Vec::new(),
                }
            }
            SessionCommand::ToggleMember(user) => {
                match self.overlay.as_mut().and_then(EditOverlay::draft_mut) {
                    Some(draft) => {
                        draft.toggle_member(&user);
                        vec![SessionEvent::DraftChanged]
                    }
                    None => Vec::new(),
                }
            }
            SessionCommand::SetMemberPermission(user, permission) => {
                match self.overlay.as_mut().and_then(EditOverlay::draft_mut) {
                    Some(draft) => {
                        draft.set_member_permission(&user, permission);
                        vec![SessionEvent::DraftChanged]
                    }
                    None => Vec::new(),
                }
            }
            SessionCommand::SubmitDraft => self.submit_draft(),
            SessionCommand::ResolveCommit {
                request_id,
                outcome,
            } => self.resolve_commit(request_id, outcome),
            SessionCommand::SetStatus(message) => vec![self.set_status(&message)],
            SessionCommand::ClearStatus => {
                self.status_line = None;
                vec![SessionEvent::StatusCleared]
            }
        }
    }

    fn submit_draft(&mut self) -> Vec<SessionEvent> {
        let request_id = self.next_request_id;
        let Some(overlay) = self.overlay.as_mut() else {
            return Vec::new();
        };
        // `submit` refuses everything but Editing, so a second submit while
        // a commit is outstanding falls out here as a no-op.
        let Some(attempt) = overlay.submit(request_id) else {
            return Vec::new();
        };
        match attempt {
            Ok(patch) => {
                let incident_id = overlay.source().id.clone();
                self.next_request_id += 1;
                let status = self.set_status("saving changes");
                vec![
                    SessionEvent::CommitRequested {
                        request_id,
                        incident_id,
                        patch,
                    },
                    status,
                ]
            }
            Err(error) => {
                let message = error.to_string();
                let status = self.set_status(&message);
                vec![SessionEvent::DraftRejected { message }, status]
            }
        }
    }

    fn resolve_commit(&mut self, request_id: u64, outcome: CommitOutcome) -> Vec<SessionEvent> {
        match outcome {
            CommitOutcome::Succeeded { message, data } => {
                let confirmed = self
                    .overlay
                    .as_mut()
                    .and_then(|overlay| overlay.resolve_success(request_id, data.clone()));
                match confirmed {
                    Some(record) => {
                        self.store.upsert(record);
                        self.reconcile_overlay_with_selection();
                        let message = if message.is_empty() {
                            COMMIT_SUCCESS_FALLBACK.to_owned()
                        } else {
                            message
                        };
                        let status = self.set_status(&message);
                        vec![SessionEvent::CommitSucceeded { message }, status]
                    }
                    None => {
                        // Stale or abandoned commit. Fresh server data still
                        // wins a store refresh; no notification.
                        if let Some(record) = data {
                            self.store.upsert(record);
                        }
                        Vec::new()
                    }
                }
            }
            CommitOutcome::Failed { message } => {
                let landed = self
                    .overlay
                    .as_mut()
                    .is_some_and(|overlay| overlay.resolve_failure(request_id));
                if !landed {
                    return Vec::new();
                }
                self.reconcile_overlay_with_selection();
                let message = if message.is_empty() {
                    COMMIT_FAILURE_FALLBACK.to_owned()
                } else {
                    message
                };
                let status = self.set_status(&message);
                vec![SessionEvent::CommitFailed { message }, status]
            }
        }
    }

    fn commit_in_flight(&self) -> bool {
        self.overlay
            .as_ref()
            .is_some_and(EditOverlay::is_committing)
    }

    /// The overlay follows a selection that moved while a commit was in
    /// flight, success or failure alike; any draft on the departed record
    /// is forfeit.
    fn reconcile_overlay_with_selection(&mut self) {
        let overlay_id = self
            .overlay
            .as_ref()
            .map(|overlay| overlay.source().id.clone());
        if self.selection.current_id() != overlay_id.as_ref() {
            self.rebuild_overlay_from_selection();
        }
    }

    fn rebuild_overlay_from_selection(&mut self) {
        self.overlay = self
            .selection
            .current(&self.store)
            .cloned()
            .map(EditOverlay::new);
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<SessionEvent> {
        if self.selection.current_id().is_none() {
            return Vec::new();
        }
        let tabs = DetailTab::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![SessionEvent::TabChanged(self.active_tab)]
    }

    fn set_status(&mut self, message: &str) -> SessionEvent {
        self.status_line = Some(message.to_owned());
        SessionEvent::StatusUpdated(message.to_owned())
    }
}
