// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::draft::{IncidentDraft, IncidentPatch};
use crate::model::Incident;

/// Commit that has left the overlay but not yet resolved. The patch is kept
/// so a success without a response body can still refresh the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub request_id: u64,
    pub patch: IncidentPatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayMode {
    Viewing,
    Editing,
    Committing(PendingCommit),
}

/// Detail-view edit state for one incident: the authoritative source record,
/// a draft that only diverges while Editing, and the mode gate that keeps at
/// most one commit outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOverlay {
    source: Incident,
    draft: IncidentDraft,
    mode: OverlayMode,
}

impl EditOverlay {
    pub fn new(source: Incident) -> Self {
        let draft = IncidentDraft::from_source(&source);
        Self {
            source,
            draft,
            mode: OverlayMode::Viewing,
        }
    }

    pub fn source(&self) -> &Incident {
        &self.source
    }

    pub fn draft(&self) -> &IncidentDraft {
        &self.draft
    }

    pub fn mode(&self) -> &OverlayMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == OverlayMode::Editing
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.mode, OverlayMode::Committing(_))
    }

    pub fn request_in_flight(&self) -> Option<u64> {
        match &self.mode {
            OverlayMode::Committing(pending) => Some(pending.request_id),
            _ => None,
        }
    }

    /// Draft mutations are only honored while Editing.
    pub fn draft_mut(&mut self) -> Option<&mut IncidentDraft> {
        self.is_editing().then_some(&mut self.draft)
    }

    /// Viewing -> Editing. The draft is reseeded from source so edits always
    /// start from the record as last confirmed.
    pub fn begin_edit(&mut self) -> bool {
        if self.mode != OverlayMode::Viewing {
            return false;
        }
        self.draft = IncidentDraft::from_source(&self.source);
        self.mode = OverlayMode::Editing;
        true
    }

    /// Editing -> Viewing. Discards the draft, no network involved.
    pub fn cancel(&mut self) -> bool {
        if self.mode != OverlayMode::Editing {
            return false;
        }
        self.draft = IncidentDraft::from_source(&self.source);
        self.mode = OverlayMode::Viewing;
        true
    }

    /// Editing -> Committing. Returns the coerced patch to hand to the
    /// update operation, or the validation error (mode unchanged). Returns
    /// `None` unless currently Editing, which is the re-entrancy guard: a
    /// second submit while one commit is outstanding does nothing.
    pub fn submit(&mut self, request_id: u64) -> Option<Result<IncidentPatch>> {
        if !self.is_editing() {
            return None;
        }
        match self.draft.to_patch() {
            Ok(patch) => {
                self.mode = OverlayMode::Committing(PendingCommit {
                    request_id,
                    patch: patch.clone(),
                });
                Some(Ok(patch))
            }
            Err(error) => Some(Err(error)),
        }
    }

    /// Committing -> Viewing for the matching request. The confirmed record
    /// (server-returned, or the patch applied over the old source) becomes
    /// the new source and is handed back for the record store. Resolutions
    /// for any other request id leave the overlay untouched.
    pub fn resolve_success(
        &mut self,
        request_id: u64,
        server_record: Option<Incident>,
    ) -> Option<Incident> {
        match std::mem::replace(&mut self.mode, OverlayMode::Viewing) {
            OverlayMode::Committing(pending) if pending.request_id == request_id => {
                let confirmed =
                    server_record.unwrap_or_else(|| pending.patch.apply_to(&self.source));
                self.source = confirmed.clone();
                self.draft = IncidentDraft::from_source(&self.source);
                Some(confirmed)
            }
            other => {
                self.mode = other;
                None
            }
        }
    }

    /// Committing -> Editing for the matching request, draft untouched so
    /// nothing the user typed is lost.
    pub fn resolve_failure(&mut self, request_id: u64) -> bool {
        match &self.mode {
            OverlayMode::Committing(pending) if pending.request_id == request_id => {
                self.mode = OverlayMode::Editing;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditField;

    fn source() -> Incident {
        serde_json::from_str(
            r#"{
                "_id": "65a1",
                "title": "Fire in Bay 4",
                "type": "Fire",
                "status": "Open",
                "severity": "High",
                "casualties": 3
            }"#,
        )
        .expect("decode fixture incident")
    }

    fn editing_overlay() -> EditOverlay {
        let mut overlay = EditOverlay::new(source());
        assert!(overlay.begin_edit());
        overlay
    }

    #[test]
    fn cancel_discards_edits_and_returns_to_viewing() {
        let mut overlay = editing_overlay();
        overlay
            .draft_mut()
            .expect("draft editable while editing")
            .set_field(EditField::Severity, "Low".to_owned());

        assert!(overlay.cancel());
        assert_eq!(overlay.draft().severity, "High");
        assert_eq!(*overlay.mode(), OverlayMode::Viewing);
    }

    #[test]
    fn draft_is_frozen_outside_editing() {
        let mut overlay = EditOverlay::new(source());
        assert!(overlay.draft_mut().is_none());
        assert!(!overlay.cancel());

        assert!(overlay.begin_edit());
        assert!(!overlay.begin_edit());
    }

    #[test]
    fn second_submit_while_committing_is_a_no_op() {
        let mut overlay = editing_overlay();
        let first = overlay.submit(1).expect("first submit accepted");
        assert!(first.is_ok());
        assert_eq!(overlay.request_in_flight(), Some(1));

        assert!(overlay.submit(2).is_none());
        assert_eq!(overlay.request_in_flight(), Some(1));
    }

    #[test]
    fn invalid_numeric_field_keeps_the_overlay_editing() {
        let mut overlay = editing_overlay();
        overlay
            .draft_mut()
            .expect("draft editable while editing")
            .set_field(EditField::Casualties, "a few".to_owned());

        let attempt = overlay.submit(1).expect("submit attempted");
        assert!(attempt.is_err());
        assert!(overlay.is_editing());
        assert_eq!(overlay.draft().casualties, "a few");
    }

    #[test]
    fn success_with_server_record_adopts_it_as_source() {
        let mut overlay = editing_overlay();
        overlay.submit(1).expect("submit accepted").expect("valid draft");

        let mut confirmed = source();
        confirmed.severity = "Critical".to_owned();
        let stored = overlay
            .resolve_success(1, Some(confirmed.clone()))
            .expect("matching resolution lands");

        assert_eq!(stored, confirmed);
        assert_eq!(overlay.source().severity, "Critical");
        assert_eq!(overlay.draft().severity, "Critical");
        assert_eq!(*overlay.mode(), OverlayMode::Viewing);
    }

    #[test]
    fn success_without_record_falls_back_to_the_patch() {
        let mut overlay = editing_overlay();
        overlay
            .draft_mut()
            .expect("draft editable while editing")
            .set_field(EditField::Casualties, "9".to_owned());
        overlay.submit(1).expect("submit accepted").expect("valid draft");

        let stored = overlay
            .resolve_success(1, None)
            .expect("matching resolution lands");
        assert_eq!(stored.casualties, 9);
        assert_eq!(overlay.source().casualties, 9);
    }

    #[test]
    fn failure_returns_to_editing_with_draft_intact() {
        let mut overlay = editing_overlay();
        overlay
            .draft_mut()
            .expect("draft editable while editing")
            .set_field(EditField::Summary, "still typing".to_owned());
        overlay.submit(1).expect("submit accepted").expect("valid draft");

        assert!(overlay.resolve_failure(1));
        assert!(overlay.is_editing());
        assert_eq!(overlay.draft().summary, "still typing");
        assert_eq!(overlay.source().summary, "");
    }

    #[test]
    fn resolutions_for_other_requests_are_ignored() {
        let mut overlay = editing_overlay();
        overlay.submit(7).expect("submit accepted").expect("valid draft");

        assert!(overlay.resolve_success(8, None).is_none());
        assert!(!overlay.resolve_failure(8));
        assert_eq!(overlay.request_in_flight(), Some(7));
    }
}
