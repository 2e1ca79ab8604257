// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::IncidentId;
use crate::model::Incident;
use crate::store::RecordStore;

/// Single nullable selection slot shared by the list and detail views.
/// Holds only the id; the record is re-derived from the store on every read
/// so a selection that outlived its record simply reads as empty.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    current: Option<IncidentId>,
}

impl SelectionTracker {
    /// Overwrites the slot. Passing `None` is the same as [`clear`].
    ///
    /// [`clear`]: Self::clear
    pub fn select(&mut self, id: Option<IncidentId>) {
        self.current = id;
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current_id(&self) -> Option<&IncidentId> {
        self.current.as_ref()
    }

    pub fn current<'a>(&self, store: &'a RecordStore) -> Option<&'a Incident> {
        self.current.as_ref().and_then(|id| store.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        let records = ["a", "b"]
            .iter()
            .map(|id| {
                serde_json::from_str(&format!(r#"{{"_id": "{id}", "title": "{id}"}}"#))
                    .expect("decode fixture incident")
            })
            .collect();
        RecordStore::new(records)
    }

    #[test]
    fn selecting_twice_keeps_only_the_last() {
        let store = store();
        let mut selection = SelectionTracker::default();

        selection.select(Some(IncidentId::from("a")));
        selection.select(Some(IncidentId::from("b")));

        assert_eq!(selection.current_id(), Some(&IncidentId::from("b")));
        assert_eq!(selection.current(&store).map(|r| r.id.get()), Some("b"));
    }

    #[test]
    fn selecting_none_clears_the_slot() {
        let mut selection = SelectionTracker::default();
        selection.select(Some(IncidentId::from("a")));
        selection.select(None);
        assert!(selection.current_id().is_none());
    }

    #[test]
    fn stale_selection_reads_as_empty() {
        let store = store();
        let mut selection = SelectionTracker::default();
        selection.select(Some(IncidentId::from("gone")));
        assert!(selection.current(&store).is_none());
        assert!(selection.current_id().is_some());
    }
}
