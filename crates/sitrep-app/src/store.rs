// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::IncidentId;
use crate::model::Incident;

/// Authoritative in-memory incident collection for the session. The service
/// is the system of record; this holds what was last fetched or confirmed,
/// in the order the service returned it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Incident>,
}

impl RecordStore {
    pub fn new(records: Vec<Incident>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Incident] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &IncidentId) -> Option<&Incident> {
        self.records.iter().find(|record| record.id == *id)
    }

    /// Replaces the whole collection, e.g. after a fresh fetch.
    pub fn replace_all(&mut self, records: Vec<Incident>) {
        self.records = records;
    }

    /// Replaces the record with the same id in place, preserving list
    /// order; unknown ids are appended.
    pub fn upsert(&mut self, incident: Incident) {
        match self.records.iter_mut().find(|record| record.id == incident.id) {
            Some(slot) => *slot = incident,
            None => self.records.push(incident),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str, title: &str) -> Incident {
        serde_json::from_str(&format!(r#"{{"_id": "{id}", "title": "{title}"}}"#))
            .expect("decode fixture incident")
    }

    #[test]
    fn upsert_replaces_in_place_without_reordering() {
        let mut store = RecordStore::new(vec![
            incident("a", "first"),
            incident("b", "second"),
            incident("c", "third"),
        ]);

        store.upsert(incident("b", "second, revised"));

        let titles: Vec<&str> = store
            .records()
            .iter()
            .map(|record| record.title.as_str())
            .collect();
        assert_eq!(titles, ["first", "second, revised", "third"]);
    }

    #[test]
    fn upsert_appends_unknown_ids() {
        let mut store = RecordStore::new(vec![incident("a", "first")]);
        store.upsert(incident("z", "late arrival"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&IncidentId::from("z")).map(|r| r.title.as_str()), Some("late arrival"));
    }
}
