// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use sitrep_api::{ApiClient, UpdateResponse};
use sitrep_app::{Incident, IncidentId, IncidentPatch, User};
use sitrep_testkit::IncidentFaker;
use sitrep_tui::{CommitEvent, CommitReceipt, InternalEvent, SessionRuntime};
use std::sync::mpsc::Sender;
use std::thread;

pub struct ApiRuntime {
    client: ApiClient,
}

impl ApiRuntime {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn receipt_from_envelope(envelope: UpdateResponse) -> CommitReceipt {
    CommitReceipt {
        accepted: envelope.success,
        message: envelope.message,
        record: envelope.data,
    }
}

impl SessionRuntime for ApiRuntime {
    fn fetch_incidents(&mut self) -> Result<Vec<Incident>> {
        self.client.fetch_incidents()
    }

    fn fetch_users(&mut self) -> Result<Vec<User>> {
        self.client.fetch_users()
    }

    fn update_incident(
        &mut self,
        incident: &IncidentId,
        patch: &IncidentPatch,
    ) -> Result<CommitReceipt> {
        Ok(receipt_from_envelope(
            self.client.update_incident(incident, patch)?,
        ))
    }

    fn spawn_commit(
        &mut self,
        request_id: u64,
        incident: &IncidentId,
        patch: &IncidentPatch,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let incident = incident.clone();
        let patch = patch.clone();

        thread::spawn(move || {
            let event = match client.update_incident(&incident, &patch) {
                Ok(envelope) => InternalEvent::Commit(CommitEvent::Completed {
                    request_id,
                    receipt: receipt_from_envelope(envelope),
                }),
                Err(error) => InternalEvent::Commit(CommitEvent::Failed {
                    request_id,
                    error: error.to_string(),
                }),
            };
            // A closed channel means the session already exited.
            let _ = tx.send(event);
        });

        Ok(())
    }
}

/// Offline runtime backed by generated fixtures. Commits mutate the
/// in-memory records, so edits survive a refresh within the session.
pub struct DemoRuntime {
    incidents: Vec<Incident>,
    users: Vec<User>,
}

impl DemoRuntime {
    pub fn seeded(seed: u64) -> Self {
        let mut faker = IncidentFaker::new(seed);
        let users = faker.users(6);
        let incidents = faker.incidents(18, &users);
        Self { incidents, users }
    }
}

impl SessionRuntime for DemoRuntime {
    fn fetch_incidents(&mut self) -> Result<Vec<Incident>> {
        Ok(self.incidents.clone())
    }

    fn fetch_users(&mut self) -> Result<Vec<User>> {
        Ok(self.users.clone())
    }

    fn update_incident(
        &mut self,
        incident: &IncidentId,
        patch: &IncidentPatch,
    ) -> Result<CommitReceipt> {
        let Some(existing) = self.incidents.iter_mut().find(|record| record.id == *incident)
        else {
            return Ok(CommitReceipt {
                accepted: false,
                message: format!("incident {} not found", incident.get()),
                record: None,
            });
        };

        let updated = patch.apply_to(existing);
        *existing = updated.clone();
        Ok(CommitReceipt {
            accepted: true,
            message: "Incident updated".to_owned(),
            record: Some(updated),
        })
    }
}
