// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::Serialize;

use crate::ids::UserId;
use crate::model::{EditField, Incident, Member, Permission};

/// Working copy of an incident's editable fields. Server-managed fields
/// (id, timestamps, nested reports) are never copied in, so a draft cannot
/// leak them back on commit. Numeric fields stay strings while editing and
/// are only coerced when the draft is turned into a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentDraft {
    pub title: String,
    pub kind: String,
    pub severity: String,
    pub status: String,
    pub summary: String,
    pub response: String,
    pub description: String,
    pub date: String,
    pub state: String,
    pub local_gov: String,
    pub affected_population: String,
    pub casualties: String,
    pub witnesses: String,
    pub resources: String,
    pub members: Vec<Member>,
    pub created_by: String,
}

impl IncidentDraft {
    pub fn from_source(source: &Incident) -> Self {
        Self {
            title: source.title.clone(),
            kind: source.kind.clone(),
            severity: source.severity.clone(),
            status: source.status.clone(),
            summary: source.summary.clone(),
            response: source.response.clone(),
            description: source.description.clone(),
            date: source.date.clone(),
            state: source.state.clone(),
            local_gov: source.local_gov.clone(),
            affected_population: source.affected_population.to_string(),
            casualties: source.casualties.to_string(),
            witnesses: source.witnesses.to_string(),
            resources: source.resources.clone(),
            members: source.members.clone(),
            created_by: source.created_by.clone(),
        }
    }

    pub fn field(&self, field: EditField) -> &str {
        match field {
            EditField::Severity => &self.severity,
            EditField::Status => &self.status,
            EditField::Summary => &self.summary,
            EditField::Response => &self.response,
            EditField::Description => &self.description,
            EditField::AffectedPopulation => &self.affected_population,
            EditField::Casualties => &self.casualties,
            EditField::Witnesses => &self.witnesses,
            EditField::Resources => &self.resources,
        }
    }

    pub fn set_field(&mut self, field: EditField, value: String) {
        match field {
            EditField::Severity => self.severity = value,
            EditField::Status => self.status = value,
            EditField::Summary => self.summary = value,
            EditField::Response => self.response = value,
            EditField::Description => self.description = value,
            EditField::AffectedPopulation => self.affected_population = value,
            EditField::Casualties => self.casualties = value,
            EditField::Witnesses => self.witnesses = value,
            EditField::Resources => self.resources = value,
        }
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.iter().any(|member| member.user == *user)
    }

    /// Adds the user with the default `view` permission, or removes an
    /// existing entry. Check-before-add keeps the list duplicate-free.
    pub fn toggle_member(&mut self, user: &UserId) {
        if self.is_member(user) {
            self.members.retain(|member| member.user != *user);
        } else {
            self.members.push(Member {
                user: user.clone(),
                permission: Permission::View,
            });
        }
    }

    /// Replaces the permission on an existing member entry only; other
    /// entries and non-members are left untouched.
    pub fn set_member_permission(&mut self, user: &UserId, permission: Permission) {
        if let Some(member) = self.members.iter_mut().find(|member| member.user == *user) {
            member.permission = permission;
        }
    }

    /// Validates and coerces the draft into the commit body. Numeric rule:
    /// blank coerces to 0, anything else must parse as a non-negative
    /// whole number or the draft is rejected as-is.
    pub fn to_patch(&self) -> Result<IncidentPatch> {
        Ok(IncidentPatch {
            title: self.title.clone(),
            kind: self.kind.clone(),
            severity: self.severity.clone(),
            status: self.status.clone(),
            summary: self.summary.clone(),
            response: self.response.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            state: self.state.clone(),
            local_gov: self.local_gov.clone(),
            affected_population: coerce_count(
                EditField::AffectedPopulation,
                &self.affected_population,
            )?,
            casualties: coerce_count(EditField::Casualties, &self.casualties)?,
            witnesses: coerce_count(EditField::Witnesses, &self.witnesses)?,
            resources: self.resources.clone(),
            members: self.members.clone(),
            created_by: self.created_by.clone(),
        })
    }
}

/// JSON body sent to the update endpoint. Key names match the service's
/// camelCase schema; numerics are integers after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentPatch {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub status: String,
    pub summary: String,
    #[serde(rename = "summaryResponse")]
    pub response: String,
    pub description: String,
    pub date: String,
    pub state: String,
    #[serde(rename = "localGov")]
    pub local_gov: String,
    #[serde(rename = "affectedPopulation")]
    pub affected_population: u64,
    pub casualties: u64,
    pub witnesses: u64,
    pub resources: String,
    pub members: Vec<Member>,
    #[serde(rename = "createdBy")]
    pub created_by: String,
}

impl IncidentPatch {
    /// Fallback source refresh for a successful commit whose response body
    /// carried no record: the patch lands on a copy of the old source, and
    /// server-managed fields ride through unchanged.
    pub fn apply_to(&self, source: &Incident) -> Incident {
        let mut updated = source.clone();
        updated.title = self.title.clone();
        updated.kind = self.kind.clone();
        updated.severity = self.severity.clone();
        updated.status = self.status.clone();
        updated.summary = self.summary.clone();
        updated.response = self.response.clone();
        updated.description = self.description.clone();
        updated.date = self.date.clone();
        updated.state = self.state.clone();
        updated.local_gov = self.local_gov.clone();
        updated.affected_population = self.affected_population;
        updated.casualties = self.casualties;
        updated.witnesses = self.witnesses;
        updated.resources = self.resources.clone();
        updated.members = self.members.clone();
        updated.created_by = self.created_by.clone();
        updated
    }
}

fn coerce_count(field: EditField, value: &str) -> Result<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    match trimmed.parse::<u64>() {
        Ok(count) => Ok(count),
        Err(_) => bail!(
            "{} must be a whole number, got {trimmed:?} -- enter digits or clear the field",
            field.label()
        ),
    }
}
