// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

/// Canonical status vocabulary offered by the editor. The wire carries
/// status as a plain string because the service also stores values outside
/// this set (legacy records use e.g. "Open"), so this enum never appears in
/// serde derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentStatus {
    New,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub const ALL: [Self; 4] = [Self::New, Self::InProgress, Self::Resolved, Self::Closed];

    pub const CHOICES: [&'static str; 4] = [
        Self::New.as_str(),
        Self::InProgress.as_str(),
        Self::Resolved.as_str(),
        Self::Closed.as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(Self::New),
            "In Progress" => Some(Self::InProgress),
            "Resolved" => Some(Self::Resolved),
            "Closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Canonical severity vocabulary, same stringly wire contract as
/// [`IncidentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub const CHOICES: [&'static str; 4] = [
        Self::Low.as_str(),
        Self::Medium.as_str(),
        Self::High.as_str(),
        Self::Critical.as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Reporter,
    Admin,
}

impl Permission {
    pub const ALL: [Self; 3] = [Self::View, Self::Reporter, Self::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Reporter => "reporter",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Self::View),
            "reporter" => Some(Self::Reporter),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Detail-view sub-pages. Purely local navigation, no history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Overview,
    Reports,
    Briefs,
    Agents,
}

impl DetailTab {
    pub const ALL: [Self; 4] = [Self::Overview, Self::Reports, Self::Briefs, Self::Agents];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Reports => "reports",
            Self::Briefs => "briefs",
            Self::Agents => "agents",
        }
    }
}

/// One entry in an incident's membership list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: UserId,
    pub permission: Permission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: ReportId,
    #[serde(default)]
    pub sender: String,
    #[serde(rename = "senderImg", default)]
    pub sender_img: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Preferred name for lists and member search. Empty `fullName` falls
    /// back to the first/last pair, matching the service's own display rule.
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// An incident as the service sends it. Field names mirror the JSON
/// (camelCase on the wire); unknown keys such as the `__v` version marker
/// are dropped on decode. Absent text fields decode as empty strings so the
/// filter and the views never trip over partial records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(rename = "_id")]
    pub id: IncidentId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default = "default_incident_status")]
    pub status: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "summaryResponse", default)]
    pub response: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "localGov", default)]
    pub local_gov: String,
    #[serde(rename = "affectedPopulation", default)]
    pub affected_population: u64,
    #[serde(default)]
    pub casualties: u64,
    #[serde(default)]
    pub witnesses: u64,
    #[serde(default)]
    pub resources: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(rename = "createdBy", default)]
    pub created_by: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339::option", default)]
    pub created_at: Option<OffsetDateTime>,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339::option", default)]
    pub updated_at: Option<OffsetDateTime>,
}

/// Editable fields of the detail overview, declared statically so the
/// editor never inspects record keys at runtime to pick a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Severity,
    Status,
    Summary,
    Response,
    Description,
    AffectedPopulation,
    Casualties,
    Witnesses,
    Resources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidget {
    Text,
    TextArea,
    Numeric,
    Choice(&'static [&'static str]),
}

impl EditField {
    pub const ALL: [Self; 9] = [
        Self::Severity,
        Self::Status,
        Self::Summary,
        Self::Response,
        Self::Description,
        Self::AffectedPopulation,
        Self::Casualties,
        Self::Witnesses,
        Self::Resources,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Severity => "severity",
            Self::Status => "status",
            Self::Summary => "summary",
            Self::Response => "response",
            Self::Description => "description",
            Self::AffectedPopulation => "affected population",
            Self::Casualties => "casualties",
            Self::Witnesses => "witnesses",
            Self::Resources => "resources",
        }
    }

    pub const fn widget(self) -> FieldWidget {
        match self {
            Self::Severity => FieldWidget::Choice(&IncidentSeverity::CHOICES),
            Self::Status => FieldWidget::Choice(&IncidentStatus::CHOICES),
            Self::Summary | Self::Response | Self::Description => FieldWidget::TextArea,
            Self::AffectedPopulation | Self::Casualties | Self::Witnesses => FieldWidget::Numeric,
            Self::Resources => FieldWidget::Text,
        }
    }
}

fn default_incident_status() -> String {
    IncidentStatus::New.as_str().to_owned()
}
