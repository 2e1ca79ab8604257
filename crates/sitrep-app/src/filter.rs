// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Incident;

/// Categorical filter slot: either the "All" sentinel or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldFilter {
    #[default]
    All,
    Value(String),
}

impl FieldFilter {
    /// Maps an option-list entry back to a filter. The first entry of every
    /// option list is the "All" sentinel.
    pub fn from_option(option: &str) -> Self {
        if option == ALL_OPTION {
            Self::All
        } else {
            Self::Value(option.to_owned())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Value(expected) => expected == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_OPTION,
            Self::Value(value) => value,
        }
    }
}

/// Live filter state for the incident list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub search: String,
    pub kind: FieldFilter,
    pub status: FieldFilter,
}

impl FilterCriteria {
    /// Title search is a case-insensitive contains; kind and status are
    /// exact matches unless set to "All".
    pub fn matches(&self, incident: &Incident) -> bool {
        incident
            .title
            .to_lowercase()
            .contains(&self.search.to_lowercase())
            && self.kind.matches(&incident.kind)
            && self.status.matches(&incident.status)
    }
}

pub const ALL_OPTION: &str = "All";

/// Pure projection of the record list through the criteria. Keeps input
/// order, so the result is always a stable subsequence of `records`.
pub fn filter_incidents<'a>(records: &'a [Incident], criteria: &FilterCriteria) -> Vec<&'a Incident> {
    records
        .iter()
        .filter(|incident| criteria.matches(incident))
        .collect()
}

/// Distinct `type` values in first-observed order, behind the "All"
/// sentinel.
pub fn kind_options(records: &[Incident]) -> Vec<String> {
    observed_options(records.iter().map(|incident| incident.kind.as_str()))
}

/// Distinct `status` values in first-observed order, behind the "All"
/// sentinel.
pub fn status_options(records: &[Incident]) -> Vec<String> {
    observed_options(records.iter().map(|incident| incident.status.as_str()))
}

fn observed_options<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut options = vec![ALL_OPTION.to_owned()];
    for value in values {
        if !options.iter().skip(1).any(|seen| seen == value) {
            options.push(value.to_owned());
        }
    }
    options
}
