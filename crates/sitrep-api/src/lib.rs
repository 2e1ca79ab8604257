// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

use sitrep_app::{Incident, IncidentId, IncidentPatch, User};

/// Blocking client for the incident service. One instance per session;
/// cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: String,
    timeout: Duration,
    http: HttpClient,
}

/// Envelope the update endpoint answers with. `success: false` is an
/// application-level failure; the transport may still be 2xx.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Incident>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            token: token.to_owned(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full incident collection, in service order.
    pub fn fetch_incidents(&self) -> Result<Vec<Incident>> {
        let response = self
            .authorized(
                self.http
                    .get(format!("{}/incident/get-all-incidents", self.base_url)),
            )
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: ListEnvelope<Incident> = response.json().context("decode incident list")?;
        parsed.into_data("incident list")
    }

    /// Users available for membership editing.
    pub fn fetch_users(&self) -> Result<Vec<User>> {
        let response = self
            .authorized(self.http.get(format!("{}/user/get-all-users", self.base_url)))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: ListEnvelope<User> = response.json().context("decode user list")?;
        parsed.into_data("user list")
    }

    /// Commits a patch to one incident. Transport and decode failures are
    /// `Err`; anything the service answered with its envelope comes back
    /// `Ok`, including `success: false`, so callers can surface the
    /// server's own message. Non-2xx responses that still carry the
    /// envelope are treated the same way.
    pub fn update_incident(&self, id: &IncidentId, patch: &IncidentPatch) -> Result<UpdateResponse> {
        let response = self
            .authorized(self.http.put(format!(
                "{}/incident/update-incident/{}",
                self.base_url,
                id.get()
            )))
            .json(patch)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<UpdateResponse>(&body) {
            return Ok(envelope);
        }
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }
        bail!("unexpected response from update endpoint ({})", status.as_u16())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ListEnvelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    fn into_data(self, what: &str) -> Result<Vec<T>> {
        if self.success {
            return Ok(self.data);
        }
        if self.message.is_empty() {
            bail!("server rejected the {what} request -- check api.token in your config and retry");
        }
        bail!("server error: {}", self.message);
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check api.base_url in your config and that the service is up ({} )",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}
