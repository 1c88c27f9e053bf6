// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod download;
pub mod resolver;

pub use download::*;
pub use resolver::*;

use anyhow::{Context, Result, anyhow, bail};
use prochist_app::InstanceRecord;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Name of the process variable that carries the artifact URL.
pub const DOWNLOAD_VARIABLE: &str = "download-s3";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariableInstance {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VariableValue {
    #[serde(default)]
    value: Option<String>,
}

/// Blocking client for the workflow engine's REST surface.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("engine.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    /// Lists historical process instances for the table.
    pub fn list_history_instances(&self) -> Result<Vec<InstanceRecord>> {
        let response = self
            .http
            .get(format!("{}/history/process-instance", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response.json().context("decode instance listing")
    }

    /// Primary stage: the per-instance runtime variable endpoint. Only valid
    /// while the engine retains runtime variables, so every transport fault,
    /// non-2xx status, or undecodable body collapses to `Unavailable` and
    /// hands the attempt to the fallback stage.
    pub fn primary_lookup(&self, instance_id: &str) -> PrimaryLookup {
        let url = format!(
            "{}/process-instance/{}/variables/{}",
            self.base_url, instance_id, DOWNLOAD_VARIABLE
        );
        let response = match self.http.get(url).send() {
            Ok(response) => response,
            Err(_) => return PrimaryLookup::Unavailable,
        };
        if !response.status().is_success() {
            return PrimaryLookup::Unavailable;
        }
        match response.json::<VariableValue>() {
            Ok(body) => classify_primary(body.value),
            Err(_) => PrimaryLookup::Unavailable,
        }
    }

    /// Fallback stage: the historical variable-instance search. Faults here
    /// are terminal for the attempt.
    pub fn fallback_lookup(&self, instance_id: &str) -> FallbackLookup {
        let mut url =
            match Url::parse(&format!("{}/history/variable-instance", self.base_url)) {
                Ok(url) => url,
                Err(_) => return FallbackLookup::TransportError,
            };
        url.query_pairs_mut()
            .append_pair("processInstanceId", instance_id);

        let response = match self.http.get(url).send() {
            Ok(response) => response,
            Err(_) => return FallbackLookup::TransportError,
        };
        if !response.status().is_success() {
            return FallbackLookup::TransportError;
        }
        match response.json::<Vec<VariableInstance>>() {
            Ok(variables) => find_marker_variable(&variables),
            Err(_) => FallbackLookup::TransportError,
        }
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check engine.base_url in the config ({} )",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<EngineErrorEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("engine error ({}): {}", status.as_u16(), message);
    }

    if body.len() < 100 && !body.contains('{') {
        return anyhow!("engine error ({}): {}", status.as_u16(), body);
    }

    anyhow!("engine returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct EngineErrorEnvelope {
    message: Option<String>,
}
