// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::download::DownloadTrigger;
use crate::{Client, DOWNLOAD_VARIABLE, VariableInstance};

/// Result of the primary stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryLookup {
    Resolved(String),
    /// 2xx response but no usable link. Terminal: the fallback is NOT tried.
    LinkMissing,
    /// Unsuccessful response; hand the attempt to the fallback stage.
    Unavailable,
}

/// Result of the fallback stage. Everything but `Resolved` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackLookup {
    Resolved(String),
    NotFound,
    LinkMissing,
    TransportError,
}

/// Terminal outcome of one resolution attempt. Never persisted, never
/// propagated as an error; the table shell renders `message()` on its
/// status line and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Triggered(String),
    MissingIdentifier,
    LinkAbsentInPrimary,
    VariableNotFoundInFallback,
    LinkAbsentInFallback,
    TransportFailureFallback,
    TriggerFailed(String),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Triggered(_))
    }

    pub fn message(&self) -> String {
        match self {
            Self::Triggered(url) => format!("download started: {url}"),
            Self::MissingIdentifier => "download failed: missing instance id".to_owned(),
            Self::LinkAbsentInPrimary => "download failed: link missing in response".to_owned(),
            Self::VariableNotFoundInFallback => {
                format!("download failed: {DOWNLOAD_VARIABLE} variable not found")
            }
            Self::LinkAbsentInFallback => {
                format!("download failed: {DOWNLOAD_VARIABLE} variable has no link")
            }
            Self::TransportFailureFallback => {
                "download failed: variable lookup unreachable".to_owned()
            }
            Self::TriggerFailed(reason) => format!("download failed: {reason}"),
        }
    }
}

pub fn classify_primary(value: Option<String>) -> PrimaryLookup {
    match value {
        Some(url) if !url.is_empty() => PrimaryLookup::Resolved(url),
        _ => PrimaryLookup::LinkMissing,
    }
}

/// Order-independent search for the marker variable in the fallback
/// response.
pub fn find_marker_variable(variables: &[VariableInstance]) -> FallbackLookup {
    let marker = variables
        .iter()
        .find(|variable| variable.name == DOWNLOAD_VARIABLE);
    match marker {
        Some(variable) => match &variable.value {
            Some(url) if !url.is_empty() => FallbackLookup::Resolved(url.clone()),
            _ => FallbackLookup::LinkMissing,
        },
        None => FallbackLookup::NotFound,
    }
}

/// One full resolution attempt: precondition, primary lookup, fallback
/// lookup, then the single trigger call site. Each attempt is independent;
/// there are no retries and no cancellation.
pub fn resolve_download(
    client: &Client,
    trigger: &dyn DownloadTrigger,
    instance_id: &str,
) -> DownloadOutcome {
    if instance_id.trim().is_empty() {
        return DownloadOutcome::MissingIdentifier;
    }

    let url = match client.primary_lookup(instance_id) {
        PrimaryLookup::Resolved(url) => url,
        PrimaryLookup::LinkMissing => return DownloadOutcome::LinkAbsentInPrimary,
        PrimaryLookup::Unavailable => match client.fallback_lookup(instance_id) {
            FallbackLookup::Resolved(url) => url,
            FallbackLookup::NotFound => return DownloadOutcome::VariableNotFoundInFallback,
            FallbackLookup::LinkMissing => return DownloadOutcome::LinkAbsentInFallback,
            FallbackLookup::TransportError => return DownloadOutcome::TransportFailureFallback,
        },
    };

    match trigger.trigger(&url) {
        Ok(()) => DownloadOutcome::Triggered(url),
        Err(error) => DownloadOutcome::TriggerFailed(format!("{error:#}")),
    }
}
