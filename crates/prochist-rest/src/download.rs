// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

const DEFAULT_ARTIFACT_NAME: &str = "artifact.zip";

/// Host capability that turns a resolved URL into a saved file. Injected
/// into the resolver so tests can substitute a recording double.
pub trait DownloadTrigger {
    fn trigger(&self, url: &str) -> Result<()>;
}

/// Production trigger: fetches the artifact and saves it into the download
/// directory. The body lands in a transient `.part` file that is renamed
/// into place on success and removed on failure, so no handle or partial
/// file outlives the call.
#[derive(Debug, Clone)]
pub struct FileSaver {
    http: HttpClient,
    download_dir: PathBuf,
}

impl FileSaver {
    pub fn new(download_dir: PathBuf, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self { http, download_dir })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn save(&self, url: &str) -> Result<PathBuf> {
        let response = self
            .http
            .get(url)
            .send()
            .with_context(|| format!("fetch artifact {url}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("artifact host returned {} for {url}", status.as_u16());
        }

        fs::create_dir_all(&self.download_dir).with_context(|| {
            format!("create download directory {}", self.download_dir.display())
        })?;

        let name = artifact_name(url);
        let target = self.download_dir.join(&name);
        let staging = self.download_dir.join(format!("{name}.part"));

        let result = (|| -> Result<()> {
            let mut file = fs::File::create(&staging)
                .with_context(|| format!("create staging file {}", staging.display()))?;
            let bytes = response.bytes().context("read artifact body")?;
            file.write_all(&bytes).context("write artifact body")?;
            file.flush().context("flush artifact body")?;
            Ok(())
        })();

        if let Err(error) = result {
            let _ = fs::remove_file(&staging);
            return Err(error);
        }

        fs::rename(&staging, &target)
            .with_context(|| format!("move artifact into {}", target.display()))?;
        Ok(target)
    }
}

impl DownloadTrigger for FileSaver {
    fn trigger(&self, url: &str) -> Result<()> {
        self.save(url).map(|_| ())
    }
}

/// Last non-empty path segment of the URL, ignoring the query string.
fn artifact_name(url: &str) -> String {
    let segment = Url::parse(url).ok().and_then(|parsed| {
        parsed.path_segments().and_then(|segments| {
            segments
                .filter(|segment| !segment.is_empty())
                .next_back()
                .map(str::to_owned)
        })
    });
    match segment {
        Some(name) => name,
        None => DEFAULT_ARTIFACT_NAME.to_owned(),
    }
}

/// Test/demo double that records every triggered URL instead of touching
/// the host.
#[derive(Debug, Default)]
pub struct RecordingTrigger {
    urls: Mutex<Vec<String>>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<String> {
        match self.urls.lock() {
            Ok(urls) => urls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DownloadTrigger for RecordingTrigger {
    fn trigger(&self, url: &str) -> Result<()> {
        match self.urls.lock() {
            Ok(mut urls) => urls.push(url.to_owned()),
            Err(poisoned) => poisoned.into_inner().push(url.to_owned()),
        }
        Ok(())
    }
}
