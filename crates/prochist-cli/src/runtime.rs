// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use prochist_app::InstanceRecord;
use prochist_rest::{
    Client, DownloadOutcome, DownloadTrigger, FileSaver, RecordingTrigger, resolve_download,
};
use prochist_testkit::InstanceFaker;
use prochist_tui::{AppRuntime, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;

/// Production runtime: loads instances from the engine's history API and
/// resolves downloads against it, saving artifacts to disk.
pub struct RestRuntime {
    client: Client,
    saver: FileSaver,
}

impl RestRuntime {
    pub fn new(client: Client, saver: FileSaver) -> Self {
        Self { client, saver }
    }
}

impl AppRuntime for RestRuntime {
    fn load_instances(&mut self) -> Result<Vec<InstanceRecord>> {
        self.client.list_history_instances()
    }

    fn resolve_download(&mut self, instance_id: &str) -> DownloadOutcome {
        resolve_download(&self.client, &self.saver, instance_id)
    }

    /// Each attempt runs on its own thread; attempts share nothing and a
    /// dropped receiver just discards the outcome.
    fn spawn_download(
        &mut self,
        request_id: u64,
        instance_id: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let saver = self.saver.clone();
        let instance_id = instance_id.to_owned();
        thread::spawn(move || {
            let outcome = resolve_download(&client, &saver, &instance_id);
            let _ = tx.send(InternalEvent::DownloadFinished {
                request_id,
                outcome,
            });
        });
        Ok(())
    }
}

/// Offline runtime for `--demo`: seeded instances, downloads resolve to a
/// synthetic URL against a recording trigger, no network anywhere.
pub struct DemoRuntime {
    instances: Vec<InstanceRecord>,
    trigger: RecordingTrigger,
}

impl DemoRuntime {
    pub fn seeded(seed: u64, count: usize) -> Self {
        Self {
            instances: InstanceFaker::new(seed).instances(count),
            trigger: RecordingTrigger::new(),
        }
    }

    pub fn triggered_urls(&self) -> Vec<String> {
        self.trigger.urls()
    }
}

impl AppRuntime for DemoRuntime {
    fn load_instances(&mut self) -> Result<Vec<InstanceRecord>> {
        Ok(self.instances.clone())
    }

    fn resolve_download(&mut self, instance_id: &str) -> DownloadOutcome {
        if instance_id.trim().is_empty() {
            return DownloadOutcome::MissingIdentifier;
        }
        let url = format!("https://demo.invalid/artifacts/{instance_id}.zip");
        match self.trigger.trigger(&url) {
            Ok(()) => DownloadOutcome::Triggered(url),
            Err(error) => DownloadOutcome::TriggerFailed(format!("{error:#}")),
        }
    }
}
