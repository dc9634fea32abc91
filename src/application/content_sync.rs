//! Content Sync
//!
//! Uploads the local content directory to the origin bucket. Objects whose
//! sha256 matches the persisted manifest are skipped; the rest are uploaded by
//! a fixed pool of worker threads pulling from a shared index. A failed object
//! is retried on its own and never causes the whole set to be re-sent.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use serde::Serialize;
use thiserror::Error;

use super::retry::RetryPolicy;
use crate::domain::ports::{
    ContentManifest, ContentObject, ContentSource, DeployEvent, DeployEventSink, NoopEventSink,
    ObjectStore, StateError, StateStore,
};
use crate::domain::value_objects::Fingerprint;
use crate::error::ProviderError;

pub const DEFAULT_SYNC_WORKERS: usize = 8;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to list content: {0}")]
    List(#[source] io::Error),

    #[error(transparent)]
    State(#[from] StateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_SYNC_WORKERS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Per-object results, each list in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.skipped.len() + self.failed.len()
    }
}

enum ObjectResult {
    Uploaded { hash: String, bytes: u64 },
    Unchanged { hash: String },
    Failed(String),
}

pub struct ContentSync {
    source: Arc<dyn ContentSource>,
    store: Arc<dyn ObjectStore>,
    state: Arc<dyn StateStore>,
    events: Arc<dyn DeployEventSink>,
    options: SyncOptions,
}

impl ContentSync {
    pub fn new(
        source: Arc<dyn ContentSource>,
        store: Arc<dyn ObjectStore>,
        state: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            source,
            store,
            state,
            events: Arc::new(NoopEventSink),
            options: SyncOptions::default(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Upload every changed object to `bucket`
    pub fn sync(&self, bucket: &str) -> Result<SyncReport, SyncError> {
        let objects = self.source.list().map_err(SyncError::List)?;
        let previous = self.state.content_manifest()?;
        let workers = self.options.workers.max(1).min(objects.len().max(1));
        tracing::info!(bucket, objects = objects.len(), workers, "syncing content");

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, ObjectResult)>();
        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let (next, objects, previous) = (&next, &objects, &previous);
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(object) = objects.get(index) else {
                        break;
                    };
                    let result = self.sync_object(bucket, object, previous);
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, ObjectResult)> = rx.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);

        let mut report = SyncReport::default();
        let mut manifest = ContentManifest::new();
        for (index, result) in results {
            let key = objects[index].key.clone();
            match result {
                ObjectResult::Uploaded { hash, bytes } => {
                    if self.events.wants_detailed_events() {
                        self.events.on_event(DeployEvent::ObjectUploaded {
                            key: key.clone(),
                            bytes,
                        });
                    }
                    manifest.insert(key.clone(), hash);
                    report.uploaded.push(key);
                }
                ObjectResult::Unchanged { hash } => {
                    manifest.insert(key.clone(), hash);
                    report.skipped.push(key);
                }
                ObjectResult::Failed(error) => {
                    tracing::warn!(key = %key, error = %error, "object upload failed");
                    self.events.on_event(DeployEvent::ObjectFailed {
                        key: key.clone(),
                        error: error.clone(),
                    });
                    report.failed.push((key, error));
                }
            }
        }

        if let Err(err) = self.state.put_content_manifest(manifest) {
            tracing::warn!(error = %err, "failed to persist content manifest");
        }

        tracing::info!(
            uploaded = report.uploaded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "content sync finished"
        );
        self.events.on_event(DeployEvent::ContentSynced {
            uploaded: report.uploaded.len(),
            skipped: report.skipped.len(),
            failed: report.failed.len(),
        });
        Ok(report)
    }

    fn sync_object(
        &self,
        bucket: &str,
        object: &ContentObject,
        previous: &BTreeMap<String, String>,
    ) -> ObjectResult {
        let body = match self.source.read(object) {
            Ok(body) => body,
            Err(err) => return ObjectResult::Failed(format!("read {}: {}", object.path.display(), err)),
        };
        let hash = Fingerprint::of_bytes(&body).hex().to_string();
        if previous.get(&object.key) == Some(&hash) {
            tracing::trace!(key = %object.key, "unchanged");
            return ObjectResult::Unchanged { hash };
        }

        let content_type = content_type(&object.key);
        let uploaded = self.options.retry.run(
            |_| self.store.put_object(bucket, &object.key, &body, content_type),
            |attempt, delay, err: &ProviderError| {
                tracing::debug!(
                    key = %object.key,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying upload"
                );
            },
        );
        match uploaded {
            Ok(()) => ObjectResult::Uploaded {
                hash,
                bytes: body.len() as u64,
            },
            Err(err) => ObjectResult::Failed(err.to_string()),
        }
    }
}

/// Content type from the key's extension
pub fn content_type(key: &str) -> &'static str {
    let extension = key
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("webmanifest") => "application/manifest+json",
        _ => "application/octet-stream",
    }
}
