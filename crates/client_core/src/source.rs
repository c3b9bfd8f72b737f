use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Candidate, FeedMode, SubjectId},
    protocol::EventRecord,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Supplies the next batch of candidates for a subject's feed. Batches are
/// expected to be de-duplicated and to exclude anything already decided.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch(
        &self,
        subject: SubjectId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<Candidate>>;
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid fixture '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Serves a fixed set of events, page by page, without a backend. Each mode
/// keeps its own read position so later pages never repeat earlier ones.
pub struct FixtureCandidateSource {
    events: Vec<EventRecord>,
    latency: Duration,
    offsets: Mutex<HashMap<FeedMode, usize>>,
}

impl FixtureCandidateSource {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self {
            events,
            latency: Duration::ZERO,
            offsets: Mutex::new(HashMap::new()),
        }
    }

    /// Delays every fetch, mimicking a slow network.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&raw).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl CandidateSource for FixtureCandidateSource {
    async fn fetch(
        &self,
        subject: SubjectId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut offsets = self.offsets.lock().await;
        let offset = offsets.entry(mode).or_insert(0);
        let batch: Vec<Candidate> = self
            .events
            .iter()
            .filter(|event| event.is_listed_in(mode))
            .skip(*offset)
            .take(limit)
            .cloned()
            .map(EventRecord::into_candidate)
            .collect();
        *offset += batch.len();

        debug!(
            subject_id = subject.0,
            %mode,
            served = batch.len(),
            next_offset = *offset,
            "fixture: served candidate batch"
        );
        Ok(batch)
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
