use std::{fmt, sync::Arc};

use shared::domain::SwipeDirection;
use tracing::{info, warn};

use crate::{
    session::{Decision, SessionError, SwipeSession},
    source::CandidateSource,
};

/// Outcome of the most recent replenishment. The session itself cannot
/// tell an empty batch from a failed fetch; this can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedBatch {
    Loaded(usize),
    Empty,
    Unavailable(String),
}

impl fmt::Display for FeedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(count) => write!(f, "loaded {count} candidates"),
            Self::Empty => f.write_str("no candidates available"),
            Self::Unavailable(reason) => write!(f, "feed unavailable: {reason}"),
        }
    }
}

/// A swipe session paired with the source that refills it.
pub struct DiscoveryFeed {
    session: SwipeSession,
    source: Arc<dyn CandidateSource>,
    batch_limit: usize,
    last_batch: Option<FeedBatch>,
}

impl DiscoveryFeed {
    pub fn new(session: SwipeSession, source: Arc<dyn CandidateSource>, batch_limit: usize) -> Self {
        Self {
            session,
            source,
            batch_limit: batch_limit.max(1),
            last_batch: None,
        }
    }

    pub fn session(&self) -> &SwipeSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SwipeSession {
        &mut self.session
    }

    pub fn last_batch(&self) -> Option<&FeedBatch> {
        self.last_batch.as_ref()
    }

    /// Fetches a fresh batch and loads it, discarding whatever was left of
    /// the previous one. Fetch failures load an empty queue.
    pub async fn replenish(&mut self) -> FeedBatch {
        let context = self.session.context();
        self.session.begin_reload();

        let batch = match self
            .source
            .fetch(context.subject, context.mode, self.batch_limit)
            .await
        {
            Ok(candidates) if candidates.is_empty() => {
                self.session.load(Vec::new());
                FeedBatch::Empty
            }
            Ok(candidates) => {
                let count = candidates.len();
                self.session.load(candidates);
                FeedBatch::Loaded(count)
            }
            Err(err) => {
                warn!(
                    session_id = %self.session.session_id(),
                    subject_id = context.subject.0,
                    mode = %context.mode,
                    error = %format!("{err:#}"),
                    "feed: candidate fetch failed"
                );
                self.session.load(Vec::new());
                FeedBatch::Unavailable(err.to_string())
            }
        };

        info!(
            session_id = %self.session.session_id(),
            outcome = %batch,
            "feed: replenished"
        );
        self.last_batch = Some(batch.clone());
        batch
    }

    pub fn decide(&mut self, direction: SwipeDirection) -> Result<Decision, SessionError> {
        self.session.decide(direction)
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
