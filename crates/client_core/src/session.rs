use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use shared::domain::{Candidate, CandidateId, FeedMode, SubjectId, SwipeDirection};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    forwarder::{DecisionForwarder, SwipeRecord},
    Clock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    Exhausted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Exhausted => "exhausted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub candidate_id: CandidateId,
    pub direction: SwipeDirection,
    pub view_start: DateTime<Utc>,
    pub view_end: DateTime<Utc>,
}

impl Decision {
    pub fn dwell(&self) -> Duration {
        self.view_end - self.view_start
    }
}

/// Who the session acts for and which feed it browses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub subject: SubjectId,
    pub mode: FeedMode,
}

/// One-based display position and queue length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.position, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no current candidate to decide on (session is {state})")]
    NoCurrentCandidate { state: SessionState },
}

/// Presents a finite queue of candidates one at a time and turns each swipe
/// into a [`Decision`] handed to the [`DecisionForwarder`].
pub struct SwipeSession {
    session_id: Uuid,
    context: SessionContext,
    clock: Arc<dyn Clock>,
    forwarder: DecisionForwarder,
    queue: Vec<Candidate>,
    cursor: usize,
    view_start: Option<DateTime<Utc>>,
    state: SessionState,
}

impl SwipeSession {
    pub fn new(
        context: SessionContext,
        clock: Arc<dyn Clock>,
        forwarder: DecisionForwarder,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            context,
            clock,
            forwarder,
            queue: Vec::new(),
            cursor: 0,
            view_start: None,
            state: SessionState::Loading,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn context(&self) -> SessionContext {
        self.context
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }

    /// Drops the queue and returns to `Loading`. An undecided current
    /// candidate is abandoned and never produces a decision.
    pub fn begin_reload(&mut self) {
        self.log_abandoned("reload requested");
        self.queue.clear();
        self.cursor = 0;
        self.view_start = None;
        self.state = SessionState::Loading;
    }

    /// Replaces the queue with a freshly fetched batch and restarts at its
    /// first candidate. An empty batch lands directly in `Exhausted`.
    pub fn load(&mut self, candidates: Vec<Candidate>) {
        self.log_abandoned("queue replaced");
        self.queue = candidates;
        self.cursor = 0;

        if self.queue.is_empty() {
            self.view_start = None;
            self.state = SessionState::Exhausted;
        } else {
            self.view_start = Some(self.clock.now());
            self.state = SessionState::Ready;
        }

        info!(
            session_id = %self.session_id,
            subject_id = self.context.subject.0,
            mode = %self.context.mode,
            count = self.queue.len(),
            state = %self.state,
            "swipe: queue loaded"
        );
    }

    pub fn current(&self) -> Option<&Candidate> {
        match self.state {
            SessionState::Ready => self.queue.get(self.cursor),
            SessionState::Loading | SessionState::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty() || self.cursor >= self.queue.len()
    }

    pub fn progress(&self) -> Progress {
        let total = self.queue.len();
        Progress {
            position: (self.cursor + 1).min(total),
            total,
        }
    }

    /// Records a swipe on the current candidate and advances past it. The
    /// decision is queued for the recorder without waiting on delivery.
    pub fn decide(&mut self, direction: SwipeDirection) -> Result<Decision, SessionError> {
        let (candidate_id, view_start) = match (self.current(), self.view_start) {
            (Some(candidate), Some(view_start)) => (candidate.id.clone(), view_start),
            _ => {
                warn!(
                    session_id = %self.session_id,
                    state = %self.state,
                    %direction,
                    "swipe: decide called without a current candidate"
                );
                return Err(SessionError::NoCurrentCandidate { state: self.state });
            }
        };

        let view_end = self.clock.now().max(view_start);
        let decision = Decision {
            candidate_id,
            direction,
            view_start,
            view_end,
        };

        self.cursor += 1;
        if self.cursor >= self.queue.len() {
            self.view_start = None;
            self.state = SessionState::Exhausted;
        } else {
            self.view_start = Some(view_end);
        }

        debug!(
            session_id = %self.session_id,
            candidate_id = %decision.candidate_id,
            %direction,
            dwell_ms = decision.dwell().num_milliseconds(),
            cursor = self.cursor,
            total = self.queue.len(),
            "swipe: decision made"
        );

        self.forwarder.forward(SwipeRecord {
            decision: decision.clone(),
            subject: self.context.subject,
            mode: self.context.mode,
        });

        Ok(decision)
    }

    fn log_abandoned(&self, reason: &str) {
        if let Some(candidate) = self.current() {
            debug!(
                session_id = %self.session_id,
                candidate_id = %candidate.id,
                undecided = self.remaining(),
                reason,
                "swipe: abandoning undecided candidates"
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
