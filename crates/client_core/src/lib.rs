use chrono::{DateTime, Utc};

pub mod brew;
pub mod feed;
pub mod forwarder;
pub mod http;
pub mod session;
pub mod source;

pub use brew::{suggested_tags, BrewError, BrewStep, EventDraft};
pub use feed::{DiscoveryFeed, FeedBatch};
pub use forwarder::{
    DecisionForwarder, DecisionRecorder, ForwarderStats, LoggingRecorder, SwipeRecord,
};
pub use http::{ApiClient, ApiClientError};
pub use session::{Decision, Progress, SessionContext, SessionError, SessionState, SwipeSession};
pub use source::{CandidateSource, FixtureCandidateSource, FixtureError};

/// Source of wall-clock time for view timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
