use std::{
    collections::HashSet,
    sync::{Arc, Mutex as StdMutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shared::domain::{Candidate, CandidateId, CandidatePayload, FeedMode, SubjectId};
use tokio::sync::mpsc;

use crate::{
    forwarder::{DecisionForwarder, DecisionRecorder, SwipeRecord},
    session::{SessionContext, SwipeSession},
    Clock,
};

/// Clock that only moves when told to.
pub(crate) struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: StdMutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    pub(crate) fn advance_ms(&self, ms: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += Duration::milliseconds(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Recorder that reports every attempt on a channel and fails for the
/// configured candidate ids.
pub(crate) struct ChannelRecorder {
    tx: mpsc::UnboundedSender<SwipeRecord>,
    fail_for: HashSet<CandidateId>,
}

impl ChannelRecorder {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<SwipeRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                fail_for: HashSet::new(),
            },
            rx,
        )
    }

    pub(crate) fn failing_for(mut self, id: impl Into<CandidateId>) -> Self {
        self.fail_for.insert(id.into());
        self
    }
}

#[async_trait]
impl DecisionRecorder for ChannelRecorder {
    async fn record(&self, record: &SwipeRecord) -> Result<()> {
        let _ = self.tx.send(record.clone());
        if self.fail_for.contains(&record.decision.candidate_id) {
            return Err(anyhow!(
                "recorder unavailable for {}",
                record.decision.candidate_id
            ));
        }
        Ok(())
    }
}

pub(crate) fn candidate(id: &str) -> Candidate {
    Candidate::new(
        id,
        CandidatePayload {
            title: format!("Event {id}"),
            description: Some(format!("About {id}")),
            tags: vec!["test".to_string()],
            image_url: None,
        },
    )
}

pub(crate) fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter().map(|id| candidate(id)).collect()
}

pub(crate) fn context() -> SessionContext {
    SessionContext {
        subject: SubjectId(42),
        mode: FeedMode::Matcha,
    }
}

pub(crate) struct SessionHarness {
    pub session: SwipeSession,
    pub clock: Arc<ManualClock>,
    pub forwarder: DecisionForwarder,
}

pub(crate) fn harness(recorder: ChannelRecorder) -> SessionHarness {
    let clock = Arc::new(ManualClock::new());
    let forwarder = DecisionForwarder::spawn(Arc::new(recorder));
    let session = SwipeSession::new(context(), clock.clone(), forwarder.clone());
    SessionHarness {
        session,
        clock,
        forwarder,
    }
}

pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<SwipeRecord>) -> Vec<SwipeRecord> {
    let mut records = Vec::new();
    while let Ok(record) = rx.try_recv() {
        records.push(record);
    }
    records
}
