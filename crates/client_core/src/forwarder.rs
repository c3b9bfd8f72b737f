use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{FeedMode, SubjectId},
    protocol::SwipeRequest,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::session::Decision;

/// Everything the recorder needs about one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeRecord {
    pub decision: Decision,
    pub subject: SubjectId,
    pub mode: FeedMode,
}

impl SwipeRecord {
    pub fn to_request(&self) -> SwipeRequest {
        SwipeRequest {
            user_id: self.subject,
            event_id: self.decision.candidate_id.clone(),
            direction: self.decision.direction,
            view_start: self.decision.view_start,
            view_end: self.decision.view_end,
            matcha_mode: self.mode.is_matcha(),
        }
    }
}

#[async_trait]
pub trait DecisionRecorder: Send + Sync {
    async fn record(&self, record: &SwipeRecord) -> Result<()>;
}

/// Recorder for offline sessions: decisions only show up in the log.
pub struct LoggingRecorder;

#[async_trait]
impl DecisionRecorder for LoggingRecorder {
    async fn record(&self, record: &SwipeRecord) -> Result<()> {
        info!(
            subject_id = record.subject.0,
            mode = %record.mode,
            candidate_id = %record.decision.candidate_id,
            direction = %record.decision.direction,
            dwell_ms = record.decision.dwell().num_milliseconds(),
            "swipe: recorded locally"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

enum ForwarderMessage {
    Record(SwipeRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle to a single background worker that hands decisions to the
/// recorder one at a time, in the order they were forwarded. Each delivery
/// runs in its own task so a panicking recorder only loses that decision.
/// Cloning shares the worker.
#[derive(Clone)]
pub struct DecisionForwarder {
    tx: mpsc::UnboundedSender<ForwarderMessage>,
    counters: Arc<Counters>,
}

impl DecisionForwarder {
    /// Starts the worker on the current Tokio runtime. It runs until every
    /// handle is dropped and the queue is drained.
    pub fn spawn(recorder: Arc<dyn DecisionRecorder>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        tokio::spawn(run_forwarder(recorder, rx, counters.clone()));
        Self { tx, counters }
    }

    /// Queues a decision and returns immediately.
    pub fn forward(&self, record: SwipeRecord) {
        if let Err(mpsc::error::SendError(message)) =
            self.tx.send(ForwarderMessage::Record(record))
        {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            if let ForwarderMessage::Record(record) = message {
                warn!(
                    candidate_id = %record.decision.candidate_id,
                    "swipe: recorder worker is gone, dropping decision"
                );
            }
        }
    }

    /// Waits until every decision forwarded before this call has been
    /// attempted.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(ForwarderMessage::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    pub fn stats(&self) -> ForwarderStats {
        ForwarderStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

async fn run_forwarder(
    recorder: Arc<dyn DecisionRecorder>,
    mut rx: mpsc::UnboundedReceiver<ForwarderMessage>,
    counters: Arc<Counters>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            ForwarderMessage::Record(record) => {
                let task = tokio::spawn({
                    let recorder = recorder.clone();
                    let record = record.clone();
                    async move { recorder.record(&record).await }
                });
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => Err(anyhow!("recorder task aborted: {join_err}")),
                };
                match outcome {
                    Ok(()) => {
                        counters.delivered.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            candidate_id = %record.decision.candidate_id,
                            direction = %record.decision.direction,
                            "swipe: decision recorded"
                        );
                    }
                    Err(err) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            candidate_id = %record.decision.candidate_id,
                            direction = %record.decision.direction,
                            error = %format!("{err:#}"),
                            "swipe: recorder rejected decision, dropping it"
                        );
                    }
                }
            }
            ForwarderMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("swipe: recorder worker stopped");
}

#[cfg(test)]
#[path = "tests/forwarder_tests.rs"]
mod tests;
