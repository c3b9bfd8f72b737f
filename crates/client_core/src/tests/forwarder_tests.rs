use super::*;
use crate::test_support::{drain, ChannelRecorder};
use chrono::{TimeZone, Utc};
use shared::domain::{CandidateId, SwipeDirection};
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

fn record(id: i64, direction: SwipeDirection) -> SwipeRecord {
    let view_start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    SwipeRecord {
        decision: Decision {
            candidate_id: CandidateId::Numeric(id),
            direction,
            view_start,
            view_end: view_start + chrono::Duration::seconds(2),
        },
        subject: SubjectId(7),
        mode: FeedMode::Coffee,
    }
}

/// Holds every delivery until a permit is released, then answers with a
/// delay that shrinks as ids grow.
struct GatedRecorder {
    gate: Arc<Semaphore>,
    seen: Arc<Mutex<Vec<CandidateId>>>,
}

#[async_trait]
impl DecisionRecorder for GatedRecorder {
    async fn record(&self, record: &SwipeRecord) -> Result<()> {
        let permit = self.gate.acquire().await?;
        permit.forget();
        if let CandidateId::Numeric(id) = record.decision.candidate_id {
            tokio::time::sleep(Duration::from_millis((5 - id.min(5)) as u64 * 5)).await;
        }
        self.seen.lock().await.push(record.decision.candidate_id.clone());
        Ok(())
    }
}

#[test]
fn swipe_record_maps_onto_backend_request() {
    let request = record(3, SwipeDirection::Accept).to_request();

    assert_eq!(request.user_id, SubjectId(7));
    assert_eq!(request.event_id, CandidateId::Numeric(3));
    assert_eq!(request.direction, SwipeDirection::Accept);
    assert!(!request.matcha_mode);
    assert_eq!(
        (request.view_end - request.view_start).num_seconds(),
        2
    );
}

#[tokio::test]
async fn forward_returns_while_recorder_is_blocked() {
    let gate = Arc::new(Semaphore::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let forwarder = DecisionForwarder::spawn(Arc::new(GatedRecorder {
        gate: gate.clone(),
        seen: seen.clone(),
    }));

    for id in 1..=4 {
        forwarder.forward(record(id, SwipeDirection::Reject));
    }
    assert!(seen.lock().await.is_empty());

    gate.add_permits(4);
    forwarder.flush().await;

    let seen = seen.lock().await.clone();
    assert_eq!(
        seen,
        (1..=4).map(CandidateId::Numeric).collect::<Vec<_>>()
    );
    assert_eq!(
        forwarder.stats(),
        ForwarderStats {
            delivered: 4,
            failed: 0
        }
    );
}

#[tokio::test]
async fn failures_are_counted_and_later_records_still_flow() {
    let (recorder, mut rx) = ChannelRecorder::new();
    let forwarder = DecisionForwarder::spawn(Arc::new(recorder.failing_for(CandidateId::Numeric(2))));

    forwarder.forward(record(1, SwipeDirection::Accept));
    forwarder.forward(record(2, SwipeDirection::Accept));
    forwarder.forward(record(3, SwipeDirection::Reject));
    forwarder.flush().await;

    let attempted: Vec<_> = drain(&mut rx)
        .into_iter()
        .map(|r| r.decision.candidate_id)
        .collect();
    assert_eq!(
        attempted,
        vec![
            CandidateId::Numeric(1),
            CandidateId::Numeric(2),
            CandidateId::Numeric(3)
        ]
    );
    assert_eq!(
        forwarder.stats(),
        ForwarderStats {
            delivered: 2,
            failed: 1
        }
    );
}

#[tokio::test]
async fn logging_recorder_accepts_everything() {
    let forwarder = DecisionForwarder::spawn(Arc::new(LoggingRecorder));
    forwarder.forward(record(1, SwipeDirection::Accept));
    forwarder.flush().await;

    assert_eq!(forwarder.stats().delivered, 1);
}

struct PanickingRecorder {
    panic_on: CandidateId,
    seen: Arc<Mutex<Vec<CandidateId>>>,
}

#[async_trait]
impl DecisionRecorder for PanickingRecorder {
    async fn record(&self, record: &SwipeRecord) -> Result<()> {
        if record.decision.candidate_id == self.panic_on {
            panic!("recorder blew up on {}", record.decision.candidate_id);
        }
        self.seen.lock().await.push(record.decision.candidate_id.clone());
        Ok(())
    }
}

#[tokio::test]
async fn recorder_panic_drops_only_that_decision() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let forwarder = DecisionForwarder::spawn(Arc::new(PanickingRecorder {
        panic_on: CandidateId::Numeric(2),
        seen: seen.clone(),
    }));

    forwarder.forward(record(1, SwipeDirection::Accept));
    forwarder.forward(record(2, SwipeDirection::Accept));
    forwarder.flush().await;
    forwarder.forward(record(3, SwipeDirection::Reject));
    forwarder.forward(record(4, SwipeDirection::Accept));
    forwarder.flush().await;

    assert_eq!(
        *seen.lock().await,
        vec![
            CandidateId::Numeric(1),
            CandidateId::Numeric(3),
            CandidateId::Numeric(4)
        ]
    );
    assert_eq!(
        forwarder.stats(),
        ForwarderStats {
            delivered: 3,
            failed: 1
        }
    );
}
