use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use classifier_engine::{
    AnalysisClient, AnalysisError, AnalysisReport, Clock, EngineEvent, EngineHandle, FailureKind,
    Prediction, RequestId, ThreatType,
};

const WAIT: Duration = Duration::from_secs(5);

/// Answers each URL after a per-URL delay and records what it was asked.
struct DelayedClient {
    delays: HashMap<String, Duration>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl DelayedClient {
    fn new(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(url, ms)| (url.to_string(), Duration::from_millis(*ms)))
                .collect(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait::async_trait]
impl AnalysisClient for DelayedClient {
    async fn analyze(&self, url: &str) -> Result<AnalysisReport, AnalysisError> {
        self.seen.lock().unwrap().push(url.to_string());
        let delay = self.delays.get(url).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(AnalysisReport {
            prediction: Prediction {
                threat_type: Some(ThreatType::Benign),
                confidence: 0.9,
                description: url.to_string(),
            },
            status: 200,
            byte_len: 0,
        })
    }
}

fn completion(engine: &EngineHandle) -> (RequestId, Result<AnalysisReport, AnalysisError>, Option<String>) {
    match engine.recv_timeout(WAIT).expect("completion") {
        EngineEvent::AnalysisCompleted {
            request_id,
            result,
            received_utc,
        } => (request_id, result, received_utc),
    }
}

#[test]
fn completions_arrive_in_finish_order() {
    let client = DelayedClient::new(&[("slow", 300), ("fast", 10)]);
    let seen = client.seen.clone();
    let engine = EngineHandle::with_client(Arc::new(client), None).expect("engine");

    engine.analyze(1, "slow");
    engine.analyze(2, "fast");

    let (first_id, first, _) = completion(&engine);
    let (second_id, second, _) = completion(&engine);
    assert_eq!(first_id, 2);
    assert_eq!(first.unwrap().prediction.description, "fast");
    assert_eq!(second_id, 1);
    assert_eq!(second.unwrap().prediction.description, "slow");

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["fast".to_string(), "slow".to_string()]);
}

#[test]
fn cancelled_request_reports_cancelled_promptly() {
    let client = DelayedClient::new(&[("hang", 10_000)]);
    let engine = EngineHandle::with_client(Arc::new(client), None).expect("engine");

    engine.analyze(7, "hang");
    engine.cancel(7);

    let (request_id, result, _) = completion(&engine);
    assert_eq!(request_id, 7);
    assert_eq!(result.unwrap_err().kind, FailureKind::Cancelled);
}

#[test]
fn cancelling_unknown_request_is_harmless() {
    let client = DelayedClient::new(&[]);
    let engine = EngineHandle::with_client(Arc::new(client), None).expect("engine");

    engine.cancel(99);
    engine.analyze(1, "now");

    let (request_id, result, _) = completion(&engine);
    assert_eq!(request_id, 1);
    assert!(result.is_ok());
    assert!(engine.try_recv().is_none());
}

#[test]
fn clock_stamps_each_completion() {
    let client = DelayedClient::new(&[]);
    let clock: Clock = Arc::new(|| "2026-10-17T00:00:00Z".to_string());
    let engine = EngineHandle::with_client(Arc::new(client), Some(clock)).expect("engine");

    engine.analyze(3, "https://example.com");

    let (_, _, received_utc) = completion(&engine);
    assert_eq!(received_utc.as_deref(), Some("2026-10-17T00:00:00Z"));
}

#[test]
fn shutdown_drops_unfinished_requests_and_closes_events() {
    let client = DelayedClient::new(&[("hang", 10_000)]);
    let mut engine = EngineHandle::with_client(Arc::new(client), None).expect("engine");

    engine.analyze(1, "hang");
    engine.shutdown();

    assert!(engine.recv().is_none());
    // Commands after shutdown are dropped rather than panicking.
    engine.analyze(2, "hang");
    assert!(engine.try_recv().is_none());
}
