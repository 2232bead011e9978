use std::sync::Arc;

use chrono::Utc;
use classifier_core::{AnalysisOutcome, Category, ClassificationResult, Effect, Msg};
use classifier_engine::{
    AnalysisError, AnalysisReport, Clock, EngineEvent, EngineHandle, FailureKind, ThreatType,
};
use classifier_logging::{classifier_debug, classifier_info};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AnalyzeUrl { request_id, url } => {
                    classifier_info!(
                        "AnalyzeUrl request_id={} url_len={} url={}",
                        request_id,
                        url.len(),
                        url
                    );
                    self.engine.analyze(request_id, url);
                }
                Effect::CancelAnalysis { request_id } => {
                    classifier_debug!("CancelAnalysis request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
            }
        }
    }

    pub fn try_next_msg(&self) -> Option<Msg> {
        while let Some(event) = self.engine.try_recv() {
            if let Some(msg) = map_event(event) {
                return Some(msg);
            }
        }
        None
    }

    /// Block for the next completion; `None` if the engine is gone.
    pub fn next_msg(&self) -> Option<Msg> {
        while let Some(event) = self.engine.recv() {
            if let Some(msg) = map_event(event) {
                return Some(msg);
            }
        }
        None
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}

pub fn utc_clock() -> Clock {
    Arc::new(|| Utc::now().to_rfc3339())
}

// Cancellations are only sent for requests the core already abandoned, so
// their completions carry nothing to apply.
fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::AnalysisCompleted {
            request_id,
            result,
            received_utc,
        } => match map_result(result) {
            Some(outcome) => Some(Msg::AnalysisSettled {
                request_id,
                outcome,
                settled_utc: received_utc,
            }),
            None => {
                classifier_debug!("Dropping cancelled completion request_id={}", request_id);
                None
            }
        },
    }
}

fn map_result(result: Result<AnalysisReport, AnalysisError>) -> Option<AnalysisOutcome> {
    let outcome = match result {
        Ok(report) => AnalysisOutcome::Classified(ClassificationResult {
            category: report.prediction.threat_type.map(map_threat),
            confidence: report.prediction.confidence,
            description: report.prediction.description,
        }),
        Err(err) => match err.kind {
            FailureKind::ServiceStatus { status, detail } => {
                AnalysisOutcome::ServiceRejected { status, detail }
            }
            FailureKind::InvalidPayload => AnalysisOutcome::MalformedResponse { cause: err.message },
            FailureKind::Cancelled => return None,
            FailureKind::Network | FailureKind::Timeout | FailureKind::TooLarge { .. } => {
                AnalysisOutcome::TransportFailed {
                    cause: Some(err.to_string()),
                }
            }
        },
    };
    Some(outcome)
}

fn map_threat(threat: ThreatType) -> Category {
    match threat {
        ThreatType::Malware => Category::Malware,
        ThreatType::Phishing => Category::Phishing,
        ThreatType::Defacement => Category::Defacement,
        ThreatType::Benign => Category::Benign,
    }
}
