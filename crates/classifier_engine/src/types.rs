use std::fmt;

use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// Labels the analysis service may assign to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatType {
    Malware,
    Phishing,
    Defacement,
    Benign,
}

/// A well-formed classification as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// `None` when the service answered `"type": null`.
    pub threat_type: Option<ThreatType>,
    pub confidence: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub prediction: Prediction,
    pub status: u16,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    AnalysisCompleted {
        request_id: RequestId,
        result: Result<AnalysisReport, AnalysisError>,
        received_utc: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AnalysisError {
    pub kind: FailureKind,
    pub message: String,
}

impl AnalysisError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx answer; `detail` is the body's `detail` string if it had one.
    ServiceStatus { status: u16, detail: Option<String> },
    Network,
    Timeout,
    /// 2xx answer whose body does not match the prediction schema.
    InvalidPayload,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ServiceStatus { status, .. } => write!(f, "service status {status}"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
