//! Classifier engine: analysis service client and request execution.
mod client;
mod engine;
mod types;
mod wire;

pub use client::{AnalysisClient, ClientSettings, ReqwestAnalysisClient, DEFAULT_ENDPOINT};
pub use engine::{Clock, EngineError, EngineHandle};
pub use types::{
    AnalysisError, AnalysisReport, EngineEvent, FailureKind, Prediction, RequestId, ThreatType,
};
pub use wire::{decode_error_detail, decode_prediction, encode_request};
