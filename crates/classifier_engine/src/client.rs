use std::error::Error as _;
use std::time::Duration;

use classifier_logging::{classifier_debug, classifier_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::engine::EngineError;
use crate::wire::{decode_error_detail, decode_prediction, encode_request};
use crate::{AnalysisError, AnalysisReport, FailureKind};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// `None` waits for the service as long as the transport allows.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Ask the service to classify `url`, sent exactly as given.
    async fn analyze(&self, url: &str) -> Result<AnalysisReport, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    endpoint: Url,
    client: reqwest::Client,
    max_response_bytes: u64,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let endpoint =
            Url::parse(&settings.endpoint).map_err(|source| EngineError::InvalidEndpoint {
                endpoint: settings.endpoint.clone(),
                source,
            })?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(EngineError::Client)?;

        Ok(Self {
            endpoint,
            client,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, AnalysisError> {
        let max_bytes = self.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(AnalysisError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(AnalysisError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn analyze(&self, url: &str) -> Result<AnalysisReport, AnalysisError> {
        classifier_debug!("POST {} url_len={}", self.endpoint, url.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(encode_request(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = match self.read_body(response).await {
                Ok(body) => decode_error_detail(&body),
                Err(err) => {
                    classifier_warn!("Unreadable error body for status {}: {}", status, err);
                    None
                }
            };
            return Err(AnalysisError::new(
                FailureKind::ServiceStatus {
                    status: status.as_u16(),
                    detail,
                },
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        let prediction = decode_prediction(&body)?;
        Ok(AnalysisReport {
            prediction,
            status: status.as_u16(),
            byte_len: body.len() as u64,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AnalysisError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    AnalysisError::new(kind, message)
}
