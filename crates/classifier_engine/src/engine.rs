use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use classifier_logging::{classifier_debug, classifier_info, classifier_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{AnalysisClient, ClientSettings, ReqwestAnalysisClient};
use crate::{AnalysisError, EngineEvent, FailureKind, RequestId};

/// Produces the timestamp attached to each completion.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid analysis endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Analyze { request_id: RequestId, url: String },
    Cancel { request_id: RequestId },
}

/// Runs analysis requests on a background tokio runtime.
///
/// Completions are delivered in the order they finish, not the order they
/// were started.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, clock: Option<Clock>) -> Result<Self, EngineError> {
        let client = ReqwestAnalysisClient::new(settings)?;
        classifier_info!("Analysis endpoint {}", client.endpoint());
        Self::with_client(Arc::new(client), clock)
    }

    pub fn with_client(
        client: Arc<dyn AnalysisClient>,
        clock: Option<Clock>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            let in_flight: InFlight = Arc::default();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Analyze { request_id, url } => {
                        let token = CancellationToken::new();
                        lock(&in_flight).insert(request_id, token.clone());
                        runtime.spawn(run_analysis(
                            client.clone(),
                            request_id,
                            url,
                            token,
                            in_flight.clone(),
                            event_tx.clone(),
                            clock.clone(),
                        ));
                    }
                    EngineCommand::Cancel { request_id } => {
                        if let Some(token) = lock(&in_flight).remove(&request_id) {
                            classifier_debug!("Cancelling request {}", request_id);
                            token.cancel();
                        }
                    }
                }
            }
            // Dropping the runtime drops unfinished requests with their event senders.
            classifier_debug!("Engine command channel closed, stopping runtime");
        });

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
        })
    }

    pub fn analyze(&self, request_id: RequestId, url: impl Into<String>) {
        self.send(EngineCommand::Analyze {
            request_id,
            url: url.into(),
        });
    }

    /// Abandon a request. It still reports a completion, as `FailureKind::Cancelled`.
    pub fn cancel(&self, request_id: RequestId) {
        self.send(EngineCommand::Cancel { request_id });
    }

    /// Stop accepting work and tear down the runtime. Requests still in flight
    /// never complete; once buffered completions are drained, `recv` returns
    /// `None`.
    pub fn shutdown(&mut self) {
        if self.cmd_tx.take().is_some() {
            classifier_info!("Analysis engine shutting down");
        }
    }

    fn send(&self, command: EngineCommand) {
        match &self.cmd_tx {
            Some(cmd_tx) => {
                let _ = cmd_tx.send(command);
            }
            None => classifier_warn!("Analysis engine already shut down, command dropped"),
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next completion. `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_analysis(
    client: Arc<dyn AnalysisClient>,
    request_id: RequestId,
    url: String,
    token: CancellationToken,
    in_flight: InFlight,
    event_tx: mpsc::Sender<EngineEvent>,
    clock: Option<Clock>,
) {
    let result = tokio::select! {
        _ = token.cancelled() => Err(AnalysisError::new(FailureKind::Cancelled, "request cancelled")),
        result = client.analyze(&url) => result,
    };
    lock(&in_flight).remove(&request_id);

    match &result {
        Ok(report) => classifier_info!(
            "Request {} classified as {:?} ({:.3})",
            request_id,
            report.prediction.threat_type,
            report.prediction.confidence
        ),
        Err(err) if err.kind == FailureKind::Cancelled => {
            classifier_debug!("Request {} cancelled", request_id)
        }
        Err(err) => classifier_warn!("Request {} failed: {}", request_id, err),
    }

    let received_utc = clock.as_ref().map(|clock| clock());
    let _ = event_tx.send(EngineEvent::AnalysisCompleted {
        request_id,
        result,
        received_utc,
    });
}
