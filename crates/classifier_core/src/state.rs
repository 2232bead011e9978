use std::collections::BTreeMap;
use std::fmt;

use crate::view_model::{AnalysisViewModel, ResultView};
use crate::AnalysisOutcome;

pub type RequestId = u64;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a URL";
pub const SERVICE_FALLBACK_MESSAGE: &str = "Failed to analyze URL";
pub const TRANSPORT_FALLBACK_MESSAGE: &str =
    "An error occurred while analyzing the URL. Please try again.";
pub const PARSE_FAILURE_MESSAGE: &str = "The analysis service returned an invalid response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Malware,
    Phishing,
    Defacement,
    Benign,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Malware => "Malware",
            Category::Phishing => "Phishing",
            Category::Defacement => "Defacement",
            Category::Benign => "Benign",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict returned by the analysis service. `category` is `None` when the
/// service could not name one.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: Option<Category>,
    pub confidence: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Service,
    Transport,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// Text shown to the user.
    pub message: String,
    /// Diagnostic detail for logs; never rendered as the message.
    pub cause: Option<String>,
}

impl ErrorInfo {
    pub fn empty_input() -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: EMPTY_INPUT_MESSAGE.to_string(),
            cause: None,
        }
    }

    pub fn service(status: u16, detail: Option<String>) -> Self {
        let message = detail
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| SERVICE_FALLBACK_MESSAGE.to_string());
        Self {
            kind: ErrorKind::Service,
            message,
            cause: Some(format!("http status {status}")),
        }
    }

    pub fn transport(cause: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: TRANSPORT_FALLBACK_MESSAGE.to_string(),
            cause,
        }
    }

    pub fn parse(cause: String) -> Self {
        Self {
            kind: ErrorKind::Parse,
            message: PARSE_FAILURE_MESSAGE.to_string(),
            cause: Some(cause),
        }
    }
}

/// What to do with a submission while an earlier one is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Cancel every in-flight request; only the newest one may settle.
    #[default]
    Supersede,
    /// Ignore the submission until the pending request settles.
    RejectWhilePending,
    /// Let every request settle; the last completion to arrive wins.
    LastWriteWins,
}

/// Exactly one of these holds at a time. Result and error live inside the
/// variants, so a pending request can never show stale data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending {
        request_id: RequestId,
        url: String,
    },
    Succeeded {
        result: ClassificationResult,
        url: String,
        settled_utc: Option<String>,
    },
    Failed(ErrorInfo),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    input: String,
    request: RequestState,
    in_flight: BTreeMap<RequestId, String>,
    next_request_id: RequestId,
    policy: SubmitPolicy,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SubmitPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.request, RequestState::Pending { .. })
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        match &self.request {
            RequestState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match &self.request {
            RequestState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Requests dispatched whose completion would still be applied.
    pub fn outstanding_requests(&self) -> usize {
        self.in_flight.len()
    }

    pub fn outstanding_request_ids(&self) -> Vec<RequestId> {
        self.in_flight.keys().copied().collect()
    }

    pub fn view(&self) -> AnalysisViewModel {
        let is_pending = self.is_pending();
        let result = match &self.request {
            RequestState::Succeeded {
                result,
                url,
                settled_utc,
            } => Some(ResultView::new(result, url, settled_utc.clone())),
            _ => None,
        };
        AnalysisViewModel {
            input: self.input.clone(),
            is_pending,
            submit_enabled: !is_pending,
            result,
            error: self.error().map(|error| error.message.clone()),
            outstanding_requests: self.in_flight.len(),
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.dirty = true;
        }
    }

    pub(crate) fn fail(&mut self, error: ErrorInfo) {
        self.request = RequestState::Failed(error);
        self.dirty = true;
    }

    /// Forget every in-flight request and return their ids.
    pub(crate) fn abandon_in_flight(&mut self) -> Vec<RequestId> {
        let abandoned: Vec<RequestId> = self.in_flight.keys().copied().collect();
        self.in_flight.clear();
        if !abandoned.is_empty() {
            self.dirty = true;
        }
        abandoned
    }

    /// Clear the previous outcome and enter Pending for a new request.
    pub(crate) fn begin_request(&mut self, url: String) -> RequestId {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight.insert(request_id, url.clone());
        self.request = RequestState::Pending { request_id, url };
        self.dirty = true;
        request_id
    }

    /// Apply a completion. Returns `false` when the request is no longer tracked.
    pub(crate) fn settle(
        &mut self,
        request_id: RequestId,
        outcome: AnalysisOutcome,
        settled_utc: Option<String>,
    ) -> bool {
        let Some(url) = self.in_flight.remove(&request_id) else {
            return false;
        };

        self.request = match outcome {
            AnalysisOutcome::Classified(result) => RequestState::Succeeded {
                result,
                url,
                settled_utc,
            },
            AnalysisOutcome::ServiceRejected { status, detail } => {
                RequestState::Failed(ErrorInfo::service(status, detail))
            }
            AnalysisOutcome::TransportFailed { cause } => {
                RequestState::Failed(ErrorInfo::transport(cause))
            }
            AnalysisOutcome::MalformedResponse { cause } => {
                RequestState::Failed(ErrorInfo::parse(cause))
            }
        };
        self.dirty = true;
        true
    }
}
