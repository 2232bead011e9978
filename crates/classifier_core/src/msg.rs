use crate::ClassificationResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User submitted the current input for analysis.
    SubmitClicked,
    /// A dispatched analysis request completed.
    AnalysisSettled {
        request_id: crate::RequestId,
        outcome: AnalysisOutcome,
        /// Receive time as reported by the engine, if known.
        settled_utc: Option<String>,
    },
}

/// How a dispatched request ended, before it is turned into user-facing state.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// 2xx with a well-formed payload.
    Classified(ClassificationResult),
    /// Non-2xx; `detail` is the service's own message when it sent one.
    ServiceRejected { status: u16, detail: Option<String> },
    /// The request never produced a response.
    TransportFailed { cause: Option<String> },
    /// 2xx whose body did not match the expected schema.
    MalformedResponse { cause: String },
}
