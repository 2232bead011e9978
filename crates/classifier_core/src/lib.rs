//! Classifier core: pure analysis request state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{AnalysisOutcome, Msg};
pub use state::{
    AppState, Category, ClassificationResult, ErrorInfo, ErrorKind, RequestId, RequestState,
    SubmitPolicy, EMPTY_INPUT_MESSAGE, PARSE_FAILURE_MESSAGE, SERVICE_FALLBACK_MESSAGE,
    TRANSPORT_FALLBACK_MESSAGE,
};
pub use update::update;
pub use view_model::{format_confidence, AnalysisViewModel, ResultView};
