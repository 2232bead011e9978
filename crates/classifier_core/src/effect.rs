/// Work the core asks the outside world to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the raw input to the analysis service.
    AnalyzeUrl {
        request_id: crate::RequestId,
        url: String,
    },
    /// Abandon an in-flight request; its completion will be ignored.
    CancelAnalysis { request_id: crate::RequestId },
}
