use crate::{Category, ClassificationResult};

/// Read-only snapshot handed to whatever renders the analysis screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisViewModel {
    pub input: String,
    pub is_pending: bool,
    /// The submit control should be disabled while a request is pending.
    pub submit_enabled: bool,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    pub outstanding_requests: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub category: Option<Category>,
    pub category_label: String,
    pub headline: &'static str,
    pub is_benign: bool,
    pub confidence: f64,
    pub confidence_text: String,
    pub description: String,
    pub analyzed_url: String,
    pub settled_utc: Option<String>,
}

impl ResultView {
    pub(crate) fn new(
        result: &ClassificationResult,
        analyzed_url: &str,
        settled_utc: Option<String>,
    ) -> Self {
        let is_benign = result.category == Some(Category::Benign);
        Self {
            category: result.category,
            category_label: result
                .category
                .map_or("Unknown", Category::label)
                .to_string(),
            headline: if is_benign {
                "Safe URL Detected"
            } else {
                "Threat Detected"
            },
            is_benign,
            confidence: result.confidence,
            confidence_text: format_confidence(result.confidence),
            description: result.description.clone(),
            analyzed_url: analyzed_url.to_string(),
            settled_utc,
        }
    }
}

/// Formats a 0..1 confidence as a percentage with one decimal, e.g. `0.97` -> `97.0%`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}
