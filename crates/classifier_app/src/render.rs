//! Plain-text rendering of the analysis view model.

use classifier_core::AnalysisViewModel;

pub const CONFIDENCE_BAR_WIDTH: usize = 20;

pub fn render(view: &AnalysisViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }

    if view.is_pending {
        lines.push("Analyzing URL security...".to_string());
        lines.push("Checking for malware, phishing, and other threats".to_string());
        return lines;
    }

    if let Some(result) = &view.result {
        lines.push(format!("Analysis Result [{}]", result.category_label));
        lines.push(result.headline.to_string());
        lines.push(result.description.clone());
        lines.push(format!(
            "Confidence Score: {} {}",
            result.confidence_text,
            confidence_bar(result.confidence, CONFIDENCE_BAR_WIDTH)
        ));
        lines.push(format!("URL analyzed: {}", result.analyzed_url));
        if let Some(settled_utc) = &result.settled_utc {
            lines.push(format!("Analyzed at: {settled_utc}"));
        }
    } else if view.error.is_none() {
        lines.push("Enter a URL to check if it's malicious or safe".to_string());
    }

    lines
}

/// `[#####-----]` style bar; confidence is clamped to 0..=1.
pub fn confidence_bar(confidence: f64, width: usize) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
