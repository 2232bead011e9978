use serde::{Deserialize, Deserializer};

use crate::{AnalysisError, FailureKind, Prediction, ThreatType};

#[derive(Debug, Deserialize)]
struct PredictionPayload {
    #[serde(rename = "type", deserialize_with = "nullable")]
    threat_type: Option<ThreatType>,
    confidence: f64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

// `type` must be present; only an explicit null maps to None.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Request body for the predict endpoint: `{"url": <raw input>}`.
pub fn encode_request(url: &str) -> Vec<u8> {
    serde_json::json!({ "url": url }).to_string().into_bytes()
}

/// Parse a 2xx body into a [`Prediction`], rejecting anything off-schema.
pub fn decode_prediction(bytes: &[u8]) -> Result<Prediction, AnalysisError> {
    let payload: PredictionPayload = serde_json::from_slice(bytes)
        .map_err(|err| AnalysisError::new(FailureKind::InvalidPayload, err.to_string()))?;

    if !payload.confidence.is_finite() || !(0.0..=1.0).contains(&payload.confidence) {
        return Err(AnalysisError::new(
            FailureKind::InvalidPayload,
            format!("confidence {} outside 0..=1", payload.confidence),
        ));
    }

    Ok(Prediction {
        threat_type: payload.threat_type,
        confidence: payload.confidence,
        description: payload.description,
    })
}

/// Extract the `detail` string from an error body, if there is one.
pub fn decode_error_detail(bytes: &[u8]) -> Option<String> {
    let payload: ErrorPayload = serde_json::from_slice(bytes).ok()?;
    match payload.detail? {
        serde_json::Value::String(detail) => Some(detail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_raw_input() {
        let body = encode_request(" example.com ");
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "url": " example.com " }));
    }

    #[test]
    fn null_type_is_unknown_but_missing_type_is_rejected() {
        let prediction =
            decode_prediction(br#"{"type": null, "confidence": 0.4, "description": "?"}"#)
                .unwrap();
        assert_eq!(prediction.threat_type, None);

        let err = decode_prediction(br#"{"confidence": 0.4, "description": "?"}"#).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidPayload);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = decode_prediction(br#"{"type": "Spam", "confidence": 0.4, "description": "?"}"#)
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidPayload);
    }

    #[test]
    fn confidence_outside_unit_range_is_rejected() {
        let err = decode_prediction(br#"{"type": "Benign", "confidence": 1.5, "description": ""}"#)
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidPayload);
        assert!(err.message.contains("1.5"));
    }

    #[test]
    fn integer_confidence_is_accepted() {
        let prediction =
            decode_prediction(br#"{"type": "Malware", "confidence": 1, "description": "x"}"#)
                .unwrap();
        assert_eq!(prediction.confidence, 1.0);
        assert_eq!(prediction.threat_type, Some(ThreatType::Malware));
    }

    #[test]
    fn error_detail_only_taken_from_strings() {
        assert_eq!(
            decode_error_detail(br#"{"detail": "model unavailable"}"#).as_deref(),
            Some("model unavailable")
        );
        assert_eq!(decode_error_detail(br#"{"detail": [{"msg": "bad"}]}"#), None);
        assert_eq!(decode_error_detail(br#"{}"#), None);
        assert_eq!(decode_error_detail(b"Service Unavailable"), None);
    }
}
