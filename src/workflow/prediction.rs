use serde::Deserialize;
use tracing::{info, warn};

use crate::backend::{error_message, ResponseBody, Transport, PREDICT_PATH};
use crate::error::{PredictionError, ValidationError};

use super::types::{FeatureField, PredictionInput, PredictionResult};

#[derive(Debug, Deserialize)]
struct PredictResponse {
    prediction: PredictionResult,
}

/// Check that every field is present. Whitespace counts as present; values are
/// sent verbatim and the backend owns numeric parsing.
pub fn validate(input: &PredictionInput) -> Result<(), ValidationError> {
    let missing: Vec<FeatureField> = FeatureField::ALL
        .into_iter()
        .filter(|field| input.get(*field).is_empty())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

/// Validate, then submit. No request is sent for invalid input.
pub async fn predict<T: Transport>(
    transport: &T,
    input: &PredictionInput,
) -> Result<PredictionResult, PredictionError> {
    validate(input)?;
    submit(transport, input).await
}

/// Send an already validated feature record.
pub async fn submit<T: Transport>(
    transport: &T,
    input: &PredictionInput,
) -> Result<PredictionResult, PredictionError> {
    let payload = serde_json::to_value(input).map_err(|e| PredictionError::Transport {
        detail: format!("Failed to encode feature record: {}", e),
    })?;
    info!("Requesting prediction for {}", payload);

    let reply = transport
        .post_json(PREDICT_PATH, &payload)
        .await
        .map_err(|e| {
            warn!("Prediction request failed: {}", e);
            PredictionError::Transport { detail: e.to_string() }
        })?;

    if !reply.is_success() {
        let status = reply.status;
        let body = reply.body.read_all().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
        warn!("Backend rejected prediction ({}): {}", status, message);
        return Err(PredictionError::Rejected { status, message });
    }

    let body = reply.body.read_all().await.map_err(|e| {
        warn!("Failed to read prediction response: {}", e);
        PredictionError::Transport { detail: e.to_string() }
    })?;

    let parsed: PredictResponse = serde_json::from_slice(&body).map_err(|e| {
        warn!("Malformed prediction response: {}", e);
        PredictionError::Transport {
            detail: format!("Failed to parse prediction response: {}", e),
        }
    })?;

    info!(
        "Prediction: {} ({}%)",
        parsed.prediction.label, parsed.prediction.confidence
    );
    Ok(parsed.prediction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> PredictionInput {
        PredictionInput {
            sepal_length: "5.1".to_string(),
            sepal_width: "3.5".to_string(),
            petal_length: "1.4".to_string(),
            petal_width: "0.2".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_input() {
        assert_eq!(validate(&filled()), Ok(()));
    }

    #[test]
    fn test_validate_reports_exactly_the_empty_fields() {
        let mut input = filled();
        input.set(FeatureField::PetalWidth, "");
        let err = validate(&input).unwrap_err();
        assert_eq!(err.missing, vec![FeatureField::PetalWidth]);

        let mut input = filled();
        input.set(FeatureField::SepalLength, "");
        input.set(FeatureField::PetalLength, "");
        let err = validate(&input).unwrap_err();
        assert_eq!(
            err.missing,
            vec![FeatureField::SepalLength, FeatureField::PetalLength]
        );
    }

    #[test]
    fn test_validate_empty_form_lists_all_fields() {
        let err = validate(&PredictionInput::default()).unwrap_err();
        assert_eq!(err.missing, FeatureField::ALL.to_vec());
    }

    #[test]
    fn test_validate_treats_whitespace_as_present() {
        let mut input = filled();
        input.set(FeatureField::SepalWidth, " ");
        assert_eq!(validate(&input), Ok(()));
    }

    #[test]
    fn test_predict_response_decodes_class_key() {
        let parsed: PredictResponse =
            serde_json::from_str(r#"{"prediction":{"class":"setosa","confidence":97.2}}"#).unwrap();
        assert_eq!(parsed.prediction.label, "setosa");
        assert_eq!(parsed.prediction.confidence, 97.2);
    }
}
