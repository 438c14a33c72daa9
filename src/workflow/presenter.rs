use super::types::PredictionResult;

/// Display text for the latest prediction, or nothing before the first success.
pub fn render(result: Option<&PredictionResult>) -> Option<String> {
    result.map(|r| {
        format!(
            "Predicted Class: {} (Confidence: {}%)",
            r.label, r.confidence
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_absent_result() {
        assert_eq!(render(None), None);
    }

    #[test]
    fn test_render_formats_label_and_confidence() {
        let result = PredictionResult {
            label: "setosa".to_string(),
            confidence: 97.2,
        };
        assert_eq!(
            render(Some(&result)).as_deref(),
            Some("Predicted Class: setosa (Confidence: 97.2%)")
        );
    }

    #[test]
    fn test_render_whole_confidence_has_no_trailing_zero() {
        let result = PredictionResult {
            label: "virginica".to_string(),
            confidence: 88.0,
        };
        assert_eq!(
            render(Some(&result)).as_deref(),
            Some("Predicted Class: virginica (Confidence: 88%)")
        );
    }
}
