use thiserror::Error;

use crate::workflow::types::{FeatureField, Progress};

/// Local, pre-network failure of the prediction form. Never reaches the server.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", describe_missing(.missing))]
pub struct ValidationError {
    /// Empty fields, in form order.
    pub missing: Vec<FeatureField>,
}

fn describe_missing(missing: &[FeatureField]) -> String {
    missing
        .iter()
        .map(|field| field.required_message())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("Please select a file to upload.")]
    NoFileSelected,

    /// The backend answered with a non-success status. Body detail is only logged.
    #[error("File upload failed")]
    Rejected { status: u16, detail: Option<String> },

    #[error("File upload failed")]
    Transport { detail: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("Upload a dataset before training a model.")]
    NoDataset,

    #[error("A training job is already running.")]
    AlreadyRunning,

    #[error("Failed to start model training: {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to start model training. Please try again.")]
    Transport { detail: String },

    /// The stream broke after the server accepted the job.
    #[error("Model training stream interrupted: {detail}")]
    Interrupted { detail: String, progress: Progress },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A prediction is already in progress.")]
    InFlight,

    #[error("Prediction failed: {message}")]
    Rejected { status: u16, message: String },

    #[error("Prediction failed: An error occurred")]
    Transport { detail: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported backend URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("Preference storage unavailable: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

impl From<UploadError> for String {
    fn from(err: UploadError) -> Self {
        err.to_string()
    }
}

impl From<TrainingError> for String {
    fn from(err: TrainingError) -> Self {
        err.to_string()
    }
}

impl From<PredictionError> for String {
    fn from(err: PredictionError) -> Self {
        err.to_string()
    }
}

impl From<ConfigError> for String {
    fn from(err: ConfigError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_labels_in_form_order() {
        let err = ValidationError {
            missing: vec![FeatureField::SepalWidth, FeatureField::PetalWidth],
        };
        assert_eq!(
            err.to_string(),
            "SepalWidth is required, PetalWidth is required"
        );
    }

    #[test]
    fn test_transport_errors_hide_detail() {
        let err = PredictionError::Transport {
            detail: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Prediction failed: An error occurred");

        let err = UploadError::Transport {
            detail: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "File upload failed");
    }

    #[test]
    fn test_server_messages_are_surfaced() {
        let err = PredictionError::Rejected {
            status: 404,
            message: "Model or Label Encoder not found".to_string(),
        };
        assert_eq!(
            String::from(err),
            "Prediction failed: Model or Label Encoder not found"
        );

        let err = TrainingError::Rejected {
            status: 404,
            message: "File not found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to start model training: File not found");
    }
}
