use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::presenter;

/// Maximum number of notices kept for display.
pub const MAX_NOTICES: usize = 5;

/// The locally chosen dataset file. Replaced wholesale on re-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSelection {
    pub display_name: String,
    pub bytes: Arc<[u8]>,
}

impl FileSelection {
    pub fn new(display_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            display_name: display_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Server-assigned identifier of an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetHandle {
    pub filename: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Uploaded,
    UploadFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrainingStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Training progress as estimated from the streamed response size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Percentage in `[0, 100]`.
    Percent(f64),
    /// The server did not declare a usable content length.
    Indeterminate,
}

impl Progress {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Progress::Percent(value) => Some(*value),
            Progress::Indeterminate => None,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress::Percent(0.0)
    }
}

/// Evaluation details the backend returns once a model is trained.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrainingSummary {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub evaluation: BTreeMap<String, f64>,
}

impl TrainingSummary {
    /// One-line description, e.g. `accuracy: 0.9556`.
    pub fn evaluation_line(&self) -> Option<String> {
        if self.evaluation.is_empty() {
            return None;
        }
        Some(
            self.evaluation
                .iter()
                .map(|(metric, score)| format!("{}: {:.4}", metric, score))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingJobState {
    pub status: TrainingStatus,
    pub progress: Progress,
    /// Dataset the current (or last) job was started for.
    pub filename: Option<String>,
    pub summary: Option<TrainingSummary>,
    pub error: Option<String>,
}

impl TrainingJobState {
    pub fn is_running(&self) -> bool {
        self.status == TrainingStatus::Running
    }
}

/// The four inputs of the prediction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureField {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl FeatureField {
    pub const ALL: [FeatureField; 4] = [
        FeatureField::SepalLength,
        FeatureField::SepalWidth,
        FeatureField::PetalLength,
        FeatureField::PetalWidth,
    ];

    /// Wire key used in the `/predict` request body.
    pub fn key(&self) -> &'static str {
        match self {
            FeatureField::SepalLength => "sepalLength",
            FeatureField::SepalWidth => "sepalWidth",
            FeatureField::PetalLength => "petalLength",
            FeatureField::PetalWidth => "petalWidth",
        }
    }

    /// Human-readable label: the key with its first letter capitalized.
    pub fn label(&self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn required_message(&self) -> String {
        format!("{} is required", self.label())
    }
}

/// Feature record submitted for inference. Values are sent verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub sepal_length: String,
    pub sepal_width: String,
    pub petal_length: String,
    pub petal_width: String,
}

impl PredictionInput {
    pub fn get(&self, field: FeatureField) -> &str {
        match field {
            FeatureField::SepalLength => &self.sepal_length,
            FeatureField::SepalWidth => &self.sepal_width,
            FeatureField::PetalLength => &self.petal_length,
            FeatureField::PetalWidth => &self.petal_width,
        }
    }

    pub fn set(&mut self, field: FeatureField, value: impl Into<String>) {
        let slot = match field {
            FeatureField::SepalLength => &mut self.sepal_length,
            FeatureField::SepalWidth => &mut self.sepal_width,
            FeatureField::PetalLength => &mut self.petal_length,
            FeatureField::PetalWidth => &mut self.petal_width,
        };
        *slot = value.into();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PredictStatus {
    #[default]
    Idle,
    Validating,
    ValidationFailed,
    Predicting,
    Predicted,
    PredictFailed,
}

/// Classification returned by `/predict`. Label and confidence always travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Everything the dashboard renders, owned by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub selected_file: Option<String>,
    pub upload: UploadStatus,
    pub dataset: Option<DatasetHandle>,
    pub training: TrainingJobState,
    pub input: PredictionInput,
    pub predict: PredictStatus,
    pub field_errors: Vec<FeatureField>,
    pub prediction: Option<PredictionResult>,
    pub notices: Vec<Notice>,
    next_notice_id: u64,
}

impl WorkflowState {
    /// Training is unlocked solely by the presence of a dataset handle.
    pub fn training_available(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn is_predicting(&self) -> bool {
        self.predict == PredictStatus::Predicting
    }

    pub fn field_error(&self, field: FeatureField) -> Option<String> {
        self.field_errors
            .contains(&field)
            .then(|| field.required_message())
    }

    pub fn rendered_result(&self) -> Option<String> {
        presenter::render(self.prediction.as_ref())
    }

    pub(crate) fn push_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id: self.next_notice_id,
            level,
            message: message.into(),
        });
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
    }

    pub(crate) fn dismiss_notice(&mut self, id: u64) {
        self.notices.retain(|n| n.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_labels_capitalize_key() {
        let labels: Vec<String> = FeatureField::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            vec!["SepalLength", "SepalWidth", "PetalLength", "PetalWidth"]
        );
    }

    #[test]
    fn test_input_serializes_wire_keys_verbatim() {
        let mut input = PredictionInput::default();
        input.set(FeatureField::SepalLength, "5.1");
        input.set(FeatureField::SepalWidth, "3.5");
        input.set(FeatureField::PetalLength, "1.4");
        input.set(FeatureField::PetalWidth, " 0.2");

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sepalLength": "5.1",
                "sepalWidth": "3.5",
                "petalLength": "1.4",
                "petalWidth": " 0.2",
            })
        );
    }

    #[test]
    fn test_notices_are_bounded_and_dismissable() {
        let mut state = WorkflowState::default();
        for i in 0..(MAX_NOTICES + 2) {
            state.push_notice(NoticeLevel::Info, format!("notice {}", i));
        }
        assert_eq!(state.notices.len(), MAX_NOTICES);
        assert_eq!(state.notices[0].message, "notice 2");

        let first = state.notices[0].id;
        state.dismiss_notice(first);
        assert_eq!(state.notices.len(), MAX_NOTICES - 1);
        assert!(state.notices.iter().all(|n| n.id != first));
    }

    #[test]
    fn test_summary_evaluation_line() {
        let summary: TrainingSummary = serde_json::from_str(
            r#"{"message":"Model trained successfully","model_path":"models/model.pkl","evaluation":{"accuracy":0.9556}}"#,
        )
        .unwrap();
        assert_eq!(summary.evaluation_line().as_deref(), Some("accuracy: 0.9556"));
        assert_eq!(summary.model_path.as_deref(), Some("models/model.pkl"));
    }
}
