use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::backend::Transport;
use crate::error::{PredictionError, TrainingError, UploadError};

use super::prediction;
use super::training::{self, TrainingEvent};
use super::types::{
    DatasetHandle, FeatureField, FileSelection, NoticeLevel, PredictStatus, PredictionResult,
    Progress, TrainingJobState, TrainingStatus, TrainingSummary, UploadStatus, WorkflowState,
};
use super::upload;

type Observer = Box<dyn Fn(&WorkflowState) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum Operation {
    Upload,
    Training,
    Prediction,
}

/// One monotonic counter per operation kind. Only the most recently started
/// operation of a kind may write its outcome into the workflow state.
#[derive(Debug, Default)]
struct RequestTokens {
    upload: AtomicU64,
    training: AtomicU64,
    prediction: AtomicU64,
}

impl RequestTokens {
    fn counter(&self, op: Operation) -> &AtomicU64 {
        match op {
            Operation::Upload => &self.upload,
            Operation::Training => &self.training,
            Operation::Prediction => &self.prediction,
        }
    }

    fn begin(&self, op: Operation) -> u64 {
        self.counter(op).fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, op: Operation, token: u64) -> bool {
        self.counter(op).load(Ordering::SeqCst) == token
    }
}

/// Coordinates upload, training and prediction for one dashboard.
///
/// State lives behind a mutex that is never held across an await; subscribers
/// receive a snapshot after every change and must not call back into the
/// workflow synchronously.
pub struct Workflow<T> {
    transport: T,
    selection: Mutex<Option<FileSelection>>,
    state: Mutex<WorkflowState>,
    observers: Mutex<Vec<Observer>>,
    tokens: RequestTokens,
}

impl<T: Transport> Workflow<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            selection: Mutex::new(None),
            state: Mutex::new(WorkflowState::default()),
            observers: Mutex::new(Vec::new()),
            tokens: RequestTokens::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn subscribe(&self, observer: impl Fn(&WorkflowState) + Send + Sync + 'static) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    pub fn snapshot(&self) -> WorkflowState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current file selection. An empty file is still selected but raises a notice.
    pub fn select_file(&self, selection: FileSelection) {
        info!(
            "Selected dataset file '{}' ({} bytes)",
            selection.display_name,
            selection.len()
        );
        let name = selection.display_name.clone();
        let empty = selection.is_empty();
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = Some(selection);
        self.mutate(|s| {
            if empty {
                warn!("Selected dataset file '{}' is empty", name);
                s.push_notice(NoticeLevel::Error, format!("The file {} is empty.", name));
            }
            s.selected_file = Some(name);
        });
    }

    /// Upload the selected file. On success the returned handle unlocks training.
    ///
    /// A failed upload leaves any earlier handle in place. If another upload was
    /// started meanwhile, this one's outcome is returned but not recorded.
    pub async fn upload(&self) -> Result<DatasetHandle, UploadError> {
        let selection = self
            .selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if selection.is_none() {
            let err = UploadError::NoFileSelected;
            self.mutate(|s| s.push_notice(NoticeLevel::Error, err.to_string()));
            return Err(err);
        }

        let token = self.mutate(|s| {
            s.upload = UploadStatus::Uploading;
            self.tokens.begin(Operation::Upload)
        });

        let outcome = upload::upload_dataset(&self.transport, selection.as_ref()).await;

        if !self.tokens.is_current(Operation::Upload, token) {
            debug!("Discarding stale upload response (token {})", token);
            return outcome;
        }

        self.mutate(|s| match &outcome {
            Ok(handle) => {
                s.upload = UploadStatus::Uploaded;
                s.dataset = Some(handle.clone());
                s.push_notice(NoticeLevel::Info, "File uploaded successfully");
            }
            Err(e) => {
                s.upload = UploadStatus::UploadFailed;
                s.push_notice(NoticeLevel::Error, e.to_string());
            }
        });
        outcome
    }

    /// Train a model on the current dataset, streaming progress into the state.
    pub async fn train(&self) -> Result<Option<TrainingSummary>, TrainingError> {
        let started = self.mutate(|s| {
            let Some(handle) = s.dataset.clone() else {
                s.push_notice(NoticeLevel::Error, TrainingError::NoDataset.to_string());
                return Err(TrainingError::NoDataset);
            };
            if s.training.is_running() {
                return Err(TrainingError::AlreadyRunning);
            }
            s.training = TrainingJobState {
                status: TrainingStatus::Running,
                progress: Progress::Percent(0.0),
                filename: Some(handle.filename.clone()),
                summary: None,
                error: None,
            };
            Ok((handle, self.tokens.begin(Operation::Training)))
        });

        let (handle, token) = match started {
            Ok(started) => started,
            Err(e) => {
                warn!("Training not started: {}", e);
                return Err(e);
            }
        };

        training::run_training(&self.transport, &handle, |event| {
            self.apply_training_event(token, &handle, event)
        })
        .await
    }

    fn apply_training_event(&self, token: u64, handle: &DatasetHandle, event: TrainingEvent) {
        if !self.tokens.is_current(Operation::Training, token) {
            debug!("Discarding stale training event (token {})", token);
            return;
        }

        self.mutate(|s| match event {
            TrainingEvent::Started { initial } => {
                s.training.progress = initial;
            }
            TrainingEvent::Progress(progress) => {
                s.training.progress = progress;
            }
            TrainingEvent::Succeeded { summary } => {
                s.training.status = TrainingStatus::Succeeded;
                s.training.progress = Progress::Percent(100.0);
                s.training.summary = summary;
                s.push_notice(
                    NoticeLevel::Info,
                    format!("Model training finished for the file: {}", handle.filename),
                );
            }
            TrainingEvent::Failed { error, progress } => {
                s.training.status = TrainingStatus::Failed;
                s.training.progress = progress;
                s.training.error = Some(error.to_string());
                s.push_notice(NoticeLevel::Error, error.to_string());
            }
        });
    }

    /// Update one field of the prediction form.
    pub fn set_field(&self, field: FeatureField, value: impl Into<String>) {
        let value = value.into();
        self.mutate(|s| s.input.set(field, value));
    }

    /// Validate the form and, if valid, request a prediction.
    ///
    /// Rejected with [`PredictionError::InFlight`] while an earlier request is pending.
    pub async fn predict(&self) -> Result<PredictionResult, PredictionError> {
        let started = self.mutate(|s| {
            if s.is_predicting() {
                return Err(PredictionError::InFlight);
            }
            s.predict = PredictStatus::Validating;
            if let Err(e) = prediction::validate(&s.input) {
                s.predict = PredictStatus::ValidationFailed;
                s.field_errors = e.missing.clone();
                return Err(PredictionError::Validation(e));
            }
            s.field_errors.clear();
            s.predict = PredictStatus::Predicting;
            s.prediction = None;
            Ok((s.input.clone(), self.tokens.begin(Operation::Prediction)))
        });

        let (input, token) = match started {
            Ok(started) => started,
            Err(e) => {
                debug!("Prediction not submitted: {}", e);
                return Err(e);
            }
        };

        let outcome = prediction::submit(&self.transport, &input).await;

        if !self.tokens.is_current(Operation::Prediction, token) {
            debug!("Discarding stale prediction response (token {})", token);
            return outcome;
        }

        self.mutate(|s| match &outcome {
            Ok(result) => {
                s.predict = PredictStatus::Predicted;
                s.prediction = Some(result.clone());
            }
            Err(e) => {
                s.predict = PredictStatus::PredictFailed;
                s.prediction = None;
                s.push_notice(NoticeLevel::Error, e.to_string());
            }
        });
        outcome
    }

    pub fn dismiss_notice(&self, id: u64) {
        self.mutate(|s| s.dismiss_notice(id));
    }

    /// Surface a failure that happened outside the workflow (e.g. reading a local file).
    pub fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.mutate(|s| s.push_notice(NoticeLevel::Error, message));
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut WorkflowState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut state);
            (result, state.clone())
        };
        let observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer(&snapshot);
        }
        result
    }
}
