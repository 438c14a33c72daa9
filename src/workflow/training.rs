//! Training monitor: starts a job and turns the streamed response into progress.
//!
//! Progress is estimated as `bytes received / declared content-length`. That only
//! tracks real training progress when the server's payload size does, so it is
//! reported as a best-effort figure.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::backend::{error_message, ResponseBody, Transport, TRAIN_PATH};
use crate::error::TrainingError;

use super::types::{DatasetHandle, Progress, TrainingSummary};

/// Upper bound on body bytes kept for decoding the final summary.
pub const SUMMARY_BUFFER_LIMIT: usize = 1024 * 1024;

/// Events emitted by [`run_training`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    /// The server accepted the job and started streaming.
    Started { initial: Progress },
    /// Cumulative progress after a chunk.
    Progress(Progress),
    Succeeded { summary: Option<TrainingSummary> },
    /// `progress` is the last value reported before the failure.
    Failed { error: TrainingError, progress: Progress },
}

/// Cumulative byte counter behind the progress estimate.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    received: u64,
    declared: Option<u64>,
    current: Progress,
}

impl ProgressTracker {
    /// A missing or zero content length yields indeterminate progress.
    pub fn new(content_length: Option<u64>) -> Self {
        let declared = content_length.filter(|len| *len > 0);
        let current = if declared.is_some() {
            Progress::Percent(0.0)
        } else {
            Progress::Indeterminate
        };
        Self {
            received: 0,
            declared,
            current,
        }
    }

    pub fn current(&self) -> Progress {
        self.current
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Account for one chunk. Never decreases and never exceeds 100.
    pub fn record(&mut self, chunk_len: usize) -> Progress {
        self.received = self.received.saturating_add(chunk_len as u64);
        if let (Some(total), Progress::Percent(previous)) = (self.declared, self.current) {
            let estimate = (100.0 * self.received as f64 / total as f64).min(100.0);
            self.current = Progress::Percent(estimate.max(previous));
        }
        self.current
    }

    /// End of stream: success is always reported as 100.
    pub fn finish(&mut self) -> Progress {
        self.current = Progress::Percent(100.0);
        self.current
    }
}

/// Start a training job for `handle` and stream its progress into `on_event`.
///
/// The sink always receives a terminal `Succeeded` or `Failed` event, except when the
/// request cannot be sent at all (then only `Failed`). Nothing is retried.
pub async fn run_training<T, F>(
    transport: &T,
    handle: &DatasetHandle,
    mut on_event: F,
) -> Result<Option<TrainingSummary>, TrainingError>
where
    T: Transport,
    F: FnMut(TrainingEvent),
{
    info!("Starting model training for '{}'", handle.filename);
    let payload = json!({ "filename": handle.filename });

    let reply = match transport.post_json(TRAIN_PATH, &payload).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Training request for '{}' failed: {}", handle.filename, e);
            let error = TrainingError::Transport { detail: e.to_string() };
            on_event(TrainingEvent::Failed {
                error: error.clone(),
                progress: Progress::Percent(0.0),
            });
            return Err(error);
        }
    };

    if !reply.is_success() {
        let status = reply.status;
        let body = reply.body.read_all().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
        warn!(
            "Backend refused training for '{}' ({}): {}",
            handle.filename, status, message
        );
        let error = TrainingError::Rejected { status, message };
        on_event(TrainingEvent::Failed {
            error: error.clone(),
            progress: Progress::Percent(0.0),
        });
        return Err(error);
    }

    let mut tracker = ProgressTracker::new(reply.content_length);
    let mut body = reply.body;
    let mut buffered: Vec<u8> = Vec::new();
    let mut overflowed = false;
    on_event(TrainingEvent::Started {
        initial: tracker.current(),
    });

    loop {
        match body.next_chunk().await {
            Ok(Some(chunk)) => {
                let progress = tracker.record(chunk.len());
                debug!(
                    "Training stream: {} bytes received, progress {:?}",
                    tracker.received(),
                    progress
                );
                if !overflowed {
                    if buffered.len() + chunk.len() <= SUMMARY_BUFFER_LIMIT {
                        buffered.extend_from_slice(&chunk);
                    } else {
                        debug!(
                            "Training response exceeds {} bytes, summary dropped",
                            SUMMARY_BUFFER_LIMIT
                        );
                        overflowed = true;
                        buffered = Vec::new();
                    }
                }
                on_event(TrainingEvent::Progress(progress));
            }
            Ok(None) => break,
            Err(e) => {
                let progress = tracker.current();
                warn!(
                    "Training stream for '{}' interrupted at {:?}: {}",
                    handle.filename, progress, e
                );
                let error = TrainingError::Interrupted {
                    detail: e.to_string(),
                    progress,
                };
                on_event(TrainingEvent::Failed {
                    error: error.clone(),
                    progress,
                });
                return Err(error);
            }
        }
    }

    tracker.finish();
    // Only a complete body is decoded.
    let summary = if overflowed {
        None
    } else {
        serde_json::from_slice::<TrainingSummary>(&buffered).ok()
    };
    info!(
        "Model training for '{}' finished after {} bytes",
        handle.filename,
        tracker.received()
    );
    on_event(TrainingEvent::Succeeded {
        summary: summary.clone(),
    });
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_reports_cumulative_percent() {
        let mut tracker = ProgressTracker::new(Some(100));
        assert_eq!(tracker.current(), Progress::Percent(0.0));
        assert_eq!(tracker.record(50), Progress::Percent(50.0));
        assert_eq!(tracker.record(50), Progress::Percent(100.0));
        assert_eq!(tracker.received(), 100);
    }

    #[test]
    fn test_tracker_clamps_overshoot() {
        let mut tracker = ProgressTracker::new(Some(10));
        assert_eq!(tracker.record(25), Progress::Percent(100.0));
        assert_eq!(tracker.record(5), Progress::Percent(100.0));
    }

    #[test]
    fn test_tracker_is_monotonic_across_empty_chunks() {
        let mut tracker = ProgressTracker::new(Some(200));
        let mut last = 0.0;
        for len in [10, 0, 40, 0, 0, 150] {
            let pct = tracker.record(len).percent().unwrap();
            assert!(pct >= last, "progress went backwards: {} -> {}", last, pct);
            assert!((0.0..=100.0).contains(&pct));
            last = pct;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_tracker_without_length_is_indeterminate() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(tracker.record(64), Progress::Indeterminate);

        let mut tracker = ProgressTracker::new(Some(0));
        assert_eq!(tracker.current(), Progress::Indeterminate);
        assert_eq!(tracker.record(64), Progress::Indeterminate);
        assert_eq!(tracker.finish(), Progress::Percent(100.0));
    }

    #[test]
    fn test_tracker_finish_reconciles_short_stream() {
        let mut tracker = ProgressTracker::new(Some(1000));
        tracker.record(10);
        assert_eq!(tracker.finish(), Progress::Percent(100.0));
    }
}
