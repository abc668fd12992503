//! Progress reporting for long-running operations
//!
//! Batch scrapes and crawls report what they are doing through a caller
//! supplied callback. Events are delivered in order from the task that runs
//! the operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Whether an operation is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    InProgress,
    Done,
}

/// One progress notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub message: String,
    /// Short machine-readable name of the current phase (e.g. `fetch`, `chunk`)
    pub stage: String,
}

type Sink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Delivers [`ProgressEvent`]s to an optional callback
#[derive(Clone, Default)]
pub struct ProgressReporter {
    sink: Option<Sink>,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

impl ProgressReporter {
    /// Creates a reporter that forwards every event to `callback`
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        Self {
            sink: Some(Arc::new(callback)),
        }
    }

    /// Creates a reporter that drops every event
    pub fn silent() -> Self {
        Self { sink: None }
    }

    /// Reports that work in `stage` is under way
    pub fn in_progress(&self, stage: &str, message: impl Into<String>) {
        self.emit(ProgressStatus::InProgress, stage, message.into());
    }

    /// Reports that work in `stage` has finished
    pub fn done(&self, stage: &str, message: impl Into<String>) {
        self.emit(ProgressStatus::Done, stage, message.into());
    }

    fn emit(&self, status: ProgressStatus, stage: &str, message: String) {
        tracing::trace!("progress [{}] {}", stage, message);
        if let Some(sink) = &self.sink {
            sink(ProgressEvent {
                status,
                message,
                stage: stage.to_string(),
            });
        }
    }
}
