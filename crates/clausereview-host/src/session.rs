//! Review session state machine.
//!
//! ```text
//!  Idle ──upload──▶ AwaitingSelection ──run──▶ Running ──done──▶ AwaitingSelection
//!   ▲                                                │
//!   │                                              stop
//!   └──────────────reset────────── Stopped ◀─────────┘
//! ```
//!
//! The stop flag is only consulted at the start of a run. A question whose
//! extraction has already started always runs to completion.

use clausereview_ai::QaPipeline;
use clausereview_core::{ClauseQuestion, PipelineParams, Prediction, display_category};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ReviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingSelection,
    Running,
    Stopped,
}

/// What a `run` event produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// One prediction per selected question, in selection order.
    Completed(Vec<Prediction>),
    /// The stop flag was set; nothing ran.
    Stopped,
    /// Empty selection; nothing ran.
    NothingSelected,
    /// No contract uploaded yet; nothing ran.
    NoDocument,
}

/// Per-user session state: selection, stop flag, and upload identity.
#[derive(Debug)]
pub struct ReviewSession {
    state: SessionState,
    selection: Vec<&'static ClauseQuestion>,
    stopped: bool,
    upload_token: Uuid,
    uploaded: Option<String>,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            selection: Vec::new(),
            stopped: false,
            upload_token: Uuid::new_v4(),
            uploaded: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selection(&self) -> &[&'static ClauseQuestion] {
        &self.selection
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Identifies the current upload widget; changes on every reset.
    pub fn upload_token(&self) -> Uuid {
        self.upload_token
    }

    pub fn uploaded(&self) -> Option<&str> {
        self.uploaded.as_deref()
    }

    /// Record a successfully ingested upload.
    pub fn on_upload(&mut self, name: &str) {
        self.uploaded = Some(name.to_string());
        if self.state == SessionState::Idle {
            self.state = SessionState::AwaitingSelection;
        }
        debug!(name, token = %self.upload_token, "upload recorded");
    }

    /// Add a question to the selection. Returns `false` if already selected.
    pub fn select(&mut self, question: &'static ClauseQuestion) -> bool {
        if self.selection.iter().any(|q| q.category == question.category) {
            return false;
        }
        self.selection.push(question);
        true
    }

    /// Remove a category from the selection. Returns `false` if it was not selected.
    pub fn deselect(&mut self, category: &str) -> bool {
        let before = self.selection.len();
        self.selection.retain(|q| q.category != category);
        self.selection.len() != before
    }

    /// Run the current selection through the pipeline.
    pub fn on_run<P: QaPipeline + ?Sized>(
        &mut self,
        pipeline: &mut P,
        params: PipelineParams,
    ) -> Result<RunOutcome, ReviewError> {
        if self.uploaded.is_none() {
            return Ok(RunOutcome::NoDocument);
        }
        if self.stopped {
            info!("prediction stopped");
            return Ok(RunOutcome::Stopped);
        }
        if self.selection.is_empty() {
            return Ok(RunOutcome::NothingSelected);
        }

        let questions: Vec<&str> = self.selection.iter().map(|q| q.question.as_str()).collect();
        self.state = SessionState::Running;
        let result = run_review(pipeline, &questions, self.stopped, params);
        self.state = SessionState::AwaitingSelection;
        result.map(RunOutcome::Completed)
    }

    /// Request that the next run be skipped.
    pub fn on_stop(&mut self) {
        self.stopped = true;
        self.state = SessionState::Stopped;
        info!("stop requested");
    }

    /// Clear the selection, the stop flag, and the uploaded file identity.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.stopped = false;
        self.uploaded = None;
        self.state = SessionState::Idle;

        let previous = self.upload_token;
        while self.upload_token == previous {
            self.upload_token = Uuid::new_v4();
        }
        info!(token = %self.upload_token, "session reset");
    }
}

/// Run each selected question through the pipeline, in order.
///
/// Returns nothing if `stopped` is set or `selected` is empty; the pipeline
/// is not touched in either case. Questions run one after another, each to
/// completion. The first failure aborts the remaining questions.
pub fn run_review<P: QaPipeline + ?Sized>(
    pipeline: &mut P,
    selected: &[&str],
    stopped: bool,
    params: PipelineParams,
) -> Result<Vec<Prediction>, ReviewError> {
    if stopped || selected.is_empty() {
        return Ok(Vec::new());
    }

    info!(questions = selected.len(), "running review");
    let mut predictions = Vec::with_capacity(selected.len());
    for &query in selected {
        let prediction = pipeline
            .run(query, params)
            .map_err(|e| ReviewError::Pipeline {
                question: display_category(query).unwrap_or(query).to_string(),
                source: e.into(),
            })?;
        debug!(
            category = prediction.category.as_deref().unwrap_or("-"),
            answers = prediction.answers.len(),
            "question answered"
        );
        predictions.push(prediction);
    }
    Ok(predictions)
}
