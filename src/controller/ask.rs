//! Single-question explain workflow.

use std::sync::{Arc, Mutex};

use super::preview::CitationPreviewCell;
use super::{lock, Mount, Slot, SlotPolicy};
use crate::http::Gateway;
use crate::types::ExplainAnswer;

/// Shown when a failure carries no message of its own
pub const FALLBACK_ERROR: &str = "Request failed";

/// An answer together with one preview cell per citation
#[derive(Debug)]
pub struct AskResult {
    pub answer: ExplainAnswer,
    pub previews: Vec<CitationPreviewCell>,
}

impl AskResult {
    fn unmount_previews(&self) {
        for cell in &self.previews {
            cell.unmount();
        }
    }
}

#[derive(Debug)]
enum Settled {
    Answer(Arc<AskResult>),
    Error(String),
}

/// Observable state of the controller
#[derive(Debug, Clone)]
pub enum AskPhase {
    Idle,
    Loading,
    Success(Arc<AskResult>),
    Error(String),
}

/// What a call to [`AskController::ask`] did
#[must_use]
#[derive(Debug, Clone)]
pub enum AskOutcome {
    /// Blank question; nothing was sent and nothing changed
    Skipped,
    Answered(Arc<AskResult>),
    Failed(String),
}

#[derive(Debug)]
struct AskState {
    loading: bool,
    settled: Slot<Settled>,
}

impl AskState {
    /// Drop the previous answer/error pair, unmounting its preview cells.
    fn clear(&mut self) {
        if let Some(settled) = self.settled.get() {
            if let Settled::Answer(result) = settled.as_ref() {
                result.unmount_previews();
            }
        }
        self.settled.clear();
    }
}

/// Owns the explain request and its loading/result/error state.
///
/// The controller does not queue or coalesce: callers gate resubmission
/// while [`AskController::is_loading`] is true.
#[derive(Clone)]
pub struct AskController {
    gateway: Arc<dyn Gateway>,
    state: Arc<Mutex<AskState>>,
    mount: Mount,
}

impl AskController {
    pub fn new(gateway: Arc<dyn Gateway>, policy: SlotPolicy) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(AskState {
                loading: false,
                settled: Slot::new(policy),
            })),
            mount: Mount::new(),
        }
    }

    pub async fn ask(&self, question: &str) -> AskOutcome {
        if question.trim().is_empty() {
            return AskOutcome::Skipped;
        }

        let ticket = {
            let mut state = lock(&self.state);
            state.clear();
            state.loading = true;
            state.settled.issue()
        };

        // The gateway trims; the question goes out as typed.
        let (settled, outcome) = match self.gateway.explain(question).await {
            Ok(answer) => {
                tracing::debug!(citations = answer.citations.len(), "explain answered");
                for c in answer.citations.iter().filter(|c| !c.is_well_formed()) {
                    tracing::debug!(
                        file = %c.file,
                        start = c.start_line,
                        end = c.end_line,
                        "citation range is inverted"
                    );
                }
                let previews = answer
                    .citations
                    .iter()
                    .map(|c| CitationPreviewCell::new(self.gateway.clone(), c))
                    .collect();
                let result = Arc::new(AskResult { answer, previews });
                (
                    Settled::Answer(result.clone()),
                    AskOutcome::Answered(result),
                )
            }
            Err(err) => {
                let mut message = err.to_string();
                if message.trim().is_empty() {
                    message = FALLBACK_ERROR.to_string();
                }
                tracing::warn!(error = %message, "explain failed");
                (Settled::Error(message.clone()), AskOutcome::Failed(message))
            }
        };

        let mut state = lock(&self.state);
        state.loading = false;
        if !self.mount.is_mounted() {
            tracing::debug!("explain completed after unmount; dropping result");
            return outcome;
        }
        if !state.settled.settle(ticket, Arc::new(settled)) {
            tracing::debug!("superseded explain response dropped");
        }
        outcome
    }

    pub fn phase(&self) -> AskPhase {
        let state = lock(&self.state);
        if state.loading {
            return AskPhase::Loading;
        }
        match state.settled.get().as_deref() {
            None => AskPhase::Idle,
            Some(Settled::Answer(result)) => AskPhase::Success(result.clone()),
            Some(Settled::Error(message)) => AskPhase::Error(message.clone()),
        }
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    /// Preview cell for the `n`th citation (0-based) of the current answer
    pub fn preview(&self, n: usize) -> Option<CitationPreviewCell> {
        match self.phase() {
            AskPhase::Success(result) => result.previews.get(n).cloned(),
            _ => None,
        }
    }

    pub fn unmount(&self) {
        self.mount.unmount();
        lock(&self.state).clear();
    }
}
