#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;

use super::HistoryStore;
use crate::domain::models::ErrorKind;
use crate::domain::models::GenerationBackendBox;
use crate::domain::models::GenerationFailure;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Drives one prompt at a time through the generation backend and records
/// successful prompts in the history store.
///
/// States move `Idle -> Validating -> Submitting -> Succeeded | Failed`. The
/// session never resets itself; the caller acknowledges a terminal state with
/// [`GenerationSession::reset`] before the next submission.
pub struct GenerationSession {
    backend: GenerationBackendBox,
    history: HistoryStore,
    state: SessionState,
}

impl GenerationSession {
    pub fn new(backend: GenerationBackendBox, history: HistoryStore) -> GenerationSession {
        return GenerationSession {
            backend,
            history,
            state: SessionState::Idle,
        };
    }

    pub fn state(&self) -> SessionState {
        return self.state;
    }

    pub fn history(&self) -> &HistoryStore {
        return &self.history;
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Submits a prompt. Blank input fails with `EmptyInput` before any
    /// network call. All generation outcomes are returned as values; `Err` is
    /// reserved for caller misuse, i.e. submitting before the previous
    /// outcome was acknowledged with `reset`.
    pub async fn submit(&mut self, text: &str) -> Result<GenerationResult> {
        if self.state != SessionState::Idle {
            bail!("a submission is already in flight or awaiting reset");
        }

        self.state = SessionState::Validating;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.state = SessionState::Failed;
            return Ok(GenerationResult::Failure(GenerationFailure::new(
                ErrorKind::EmptyInput,
                "Please enter a prompt (in English).",
            )));
        }

        self.state = SessionState::Submitting;
        let result = self.backend.generate(GenerationRequest::new(trimmed)).await;

        match &result {
            GenerationResult::Success(_) => {
                self.state = SessionState::Succeeded;
                // A failed history write degrades to a log line. The image
                // was generated, the user still gets it.
                if let Err(err) = self.history.append(trimmed).await {
                    tracing::error!(error = ?err, "failed to save prompt to history");
                }
            }
            GenerationResult::Failure(failure) => {
                self.state = SessionState::Failed;
                tracing::warn!(
                    kind = ?failure.kind,
                    status = ?failure.status,
                    "generation failed"
                );
            }
        }

        return Ok(result);
    }
}
