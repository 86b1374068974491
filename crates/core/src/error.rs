use crate::history::HistoryError;

/// Errors raised by the triage core.
///
/// Only [`TriageError::KnowledgeBase`] ever reaches a `triage` caller; the other variants are
/// absorbed by the orchestrator into a degraded result or surface from the read-only views.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    KnowledgeBase(#[from] triage_kb::KbError),

    #[error("knowledge base '{0}' has no diseases to score")]
    EmptyKnowledgeBase(String),

    #[error("non-finite composite score for disease '{disease}'")]
    NonFiniteScore { disease: String },

    #[error("history store error: {0}")]
    History(#[from] HistoryError),
}

pub type CoreResult<T> = std::result::Result<T, TriageError>;
