//! # Triage Core
//!
//! Scoring engine and orchestration for field triage.
//!
//! This crate contains the pure triage logic plus its one piece of shared state:
//! - Four-factor disease scoring against a regional knowledge base
//! - The healthy short-circuit, urgency classification and guidance text
//! - An append-only triage history with statistics and medication forecasts
//!
//! **No API concerns**: argument parsing, HTTP routing and environment lookups belong in the
//! binaries and `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod forecast;
pub mod guidance;
pub mod history;
pub mod patient;
pub mod result;
pub mod scoring;
pub mod statistics;
pub mod triage;
pub mod urgency;
pub mod validation;

pub use config::CoreConfig;
pub use error::{CoreResult, TriageError};
pub use forecast::{ForecastError, ForecastReport, MedicationNeed, ShoppingList, SupplyPriority};
pub use history::{
    HistoryError, HistoryRecord, HistoryStore, InMemoryHistoryStore, JsonlHistoryStore,
};
pub use patient::PatientInput;
pub use result::{Differential, MedicationAdvice, OutcomeKind, TriageResult};
pub use scoring::ScoreBreakdown;
pub use statistics::TriageStatistics;
pub use triage::TriageService;
pub use validation::{validate_patient, ValidationErrors};

pub use triage_kb::{KbError, KnowledgeBase};
