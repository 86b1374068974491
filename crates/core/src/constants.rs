//! Constants used throughout the triage core crate.
//!
//! Scoring weights, vital-sign bands and fixed lists live here so that the scorers, the
//! orchestrator and the forecaster agree on one set of numbers.

use triage_types::Symptom;

/// Default history log location when no explicit file is configured.
pub const DEFAULT_HISTORY_FILE: &str = "triage_data/triage_history.jsonl";

// ============================================================================
// Composite weights
// ============================================================================

pub const WEIGHT_SYMPTOMS: f64 = 0.45;
pub const WEIGHT_CLIMATE: f64 = 0.25;
pub const WEIGHT_POPULATION: f64 = 0.15;
pub const WEIGHT_SEVERITY: f64 = 0.15;

// ============================================================================
// Symptom and climate scoring
// ============================================================================

/// Added per pathognomonic finding present.
pub const PATHOGNOMONIC_BONUS: f64 = 0.3;

/// Subtracted per reported symptom the disease does not list.
pub const UNRELATED_SYMPTOM_PENALTY: f64 = 0.1;

pub const CLIMATE_DIRECT_MATCH: f64 = 1.0;
pub const CLIMATE_RELATED_MATCH: f64 = 0.5;

// ============================================================================
// Vital-sign bands
// ============================================================================

/// Temperature at or above which `fever` is added to the symptom set.
pub const FEVER_THRESHOLD_C: f64 = 38.0;

pub const NORMAL_TEMPERATURE_C: (f64, f64) = (36.0, 37.5);
pub const NORMAL_SYSTOLIC: (u16, u16) = (90, 140);
pub const NORMAL_DIASTOLIC: (u16, u16) = (60, 90);
pub const NORMAL_HEART_RATE: (u16, u16) = (60, 100);

// ============================================================================
// Orchestrator
// ============================================================================

/// Displayed probability never exceeds this value.
pub const PROBABILITY_CAP: u8 = 95;

/// Differentials are listed only within this distance of the top composite.
pub const DIFFERENTIAL_MAX_GAP: f64 = 0.3;

/// Composite a differential must exceed when scoring against the general base.
pub const DIFFERENTIAL_THRESHOLD_GENERAL: f64 = 0.30;

/// Composite a differential must exceed when scoring against a regional base.
pub const DIFFERENTIAL_THRESHOLD_REGIONAL: f64 = 0.15;

pub const MAX_DIFFERENTIALS: usize = 3;

/// Differential probabilities stay at least this far below the principal.
pub const DIFFERENTIAL_PROBABILITY_GAP: i32 = 5;

/// Top composite below which a normal-vitals patient is reported as nonspecific.
pub const WEAK_EVIDENCE_THRESHOLD: f64 = 0.25;

/// Patients younger than this receive the child medication table.
pub const CHILD_AGE_CUTOFF: u32 = 12;

pub const HEALTHY_PROBABILITY: u8 = 95;
pub const MILD_FATIGUE_PROBABILITY: u8 = 90;
pub const NONSPECIFIC_PROBABILITY: u8 = 85;

/// Symptoms that rule out the healthy short-circuit even with normal vitals.
pub const SIGNIFICANT_SYMPTOMS: &[Symptom] = &[
    Symptom::Fever,
    Symptom::HighFever,
    Symptom::Headache,
    Symptom::SevereHeadache,
    Symptom::Myalgia,
    Symptom::Arthralgia,
    Symptom::SevereArthralgia,
    Symptom::Nausea,
    Symptom::Vomiting,
    Symptom::Diarrhoea,
    Symptom::Cough,
    Symptom::BreathingDifficulty,
    Symptom::ChestPain,
    Symptom::Chills,
    Symptom::SkinRash,
    Symptom::Conjunctivitis,
    Symptom::AbdominalPain,
    Symptom::Dehydration,
    Symptom::Seizures,
    Symptom::Jaundice,
    Symptom::BloodyStool,
    Symptom::BloodySputum,
    Symptom::Haemorrhage,
    Symptom::Cyanosis,
    Symptom::Oliguria,
    Symptom::NeckStiffness,
    Symptom::Confusion,
];

// ============================================================================
// Urgency points
// ============================================================================

/// Each present symptom from this list adds [`SEVERE_SYMPTOM_POINTS`].
pub const SEVERE_SYMPTOMS: &[Symptom] = &[
    Symptom::BreathingDifficulty,
    Symptom::ChestPain,
    Symptom::Dehydration,
    Symptom::Seizures,
];

pub const SEVERE_SYMPTOM_POINTS: u32 = 2;
pub const URGENCY_CRITICAL_POINTS: u32 = 7;
pub const URGENCY_HIGH_POINTS: u32 = 4;
pub const URGENCY_MEDIUM_POINTS: u32 = 2;

// ============================================================================
// Forecasting
// ============================================================================

/// Extra stock added on top of the projected need.
pub const SAFETY_MARGIN: f64 = 0.2;

/// Case-insensitive name fragments that always get CRITICAL supply priority.
pub const CRITICAL_MEDICATIONS: &[&str] = &[
    "Artesunato",
    "Quinina",
    "Ceftriaxona",
    "Soro de reidratação oral",
    "Anfotericina B",
    "Penicilina G",
    "Doxiciclina",
];

pub const HIGH_PRIORITY_SHARE: f64 = 0.15;
pub const HIGH_PRIORITY_URGENT_USES: usize = 3;
pub const MEDIUM_PRIORITY_SHARE: f64 = 0.05;
pub const MEDIUM_PRIORITY_URGENT_USES: usize = 1;

/// Entries kept in the top diagnoses / medications summaries.
pub const FORECAST_TOP_N: usize = 5;
