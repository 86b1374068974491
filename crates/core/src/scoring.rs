//! Four-factor disease scoring.
//!
//! Each factor lands in `[0, 1]`. The composite is a fixed weighted sum, so ranking is driven
//! mostly by symptom overlap and then by climatic context.

use crate::constants::{
    CLIMATE_DIRECT_MATCH, CLIMATE_RELATED_MATCH, PATHOGNOMONIC_BONUS, UNRELATED_SYMPTOM_PENALTY,
    WEIGHT_CLIMATE, WEIGHT_POPULATION, WEIGHT_SEVERITY, WEIGHT_SYMPTOMS,
};
use crate::patient::PatientInput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use triage_kb::DiseaseEntry;
use triage_types::{ClimateEvent, MedicalCondition, Prevalence, RiskGroup, Severity, Symptom};

/// Per-factor scores for one disease and their weighted composite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub symptoms: f64,
    pub climate: f64,
    pub population: f64,
    pub severity: f64,
    pub composite: f64,
}

impl ScoreBreakdown {
    pub fn new(symptoms: f64, climate: f64, population: f64, severity: f64) -> Self {
        Self {
            symptoms,
            climate,
            population,
            severity,
            composite: composite_score(symptoms, climate, population, severity),
        }
    }
}

pub fn composite_score(symptoms: f64, climate: f64, population: f64, severity: f64) -> f64 {
    WEIGHT_SYMPTOMS * symptoms
        + WEIGHT_CLIMATE * climate
        + WEIGHT_POPULATION * population
        + WEIGHT_SEVERITY * severity
}

/// Score one disease for a patient.
///
/// `symptoms` is the effective symptom set (see [`PatientInput::effective_symptoms`]).
pub fn score_disease(
    patient: &PatientInput,
    symptoms: &BTreeSet<Symptom>,
    disease: &DiseaseEntry,
) -> ScoreBreakdown {
    ScoreBreakdown::new(
        symptom_score(symptoms, &disease.symptoms, &disease.pathognomonic),
        climate_score(patient.climate_event, &disease.climate_triggers),
        population_score(patient, &disease.risk_groups),
        severity_score(patient, disease.severity, disease.prevalence),
    )
}

// ============================================================================
// Symptoms
// ============================================================================

/// `clamp(|P∩D|/|D| + 0.3·|P∩S| − 0.1·|P−D|, 0, 1)`.
///
/// An empty patient set or an empty disease set scores zero.
pub fn symptom_score(
    patient: &BTreeSet<Symptom>,
    disease: &BTreeSet<Symptom>,
    pathognomonic: &BTreeSet<Symptom>,
) -> f64 {
    if patient.is_empty() || disease.is_empty() {
        return 0.0;
    }

    let overlap = patient.intersection(disease).count() as f64;
    let specific = patient.intersection(pathognomonic).count() as f64;
    let unrelated = patient.difference(disease).count() as f64;

    let raw = overlap / disease.len() as f64 + PATHOGNOMONIC_BONUS * specific
        - UNRELATED_SYMPTOM_PENALTY * unrelated;
    raw.clamp(0.0, 1.0)
}

// ============================================================================
// Climate
// ============================================================================

/// Events treated as related to the patient's reported event. Directed: the key is what the
/// patient reported.
fn related_events(event: ClimateEvent) -> &'static [ClimateEvent] {
    use ClimateEvent::*;
    match event {
        Floods => &[HeavyRain, LackOfSanitation],
        HeavyRain => &[Floods, HeatHumidity],
        Drought => &[HeatWave, LackOfSanitation],
        HeatHumidity => &[HeavyRain, HeatWave],
        Monsoon => &[HeavyRain, Floods],
        Storms => &[HeavyRain, Floods],
        _ => &[],
    }
}

pub fn climate_score(event: Option<ClimateEvent>, triggers: &BTreeSet<ClimateEvent>) -> f64 {
    let Some(event) = event else {
        return 0.0;
    };

    if triggers.contains(&event) {
        CLIMATE_DIRECT_MATCH
    } else if related_events(event).iter().any(|e| triggers.contains(e)) {
        CLIMATE_RELATED_MATCH
    } else {
        0.0
    }
}

// ============================================================================
// Population
// ============================================================================

fn age_bracket_bonus(group: RiskGroup, age: u32) -> Option<f64> {
    let (matches, bonus) = match group {
        RiskGroup::Infants => (age < 2, 0.5),
        RiskGroup::UnderFives => (age < 5, 0.4),
        RiskGroup::Children => (age < 12, 0.4),
        RiskGroup::Adolescents => ((12..=17).contains(&age), 0.3),
        RiskGroup::YoungAdults => ((18..=30).contains(&age), 0.3),
        RiskGroup::Adults => ((18..=65).contains(&age), 0.3),
        RiskGroup::Elderly => (age > 65, 0.4),
        _ => return None,
    };
    matches.then_some(bonus)
}

fn is_childbearing_age(patient: &PatientInput) -> bool {
    patient.is_female() && (15..=45).contains(&patient.age)
}

/// Underweight heuristic: weight below `age × 2 + 8` kg, or malnutrition on record.
fn is_malnourished(patient: &PatientInput) -> bool {
    patient.weight_kg < f64::from(patient.age) * 2.0 + 8.0
        || patient.has_condition(MedicalCondition::Malnutrition)
}

fn has_any(patient: &PatientInput, conditions: &[MedicalCondition]) -> bool {
    conditions.iter().any(|c| patient.has_condition(*c))
}

/// Additive bonus for each risk group of the disease the patient belongs to, clamped to 1.
///
/// Age groups overlap, so only the best matching bracket counts. Exposure groups (rural
/// workers, riverside dwellers and so on) cannot be derived from the record; the vulnerable
/// population flag stands in for all of them and adds its bonus once.
pub fn population_score(patient: &PatientInput, risk_groups: &BTreeSet<RiskGroup>) -> f64 {
    let age_bonus = risk_groups
        .iter()
        .filter_map(|g| age_bracket_bonus(*g, patient.age))
        .fold(0.0_f64, f64::max);

    let mut score = age_bonus;
    for group in risk_groups {
        let bonus = match group {
            RiskGroup::PregnantWomen
                if patient.has_condition(MedicalCondition::Pregnancy)
                    || is_childbearing_age(patient) =>
            {
                0.4
            }
            RiskGroup::WomenOfChildbearingAge if is_childbearing_age(patient) => 0.2,
            RiskGroup::AdultMen if patient.is_male() && (18..=60).contains(&patient.age) => 0.2,
            RiskGroup::Malnourished if is_malnourished(patient) => 0.3,
            RiskGroup::Immunocompromised
                if has_any(
                    patient,
                    &[
                        MedicalCondition::Hiv,
                        MedicalCondition::Cancer,
                        MedicalCondition::Diabetes,
                        MedicalCondition::Immunosuppression,
                    ],
                ) =>
            {
                0.4
            }
            RiskGroup::Comorbidities
                if has_any(
                    patient,
                    &[
                        MedicalCondition::Diabetes,
                        MedicalCondition::Hypertension,
                        MedicalCondition::HeartDisease,
                        MedicalCondition::LungDisease,
                        MedicalCondition::KidneyDisease,
                    ],
                ) =>
            {
                0.3
            }
            RiskGroup::Unvaccinated
                if patient.has_condition(MedicalCondition::IncompleteVaccination) =>
            {
                0.3
            }
            _ => 0.0,
        };
        score += bonus;
    }

    if patient.vulnerable_population && risk_groups.iter().any(|g| g.is_exposure_group()) {
        score += 0.3;
    }

    score.clamp(0.0, 1.0)
}

// ============================================================================
// Severity
// ============================================================================

/// Severity factor. The model is picked by whether the disease carries regional prevalence.
pub fn severity_score(
    patient: &PatientInput,
    severity: Severity,
    prevalence: Option<Prevalence>,
) -> f64 {
    match prevalence {
        Some(prevalence) => regional_severity(patient, severity, prevalence),
        None => vitals_severity(patient, severity),
    }
}

fn vitals_severity(patient: &PatientInput, severity: Severity) -> f64 {
    let mut score: f64 = match severity {
        Severity::Critical => 0.3,
        Severity::High => 0.2,
        Severity::Medium => 0.1,
        Severity::Low => 0.05,
    };

    let t = patient.temperature_c;
    if t >= 39.0 || t <= 35.0 {
        score += 0.2;
    } else if t >= 38.0 || t <= 36.0 {
        score += 0.1;
    }

    let sbp = patient.systolic_bp;
    if sbp >= 180 || sbp <= 90 {
        score += 0.2;
    } else if sbp >= 160 || sbp <= 100 {
        score += 0.1;
    }

    let hr = patient.heart_rate;
    if hr >= 120 || hr <= 50 {
        score += 0.2;
    } else if hr >= 100 || hr <= 60 {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

fn regional_severity(patient: &PatientInput, severity: Severity, prevalence: Prevalence) -> f64 {
    let base: f64 = match severity {
        Severity::Low => 0.2,
        Severity::Medium => 0.4,
        Severity::High => 0.7,
        Severity::Critical => 1.0,
    };
    let weight = match prevalence {
        Prevalence::Low => 0.5,
        Prevalence::Medium => 0.7,
        Prevalence::High => 0.9,
        Prevalence::VeryHigh => 1.2,
    };

    let mut clinical = 1.0;
    if patient.temperature_c >= 39.0 {
        clinical += 0.3;
    } else if patient.temperature_c >= 37.8 {
        clinical += 0.2;
    }
    if patient.systolic_bp < 90 {
        clinical += 0.3;
    } else if patient.systolic_bp > 160 {
        clinical += 0.2;
    }

    (base * weight * clinical).clamp(0.0, 1.0)
}
