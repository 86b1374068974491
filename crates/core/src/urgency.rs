//! Urgency classification.
//!
//! The vitals tier is a pure function of temperature, blood pressure, heart rate and the
//! symptom set. Regional diagnoses also compute a disease-context tier and keep the higher.

use crate::constants::{
    SEVERE_SYMPTOMS, SEVERE_SYMPTOM_POINTS, URGENCY_CRITICAL_POINTS, URGENCY_HIGH_POINTS,
    URGENCY_MEDIUM_POINTS,
};
use crate::patient::PatientInput;
use std::collections::BTreeSet;
use triage_types::{Severity, Symptom, UrgencyLevel};

/// Additive urgency points for the vital signs and severe symptoms.
pub fn vitals_points(
    temperature_c: f64,
    systolic_bp: u16,
    heart_rate: u16,
    symptoms: &BTreeSet<Symptom>,
) -> u32 {
    let mut points = 0;

    if temperature_c >= 39.0 {
        points += 3;
    } else if temperature_c >= 38.0 || temperature_c <= 35.0 {
        points += 2;
    }

    if systolic_bp >= 180 || systolic_bp <= 90 {
        points += 3;
    } else if systolic_bp >= 160 || systolic_bp <= 100 {
        points += 2;
    }

    if heart_rate >= 120 || heart_rate <= 50 {
        points += 2;
    } else if heart_rate >= 100 || heart_rate <= 60 {
        points += 1;
    }

    let severe = SEVERE_SYMPTOMS
        .iter()
        .filter(|s| symptoms.contains(*s))
        .count() as u32;
    points + severe * SEVERE_SYMPTOM_POINTS
}

pub fn level_from_points(points: u32) -> UrgencyLevel {
    if points >= URGENCY_CRITICAL_POINTS {
        UrgencyLevel::Critical
    } else if points >= URGENCY_HIGH_POINTS {
        UrgencyLevel::High
    } else if points >= URGENCY_MEDIUM_POINTS {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

/// Vitals-only tier.
pub fn vitals_urgency(patient: &PatientInput, symptoms: &BTreeSet<Symptom>) -> UrgencyLevel {
    level_from_points(vitals_points(
        patient.temperature_c,
        patient.systolic_bp,
        patient.heart_rate,
        symptoms,
    ))
}

/// Tier driven by the winning disease's severity, escalated by extreme vitals.
pub fn disease_context_urgency(patient: &PatientInput, severity: Severity) -> UrgencyLevel {
    let t = patient.temperature_c;
    if severity == Severity::Critical || t >= 40.0 || patient.systolic_bp < 80 {
        UrgencyLevel::Critical
    } else if severity == Severity::High || t >= 39.0 {
        UrgencyLevel::High
    } else if severity == Severity::Medium || t >= 38.0 {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

/// Final tier for a diagnosis. `regional` is true when the winning entry carries prevalence.
pub fn classify(
    patient: &PatientInput,
    symptoms: &BTreeSet<Symptom>,
    severity: Severity,
    regional: bool,
) -> UrgencyLevel {
    let vitals = vitals_urgency(patient, symptoms);
    if regional {
        vitals.max(disease_context_urgency(patient, severity))
    } else {
        vitals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::tests::healthy_adult;

    #[test]
    fn test_critical_vitals_scenario_points() {
        let symptoms: BTreeSet<_> = [Symptom::BreathingDifficulty].into_iter().collect();
        // 3 (T 39.5) + 3 (SBP 180) + 2 (HR 125) + 2 (breathing difficulty)
        assert_eq!(vitals_points(39.5, 180, 125, &symptoms), 10);
        assert_eq!(level_from_points(10), UrgencyLevel::Critical);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(level_from_points(0), UrgencyLevel::Low);
        assert_eq!(level_from_points(1), UrgencyLevel::Low);
        assert_eq!(level_from_points(2), UrgencyLevel::Medium);
        assert_eq!(level_from_points(4), UrgencyLevel::High);
        assert_eq!(level_from_points(6), UrgencyLevel::High);
        assert_eq!(level_from_points(7), UrgencyLevel::Critical);
    }

    #[test]
    fn test_boundary_values_resolve_deterministically() {
        let none = BTreeSet::new();
        assert_eq!(vitals_points(38.0, 120, 70, &none), 2);
        assert_eq!(vitals_points(37.99, 120, 70, &none), 0);
        assert_eq!(vitals_points(35.0, 120, 70, &none), 2);
        assert_eq!(vitals_points(36.5, 90, 70, &none), 3);
        assert_eq!(vitals_points(36.5, 101, 70, &none), 0);
        assert_eq!(vitals_points(36.5, 120, 60, &none), 1);
        assert_eq!(vitals_points(36.5, 120, 50, &none), 2);
    }

    #[test]
    fn test_each_severe_symptom_adds_two() {
        let all: BTreeSet<_> = SEVERE_SYMPTOMS.iter().copied().collect();
        assert_eq!(vitals_points(36.5, 120, 70, &all), 8);
    }

    #[test]
    fn test_vitals_urgency_is_pure() {
        let mut patient = healthy_adult();
        patient.temperature_c = 38.7;
        patient.systolic_bp = 165;
        patient.heart_rate = 105;
        let symptoms = patient.effective_symptoms();

        let first = vitals_urgency(&patient, &symptoms);
        for _ in 0..10 {
            assert_eq!(vitals_urgency(&patient, &symptoms), first);
        }
        // unrelated fields do not move the tier
        patient.age = 80;
        patient.region = Some(triage_types::Region::SouthAsia);
        patient.vulnerable_population = true;
        assert_eq!(vitals_urgency(&patient, &symptoms), first);
        assert_eq!(first, UrgencyLevel::High);
    }

    #[test]
    fn test_regional_takes_higher_tier() {
        let patient = healthy_adult();
        let none = BTreeSet::new();
        assert_eq!(classify(&patient, &none, Severity::High, false), UrgencyLevel::Low);
        assert_eq!(classify(&patient, &none, Severity::High, true), UrgencyLevel::High);

        // vitals win when the disease is mild
        let mut patient = healthy_adult();
        patient.temperature_c = 39.5;
        patient.systolic_bp = 180;
        patient.heart_rate = 125;
        assert_eq!(
            classify(&patient, &none, Severity::Low, true),
            UrgencyLevel::Critical
        );
    }

    #[test]
    fn test_disease_context_escalation() {
        let mut patient = healthy_adult();
        assert_eq!(disease_context_urgency(&patient, Severity::Low), UrgencyLevel::Low);
        patient.temperature_c = 40.0;
        assert_eq!(disease_context_urgency(&patient, Severity::Low), UrgencyLevel::Critical);
        patient.temperature_c = 36.5;
        patient.systolic_bp = 79;
        assert_eq!(disease_context_urgency(&patient, Severity::Low), UrgencyLevel::Critical);
    }
}
