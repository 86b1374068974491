//! Patient presentation as supplied by the caller.

use crate::constants::{
    FEVER_THRESHOLD_C, NORMAL_DIASTOLIC, NORMAL_HEART_RATE, NORMAL_SYSTOLIC, NORMAL_TEMPERATURE_C,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use triage_types::{ClimateEvent, MedicalCondition, Region, Sex, Symptom};

/// One patient presentation.
///
/// Numeric fields are assumed to be range-checked by the caller (see
/// [`crate::validation::validate_patient`]). The core never rejects a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientInput {
    pub age: u32,
    #[serde(default = "default_sex")]
    pub sex: Sex,
    pub weight_kg: f64,
    pub temperature_c: f64,
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub heart_rate: u16,
    #[serde(default)]
    pub symptoms: BTreeSet<Symptom>,
    #[serde(default)]
    pub climate_event: Option<ClimateEvent>,
    #[serde(default)]
    pub symptom_duration_days: u32,
    #[serde(default)]
    pub vulnerable_population: bool,
    #[serde(default)]
    pub medical_history: BTreeSet<MedicalCondition>,
    /// `None` scores against the region-agnostic general base.
    #[serde(default)]
    pub region: Option<Region>,
}

fn default_sex() -> Sex {
    Sex::Unspecified
}

impl PatientInput {
    /// Symptoms used for scoring: the reported set plus `fever` when the measured temperature is
    /// at or above 38.0 °C.
    pub fn effective_symptoms(&self) -> BTreeSet<Symptom> {
        let mut symptoms = self.symptoms.clone();
        if self.has_measured_fever() {
            symptoms.insert(Symptom::Fever);
        }
        symptoms
    }

    pub fn has_measured_fever(&self) -> bool {
        self.temperature_c >= FEVER_THRESHOLD_C
    }

    /// True when temperature, blood pressure and heart rate all sit inside their normal bands.
    pub fn vitals_normal(&self) -> bool {
        within(self.temperature_c, NORMAL_TEMPERATURE_C)
            && within(self.systolic_bp, NORMAL_SYSTOLIC)
            && within(self.diastolic_bp, NORMAL_DIASTOLIC)
            && within(self.heart_rate, NORMAL_HEART_RATE)
    }

    pub fn has_condition(&self, condition: MedicalCondition) -> bool {
        self.medical_history.contains(&condition)
    }

    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    pub fn is_male(&self) -> bool {
        self.sex == Sex::Male
    }
}

fn within<T: PartialOrd>(value: T, (low, high): (T, T)) -> bool {
    value >= low && value <= high
}
