//! Triage outcome records.

use crate::scoring::ScoreBreakdown;
use serde::{Deserialize, Serialize};
use std::fmt;
use triage_kb::{DiseaseId, Medication};
use triage_types::{Severity, UrgencyLevel};

/// Which path of the orchestrator produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Diagnosed,
    Healthy,
    HealthyMildFatigue,
    HealthyNonspecific,
    ProcessingError,
}

/// Medication guidance attached to a result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MedicationAdvice {
    NotNeeded,
    Rest,
    Observation,
    ConsultClinician,
    Prescribed {
        name: String,
        dosage: String,
        frequency: String,
    },
}

impl MedicationAdvice {
    /// Medication name when something was prescribed.
    pub fn prescribed_name(&self) -> Option<&str> {
        match self {
            MedicationAdvice::Prescribed { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl From<&Medication> for MedicationAdvice {
    fn from(medication: &Medication) -> Self {
        MedicationAdvice::Prescribed {
            name: medication.name.as_str().to_string(),
            dosage: medication.dosage.clone(),
            frequency: medication.frequency.clone(),
        }
    }
}

impl fmt::Display for MedicationAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MedicationAdvice::NotNeeded => f.write_str("Não necessário"),
            MedicationAdvice::Rest => f.write_str("Repouso"),
            MedicationAdvice::Observation => f.write_str("Observação clínica"),
            MedicationAdvice::ConsultClinician => f.write_str("Consultar médico"),
            MedicationAdvice::Prescribed {
                name,
                dosage,
                frequency,
            } => write!(f, "{name} {dosage} {frequency}"),
        }
    }
}

/// A ranked alternative to the principal diagnosis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Differential {
    pub label: String,
    pub disease_id: DiseaseId,
    pub probability: u8,
}

/// Output of one triage evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub kind: OutcomeKind,
    pub diagnosis: String,
    pub disease_id: Option<DiseaseId>,
    pub probability: u8,
    pub urgency: UrgencyLevel,
    pub medication: MedicationAdvice,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub differentials: Vec<Differential>,
    /// Breakdown of the top-ranked disease. Absent on the healthy short-circuit.
    pub score: Option<ScoreBreakdown>,
    pub incubation_period: Option<String>,
    pub severity: Option<Severity>,
    /// Name of the regional base used; `None` for the general base.
    pub region_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medication_advice_wire_shape() {
        let advice = MedicationAdvice::Prescribed {
            name: "Artesunato".into(),
            dosage: "2.4mg/kg".into(),
            frequency: "1x/dia".into(),
        };
        let json = serde_json::to_value(&advice).expect("serialize");
        assert_eq!(json["kind"], "prescribed");
        assert_eq!(json["name"], "Artesunato");

        let json = serde_json::to_value(MedicationAdvice::NotNeeded).expect("serialize");
        assert_eq!(json, serde_json::json!({"kind": "not_needed"}));
    }

    #[test]
    fn test_medication_advice_display() {
        assert_eq!(MedicationAdvice::NotNeeded.to_string(), "Não necessário");
        assert_eq!(MedicationAdvice::ConsultClinician.to_string(), "Consultar médico");
        assert_eq!(MedicationAdvice::Rest.prescribed_name(), None);
    }

    #[test]
    fn test_outcome_kind_codes() {
        let json = serde_json::to_string(&OutcomeKind::HealthyMildFatigue).expect("serialize");
        assert_eq!(json, "\"healthy_mild_fatigue\"");
    }
}
