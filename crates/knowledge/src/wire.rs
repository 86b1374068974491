//! YAML wire model for knowledge-base documents.
//!
//! One document describes one regional base. Vocabulary fields deserialise straight into the
//! closed enums from `triage-types`, so an unknown symptom or climatic-event code is reported
//! with the YAML path of the offending entry rather than silently scoring zero.

use crate::model::{DiseaseEntry, DiseaseId, Medication, MedicationTable, RegionalBase};
use crate::{KbError, KbResult};
use serde::Deserialize;
use std::collections::BTreeSet;
use triage_types::{
    ClimateEvent, NonEmptyText, Prevalence, Region, RiskGroup, Severity, Symptom,
};

// ============================================================================
// Public parsing entry point
// ============================================================================

/// Parse one knowledge-base document.
///
/// `source` names the document in error messages (usually the file name).
///
/// # Errors
///
/// Returns [`KbError::Schema`] if the YAML does not match the wire schema (unknown keys,
/// unknown vocabulary codes, wrong types), with the path of the failing field.
/// Returns [`KbError::Invalid`] if a label or medication name is blank or a disease id is not
/// `snake_case`.
pub fn parse_document(source: &str, yaml_text: &str) -> KbResult<RegionalBase> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    let wire = match serde_path_to_error::deserialize::<_, RegionalBaseWire>(deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            return Err(KbError::Schema {
                source_name: source.to_string(),
                path,
                message: err.into_inner().to_string(),
            });
        }
    };

    wire_to_domain(source, wire)
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionalBaseWire {
    #[serde(default)]
    region: Option<Region>,
    name: String,
    #[serde(default)]
    characteristics: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    diseases: Vec<DiseaseWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DiseaseWire {
    id: String,
    label: String,
    #[serde(default)]
    climate_triggers: BTreeSet<ClimateEvent>,
    symptoms: BTreeSet<Symptom>,
    #[serde(default)]
    pathognomonic: BTreeSet<Symptom>,
    medication: MedicationTableWire,
    #[serde(default)]
    risk_groups: BTreeSet<RiskGroup>,
    severity: Severity,
    #[serde(default)]
    prevalence: Option<Prevalence>,
    incubation_period: String,
    max_incidence: f64,
    #[serde(default)]
    observations: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MedicationTableWire {
    adult: MedicationWire,
    child: MedicationWire,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MedicationWire {
    name: String,
    dosage: String,
    frequency: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(source: &str, wire: RegionalBaseWire) -> KbResult<RegionalBase> {
    let diseases = wire
        .diseases
        .into_iter()
        .enumerate()
        .map(|(index, d)| disease_to_domain(source, index, d))
        .collect::<KbResult<Vec<_>>>()?;

    Ok(RegionalBase {
        region: wire.region,
        name: wire.name,
        characteristics: wire.characteristics,
        recommendations: wire.recommendations,
        diseases,
    })
}

fn disease_to_domain(source: &str, index: usize, wire: DiseaseWire) -> KbResult<DiseaseEntry> {
    let invalid = |message: String| KbError::Invalid {
        source_name: source.to_string(),
        message: format!("diseases[{index}]: {message}"),
    };

    let id = DiseaseId::new(wire.id).map_err(invalid)?;
    let label = NonEmptyText::new(&wire.label)
        .map_err(|e| invalid(format!("{id}: label: {e}")))?;
    let adult = medication_to_domain(wire.medication.adult)
        .map_err(|e| invalid(format!("{id}: medication.adult: {e}")))?;
    let child = medication_to_domain(wire.medication.child)
        .map_err(|e| invalid(format!("{id}: medication.child: {e}")))?;

    Ok(DiseaseEntry {
        id,
        label,
        climate_triggers: wire.climate_triggers,
        symptoms: wire.symptoms,
        pathognomonic: wire.pathognomonic,
        medication: MedicationTable { adult, child },
        risk_groups: wire.risk_groups,
        severity: wire.severity,
        prevalence: wire.prevalence,
        incubation_period: wire.incubation_period,
        max_incidence: wire.max_incidence,
        observations: wire.observations,
        recommendations: wire.recommendations,
    })
}

fn medication_to_domain(wire: MedicationWire) -> Result<Medication, triage_types::TextError> {
    Ok(Medication {
        name: NonEmptyText::new(&wire.name)?,
        dosage: wire.dosage,
        frequency: wire.frequency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
region: brazil_north
name: Test Region
recommendations:
  - Usar repelente
diseases:
  - id: malaria
    label: Malária
    climate_triggers: [heavy_rain, heat_humidity]
    symptoms: [fever, chills, headache]
    pathognomonic: [chills]
    medication:
      adult: { name: Artemeter + Lumefantrina, dosage: 80mg + 480mg, frequency: 2x/dia }
      child: { name: Artemeter + Lumefantrina, dosage: Conforme peso, frequency: 2x/dia }
    risk_groups: [children, pregnant_women]
    severity: high
    prevalence: very_high
    incubation_period: 7-30 dias
    max_incidence: 0.3
"#;

    #[test]
    fn test_parse_document_builds_domain_types() {
        let base = parse_document("test.yaml", MINIMAL).expect("parse minimal document");
        assert_eq!(base.region, Some(Region::BrazilNorth));
        assert_eq!(base.recommendations, vec!["Usar repelente".to_string()]);

        let malaria = base.disease("malaria").expect("malaria present");
        assert_eq!(malaria.label.as_str(), "Malária");
        assert!(malaria.symptoms.contains(&Symptom::Chills));
        assert_eq!(malaria.prevalence, Some(Prevalence::VeryHigh));
        assert_eq!(malaria.medication.child.dosage, "Conforme peso");
        assert!(malaria.observations.is_empty());
    }

    #[test]
    fn test_parse_document_reports_path_of_unknown_symptom() {
        let yaml = MINIMAL.replace("[fever, chills, headache]", "[fever, calafrios]");
        let err = parse_document("test.yaml", &yaml).expect_err("unknown symptom code");
        match err {
            KbError::Schema { path, message, .. } => {
                assert!(path.starts_with("diseases[0].symptoms"), "path was {path}");
                assert!(message.contains("calafrios"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_document_rejects_unknown_keys() {
        let yaml = MINIMAL.replace("severity: high", "severity: high\n    gravidade: alta");
        let err = parse_document("test.yaml", &yaml).expect_err("unknown key");
        assert!(matches!(err, KbError::Schema { .. }));
        assert!(err.to_string().contains("gravidade"));
    }

    #[test]
    fn test_parse_document_rejects_blank_medication_name() {
        let yaml = MINIMAL.replace(
            "adult: { name: Artemeter + Lumefantrina",
            "adult: { name: \"  \"",
        );
        let err = parse_document("test.yaml", &yaml).expect_err("blank medication");
        assert!(matches!(err, KbError::Invalid { message, .. } if message.contains("medication.adult")));
    }
}
