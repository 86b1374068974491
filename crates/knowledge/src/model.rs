//! Domain-level knowledge-base types.
//!
//! These are the validated, immutable shapes the scoring engine works with. They are built from
//! the YAML wire model in [`crate::wire`] and never mutated after loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use triage_types::{
    ClimateEvent, NonEmptyText, Prevalence, Region, RiskGroup, Severity, Symptom,
};

/// Identifier of a disease within one regional base, e.g. `malaria` or `febre_tifoide`.
///
/// Ids are lowercase ASCII `snake_case`. The same id may appear in several regions with
/// different data; it is only unique within a single [`RegionalBase`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseId(String);

impl DiseaseId {
    /// Create an id, rejecting anything that is not lowercase ASCII `snake_case`.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if is_snake_case(&id) {
            Ok(Self(id))
        } else {
            Err(format!("disease id '{id}' must be lowercase ASCII snake_case"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DiseaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'))
}

/// A single medication prescription line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Medication {
    pub name: NonEmptyText,
    pub dosage: String,
    pub frequency: String,
}

/// Age-stratified medication table for one disease.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MedicationTable {
    pub adult: Medication,
    pub child: Medication,
}

/// One disease as known to a regional base.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiseaseEntry {
    pub id: DiseaseId,
    /// Human-readable label shown as the diagnosis, e.g. "Malária".
    pub label: NonEmptyText,
    pub climate_triggers: BTreeSet<ClimateEvent>,
    pub symptoms: BTreeSet<Symptom>,
    /// Highly specific findings. May include signs outside `symptoms`.
    pub pathognomonic: BTreeSet<Symptom>,
    pub medication: MedicationTable,
    pub risk_groups: BTreeSet<RiskGroup>,
    pub severity: Severity,
    /// Present for every regional entry, absent for the general base.
    pub prevalence: Option<Prevalence>,
    pub incubation_period: String,
    pub max_incidence: f64,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The full disease set of one region, or of the region-agnostic general base.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionalBase {
    /// `None` for the general base.
    pub region: Option<Region>,
    pub name: String,
    pub characteristics: Vec<String>,
    /// Guidance appended to every diagnosis made against this base.
    pub recommendations: Vec<String>,
    pub diseases: Vec<DiseaseEntry>,
}

impl RegionalBase {
    pub fn is_general(&self) -> bool {
        self.region.is_none()
    }

    /// Look up a disease by id.
    pub fn disease(&self, id: &str) -> Option<&DiseaseEntry> {
        self.diseases.iter().find(|d| d.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disease_id_accepts_snake_case() {
        assert!(DiseaseId::new("malaria").is_ok());
        assert!(DiseaseId::new("hepatite_a").is_ok());
        assert!(DiseaseId::new("covid19").is_ok());
    }

    #[test]
    fn test_disease_id_rejects_other_shapes() {
        for bad in ["", "Malaria", "febre amarela", "_dengue", "zika_", "tifo__x", "cólera"] {
            assert!(DiseaseId::new(bad).is_err(), "expected '{bad}' to be rejected");
        }
    }
}
