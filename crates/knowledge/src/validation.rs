//! Startup validation of parsed knowledge-base documents.
//!
//! Parsing already guarantees that every vocabulary code is known. This pass checks the
//! cross-field rules a YAML schema cannot express.

use crate::model::RegionalBase;
use crate::{KbError, KbResult};
use std::collections::HashSet;
use triage_types::Region;

/// Validate a parsed base against the slot it is being loaded into.
///
/// `expected_region` is `None` for the general base.
///
/// # Errors
///
/// Returns [`KbError::Invalid`] describing the first rule that fails.
pub fn validate_base(
    source: &str,
    expected_region: Option<Region>,
    base: &RegionalBase,
) -> KbResult<()> {
    let invalid = |message: String| KbError::Invalid {
        source_name: source.to_string(),
        message,
    };

    if base.region != expected_region {
        return Err(invalid(format!(
            "region key {} does not match expected {}",
            describe_region(base.region),
            describe_region(expected_region)
        )));
    }

    if base.name.trim().is_empty() {
        return Err(invalid("name cannot be empty".into()));
    }

    if base.diseases.is_empty() {
        return Err(invalid("a knowledge base needs at least one disease".into()));
    }

    let mut seen = HashSet::new();
    for disease in &base.diseases {
        let id = &disease.id;

        if !seen.insert(id.as_str()) {
            return Err(invalid(format!("duplicate disease id '{id}'")));
        }

        if disease.symptoms.is_empty() {
            return Err(invalid(format!("{id}: symptom set cannot be empty")));
        }

        if !(0.0..=1.0).contains(&disease.max_incidence) {
            return Err(invalid(format!(
                "{id}: max_incidence {} outside [0, 1]",
                disease.max_incidence
            )));
        }

        match (expected_region, disease.prevalence) {
            (Some(_), None) => {
                return Err(invalid(format!(
                    "{id}: regional entries must carry a prevalence tier"
                )));
            }
            (None, Some(_)) => {
                return Err(invalid(format!(
                    "{id}: the general base cannot carry prevalence data"
                )));
            }
            _ => {}
        }

        let outside: Vec<_> = disease
            .pathognomonic
            .difference(&disease.symptoms)
            .map(|s| s.code())
            .collect();
        if !outside.is_empty() {
            tracing::warn!(
                source,
                disease = %id,
                "pathognomonic findings outside the symptom set: {}",
                outside.join(", ")
            );
        }
    }

    Ok(())
}

fn describe_region(region: Option<Region>) -> &'static str {
    region.map_or("<general>", Region::code)
}
