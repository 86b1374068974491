//! # Triage Knowledge Base
//!
//! Static disease data for the triage engine, one base per supported region plus a
//! region-agnostic general base.
//!
//! Responsibilities:
//! - Define the YAML wire model for knowledge-base documents and parse it strictly
//! - Validate cross-field rules once at startup
//! - Expose lookup by region, failing loudly for regions that are not loaded
//!
//! The built-in documents are compiled into the binary. A directory with the same file names can
//! replace them at startup (see [`KnowledgeBase::from_dir`]).

mod model;
mod validation;
mod wire;

pub use model::{DiseaseEntry, DiseaseId, Medication, MedicationTable, RegionalBase};
pub use validation::validate_base;
pub use wire::parse_document;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use triage_types::Region;

/// File name of the region-agnostic base.
pub const GENERAL_FILE: &str = "general.yaml";

const BUILTIN_GENERAL: &str = include_str!("../data/general.yaml");
const BUILTIN_REGIONAL: &[(Region, &str)] = &[
    (
        Region::BrazilNorth,
        include_str!("../data/brazil_north.yaml"),
    ),
    (
        Region::SubSaharanAfrica,
        include_str!("../data/sub_saharan_africa.yaml"),
    ),
    (Region::SouthAsia, include_str!("../data/south_asia.yaml")),
];

/// Errors returned by the knowledge-base crate.
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("knowledge base {source_name} schema mismatch at {path}: {message}")]
    Schema {
        source_name: String,
        path: String,
        message: String,
    },

    #[error("knowledge base {source_name} is invalid: {message}")]
    Invalid {
        source_name: String,
        message: String,
    },

    #[error("failed to read knowledge base file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("knowledge base directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("region '{0}' is not loaded in the knowledge base")]
    UnknownRegion(Region),
}

/// Type alias for Results that can fail with a [`KbError`].
pub type KbResult<T> = Result<T, KbError>;

/// File name a regional base is loaded from.
pub fn regional_file_name(region: Region) -> String {
    format!("{}.yaml", region.code())
}

/// All loaded bases. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    general: RegionalBase,
    regional: BTreeMap<Region, RegionalBase>,
}

impl KnowledgeBase {
    /// Parse and validate the documents compiled into the binary.
    ///
    /// # Errors
    ///
    /// Only fails if the shipped data is broken, which the crate tests rule out.
    pub fn builtin() -> KbResult<Self> {
        let general = load_base(GENERAL_FILE, None, BUILTIN_GENERAL)?;
        let mut regional = BTreeMap::new();
        for (region, text) in BUILTIN_REGIONAL {
            let name = regional_file_name(*region);
            regional.insert(*region, load_base(&name, Some(*region), text)?);
        }

        let kb = Self { general, regional };
        kb.log_loaded("builtin");
        Ok(kb)
    }

    /// Load bases from a directory.
    ///
    /// `general.yaml` is required. Each regional file (`brazil_north.yaml`,
    /// `sub_saharan_africa.yaml`, `south_asia.yaml`) is loaded when present; a missing one leaves
    /// that region unavailable and lookups for it fail with [`KbError::UnknownRegion`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing, `general.yaml` cannot be read, or any present
    /// file fails parsing or validation.
    pub fn from_dir(dir: &Path) -> KbResult<Self> {
        if !dir.is_dir() {
            return Err(KbError::MissingDirectory(dir.to_path_buf()));
        }

        let general_path = dir.join(GENERAL_FILE);
        let general_text = read_file(&general_path)?;
        let general = load_base(GENERAL_FILE, None, &general_text)?;

        let mut regional = BTreeMap::new();
        for region in Region::ALL {
            let name = regional_file_name(*region);
            let path = dir.join(&name);
            if !path.exists() {
                tracing::info!(region = %region, "no {} in {}, region disabled", name, dir.display());
                continue;
            }
            let text = read_file(&path)?;
            regional.insert(*region, load_base(&name, Some(*region), &text)?);
        }

        let kb = Self { general, regional };
        kb.log_loaded(&dir.display().to_string());
        Ok(kb)
    }

    /// Select the base for a patient: the general base for `None`, the regional base otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::UnknownRegion`] if the region's base is not loaded.
    pub fn regional_base(&self, region: Option<Region>) -> KbResult<&RegionalBase> {
        match region {
            None => Ok(&self.general),
            Some(region) => self
                .regional
                .get(&region)
                .ok_or(KbError::UnknownRegion(region)),
        }
    }

    pub fn general(&self) -> &RegionalBase {
        &self.general
    }

    /// Regions with a loaded base, in declaration order.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regional.keys().copied()
    }

    fn log_loaded(&self, origin: &str) {
        let regional_diseases: usize = self.regional.values().map(|b| b.diseases.len()).sum();
        tracing::info!(
            origin,
            general_diseases = self.general.diseases.len(),
            regions = self.regional.len(),
            regional_diseases,
            "knowledge base loaded"
        );
    }
}

fn read_file(path: &Path) -> KbResult<String> {
    std::fs::read_to_string(path).map_err(|source| KbError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_base(source: &str, region: Option<Region>, text: &str) -> KbResult<RegionalBase> {
    let base = parse_document(source, text)?;
    validate_base(source, region, &base)?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use triage_types::{Prevalence, Symptom};

    #[test]
    fn test_builtin_loads_every_region() {
        let kb = KnowledgeBase::builtin().expect("builtin knowledge base");
        assert_eq!(kb.regions().collect::<Vec<_>>(), Region::ALL.to_vec());
        assert_eq!(kb.general().diseases.len(), 15);
        assert_eq!(kb.regional_base(Some(Region::BrazilNorth)).unwrap().diseases.len(), 12);
        assert_eq!(kb.regional_base(Some(Region::SubSaharanAfrica)).unwrap().diseases.len(), 10);
        assert_eq!(kb.regional_base(Some(Region::SouthAsia)).unwrap().diseases.len(), 12);
    }

    #[test]
    fn test_builtin_regional_entries_carry_prevalence() {
        let kb = KnowledgeBase::builtin().expect("builtin knowledge base");
        assert!(kb.general().diseases.iter().all(|d| d.prevalence.is_none()));

        let norte = kb.regional_base(Some(Region::BrazilNorth)).unwrap();
        let malaria = norte.disease("malaria").expect("malaria in brazil_north");
        assert_eq!(malaria.prevalence, Some(Prevalence::VeryHigh));
        assert!(malaria.symptoms.contains(&Symptom::Chills));
        assert!(!malaria.observations.is_empty());
    }

    #[test]
    fn test_regional_base_none_selects_general() {
        let kb = KnowledgeBase::builtin().expect("builtin knowledge base");
        let base = kb.regional_base(None).expect("general base");
        assert!(base.is_general());
        assert!(base.disease("covid19").is_some());
    }

    #[test]
    fn test_from_dir_missing_directory_fails() {
        let temp = TempDir::new().expect("temp dir");
        let err = KnowledgeBase::from_dir(&temp.path().join("nope")).expect_err("missing dir");
        assert!(matches!(err, KbError::MissingDirectory(_)));
    }

    #[test]
    fn test_from_dir_without_regional_file_reports_unknown_region() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join(GENERAL_FILE), BUILTIN_GENERAL).expect("write general");
        std::fs::write(
            temp.path().join("south_asia.yaml"),
            BUILTIN_REGIONAL[2].1,
        )
        .expect("write south asia");

        let kb = KnowledgeBase::from_dir(temp.path()).expect("load from dir");
        assert!(kb.regional_base(Some(Region::SouthAsia)).is_ok());

        let err = kb
            .regional_base(Some(Region::BrazilNorth))
            .expect_err("brazil_north not loaded");
        assert!(matches!(err, KbError::UnknownRegion(Region::BrazilNorth)));
    }

    #[test]
    fn test_from_dir_rejects_file_in_wrong_slot() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join(GENERAL_FILE), BUILTIN_GENERAL).expect("write general");
        // africa data under the brazil file name
        std::fs::write(temp.path().join("brazil_north.yaml"), BUILTIN_REGIONAL[1].1)
            .expect("write regional");

        let err = KnowledgeBase::from_dir(temp.path()).expect_err("slot mismatch");
        assert!(matches!(err, KbError::Invalid { .. }));
    }
}
