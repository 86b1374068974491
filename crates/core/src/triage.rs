//! Triage orchestration.
//!
//! [`TriageService`] runs one patient through the healthy short-circuit or the disease scoring
//! loop and records the outcome in the history store.

use crate::config::CoreConfig;
use crate::constants::{
    CHILD_AGE_CUTOFF, DIFFERENTIAL_MAX_GAP, DIFFERENTIAL_PROBABILITY_GAP,
    DIFFERENTIAL_THRESHOLD_GENERAL, DIFFERENTIAL_THRESHOLD_REGIONAL, MAX_DIFFERENTIALS,
    PROBABILITY_CAP, SIGNIFICANT_SYMPTOMS, WEAK_EVIDENCE_THRESHOLD,
};
use crate::forecast::{self, ForecastError, ForecastReport, ShoppingList};
use crate::guidance;
use crate::history::{HistoryRecord, HistoryStore, JsonlHistoryStore};
use crate::patient::PatientInput;
use crate::result::{Differential, MedicationAdvice, OutcomeKind, TriageResult};
use crate::scoring::{score_disease, ScoreBreakdown};
use crate::statistics::TriageStatistics;
use crate::urgency;
use crate::{CoreResult, TriageError};
use chrono::Utc;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use triage_kb::{DiseaseEntry, KnowledgeBase, RegionalBase};
use triage_types::Symptom;

/// Entry point for triage, history, statistics and forecasts.
///
/// Cheap to clone; clones share the knowledge base and the history store.
#[derive(Clone)]
pub struct TriageService {
    kb: Arc<KnowledgeBase>,
    history: Arc<dyn HistoryStore>,
}

impl std::fmt::Debug for TriageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageService")
            .field("regions", &self.kb.regions().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TriageService {
    pub fn new(kb: Arc<KnowledgeBase>, history: Arc<dyn HistoryStore>) -> Self {
        Self { kb, history }
    }

    /// Build a service from resolved configuration, backed by the JSON-lines history file.
    pub fn from_config(cfg: &CoreConfig) -> CoreResult<Self> {
        let kb = cfg.load_knowledge_base()?;
        let history = JsonlHistoryStore::new(cfg.history_file());
        Ok(Self::new(Arc::new(kb), Arc::new(history)))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Triage one patient.
    ///
    /// Internal failures, including panics, yield a degraded "processing error" result instead
    /// of an error. The outcome is appended to the history store before returning; a failed
    /// append is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::KnowledgeBase`] when the patient's region has no loaded base.
    pub fn triage(&self, patient: &PatientInput) -> CoreResult<TriageResult> {
        let base = self.kb.regional_base(patient.region)?;

        let evaluated = panic::catch_unwind(AssertUnwindSafe(|| evaluate(patient, base)));
        let result = match evaluated {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "triage evaluation failed");
                guidance::processing_error(&e.to_string())
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(reason = %reason, "triage evaluation panicked");
                guidance::processing_error(&reason)
            }
        };

        tracing::info!(
            kind = ?result.kind,
            diagnosis = %result.diagnosis,
            urgency = %result.urgency,
            probability = result.probability,
            region = ?patient.region,
            "triage completed"
        );

        let record = HistoryRecord::new(patient.clone(), result.clone());
        if let Err(e) = self.history.append(record) {
            tracing::error!(error = %e, "failed to append triage history record");
        }

        Ok(result)
    }

    pub fn history(&self) -> CoreResult<Vec<HistoryRecord>> {
        Ok(self.history.all()?)
    }

    pub fn statistics(&self) -> CoreResult<TriageStatistics> {
        Ok(TriageStatistics::from_records(&self.history.all()?))
    }

    /// Forecast medication needs from the last `window_days` of history.
    pub fn forecast_medication_needs(
        &self,
        window_days: u32,
        projection_days: u32,
    ) -> Result<ForecastReport, ForecastError> {
        let now = Utc::now();
        let (cutoff, _) = forecast::forecast_span(now, window_days, projection_days)?;
        let recent = self.history.since(cutoff)?;
        if recent.is_empty() {
            return Err(if self.history.all()?.is_empty() {
                ForecastError::EmptyHistory
            } else {
                ForecastError::EmptyWindow { window_days }
            });
        }
        forecast::forecast(&recent, window_days, projection_days, now)
    }

    pub fn shopping_list(
        &self,
        window_days: u32,
        projection_days: u32,
    ) -> Result<ShoppingList, ForecastError> {
        let report = self.forecast_medication_needs(window_days, projection_days)?;
        Ok(ShoppingList::from(&report))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

// ============================================================================
// Evaluation
// ============================================================================

fn region_name(base: &RegionalBase) -> Option<String> {
    base.region.map(|_| base.name.clone())
}

fn is_healthy(patient: &PatientInput, symptoms: &BTreeSet<Symptom>) -> bool {
    patient.vitals_normal() && !symptoms.iter().any(|s| SIGNIFICANT_SYMPTOMS.contains(s))
}

/// `min(round(composite × 100), 95)`.
pub fn probability_from_composite(composite: f64) -> u8 {
    let percent = (composite * 100.0).round().clamp(0.0, f64::from(PROBABILITY_CAP));
    percent as u8
}

fn evaluate(patient: &PatientInput, base: &RegionalBase) -> CoreResult<TriageResult> {
    let symptoms = patient.effective_symptoms();
    let region_name = region_name(base);

    if is_healthy(patient, &symptoms) {
        let fatigue_only = symptoms.len() == 1 && symptoms.contains(&Symptom::Fatigue);
        return Ok(if fatigue_only {
            guidance::mild_fatigue(region_name)
        } else {
            guidance::healthy(patient, region_name)
        });
    }

    let ranked = rank(patient, &symptoms, base)?;
    let Some((top, top_score)) = ranked.first() else {
        return Err(TriageError::EmptyKnowledgeBase(base.name.clone()));
    };

    let probability = probability_from_composite(top_score.composite);
    let differentials = differentials(&ranked, top_score.composite, probability, base);

    if top_score.composite < WEAK_EVIDENCE_THRESHOLD && patient.vitals_normal() {
        let mut result = guidance::nonspecific(region_name);
        result.differentials = differentials;
        result.score = Some(*top_score);
        return Ok(result);
    }

    let medication = if patient.age < CHILD_AGE_CUTOFF {
        &top.medication.child
    } else {
        &top.medication.adult
    };
    let urgency = urgency::classify(patient, &symptoms, top.severity, top.prevalence.is_some());

    Ok(TriageResult {
        kind: OutcomeKind::Diagnosed,
        diagnosis: top.label.as_str().to_string(),
        disease_id: Some(top.id.clone()),
        probability,
        urgency,
        medication: MedicationAdvice::from(medication),
        observations: guidance::diagnosis_observations(top, patient, &symptoms),
        recommendations: guidance::diagnosis_recommendations(top, base, urgency),
        differentials,
        score: Some(*top_score),
        incubation_period: Some(top.incubation_period.clone()),
        severity: Some(top.severity),
        region_name,
    })
}

/// Score every disease in the base, highest composite first. Ties keep knowledge-base order.
fn rank<'a>(
    patient: &PatientInput,
    symptoms: &BTreeSet<Symptom>,
    base: &'a RegionalBase,
) -> CoreResult<Vec<(&'a DiseaseEntry, ScoreBreakdown)>> {
    let mut ranked = Vec::with_capacity(base.diseases.len());
    for disease in &base.diseases {
        let score = score_disease(patient, symptoms, disease);
        if !score.composite.is_finite() {
            return Err(TriageError::NonFiniteScore {
                disease: disease.id.to_string(),
            });
        }
        ranked.push((disease, score));
    }
    ranked.sort_by(|a, b| b.1.composite.total_cmp(&a.1.composite));
    Ok(ranked)
}

fn differentials(
    ranked: &[(&DiseaseEntry, ScoreBreakdown)],
    top_composite: f64,
    principal: u8,
    base: &RegionalBase,
) -> Vec<Differential> {
    let threshold = if base.is_general() {
        DIFFERENTIAL_THRESHOLD_GENERAL
    } else {
        DIFFERENTIAL_THRESHOLD_REGIONAL
    };
    let ceiling = i32::from(principal) - DIFFERENTIAL_PROBABILITY_GAP;

    ranked
        .iter()
        .skip(1)
        .take(MAX_DIFFERENTIALS)
        .filter(|(_, score)| {
            score.composite > threshold && top_composite - score.composite < DIFFERENTIAL_MAX_GAP
        })
        .filter_map(|(disease, score)| {
            let probability = i32::from(probability_from_composite(score.composite)).min(ceiling);
            (probability > 0).then(|| Differential {
                label: disease.label.as_str().to_string(),
                disease_id: disease.id.clone(),
                probability: probability as u8,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::{HEALTHY_LABEL, MILD_FATIGUE_LABEL, NONSPECIFIC_LABEL};
    use crate::history::{HistoryError, HistoryResult, InMemoryHistoryStore};
    use crate::patient::tests::healthy_adult;
    use triage_kb::KbError;
    use triage_types::{ClimateEvent, Region, UrgencyLevel};

    fn service() -> (TriageService, Arc<InMemoryHistoryStore>) {
        let kb = KnowledgeBase::builtin().expect("builtin kb");
        let store = Arc::new(InMemoryHistoryStore::new());
        (TriageService::new(Arc::new(kb), store.clone()), store)
    }

    fn symptoms(items: &[Symptom]) -> BTreeSet<Symptom> {
        items.iter().copied().collect()
    }

    struct FailingStore;

    impl HistoryStore for FailingStore {
        fn append(&self, _record: HistoryRecord) -> HistoryResult<()> {
            Err(HistoryError::LockPoisoned)
        }

        fn all(&self) -> HistoryResult<Vec<HistoryRecord>> {
            Err(HistoryError::LockPoisoned)
        }
    }

    #[test]
    fn test_healthy_patient_end_to_end() {
        let (svc, store) = service();
        let result = svc.triage(&healthy_adult()).expect("triage");

        assert_eq!(result.kind, OutcomeKind::Healthy);
        assert_eq!(result.diagnosis, HEALTHY_LABEL);
        assert_eq!(result.urgency, UrgencyLevel::Low);
        assert_eq!(result.medication, MedicationAdvice::NotNeeded);
        assert_eq!(result.probability, 95);
        assert!(result.score.is_none());
        assert_eq!(store.all().expect("history").len(), 1);
    }

    #[test]
    fn test_healthy_short_circuit_is_idempotent() {
        let (svc, _) = service();
        let patient = healthy_adult();
        let first = svc.triage(&patient).expect("first");
        let second = svc.triage(&patient).expect("second");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("json"),
            serde_json::to_string(&second).expect("json")
        );
    }

    #[test]
    fn test_healthy_in_every_region() {
        let (svc, _) = service();
        for region in Region::ALL {
            let mut patient = healthy_adult();
            patient.region = Some(*region);
            let result = svc.triage(&patient).expect("triage");
            assert_eq!(result.kind, OutcomeKind::Healthy);
            assert!(result.region_name.is_some());
        }
    }

    #[test]
    fn test_fatigue_only_uses_mild_fatigue_template() {
        let (svc, _) = service();
        let mut patient = healthy_adult();
        patient.symptoms = symptoms(&[Symptom::Fatigue]);
        let result = svc.triage(&patient).expect("triage");
        assert_eq!(result.diagnosis, MILD_FATIGUE_LABEL);
        assert_eq!(result.probability, 90);
        assert_eq!(result.medication, MedicationAdvice::Rest);
    }

    #[test]
    fn test_measured_fever_prevents_healthy_result() {
        let (svc, _) = service();
        let mut patient = healthy_adult();
        patient.temperature_c = 38.0;
        let result = svc.triage(&patient).expect("triage");
        assert_ne!(result.kind, OutcomeKind::Healthy);
    }

    #[test]
    fn test_critical_vitals_in_every_mode() {
        let (svc, _) = service();
        let regions = std::iter::once(None).chain(Region::ALL.iter().copied().map(Some));
        for region in regions {
            let mut patient = healthy_adult();
            patient.temperature_c = 39.5;
            patient.systolic_bp = 180;
            patient.diastolic_bp = 95;
            patient.heart_rate = 125;
            patient.symptoms = symptoms(&[Symptom::BreathingDifficulty]);
            patient.region = region;

            let result = svc.triage(&patient).expect("triage");
            assert_eq!(result.kind, OutcomeKind::Diagnosed, "{region:?}");
            assert_eq!(result.urgency, UrgencyLevel::Critical, "{region:?}");
            assert_eq!(result.recommendations[0], "BUSCAR ATENDIMENTO MÉDICO IMEDIATO");
        }
    }

    #[test]
    fn test_malaria_leads_in_brazil_north() {
        let (svc, _) = service();
        let mut patient = healthy_adult();
        patient.region = Some(Region::BrazilNorth);
        patient.temperature_c = 38.5;
        patient.climate_event = Some(ClimateEvent::HeatHumidity);
        patient.symptoms = symptoms(&[Symptom::Fever, Symptom::Chills, Symptom::Headache]);

        let result = svc.triage(&patient).expect("triage");
        assert_eq!(result.disease_id.as_ref().map(|d| d.as_str()), Some("malaria"));
        assert_eq!(result.diagnosis, "Malária");
        assert!(result.probability <= 95);
        assert!(result.probability >= 80);
        assert_eq!(result.region_name.as_deref(), Some("Norte do Brasil (Amazônia)"));
        assert!(matches!(result.medication, MedicationAdvice::Prescribed { .. }));
        assert!(result
            .recommendations
            .contains(&"Notificar vigilância epidemiológica".to_string()));
    }

    #[test]
    fn test_differentials_bounded_and_below_principal() {
        let (svc, _) = service();
        let probes = [
            symptoms(&[Symptom::Fever, Symptom::Headache, Symptom::Myalgia]),
            symptoms(&[Symptom::Fever, Symptom::Headache, Symptom::SkinRash, Symptom::Arthralgia]),
            symptoms(&[Symptom::Cough, Symptom::Fever, Symptom::BreathingDifficulty]),
            symptoms(&[Symptom::Diarrhoea, Symptom::Vomiting, Symptom::AbdominalPain]),
        ];
        let regions = std::iter::once(None).chain(Region::ALL.iter().copied().map(Some));
        for region in regions {
            for probe in &probes {
                let mut patient = healthy_adult();
                patient.region = region;
                patient.temperature_c = 38.4;
                patient.climate_event = Some(ClimateEvent::HeavyRain);
                patient.symptoms = probe.clone();

                let result = svc.triage(&patient).expect("triage");
                assert!(result.differentials.len() <= 3);
                for differential in &result.differentials {
                    assert!(differential.probability < result.probability);
                    assert!(differential.probability > 0);
                }
            }
        }
    }

    #[test]
    fn test_weak_evidence_falls_back_to_nonspecific() {
        let (svc, _) = service();
        let mut patient = healthy_adult();
        patient.age = 40;
        patient.sex = triage_types::Sex::Male;
        patient.weight_kg = 90.0;
        patient.symptoms = symptoms(&[Symptom::Conjunctivitis]);

        let result = svc.triage(&patient).expect("triage");
        assert_eq!(result.diagnosis, NONSPECIFIC_LABEL);
        assert_eq!(result.probability, 85);
        assert_eq!(result.medication, MedicationAdvice::Observation);
        assert!(result.score.is_some());
    }

    #[test]
    fn test_child_gets_child_medication() {
        let (svc, _) = service();
        let mut patient = healthy_adult();
        patient.age = 6;
        patient.weight_kg = 20.0;
        patient.region = Some(Region::BrazilNorth);
        patient.temperature_c = 38.5;
        patient.climate_event = Some(ClimateEvent::HeatHumidity);
        patient.symptoms = symptoms(&[Symptom::Fever, Symptom::Chills, Symptom::Headache]);

        let result = svc.triage(&patient).expect("triage");
        let base = svc
            .knowledge_base()
            .regional_base(Some(Region::BrazilNorth))
            .expect("region");
        let id = result.disease_id.clone().expect("diagnosis");
        let disease = base.disease(id.as_str()).expect("disease");
        assert_eq!(result.medication, MedicationAdvice::from(&disease.medication.child));
    }

    const GENERAL_ONLY: &str = "\
name: Base geral
diseases:
  - id: gripe
    label: Gripe
    climate_triggers: [cold]
    symptoms: [fever, cough]
    medication:
      adult: { name: Paracetamol, dosage: 500mg, frequency: 6/6h }
      child: { name: Paracetamol, dosage: 10mg/kg, frequency: 6/6h }
    severity: low
    incubation_period: 1-4 dias
    max_incidence: 0.2
";

    #[test]
    fn test_unknown_region_fails_the_call() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("general.yaml"), GENERAL_ONLY).expect("write");
        let kb = KnowledgeBase::from_dir(temp.path()).expect("kb");
        let store = Arc::new(InMemoryHistoryStore::new());
        let svc = TriageService::new(Arc::new(kb), store.clone());

        let mut patient = healthy_adult();
        patient.region = Some(Region::SouthAsia);
        let err = svc.triage(&patient).expect_err("region not loaded");
        assert!(matches!(
            err,
            TriageError::KnowledgeBase(KbError::UnknownRegion(Region::SouthAsia))
        ));
        assert!(store.all().expect("history").is_empty());

        patient.region = None;
        patient.symptoms = symptoms(&[Symptom::Cough]);
        patient.temperature_c = 38.2;
        let result = svc.triage(&patient).expect("general mode");
        assert_eq!(result.diagnosis, "Gripe");
    }

    #[test]
    fn test_failed_history_append_still_returns_result() {
        let kb = KnowledgeBase::builtin().expect("builtin kb");
        let svc = TriageService::new(Arc::new(kb), Arc::new(FailingStore));
        let result = svc.triage(&healthy_adult()).expect("triage");
        assert_eq!(result.kind, OutcomeKind::Healthy);
        assert!(svc.statistics().is_err());
    }

    #[test]
    fn test_every_outcome_is_recorded_and_counted() {
        let (svc, _) = service();
        svc.triage(&healthy_adult()).expect("healthy");
        let mut sick = healthy_adult();
        sick.temperature_c = 39.0;
        sick.symptoms = symptoms(&[Symptom::Cough, Symptom::BreathingDifficulty]);
        svc.triage(&sick).expect("sick");

        let stats = svc.statistics().expect("stats");
        assert_eq!(stats.total, 2);
        assert_eq!(stats.diagnosis_frequency[HEALTHY_LABEL], 1);
        assert_eq!(svc.history().expect("history").len(), 2);
    }

    #[test]
    fn test_forecast_through_service() {
        let (svc, _) = service();
        let err = svc.forecast_medication_needs(30, 30).expect_err("empty");
        assert!(matches!(err, ForecastError::EmptyHistory));

        let mut patient = healthy_adult();
        patient.region = Some(Region::BrazilNorth);
        patient.temperature_c = 38.5;
        patient.climate_event = Some(ClimateEvent::HeatHumidity);
        patient.symptoms = symptoms(&[Symptom::Fever, Symptom::Chills, Symptom::Headache]);
        svc.triage(&patient).expect("triage");

        let list = svc.shopping_list(30, 30).expect("shopping list");
        assert_eq!(list.summary.based_on_triages, 1);
        assert_eq!(list.summary.distinct_medications, 1);

        let err = svc
            .forecast_medication_needs(200_000_000, 30)
            .expect_err("window out of range");
        assert!(matches!(err, ForecastError::InvalidWindow));
        let err = svc
            .shopping_list(30, u32::MAX)
            .expect_err("projection out of range");
        assert!(matches!(err, ForecastError::InvalidWindow));
    }

    #[test]
    fn test_forecast_reads_only_the_window() {
        let (svc, store) = service();
        let now = Utc::now();
        store
            .append(crate::history::tests::healthy_record(now - chrono::Duration::days(90)))
            .expect("append old");

        let err = svc.forecast_medication_needs(30, 30).expect_err("old only");
        assert!(matches!(err, ForecastError::EmptyWindow { window_days: 30 }));

        store
            .append(crate::history::tests::healthy_record(now - chrono::Duration::days(2)))
            .expect("append recent");
        let report = svc.forecast_medication_needs(30, 30).expect("forecast");
        assert_eq!(report.triage_count, 1);
        assert!(report.period_start > now - chrono::Duration::days(31));
    }

    #[test]
    fn test_probability_from_composite_caps() {
        assert_eq!(probability_from_composite(0.999), 95);
        assert_eq!(probability_from_composite(0.954), 95);
        assert_eq!(probability_from_composite(0.851), 85);
        assert_eq!(probability_from_composite(0.0), 0);
    }
}
