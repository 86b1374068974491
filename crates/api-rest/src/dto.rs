//! Wire types for the REST API.
//!
//! Requests carry vocabulary values as their string codes and are converted into core types
//! at the boundary, so a bad code is reported alongside range violations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use triage_core::forecast::{CountEntry, ShoppingGroup, ShoppingItem};
use triage_core::{
    Differential, ForecastReport, HistoryRecord, MedicationAdvice, MedicationNeed, PatientInput,
    ScoreBreakdown, ShoppingList, TriageResult, TriageStatistics,
};
use triage_kb::{DiseaseEntry, RegionalBase};
use triage_types::{Sex, VocabularyError};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(default)]
    pub details: Vec<String>,
}

// ============================================================================
// Triage
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TriageReq {
    pub age: u32,
    /// `male`, `female` or `unspecified`.
    #[serde(default)]
    pub sex: Option<String>,
    pub weight_kg: f64,
    pub temperature_c: f64,
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub heart_rate: u16,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub climate_event: Option<String>,
    #[serde(default)]
    pub symptom_duration_days: u32,
    #[serde(default)]
    pub vulnerable_population: bool,
    #[serde(default)]
    pub medical_history: Vec<String>,
    /// Omit for the region-agnostic base.
    #[serde(default)]
    pub region: Option<String>,
}

fn parse_code<T>(value: &str, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr<Err = VocabularyError>,
{
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    }
}

fn parse_optional<T>(value: Option<&str>, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr<Err = VocabularyError>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| parse_code(v, errors))
}

impl TryFrom<TriageReq> for PatientInput {
    type Error = Vec<String>;

    fn try_from(req: TriageReq) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let sex = parse_optional::<Sex>(req.sex.as_deref(), &mut errors).unwrap_or(Sex::Unspecified);
        let symptoms = req
            .symptoms
            .iter()
            .filter_map(|s| parse_code(s, &mut errors))
            .collect();
        let medical_history = req
            .medical_history
            .iter()
            .filter_map(|c| parse_code(c, &mut errors))
            .collect();
        let climate_event = parse_optional(req.climate_event.as_deref(), &mut errors);
        let region = parse_optional(req.region.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PatientInput {
            age: req.age,
            sex,
            weight_kg: req.weight_kg,
            temperature_c: req.temperature_c,
            systolic_bp: req.systolic_bp,
            diastolic_bp: req.diastolic_bp,
            heart_rate: req.heart_rate,
            symptoms,
            climate_event,
            symptom_duration_days: req.symptom_duration_days,
            vulnerable_population: req.vulnerable_population,
            medical_history,
            region,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MedicationRes {
    /// `not_needed`, `rest`, `observation`, `consult_clinician` or `prescribed`.
    pub kind: String,
    /// Display text.
    pub label: String,
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
}

impl From<&MedicationAdvice> for MedicationRes {
    fn from(advice: &MedicationAdvice) -> Self {
        let label = advice.to_string();
        match advice {
            MedicationAdvice::Prescribed {
                name,
                dosage,
                frequency,
            } => MedicationRes {
                kind: "prescribed".into(),
                label,
                name: Some(name.clone()),
                dosage: Some(dosage.clone()),
                frequency: Some(frequency.clone()),
            },
            other => {
                let kind = match other {
                    MedicationAdvice::NotNeeded => "not_needed",
                    MedicationAdvice::Rest => "rest",
                    MedicationAdvice::Observation => "observation",
                    _ => "consult_clinician",
                };
                MedicationRes {
                    kind: kind.into(),
                    label,
                    name: None,
                    dosage: None,
                    frequency: None,
                }
            }
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DifferentialRes {
    pub label: String,
    pub disease_id: String,
    pub probability: u8,
}

impl From<&Differential> for DifferentialRes {
    fn from(d: &Differential) -> Self {
        Self {
            label: d.label.clone(),
            disease_id: d.disease_id.to_string(),
            probability: d.probability,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ScoreRes {
    pub symptoms: f64,
    pub climate: f64,
    pub population: f64,
    pub severity: f64,
    pub composite: f64,
}

impl From<&ScoreBreakdown> for ScoreRes {
    fn from(s: &ScoreBreakdown) -> Self {
        Self {
            symptoms: s.symptoms,
            climate: s.climate,
            population: s.population,
            severity: s.severity,
            composite: s.composite,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TriageRes {
    pub kind: String,
    pub diagnosis: String,
    pub disease_id: Option<String>,
    pub probability: u8,
    pub urgency: String,
    pub medication: MedicationRes,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub differentials: Vec<DifferentialRes>,
    pub score: Option<ScoreRes>,
    pub incubation_period: Option<String>,
    pub severity: Option<String>,
    pub region_name: Option<String>,
}

fn outcome_code(result: &TriageResult) -> String {
    serde_json::to_value(result.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl From<&TriageResult> for TriageRes {
    fn from(r: &TriageResult) -> Self {
        Self {
            kind: outcome_code(r),
            diagnosis: r.diagnosis.clone(),
            disease_id: r.disease_id.as_ref().map(|d| d.to_string()),
            probability: r.probability,
            urgency: r.urgency.to_string(),
            medication: MedicationRes::from(&r.medication),
            observations: r.observations.clone(),
            recommendations: r.recommendations.clone(),
            differentials: r.differentials.iter().map(DifferentialRes::from).collect(),
            score: r.score.as_ref().map(ScoreRes::from),
            incubation_period: r.incubation_period.clone(),
            severity: r.severity.map(|s| s.to_string()),
            region_name: r.region_name.clone(),
        }
    }
}

// ============================================================================
// History and statistics
// ============================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryRes {
    pub id: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub age: u32,
    pub region: Option<String>,
    pub climate_event: Option<String>,
    pub diagnosis: String,
    pub probability: u8,
    pub urgency: String,
    pub medication: String,
}

impl From<&HistoryRecord> for HistoryEntryRes {
    fn from(r: &HistoryRecord) -> Self {
        Self {
            id: r.id.to_string(),
            timestamp: r.timestamp.to_rfc3339(),
            age: r.patient.age,
            region: r.patient.region.map(|x| x.to_string()),
            climate_event: r.patient.climate_event.map(|x| x.to_string()),
            diagnosis: r.result.diagnosis.clone(),
            probability: r.result.probability,
            urgency: r.result.urgency.to_string(),
            medication: r.result.medication.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HistoryRes {
    pub records: Vec<HistoryEntryRes>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatisticsRes {
    pub total: usize,
    pub diagnosis_frequency: BTreeMap<String, usize>,
    pub urgency_distribution: BTreeMap<String, usize>,
    pub climate_event_frequency: BTreeMap<String, usize>,
    pub mean_age: Option<f64>,
}

impl From<TriageStatistics> for StatisticsRes {
    fn from(s: TriageStatistics) -> Self {
        Self {
            total: s.total,
            diagnosis_frequency: s.diagnosis_frequency,
            urgency_distribution: s
                .urgency_distribution
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            climate_event_frequency: s.climate_event_frequency,
            mean_age: s.mean_age,
        }
    }
}

// ============================================================================
// Forecast
// ============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForecastQuery {
    /// Trailing analysis window in days (default 30).
    pub window_days: Option<u32>,
    /// Forward projection in days (default 30).
    pub projection_days: Option<u32>,
}

impl ForecastQuery {
    pub fn window_days(&self) -> u32 {
        self.window_days.unwrap_or(30)
    }

    pub fn projection_days(&self) -> u32 {
        self.projection_days.unwrap_or(30)
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MedicationNeedRes {
    pub name: String,
    pub priority: String,
    pub used_in_window: usize,
    pub frequency_percent: f64,
    pub urgent_uses: usize,
    pub projected_need: u64,
    pub safety_margin: u64,
    pub total_needed: u64,
}

impl From<&MedicationNeed> for MedicationNeedRes {
    fn from(m: &MedicationNeed) -> Self {
        Self {
            name: m.name.clone(),
            priority: m.priority.to_string(),
            used_in_window: m.used_in_window,
            frequency_percent: m.frequency_percent,
            urgent_uses: m.urgent_uses,
            projected_need: m.projected_need,
            safety_margin: m.safety_margin,
            total_needed: m.total_needed,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CountRes {
    pub label: String,
    pub count: usize,
}

impl From<&CountEntry> for CountRes {
    fn from(c: &CountEntry) -> Self {
        Self {
            label: c.label.clone(),
            count: c.count,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ForecastRes {
    pub window_days: u32,
    pub projection_days: u32,
    pub period_start: String,
    pub period_end: String,
    pub projection_end: String,
    pub triage_count: usize,
    pub daily_mean: f64,
    pub projected_triages: f64,
    pub medications: Vec<MedicationNeedRes>,
    pub top_diagnoses: Vec<CountRes>,
    pub top_medications: Vec<CountRes>,
    pub urgency_distribution: BTreeMap<String, usize>,
}

impl From<&ForecastReport> for ForecastRes {
    fn from(r: &ForecastReport) -> Self {
        Self {
            window_days: r.window_days,
            projection_days: r.projection_days,
            period_start: r.period_start.to_rfc3339(),
            period_end: r.period_end.to_rfc3339(),
            projection_end: r.projection_end.to_rfc3339(),
            triage_count: r.triage_count,
            daily_mean: r.daily_mean,
            projected_triages: r.projected_triages,
            medications: r.medications.iter().map(MedicationNeedRes::from).collect(),
            top_diagnoses: r.top_diagnoses.iter().map(CountRes::from).collect(),
            top_medications: r.top_medications.iter().map(CountRes::from).collect(),
            urgency_distribution: r
                .urgency_distribution
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ShoppingItemRes {
    pub name: String,
    pub quantity: u64,
    pub frequency_percent: f64,
    pub historical_uses: usize,
}

impl From<&ShoppingItem> for ShoppingItemRes {
    fn from(i: &ShoppingItem) -> Self {
        Self {
            name: i.name.clone(),
            quantity: i.quantity,
            frequency_percent: i.frequency_percent,
            historical_uses: i.historical_uses,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ShoppingGroupRes {
    pub priority: String,
    pub items: Vec<ShoppingItemRes>,
}

impl From<&ShoppingGroup> for ShoppingGroupRes {
    fn from(g: &ShoppingGroup) -> Self {
        Self {
            priority: g.priority.to_string(),
            items: g.items.iter().map(ShoppingItemRes::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ShoppingListRes {
    pub groups: Vec<ShoppingGroupRes>,
    pub distinct_medications: usize,
    pub total_units: u64,
    pub coverage_days: u32,
    pub based_on_triages: usize,
    /// Printable rendering of the list.
    pub text: String,
}

impl From<&ShoppingList> for ShoppingListRes {
    fn from(l: &ShoppingList) -> Self {
        Self {
            groups: l.groups.iter().map(ShoppingGroupRes::from).collect(),
            distinct_medications: l.summary.distinct_medications,
            total_units: l.summary.total_units,
            coverage_days: l.summary.coverage_days,
            based_on_triages: l.summary.based_on_triages,
            text: l.to_string(),
        }
    }
}

// ============================================================================
// Knowledge base
// ============================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegionRes {
    pub code: String,
    pub name: String,
    pub disease_count: usize,
    pub characteristics: Vec<String>,
}

impl RegionRes {
    pub fn new(code: &str, base: &RegionalBase) -> Self {
        Self {
            code: code.to_string(),
            name: base.name.clone(),
            disease_count: base.diseases.len(),
            characteristics: base.characteristics.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegionsRes {
    pub regions: Vec<RegionRes>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiseaseRes {
    pub id: String,
    pub label: String,
    pub severity: String,
    pub prevalence: Option<String>,
    pub symptoms: Vec<String>,
    pub pathognomonic: Vec<String>,
    pub climate_triggers: Vec<String>,
    pub incubation_period: String,
}

impl From<&DiseaseEntry> for DiseaseRes {
    fn from(d: &DiseaseEntry) -> Self {
        Self {
            id: d.id.to_string(),
            label: d.label.to_string(),
            severity: d.severity.to_string(),
            prevalence: d.prevalence.map(|p| p.to_string()),
            symptoms: d.symptoms.iter().map(|s| s.to_string()).collect(),
            pathognomonic: d.pathognomonic.iter().map(|s| s.to_string()).collect(),
            climate_triggers: d.climate_triggers.iter().map(|c| c.to_string()).collect(),
            incubation_period: d.incubation_period.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiseasesRes {
    pub region: RegionRes,
    pub diseases: Vec<DiseaseRes>,
}
