//! Guidance text for triage results.
//!
//! Per-disease and per-region lines come from the knowledge base. The lines here are keyed by
//! urgency tier, severity, fever, age and climatic event.

use crate::constants::{
    HEALTHY_PROBABILITY, MILD_FATIGUE_PROBABILITY, NONSPECIFIC_PROBABILITY,
};
use crate::patient::PatientInput;
use crate::result::{MedicationAdvice, OutcomeKind, TriageResult};
use std::collections::BTreeSet;
use triage_kb::{DiseaseEntry, RegionalBase};
use triage_types::{ClimateEvent, Severity, Symptom, UrgencyLevel};

pub const HEALTHY_LABEL: &str = "Paciente Saudável";
pub const MILD_FATIGUE_LABEL: &str = "Paciente Saudável - Fadiga Leve";
pub const NONSPECIFIC_LABEL: &str = "Paciente Saudável - Sintomas Inespecíficos";
pub const PROCESSING_ERROR_LABEL: &str = "Erro no processamento";

const CLOSING_RECOMMENDATIONS: &[&str] = &[
    "Manter hidratação adequada",
    "Retornar se febre persistir ou piorar",
];

fn urgency_recommendations(urgency: UrgencyLevel) -> &'static [&'static str] {
    match urgency {
        UrgencyLevel::Critical => &[
            "BUSCAR ATENDIMENTO MÉDICO IMEDIATO",
            "Considerar transferência para centro especializado",
        ],
        UrgencyLevel::High => &[
            "Procurar atendimento médico em até 2 horas",
            "Monitorar sinais vitais de perto",
        ],
        UrgencyLevel::Medium => &[
            "Procurar atendimento médico em 24 horas",
            "Repouso domiciliar adequado",
        ],
        UrgencyLevel::Low => &[],
    }
}

fn severity_observation(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Critical => Some("DOENÇA CRÍTICA - Requer atenção médica imediata"),
        Severity::High => Some("Doença de alta gravidade - Acompanhamento rigoroso necessário"),
        Severity::Medium | Severity::Low => None,
    }
}

fn fever_observation(temperature_c: f64) -> Option<&'static str> {
    if temperature_c >= 39.0 {
        Some("Febre alta - Monitorar hidratação")
    } else if temperature_c >= 37.8 {
        Some("Febre presente - Controle térmico")
    } else {
        None
    }
}

fn climate_recommendations(event: Option<ClimateEvent>) -> &'static [&'static str] {
    match event {
        Some(ClimateEvent::Floods | ClimateEvent::HeavyRain | ClimateEvent::Monsoon) => &[
            "Evitar contato com água contaminada",
            "Manter cuidados com higiene pessoal",
        ],
        Some(ClimateEvent::Drought | ClimateEvent::HeatWave) => &[
            "Aumentar ingestão de líquidos",
            "Evitar exposição solar excessiva",
        ],
        Some(ClimateEvent::HeatHumidity) => &[
            "Usar repelente contra mosquitos",
            "Eliminar água parada ao redor da residência",
        ],
        _ => &[],
    }
}

fn age_observation(age: u32) -> Option<&'static str> {
    if age < 2 {
        Some("Manter acompanhamento pediátrico regular")
    } else if age > 65 {
        Some("Manter acompanhamento geriátrico preventivo")
    } else {
        None
    }
}

fn push_unique(lines: &mut Vec<String>, line: &str) {
    if !lines.iter().any(|l| l == line) {
        lines.push(line.to_string());
    }
}

fn to_lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Observations for a diagnosis, in display order.
pub fn diagnosis_observations(
    disease: &DiseaseEntry,
    patient: &PatientInput,
    symptoms: &BTreeSet<Symptom>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for line in &disease.observations {
        push_unique(&mut lines, line);
    }
    if let Some(line) = severity_observation(disease.severity) {
        push_unique(&mut lines, line);
    }
    push_unique(
        &mut lines,
        &format!("Tempo de incubação típico: {}", disease.incubation_period),
    );

    let specific: Vec<&str> = disease
        .pathognomonic
        .iter()
        .filter(|s| symptoms.contains(*s))
        .map(|s| s.code())
        .collect();
    if !specific.is_empty() {
        push_unique(
            &mut lines,
            &format!("Sintomas específicos presentes: {}", specific.join(", ")),
        );
    }

    if let Some(line) = fever_observation(patient.temperature_c) {
        push_unique(&mut lines, line);
    }
    lines
}

/// Recommendations for a diagnosis: urgency lines, then the base's, then the disease's, then
/// the closing lines. Duplicates keep their first position.
pub fn diagnosis_recommendations(
    disease: &DiseaseEntry,
    base: &RegionalBase,
    urgency: UrgencyLevel,
) -> Vec<String> {
    let mut lines = Vec::new();
    let sources = urgency_recommendations(urgency)
        .iter()
        .copied()
        .chain(base.recommendations.iter().map(String::as_str))
        .chain(disease.recommendations.iter().map(String::as_str))
        .chain(CLOSING_RECOMMENDATIONS.iter().copied());
    for line in sources {
        push_unique(&mut lines, line);
    }
    lines
}

// ============================================================================
// Fixed outcomes
// ============================================================================

fn fixed_result(
    kind: OutcomeKind,
    diagnosis: &str,
    probability: u8,
    urgency: UrgencyLevel,
    medication: MedicationAdvice,
    observations: Vec<String>,
    recommendations: Vec<String>,
) -> TriageResult {
    TriageResult {
        kind,
        diagnosis: diagnosis.to_string(),
        disease_id: None,
        probability,
        urgency,
        medication,
        observations,
        recommendations,
        differentials: Vec::new(),
        score: None,
        incubation_period: None,
        severity: None,
        region_name: None,
    }
}

/// The healthy short-circuit result.
pub fn healthy(patient: &PatientInput, region_name: Option<String>) -> TriageResult {
    let mut observations = to_lines(&[
        "Sinais vitais dentro dos parâmetros normais",
        "Ausência de sintomas significativos",
        "Paciente em bom estado geral",
    ]);
    if let Some(line) = age_observation(patient.age) {
        observations.push(line.to_string());
    }

    let mut recommendations = to_lines(&[
        "Manter hábitos saudáveis de vida",
        "Hidratação adequada",
        "Alimentação balanceada",
        "Retornar se desenvolver sintomas",
    ]);
    recommendations.extend(
        climate_recommendations(patient.climate_event)
            .iter()
            .map(|s| s.to_string()),
    );

    TriageResult {
        region_name,
        ..fixed_result(
            OutcomeKind::Healthy,
            HEALTHY_LABEL,
            HEALTHY_PROBABILITY,
            UrgencyLevel::Low,
            MedicationAdvice::NotNeeded,
            observations,
            recommendations,
        )
    }
}

/// Healthy vitals with fatigue as the only complaint.
pub fn mild_fatigue(region_name: Option<String>) -> TriageResult {
    TriageResult {
        region_name,
        ..fixed_result(
            OutcomeKind::HealthyMildFatigue,
            MILD_FATIGUE_LABEL,
            MILD_FATIGUE_PROBABILITY,
            UrgencyLevel::Low,
            MedicationAdvice::Rest,
            to_lines(&["Apenas fadiga leve", "Sinais vitais estáveis"]),
            to_lines(&["Repouso adequado", "Hidratação", "Retorno se piorar"]),
        )
    }
}

/// Weak evidence with normal vitals. Differentials and the score are filled in by the caller.
pub fn nonspecific(region_name: Option<String>) -> TriageResult {
    TriageResult {
        region_name,
        ..fixed_result(
            OutcomeKind::HealthyNonspecific,
            NONSPECIFIC_LABEL,
            NONSPECIFIC_PROBABILITY,
            UrgencyLevel::Low,
            MedicationAdvice::Observation,
            to_lines(&[
                "Sintomas muito leves ou inespecíficos",
                "Sinais vitais dentro da normalidade",
            ]),
            to_lines(&[
                "Retorno se houver piora dos sintomas",
                "Manter hidratação adequada",
                "Repouso se necessário",
            ]),
        )
    }
}

/// Degraded result returned when evaluation fails internally.
pub fn processing_error(reason: &str) -> TriageResult {
    fixed_result(
        OutcomeKind::ProcessingError,
        PROCESSING_ERROR_LABEL,
        0,
        UrgencyLevel::Medium,
        MedicationAdvice::ConsultClinician,
        vec![format!("Erro no sistema: {reason}")],
        to_lines(&["Buscar atendimento médico imediato"]),
    )
}
