//! Aggregate views over the triage history.

use crate::history::HistoryRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use triage_types::UrgencyLevel;

/// Key used for records without a climatic event.
pub const NOT_REPORTED: &str = "not_reported";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageStatistics {
    pub total: usize,
    /// Count per diagnosis label.
    pub diagnosis_frequency: BTreeMap<String, usize>,
    pub urgency_distribution: BTreeMap<UrgencyLevel, usize>,
    /// Count per climatic event code, [`NOT_REPORTED`] when none was given.
    pub climate_event_frequency: BTreeMap<String, usize>,
    /// `None` for an empty history.
    pub mean_age: Option<f64>,
}

impl TriageStatistics {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };

        let mut age_sum = 0u64;
        for record in records {
            *stats
                .diagnosis_frequency
                .entry(record.result.diagnosis.clone())
                .or_default() += 1;
            *stats
                .urgency_distribution
                .entry(record.result.urgency)
                .or_default() += 1;
            let climate = record
                .patient
                .climate_event
                .map(|e| e.code().to_string())
                .unwrap_or_else(|| NOT_REPORTED.to_string());
            *stats.climate_event_frequency.entry(climate).or_default() += 1;
            age_sum += u64::from(record.patient.age);
        }

        if !records.is_empty() {
            stats.mean_age = Some(age_sum as f64 / records.len() as f64);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::healthy_record;
    use chrono::Utc;
    use triage_types::ClimateEvent;

    #[test]
    fn test_empty_history_has_no_mean_age() {
        let stats = TriageStatistics::from_records(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.diagnosis_frequency.is_empty());
        assert_eq!(stats.mean_age, None);
    }

    #[test]
    fn test_counts_and_mean_age() {
        let mut first = healthy_record(Utc::now());
        first.patient.age = 20;
        first.patient.climate_event = Some(ClimateEvent::Floods);
        let mut second = healthy_record(Utc::now());
        second.patient.age = 41;
        second.result.urgency = UrgencyLevel::High;
        second.result.diagnosis = "Malária".into();

        let stats = TriageStatistics::from_records(&[first, second]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.diagnosis_frequency["Paciente Saudável"], 1);
        assert_eq!(stats.diagnosis_frequency["Malária"], 1);
        assert_eq!(stats.urgency_distribution[&UrgencyLevel::Low], 1);
        assert_eq!(stats.urgency_distribution[&UrgencyLevel::High], 1);
        assert_eq!(stats.climate_event_frequency["floods"], 1);
        assert_eq!(stats.climate_event_frequency[NOT_REPORTED], 1);
        assert_eq!(stats.mean_age, Some(30.5));
    }
}
