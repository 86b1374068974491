//! Medication supply forecasting over the triage history.
//!
//! A trailing window of history is tallied per prescribed medication, projected forward at the
//! window's daily triage rate, padded with a fixed safety margin and tiered by priority.

use crate::constants::{
    CRITICAL_MEDICATIONS, FORECAST_TOP_N, HIGH_PRIORITY_SHARE, HIGH_PRIORITY_URGENT_USES,
    MEDIUM_PRIORITY_SHARE, MEDIUM_PRIORITY_URGENT_USES, SAFETY_MARGIN,
};
use crate::history::{HistoryError, HistoryRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use triage_types::UrgencyLevel;

/// Reasons a forecast cannot be produced. Distinct from a successful report with no
/// medications.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("analysis window must be at least one day and both spans must fit the calendar")]
    InvalidWindow,

    #[error("insufficient data: the triage history is empty")]
    EmptyHistory,

    #[error("insufficient data: no triages in the last {window_days} days")]
    EmptyWindow { window_days: u32 },

    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplyPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl SupplyPriority {
    pub const ALL: [SupplyPriority; 4] = [
        SupplyPriority::Critical,
        SupplyPriority::High,
        SupplyPriority::Medium,
        SupplyPriority::Low,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SupplyPriority::Critical => "CRITICAL",
            SupplyPriority::High => "HIGH",
            SupplyPriority::Medium => "MEDIUM",
            SupplyPriority::Low => "LOW",
        }
    }
}

impl fmt::Display for SupplyPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Projected need for one medication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedicationNeed {
    pub name: String,
    /// Prescriptions in the analysis window.
    pub used_in_window: usize,
    /// Fraction of the window's triages that prescribed this medication.
    pub share: f64,
    pub frequency_percent: f64,
    /// Prescriptions whose triage was HIGH or CRITICAL.
    pub urgent_uses: usize,
    pub projected_need: u64,
    pub safety_margin: u64,
    pub total_needed: u64,
    pub priority: SupplyPriority,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub window_days: u32,
    pub projection_days: u32,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub projection_end: DateTime<Utc>,
    pub triage_count: usize,
    pub daily_mean: f64,
    pub projected_triages: f64,
    /// Ordered by priority, then total needed (descending), then name.
    pub medications: Vec<MedicationNeed>,
    pub top_diagnoses: Vec<CountEntry>,
    pub top_medications: Vec<CountEntry>,
    pub urgency_distribution: BTreeMap<UrgencyLevel, usize>,
}

fn is_critical_medication(name: &str) -> bool {
    let name = name.to_lowercase();
    CRITICAL_MEDICATIONS
        .iter()
        .any(|critical| name.contains(&critical.to_lowercase()))
}

pub fn supply_priority(name: &str, share: f64, urgent_uses: usize) -> SupplyPriority {
    if is_critical_medication(name) {
        SupplyPriority::Critical
    } else if share >= HIGH_PRIORITY_SHARE || urgent_uses >= HIGH_PRIORITY_URGENT_USES {
        SupplyPriority::High
    } else if share >= MEDIUM_PRIORITY_SHARE || urgent_uses >= MEDIUM_PRIORITY_URGENT_USES {
        SupplyPriority::Medium
    } else {
        SupplyPriority::Low
    }
}

fn top_entries(counts: &BTreeMap<String, usize>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .iter()
        .map(|(label, count)| CountEntry {
            label: label.clone(),
            count: *count,
        })
        .collect();
    // BTreeMap iteration already gives name order; the stable sort keeps it within a count.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(FORECAST_TOP_N);
    entries
}

/// Start of the analysis window and end of the projection around `now`.
///
/// # Errors
///
/// [`ForecastError::InvalidWindow`] for a zero window or for spans that leave the range chrono
/// can represent.
pub fn forecast_span(
    now: DateTime<Utc>,
    window_days: u32,
    projection_days: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ForecastError> {
    if window_days == 0 {
        return Err(ForecastError::InvalidWindow);
    }
    let start = Duration::try_days(i64::from(window_days))
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or(ForecastError::InvalidWindow)?;
    let end = Duration::try_days(i64::from(projection_days))
        .and_then(|span| now.checked_add_signed(span))
        .ok_or(ForecastError::InvalidWindow)?;
    Ok((start, end))
}

/// Forecast medication needs from `records`, looking back `window_days` from `now` and
/// projecting `projection_days` forward.
///
/// # Errors
///
/// [`ForecastError::InvalidWindow`] as for [`forecast_span`], [`ForecastError::EmptyHistory`] when
/// there are no records at all and [`ForecastError::EmptyWindow`] when none fall in the window.
pub fn forecast(
    records: &[HistoryRecord],
    window_days: u32,
    projection_days: u32,
    now: DateTime<Utc>,
) -> Result<ForecastReport, ForecastError> {
    let (period_start, projection_end) = forecast_span(now, window_days, projection_days)?;
    if records.is_empty() {
        return Err(ForecastError::EmptyHistory);
    }

    let window: Vec<&HistoryRecord> = records
        .iter()
        .filter(|r| r.timestamp >= period_start && r.timestamp <= now)
        .collect();
    if window.is_empty() {
        return Err(ForecastError::EmptyWindow { window_days });
    }

    let triage_count = window.len();
    let mut uses: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    let mut diagnoses: BTreeMap<String, usize> = BTreeMap::new();
    let mut urgency_distribution: BTreeMap<UrgencyLevel, usize> = BTreeMap::new();

    for record in &window {
        let result = &record.result;
        *diagnoses.entry(result.diagnosis.clone()).or_default() += 1;
        *urgency_distribution.entry(result.urgency).or_default() += 1;

        if let Some(name) = result.medication.prescribed_name() {
            let entry = uses.entry(name.to_string()).or_default();
            entry.0 += 1;
            if result.urgency >= UrgencyLevel::High {
                entry.1 += 1;
            }
        }
    }

    let daily_mean = triage_count as f64 / f64::from(window_days);
    let projected_triages = daily_mean * f64::from(projection_days);

    let mut medications: Vec<MedicationNeed> = uses
        .iter()
        .map(|(name, (used, urgent))| {
            let share = *used as f64 / triage_count as f64;
            let projected_need = (share * projected_triages).round() as u64;
            let safety_margin = (projected_need as f64 * SAFETY_MARGIN).round() as u64;
            MedicationNeed {
                name: name.clone(),
                used_in_window: *used,
                share,
                frequency_percent: share * 100.0,
                urgent_uses: *urgent,
                projected_need,
                safety_margin,
                total_needed: projected_need + safety_margin,
                priority: supply_priority(name, share, *urgent),
            }
        })
        .collect();
    medications.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(b.total_needed.cmp(&a.total_needed))
            .then(a.name.cmp(&b.name))
    });

    let medication_counts: BTreeMap<String, usize> = uses
        .iter()
        .map(|(name, (used, _))| (name.clone(), *used))
        .collect();

    let report = ForecastReport {
        window_days,
        projection_days,
        period_start,
        period_end: now,
        projection_end,
        triage_count,
        daily_mean,
        projected_triages,
        medications,
        top_diagnoses: top_entries(&diagnoses),
        top_medications: top_entries(&medication_counts),
        urgency_distribution,
    };
    tracing::info!(
        window_days,
        projection_days,
        triage_count,
        medications = report.medications.len(),
        "medication forecast computed"
    );
    Ok(report)
}

// ============================================================================
// Shopping list
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: u64,
    pub frequency_percent: f64,
    pub historical_uses: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShoppingGroup {
    pub priority: SupplyPriority,
    pub items: Vec<ShoppingItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingSummary {
    pub distinct_medications: usize,
    pub total_units: u64,
    pub coverage_days: u32,
    pub based_on_triages: usize,
}

/// Purchase list grouped by priority. Every tier is present, possibly empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub groups: Vec<ShoppingGroup>,
    pub summary: ShoppingSummary,
}

impl From<&ForecastReport> for ShoppingList {
    fn from(report: &ForecastReport) -> Self {
        let groups = SupplyPriority::ALL
            .iter()
            .map(|priority| {
                let mut items: Vec<ShoppingItem> = report
                    .medications
                    .iter()
                    .filter(|m| m.priority == *priority)
                    .map(|m| ShoppingItem {
                        name: m.name.clone(),
                        quantity: m.total_needed,
                        frequency_percent: m.frequency_percent,
                        historical_uses: m.used_in_window,
                    })
                    .collect();
                items.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.name.cmp(&b.name)));
                ShoppingGroup {
                    priority: *priority,
                    items,
                }
            })
            .collect();

        ShoppingList {
            groups,
            summary: ShoppingSummary {
                distinct_medications: report.medications.len(),
                total_units: report.medications.iter().map(|m| m.total_needed).sum(),
                coverage_days: report.projection_days,
                based_on_triages: report.triage_count,
            },
        }
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MEDICATION SHOPPING LIST")?;
        writeln!(
            f,
            "Coverage: {} days, based on {} triages",
            self.summary.coverage_days, self.summary.based_on_triages
        )?;
        for group in &self.groups {
            if group.items.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "[{}]", group.priority)?;
            for item in &group.items {
                writeln!(
                    f,
                    "  - {}: {} units ({:.1}% of triages, {} uses)",
                    item.name, item.quantity, item.frequency_percent, item.historical_uses
                )?;
            }
        }
        writeln!(f)?;
        write!(
            f,
            "Total: {} medications, {} units",
            self.summary.distinct_medications, self.summary.total_units
        )
    }
}
