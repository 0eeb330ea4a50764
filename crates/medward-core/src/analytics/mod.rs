//! Clinical patient-flow timing analytics.
//!
//! Pure aggregation over visit flow records: per-stage duration statistics
//! (mean/median, minutes) and a completion funnel across the visit pipeline.
//! A record missing one endpoint of a transition is excluded from that
//! transition only; its other stages still count.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::VisitFlowRecord;

/// A timed transition between two pipeline stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StageTransition {
    CheckInToVitals,
    VitalsToDoctor,
    DoctorConsultation,
    LabProcessing,
    PharmacyProcessing,
    TotalVisit,
}

impl StageTransition {
    pub const ALL: [StageTransition; 6] = [
        StageTransition::CheckInToVitals,
        StageTransition::VitalsToDoctor,
        StageTransition::DoctorConsultation,
        StageTransition::LabProcessing,
        StageTransition::PharmacyProcessing,
        StageTransition::TotalVisit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageTransition::CheckInToVitals => "check_in_to_vitals",
            StageTransition::VitalsToDoctor => "vitals_to_doctor",
            StageTransition::DoctorConsultation => "doctor_consultation",
            StageTransition::LabProcessing => "lab_processing",
            StageTransition::PharmacyProcessing => "pharmacy_processing",
            StageTransition::TotalVisit => "total_visit",
        }
    }

    /// Start/end timestamps of this transition on one record. Every stage
    /// is timed from its own timestamps; none is assumed or hardcoded.
    fn endpoints(
        &self,
        record: &VisitFlowRecord,
    ) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self {
            StageTransition::CheckInToVitals => {
                (Some(record.checked_in_at), record.vitals_completed_at)
            }
            StageTransition::VitalsToDoctor => {
                (record.vitals_completed_at, record.doctor_started_at)
            }
            StageTransition::DoctorConsultation => {
                (record.doctor_started_at, record.doctor_completed_at)
            }
            StageTransition::LabProcessing => (record.lab_started_at, record.lab_completed_at),
            StageTransition::PharmacyProcessing => {
                (record.pharmacy_started_at, record.pharmacy_completed_at)
            }
            StageTransition::TotalVisit => (Some(record.checked_in_at), record.checked_out_at),
        }
    }
}

/// Aggregate statistics for one transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct StageStats {
    /// Mean duration in minutes, 1 decimal; 0 when no samples
    pub mean_minutes: f64,
    /// Median duration in minutes, 1 decimal; 0 when no samples
    pub median_minutes: f64,
    /// Records that contributed a duration
    pub sample_count: usize,
}

/// Drop-off funnel: how many visits reached each pipeline stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CompletionFunnel {
    pub checked_in: usize,
    pub vitals_completed: usize,
    pub doctor_seen: usize,
    pub lab_visited: usize,
    pub pharmacy_visited: usize,
    pub checked_out: usize,
}

/// Restricts which records feed the metrics, by check-in time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl FlowFilter {
    fn matches(&self, record: &VisitFlowRecord) -> bool {
        if let Some(from) = self.from {
            if record.checked_in_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.checked_in_at > to {
                return false;
            }
        }
        true
    }
}

/// Full flow metrics report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowReport {
    /// Per-transition statistics, keyed in pipeline order
    pub stats: BTreeMap<StageTransition, StageStats>,
    pub funnel: CompletionFunnel,
    /// Records considered after filtering
    pub visit_count: usize,
}

/// Compute flow metrics over a set of visit records.
pub fn compute_flow_metrics(records: &[VisitFlowRecord], filter: Option<&FlowFilter>) -> FlowReport {
    let filtered: Vec<&VisitFlowRecord> = records
        .iter()
        .filter(|r| filter.map_or(true, |f| f.matches(r)))
        .collect();

    let mut stats = BTreeMap::new();
    for transition in StageTransition::ALL {
        let durations: Vec<f64> = filtered
            .iter()
            .filter_map(|record| {
                let (start, end) = transition.endpoints(record);
                duration_minutes(start, end)
            })
            .collect();
        stats.insert(
            transition,
            StageStats {
                mean_minutes: mean(&durations),
                median_minutes: median(&durations),
                sample_count: durations.len(),
            },
        );
    }

    let mut funnel = CompletionFunnel::default();
    for record in &filtered {
        funnel.checked_in += 1;
        funnel.vitals_completed += record.vitals_completed_at.is_some() as usize;
        funnel.doctor_seen += record.doctor_started_at.is_some() as usize;
        funnel.lab_visited += record.lab_started_at.is_some() as usize;
        funnel.pharmacy_visited += record.pharmacy_started_at.is_some() as usize;
        funnel.checked_out += record.checked_out_at.is_some() as usize;
    }

    FlowReport {
        stats,
        funnel,
        visit_count: filtered.len(),
    }
}

/// Whole-minute durations for a single record, for per-visit detail views.
/// Transitions missing an endpoint are absent from the map.
pub fn visit_durations(record: &VisitFlowRecord) -> BTreeMap<StageTransition, i64> {
    StageTransition::ALL
        .iter()
        .filter_map(|transition| {
            let (start, end) = transition.endpoints(record);
            duration_minutes(start, end).map(|m| (*transition, m.round() as i64))
        })
        .collect()
}

fn duration_minutes(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<f64> {
    let (start, end) = (start?, end?);
    Some((end - start).num_seconds() as f64 / 60.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round1(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    let raw = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    round1(raw)
}
