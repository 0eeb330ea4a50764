//! Visit flow records for timing analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A read-only projection of one visit's pipeline stage timestamps.
///
/// Check-in is the only guaranteed timestamp; everything else is filled in
/// (or not) as the visit progresses. Analytics never mutates these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitFlowRecord {
    /// Appointment/visit ID
    pub visit_id: String,
    pub checked_in_at: DateTime<Utc>,
    pub vitals_completed_at: Option<DateTime<Utc>>,
    pub doctor_started_at: Option<DateTime<Utc>>,
    pub doctor_completed_at: Option<DateTime<Utc>>,
    pub lab_started_at: Option<DateTime<Utc>>,
    pub lab_completed_at: Option<DateTime<Utc>>,
    pub pharmacy_started_at: Option<DateTime<Utc>>,
    pub pharmacy_completed_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

impl VisitFlowRecord {
    /// Create a record with only the check-in stamp set.
    pub fn new(visit_id: String, checked_in_at: DateTime<Utc>) -> Self {
        Self {
            visit_id,
            checked_in_at,
            vitals_completed_at: None,
            doctor_started_at: None,
            doctor_completed_at: None,
            lab_started_at: None,
            lab_completed_at: None,
            pharmacy_started_at: None,
            pharmacy_completed_at: None,
            checked_out_at: None,
        }
    }
}
