//! Prescription models and dosage instruction parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit of a prescription duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Day,
    Week,
}

/// How long a drug is prescribed for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DosageDuration {
    pub value: f64,
    pub unit: DurationUnit,
}

/// Errors from parsing a free-text duration such as "7 days".
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("invalid duration: {0:?}")]
    Invalid(String),

    #[error("unrecognized duration unit: {0:?}")]
    UnknownUnit(String),
}

impl DosageDuration {
    pub fn days(value: f64) -> Self {
        Self {
            value,
            unit: DurationUnit::Day,
        }
    }

    pub fn weeks(value: f64) -> Self {
        Self {
            value,
            unit: DurationUnit::Week,
        }
    }

    /// Duration normalized to days.
    pub fn in_days(&self) -> f64 {
        match self.unit {
            DurationUnit::Day => self.value,
            DurationUnit::Week => self.value * 7.0,
        }
    }
}

impl std::str::FromStr for DosageDuration {
    type Err = DurationParseError;

    /// Parse "7 days" / "2 weeks" style durations. Unrecognized units are
    /// an error rather than a guess.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let value: f64 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| DurationParseError::Invalid(s.to_string()))?;
        let unit_token = parts
            .next()
            .ok_or_else(|| DurationParseError::Invalid(s.to_string()))?;
        if parts.next().is_some() {
            return Err(DurationParseError::Invalid(s.to_string()));
        }

        let unit = match unit_token.to_lowercase().as_str() {
            "day" | "days" => DurationUnit::Day,
            "week" | "weeks" => DurationUnit::Week,
            other => return Err(DurationParseError::UnknownUnit(other.to_string())),
        };

        Ok(Self { value, unit })
    }
}

/// A dosage instruction: how much, how often, for how long.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DosageInstruction {
    /// Tablets per administration
    pub dosage_count: f64,
    /// Administrations per day
    pub frequency_count: u32,
    /// Course length
    pub duration: DosageDuration,
}

/// Lifecycle state of a prescription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    Pending,
    Dispensed,
    Cancelled,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Dispensed => "dispensed",
            PrescriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PrescriptionStatus::Pending),
            "dispensed" => Some(PrescriptionStatus::Dispensed),
            "cancelled" => Some(PrescriptionStatus::Cancelled),
            _ => None,
        }
    }
}

/// One priced drug line within a prescription.
///
/// The computed fields are filled by the calculator at prescribing time and
/// reused verbatim by the dispense transaction and the invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionItem {
    /// Drug display name at time of prescribing
    pub drug_name: String,
    /// Linked inventory item
    pub inventory_item_id: String,
    pub dosage_count: f64,
    pub frequency_count: u32,
    pub duration: DosageDuration,
    /// Tablets needed over the whole course
    pub total_tablets: i64,
    /// Whole packages to pull from stock
    pub packages_needed: i64,
    /// Per-tablet price applied
    pub unit_price: f64,
    /// unit_price × total_tablets
    pub subtotal: f64,
    /// HMO share of the subtotal (0 for non-HMO patients)
    pub hmo_contribution: f64,
    /// subtotal − hmo_contribution, never negative
    pub patient_pays: f64,
}

/// A prescription: one patient, one or more drug lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    /// Unique prescription ID
    pub id: String,
    /// Patient this was prescribed for
    pub patient_id: String,
    /// Prescribing clinician
    pub prescribed_by: String,
    /// Priced drug lines
    pub items: Vec<PrescriptionItem>,
    pub status: PrescriptionStatus,
    /// Set when dispensed
    pub dispensed_at: Option<String>,
    /// Operator who performed the dispense
    pub dispensed_by: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Prescription {
    /// Create a new pending prescription.
    pub fn new(patient_id: String, prescribed_by: String, items: Vec<PrescriptionItem>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            prescribed_by,
            items,
            status: PrescriptionStatus::Pending,
            dispensed_at: None,
            dispensed_by: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_dispensed(&self) -> bool {
        self.status == PrescriptionStatus::Dispensed
    }

    /// Sum of the patient-payable amounts across all lines.
    pub fn total_patient_pays(&self) -> f64 {
        self.items.iter().map(|i| i.patient_pays).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days() {
        let d: DosageDuration = "7 days".parse().unwrap();
        assert_eq!(d.unit, DurationUnit::Day);
        assert_eq!(d.value, 7.0);
        assert_eq!(d.in_days(), 7.0);
    }

    #[test]
    fn test_parse_weeks() {
        let d: DosageDuration = "2 Weeks".parse().unwrap();
        assert_eq!(d.unit, DurationUnit::Week);
        assert_eq!(d.in_days(), 14.0);

        let d: DosageDuration = "1 week".parse().unwrap();
        assert_eq!(d.in_days(), 7.0);
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        let err = "3 fortnights".parse::<DosageDuration>().unwrap_err();
        assert_eq!(err, DurationParseError::UnknownUnit("fortnights".into()));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("days".parse::<DosageDuration>().is_err());
        assert!("".parse::<DosageDuration>().is_err());
        assert!("7".parse::<DosageDuration>().is_err());
        assert!("7 days extra".parse::<DosageDuration>().is_err());
    }

    #[test]
    fn test_total_patient_pays() {
        let item = |pays: f64| PrescriptionItem {
            drug_name: "Test".into(),
            inventory_item_id: "item-1".into(),
            dosage_count: 1.0,
            frequency_count: 1,
            duration: DosageDuration::days(1.0),
            total_tablets: 1,
            packages_needed: 1,
            unit_price: pays,
            subtotal: pays,
            hmo_contribution: 0.0,
            patient_pays: pays,
        };

        let rx = Prescription::new(
            "patient-1".into(),
            "Dr. Bello".into(),
            vec![item(100.0), item(250.0)],
        );
        assert_eq!(rx.total_patient_pays(), 350.0);
        assert!(!rx.is_dispensed());
    }
}
