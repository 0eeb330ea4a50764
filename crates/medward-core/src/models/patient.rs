//! Patient and HMO policy models.

use serde::{Deserialize, Serialize};

/// How a patient's drug costs are billed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientType {
    /// Patient pays the full amount out of pocket
    SelfPay,
    /// An HMO contributes a coverage-rate share
    Hmo,
    /// Billed at the corporate-negotiated price, no HMO split
    Corporate,
}

impl PatientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientType::SelfPay => "self_pay",
            PatientType::Hmo => "hmo",
            PatientType::Corporate => "corporate",
        }
    }

    /// Parse from the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "self_pay" => Some(PatientType::SelfPay),
            "hmo" => Some(PatientType::Hmo),
            "corporate" => Some(PatientType::Corporate),
            _ => None,
        }
    }
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique patient ID
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Billing arrangement
    pub patient_type: PatientType,
    /// Linked HMO policy; expected to be set when `patient_type` is HMO
    pub hmo_policy_id: Option<String>,
    /// Known allergies as free-text tags (e.g., "penicillin")
    pub allergies: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(first_name: String, last_name: String, patient_type: PatientType) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            patient_type,
            hmo_policy_id: None,
            allergies: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An HMO policy with its cost-sharing rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HmoPolicy {
    /// Unique policy ID
    pub id: String,
    /// HMO / plan name
    pub name: String,
    /// Fraction of drug cost the HMO covers, in [0, 1]
    pub coverage_rate: f64,
    /// Creation timestamp
    pub created_at: String,
}

impl HmoPolicy {
    /// Create a new policy. The coverage rate is clamped to [0, 1].
    pub fn new(name: String, coverage_rate: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            coverage_rate: coverage_rate.clamp(0.0, 1.0),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient() {
        let patient = Patient::new("Ada".into(), "Okafor".into(), PatientType::SelfPay);
        assert_eq!(patient.full_name(), "Ada Okafor");
        assert!(patient.allergies.is_empty());
        assert_eq!(patient.id.len(), 36); // UUID format
    }

    #[test]
    fn test_patient_type_roundtrip() {
        for pt in [PatientType::SelfPay, PatientType::Hmo, PatientType::Corporate] {
            assert_eq!(PatientType::parse(pt.as_str()), Some(pt));
        }
        assert_eq!(PatientType::parse("charity"), None);
    }

    #[test]
    fn test_coverage_rate_clamped() {
        assert_eq!(HmoPolicy::new("Acme Health".into(), 1.5).coverage_rate, 1.0);
        assert_eq!(HmoPolicy::new("Acme Health".into(), -0.2).coverage_rate, 0.0);
        assert_eq!(HmoPolicy::new("Acme Health".into(), 0.8).coverage_rate, 0.8);
    }
}
