//! Prescription cost calculator.
//!
//! Converts a dosage instruction into tablet counts, whole packages, and a
//! priced cost split. Pure arithmetic behind a read-only fetch, so it is safe
//! to call repeatedly for live preview while a prescribing form is edited.

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{
    DosageInstruction, DurationParseError, InventoryItem, Patient, PatientType, Prescription,
    PrescriptionItem,
};

/// Calculator errors.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("invalid dosage: {0}")]
    Validation(String),

    #[error("invalid duration: {0}")]
    Duration(#[from] DurationParseError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Db(#[from] DbError),
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Full breakdown of one priced dosage, carrying every intermediate value
/// so the prescribing UI can show its working.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    /// Course length normalized to days
    pub duration_in_days: f64,
    /// Tablets needed over the whole course
    pub total_tablets: i64,
    /// Conversion factor used (zero/unset treated as 1)
    pub units_per_package: i64,
    /// Whole packages to pull from stock
    pub packages_needed: i64,
    /// Tablets the patient actually receives (whole packages)
    pub units_from_packages: i64,
    /// Tablets received beyond what was strictly needed
    pub excess_tablets: i64,
    /// Per-tablet price applied
    pub unit_price: f64,
    /// unit_price × total_tablets (priced per tablet needed, not per package)
    pub subtotal: f64,
    /// HMO share of the subtotal
    pub hmo_contribution: f64,
    /// subtotal − hmo_contribution, clamped to ≥ 0
    pub patient_pays: f64,
    /// Whether current stock covers packages_needed
    pub stock_available: bool,
    /// Packages short, 0 when stock suffices
    pub shortage: i64,
}

/// Price one dosage of an inventory item for a given billing arrangement.
///
/// `coverage_rate` only applies to HMO patients; pass the rate resolved from
/// the patient's policy (0 when none is found).
pub fn price_item(
    item: &InventoryItem,
    patient_type: PatientType,
    coverage_rate: f64,
    dosage: &DosageInstruction,
) -> PricingResult<CalculationResult> {
    if dosage.dosage_count <= 0.0 {
        return Err(PricingError::Validation(format!(
            "dosage count must be positive, got {}",
            dosage.dosage_count
        )));
    }
    if dosage.frequency_count == 0 {
        return Err(PricingError::Validation(
            "frequency must be positive".into(),
        ));
    }
    let duration_in_days = dosage.duration.in_days();
    if duration_in_days <= 0.0 {
        return Err(PricingError::Validation(format!(
            "duration must be positive, got {} day(s)",
            duration_in_days
        )));
    }

    let total_tablets =
        (dosage.dosage_count * dosage.frequency_count as f64 * duration_in_days).round() as i64;

    let units_per_package = item.effective_units_per_package();
    // Patients receive whole packages: always round up.
    let packages_needed = (total_tablets + units_per_package - 1) / units_per_package;
    let units_from_packages = packages_needed * units_per_package;
    let excess_tablets = units_from_packages - total_tablets;

    // A missing/zero price yields a zero subtotal; that is a data-quality
    // concern for the caller, not an error here.
    let unit_price = item.unit_price_for(patient_type == PatientType::Corporate);
    let subtotal = unit_price * total_tablets as f64;

    let hmo_contribution = if patient_type == PatientType::Hmo {
        subtotal * coverage_rate
    } else {
        0.0
    };
    let patient_pays = (subtotal - hmo_contribution).max(0.0);

    let stock_available = item.stock_quantity >= packages_needed;
    let shortage = (packages_needed - item.stock_quantity).max(0);

    Ok(CalculationResult {
        duration_in_days,
        total_tablets,
        units_per_package,
        packages_needed,
        units_from_packages,
        excess_tablets,
        unit_price,
        subtotal,
        hmo_contribution,
        patient_pays,
        stock_available,
        shortage,
    })
}

/// One requested drug line before pricing.
#[derive(Debug, Clone)]
pub struct PrescriptionLine {
    pub inventory_item_id: String,
    pub dosage: DosageInstruction,
}

/// Calculator over the inventory/patient store.
pub struct Calculator<'a> {
    db: &'a Database,
}

impl<'a> Calculator<'a> {
    /// Create a new calculator.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Price a dosage of an inventory item for a patient.
    pub fn calculate_cost(
        &self,
        inventory_item_id: &str,
        patient_id: &str,
        dosage: &DosageInstruction,
    ) -> PricingResult<CalculationResult> {
        let item = self
            .db
            .get_inventory_item(inventory_item_id)?
            .ok_or_else(|| PricingError::NotFound(format!("inventory item {}", inventory_item_id)))?;
        let patient = self
            .db
            .get_patient(patient_id)?
            .ok_or_else(|| PricingError::NotFound(format!("patient {}", patient_id)))?;
        let coverage_rate = self.db.coverage_rate_for(&patient)?;

        price_item(&item, patient.patient_type, coverage_rate, dosage)
    }

    /// Price one line into a persistable prescription item.
    pub fn price_line(
        &self,
        patient: &Patient,
        line: &PrescriptionLine,
    ) -> PricingResult<PrescriptionItem> {
        let item = self
            .db
            .get_inventory_item(&line.inventory_item_id)?
            .ok_or_else(|| {
                PricingError::NotFound(format!("inventory item {}", line.inventory_item_id))
            })?;
        let coverage_rate = self.db.coverage_rate_for(patient)?;
        let calc = price_item(&item, patient.patient_type, coverage_rate, &line.dosage)?;

        Ok(PrescriptionItem {
            drug_name: item.name,
            inventory_item_id: line.inventory_item_id.clone(),
            dosage_count: line.dosage.dosage_count,
            frequency_count: line.dosage.frequency_count,
            duration: line.dosage.duration,
            total_tablets: calc.total_tablets,
            packages_needed: calc.packages_needed,
            unit_price: calc.unit_price,
            subtotal: calc.subtotal,
            hmo_contribution: calc.hmo_contribution,
            patient_pays: calc.patient_pays,
        })
    }

    /// Price every line and assemble a pending prescription.
    pub fn build_prescription(
        &self,
        patient_id: &str,
        prescribed_by: &str,
        lines: &[PrescriptionLine],
    ) -> PricingResult<Prescription> {
        let patient = self
            .db
            .get_patient(patient_id)?
            .ok_or_else(|| PricingError::NotFound(format!("patient {}", patient_id)))?;

        let items = lines
            .iter()
            .map(|line| self.price_line(&patient, line))
            .collect::<PricingResult<Vec<_>>>()?;

        Ok(Prescription::new(
            patient.id,
            prescribed_by.to_string(),
            items,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DosageDuration, HmoPolicy, ItemCategory};

    fn make_item(stock: i64, units_per_package: i64, unit_price: f64) -> InventoryItem {
        let mut item = InventoryItem::new("Paracetamol 500mg".into(), ItemCategory::Medication);
        item.stock_quantity = stock;
        item.units_per_package = units_per_package;
        item.unit_price = unit_price;
        item
    }

    fn dosage(count: f64, freq: u32, duration: DosageDuration) -> DosageInstruction {
        DosageInstruction {
            dosage_count: count,
            frequency_count: freq,
            duration,
        }
    }

    #[test]
    fn test_worked_example() {
        // 1 tablet, 3x/day, 7 days, 10 per package, 50 each, self-pay
        let item = make_item(5, 10, 50.0);
        let result = price_item(
            &item,
            PatientType::SelfPay,
            0.0,
            &dosage(1.0, 3, DosageDuration::days(7.0)),
        )
        .unwrap();

        assert_eq!(result.total_tablets, 21);
        assert_eq!(result.packages_needed, 3);
        assert_eq!(result.units_from_packages, 30);
        assert_eq!(result.excess_tablets, 9);
        assert_eq!(result.subtotal, 1050.0);
        assert_eq!(result.hmo_contribution, 0.0);
        assert_eq!(result.patient_pays, 1050.0);
        assert!(result.stock_available);
        assert_eq!(result.shortage, 0);
    }

    #[test]
    fn test_week_duration_normalized() {
        let item = make_item(100, 10, 50.0);
        let result = price_item(
            &item,
            PatientType::SelfPay,
            0.0,
            &dosage(1.0, 2, DosageDuration::weeks(2.0)),
        )
        .unwrap();

        assert_eq!(result.duration_in_days, 14.0);
        assert_eq!(result.total_tablets, 28);
    }

    #[test]
    fn test_hmo_split() {
        let item = make_item(100, 10, 50.0);
        let result = price_item(
            &item,
            PatientType::Hmo,
            0.9,
            &dosage(1.0, 3, DosageDuration::days(7.0)),
        )
        .unwrap();

        assert_eq!(result.subtotal, 1050.0);
        assert!((result.hmo_contribution - 945.0).abs() < 1e-9);
        assert!((result.patient_pays - 105.0).abs() < 1e-9);
        assert!(result.patient_pays >= 0.0);
    }

    #[test]
    fn test_corporate_price_applied() {
        let mut item = make_item(100, 10, 50.0);
        item.corporate_price = Some(40.0);

        let result = price_item(
            &item,
            PatientType::Corporate,
            0.0,
            &dosage(1.0, 1, DosageDuration::days(10.0)),
        )
        .unwrap();
        assert_eq!(result.unit_price, 40.0);
        assert_eq!(result.subtotal, 400.0);
        assert_eq!(result.hmo_contribution, 0.0);

        // Without a negotiated price, corporate falls back to list price
        item.corporate_price = None;
        let result = price_item(
            &item,
            PatientType::Corporate,
            0.0,
            &dosage(1.0, 1, DosageDuration::days(10.0)),
        )
        .unwrap();
        assert_eq!(result.unit_price, 50.0);
    }

    #[test]
    fn test_zero_units_per_package_treated_as_one() {
        let item = make_item(100, 0, 50.0);
        let result = price_item(
            &item,
            PatientType::SelfPay,
            0.0,
            &dosage(1.0, 2, DosageDuration::days(3.0)),
        )
        .unwrap();

        assert_eq!(result.units_per_package, 1);
        assert_eq!(result.packages_needed, result.total_tablets);
        assert_eq!(result.excess_tablets, 0);
    }

    #[test]
    fn test_missing_price_yields_zero_subtotal() {
        let item = make_item(100, 10, 0.0);
        let result = price_item(
            &item,
            PatientType::SelfPay,
            0.0,
            &dosage(1.0, 3, DosageDuration::days(7.0)),
        )
        .unwrap();

        assert_eq!(result.subtotal, 0.0);
        assert_eq!(result.patient_pays, 0.0);
    }

    #[test]
    fn test_shortage_reported() {
        let item = make_item(1, 10, 50.0);
        let result = price_item(
            &item,
            PatientType::SelfPay,
            0.0,
            &dosage(1.0, 3, DosageDuration::days(7.0)),
        )
        .unwrap();

        assert!(!result.stock_available);
        assert_eq!(result.shortage, 2); // needs 3 packages, has 1
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let item = make_item(100, 10, 50.0);

        assert!(matches!(
            price_item(
                &item,
                PatientType::SelfPay,
                0.0,
                &dosage(0.0, 3, DosageDuration::days(7.0))
            ),
            Err(PricingError::Validation(_))
        ));
        assert!(matches!(
            price_item(
                &item,
                PatientType::SelfPay,
                0.0,
                &dosage(1.0, 0, DosageDuration::days(7.0))
            ),
            Err(PricingError::Validation(_))
        ));
        assert!(matches!(
            price_item(
                &item,
                PatientType::SelfPay,
                0.0,
                &dosage(1.0, 3, DosageDuration::days(0.0))
            ),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_idempotent() {
        let item = make_item(5, 10, 50.0);
        let d = dosage(1.5, 2, DosageDuration::days(5.0));

        let a = price_item(&item, PatientType::SelfPay, 0.0, &d).unwrap();
        let b = price_item(&item, PatientType::SelfPay, 0.0, &d).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_calculate_cost_through_store() {
        let db = Database::open_in_memory().unwrap();

        let item = make_item(5, 10, 50.0);
        db.upsert_inventory_item(&item).unwrap();

        let policy = HmoPolicy::new("Acme Health".into(), 0.8);
        db.upsert_hmo_policy(&policy).unwrap();

        let mut patient = Patient::new("Ada".into(), "Okafor".into(), PatientType::Hmo);
        patient.hmo_policy_id = Some(policy.id.clone());
        db.insert_patient(&patient).unwrap();

        let calc = Calculator::new(&db);
        let result = calc
            .calculate_cost(&item.id, &patient.id, &dosage(1.0, 3, DosageDuration::days(7.0)))
            .unwrap();

        assert_eq!(result.subtotal, 1050.0);
        assert!((result.hmo_contribution - 840.0).abs() < 1e-9);
        assert!((result.patient_pays - 210.0).abs() < 1e-9);

        assert!(matches!(
            calc.calculate_cost("missing", &patient.id, &dosage(1.0, 1, DosageDuration::days(1.0))),
            Err(PricingError::NotFound(_))
        ));
    }

    #[test]
    fn test_build_prescription() {
        let db = Database::open_in_memory().unwrap();

        let item = make_item(5, 10, 50.0);
        db.upsert_inventory_item(&item).unwrap();
        let patient = Patient::new("Ada".into(), "Okafor".into(), PatientType::SelfPay);
        db.insert_patient(&patient).unwrap();

        let calc = Calculator::new(&db);
        let rx = calc
            .build_prescription(
                &patient.id,
                "Dr. Bello",
                &[PrescriptionLine {
                    inventory_item_id: item.id.clone(),
                    dosage: dosage(1.0, 3, DosageDuration::days(7.0)),
                }],
            )
            .unwrap();

        assert_eq!(rx.items.len(), 1);
        assert_eq!(rx.items[0].drug_name, "Paracetamol 500mg");
        assert_eq!(rx.items[0].total_tablets, 21);
        assert_eq!(rx.items[0].packages_needed, 3);
        assert_eq!(rx.total_patient_pays(), 1050.0);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::models::{DosageDuration, ItemCategory};
    use proptest::prelude::*;

    fn make_item(stock: i64, units_per_package: i64, unit_price: f64) -> InventoryItem {
        let mut item = InventoryItem::new("Test Drug".into(), ItemCategory::Medication);
        item.stock_quantity = stock;
        item.units_per_package = units_per_package;
        item.unit_price = unit_price;
        item
    }

    proptest! {
        #[test]
        fn prop_tablet_arithmetic_exact(
            count in 1u32..=4,
            freq in 1u32..=4,
            days in 1u32..=30,
            upp in 1i64..=50,
        ) {
            let item = make_item(1_000, upp, 25.0);
            let dosage = DosageInstruction {
                dosage_count: count as f64,
                frequency_count: freq,
                duration: DosageDuration::days(days as f64),
            };
            let result = price_item(&item, PatientType::SelfPay, 0.0, &dosage).unwrap();

            // Integer inputs: no rounding may creep in
            prop_assert_eq!(result.total_tablets, (count * freq * days) as i64);
            // Package ceiling
            let expected_packages = (result.total_tablets + upp - 1) / upp;
            prop_assert_eq!(result.packages_needed, expected_packages);
            prop_assert!(result.excess_tablets >= 0);
            prop_assert!(result.units_from_packages >= result.total_tablets);
        }

        #[test]
        fn prop_hmo_split_conserved(
            tablets in 1u32..=100,
            price in 0.0f64..=500.0,
            rate in 0.0f64..=1.0,
        ) {
            let item = make_item(1_000, 1, price);
            let dosage = DosageInstruction {
                dosage_count: tablets as f64,
                frequency_count: 1,
                duration: DosageDuration::days(1.0),
            };
            let result = price_item(&item, PatientType::Hmo, rate, &dosage).unwrap();

            prop_assert!(result.patient_pays >= 0.0);
            prop_assert!((result.patient_pays + result.hmo_contribution - result.subtotal).abs() < 0.01);
        }
    }
}
