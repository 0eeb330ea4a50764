//! Invoice models.

use serde::{Deserialize, Serialize};

use super::prescription::Prescription;

/// One billed line on an invoice, mirroring a prescription item's split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceLineItem {
    pub description: String,
    pub inventory_item_id: String,
    /// Packages dispensed for this line
    pub quantity_packages: i64,
    pub subtotal: f64,
    pub hmo_contribution: f64,
    pub patient_pays: f64,
}

/// An invoice raised by a dispense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    /// Unique invoice ID
    pub id: String,
    /// Prescription this invoice bills for (one invoice per prescription)
    pub prescription_id: String,
    pub patient_id: String,
    pub line_items: Vec<InvoiceLineItem>,
    /// Sum of patient_pays across line items
    pub total: f64,
    pub created_at: String,
}

impl Invoice {
    /// Build an invoice from a priced prescription.
    pub fn from_prescription(prescription: &Prescription) -> Self {
        let line_items: Vec<InvoiceLineItem> = prescription
            .items
            .iter()
            .map(|item| InvoiceLineItem {
                description: item.drug_name.clone(),
                inventory_item_id: item.inventory_item_id.clone(),
                quantity_packages: item.packages_needed,
                subtotal: item.subtotal,
                hmo_contribution: item.hmo_contribution,
                patient_pays: item.patient_pays,
            })
            .collect();

        let total = line_items.iter().map(|l| l.patient_pays).sum();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prescription_id: prescription.id.clone(),
            patient_id: prescription.patient_id.clone(),
            line_items,
            total,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DosageDuration, PrescriptionItem};

    fn make_item(name: &str, subtotal: f64, hmo: f64) -> PrescriptionItem {
        PrescriptionItem {
            drug_name: name.into(),
            inventory_item_id: format!("item-{}", name),
            dosage_count: 1.0,
            frequency_count: 2,
            duration: DosageDuration::days(5.0),
            total_tablets: 10,
            packages_needed: 1,
            unit_price: subtotal / 10.0,
            subtotal,
            hmo_contribution: hmo,
            patient_pays: subtotal - hmo,
        }
    }

    #[test]
    fn test_invoice_total_is_sum_of_patient_pays() {
        let rx = Prescription::new(
            "patient-1".into(),
            "Dr. Bello".into(),
            vec![
                make_item("Paracetamol", 500.0, 450.0),
                make_item("Amoxicillin", 1200.0, 1080.0),
            ],
        );

        let invoice = Invoice::from_prescription(&rx);
        assert_eq!(invoice.prescription_id, rx.id);
        assert_eq!(invoice.line_items.len(), 2);
        assert!((invoice.total - 170.0).abs() < 1e-9);
        assert_eq!(invoice.total, rx.total_patient_pays());
    }
}
