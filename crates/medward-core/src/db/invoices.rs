//! Invoice database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{Invoice, InvoiceLineItem};

impl Database {
    /// Get an invoice by ID.
    pub fn get_invoice(&self, id: &str) -> DbResult<Option<Invoice>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM invoices WHERE id = ?", INVOICE_COLUMNS),
                [id],
                map_invoice_row,
            )
            .optional()?;
        row.map(invoice_from_row).transpose()
    }

    /// Get the invoice raised for a prescription, if dispensed.
    pub fn get_invoice_for_prescription(&self, prescription_id: &str) -> DbResult<Option<Invoice>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM invoices WHERE prescription_id = ?",
                    INVOICE_COLUMNS
                ),
                [prescription_id],
                map_invoice_row,
            )
            .optional()?;
        row.map(invoice_from_row).transpose()
    }

    /// List a patient's invoices, newest first.
    pub fn list_invoices_for_patient(&self, patient_id: &str) -> DbResult<Vec<Invoice>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM invoices WHERE patient_id = ? ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))?;
        let rows = stmt.query_map([patient_id], map_invoice_row)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(super::DbError::from)?
            .into_iter()
            .map(invoice_from_row)
            .collect()
    }
}

const INVOICE_COLUMNS: &str = "id, prescription_id, patient_id, line_items, total, created_at";

/// Insert an invoice through any connection, including an open transaction.
pub(crate) fn insert_invoice_conn(conn: &Connection, invoice: &Invoice) -> DbResult<()> {
    let line_items_json = serde_json::to_string(&invoice.line_items)?;
    conn.execute(
        r#"
        INSERT INTO invoices (id, prescription_id, patient_id, line_items, total, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            invoice.id,
            invoice.prescription_id,
            invoice.patient_id,
            line_items_json,
            invoice.total,
            invoice.created_at,
        ],
    )?;
    Ok(())
}

struct InvoiceRow {
    id: String,
    prescription_id: String,
    patient_id: String,
    line_items: String,
    total: f64,
    created_at: String,
}

fn map_invoice_row(row: &Row<'_>) -> rusqlite::Result<InvoiceRow> {
    Ok(InvoiceRow {
        id: row.get(0)?,
        prescription_id: row.get(1)?,
        patient_id: row.get(2)?,
        line_items: row.get(3)?,
        total: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn invoice_from_row(row: InvoiceRow) -> DbResult<Invoice> {
    let line_items: Vec<InvoiceLineItem> = serde_json::from_str(&row.line_items)?;
    Ok(Invoice {
        id: row.id,
        prescription_id: row.prescription_id,
        patient_id: row.patient_id,
        line_items,
        total: row.total,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, PatientType, Prescription};

    fn setup() -> (Database, Prescription) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ada".into(), "Okafor".into(), PatientType::SelfPay);
        db.insert_patient(&patient).unwrap();
        let rx = Prescription::new(patient.id.clone(), "Dr. Bello".into(), vec![]);
        db.insert_prescription(&rx).unwrap();
        (db, rx)
    }

    #[test]
    fn test_insert_and_get() {
        let (db, rx) = setup();

        let invoice = Invoice::from_prescription(&rx);
        insert_invoice_conn(db.conn(), &invoice).unwrap();

        let retrieved = db.get_invoice(&invoice.id).unwrap().unwrap();
        assert_eq!(retrieved.prescription_id, rx.id);
        assert_eq!(retrieved.total, 0.0);

        let by_rx = db.get_invoice_for_prescription(&rx.id).unwrap().unwrap();
        assert_eq!(by_rx.id, invoice.id);

        let listed = db.list_invoices_for_patient(&rx.patient_id).unwrap();
        assert_eq!(listed.len(), 1);
    }
}
