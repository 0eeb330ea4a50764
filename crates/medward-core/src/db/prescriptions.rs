//! Prescription database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Prescription, PrescriptionItem, PrescriptionStatus};

impl Database {
    /// Insert a new prescription.
    pub fn insert_prescription(&self, prescription: &Prescription) -> DbResult<()> {
        let items_json = serde_json::to_string(&prescription.items)?;
        self.conn.execute(
            r#"
            INSERT INTO prescriptions (
                id, patient_id, prescribed_by, items, status,
                dispensed_at, dispensed_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                prescription.id,
                prescription.patient_id,
                prescription.prescribed_by,
                items_json,
                prescription.status.as_str(),
                prescription.dispensed_at,
                prescription.dispensed_by,
                prescription.created_at,
                prescription.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a prescription by ID.
    pub fn get_prescription(&self, id: &str) -> DbResult<Option<Prescription>> {
        get_prescription_conn(&self.conn, id)
    }

    /// List a patient's prescriptions, newest first.
    pub fn list_prescriptions_for_patient(&self, patient_id: &str) -> DbResult<Vec<Prescription>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM prescriptions WHERE patient_id = ? ORDER BY created_at DESC",
            PRESCRIPTION_COLUMNS
        ))?;
        let rows = stmt.query_map([patient_id], map_prescription_row)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DbError::from)?
            .into_iter()
            .map(prescription_from_row)
            .collect()
    }

    /// Cancel a pending prescription. Returns false if it was not pending.
    pub fn cancel_prescription(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE prescriptions
            SET status = 'cancelled', updated_at = datetime('now')
            WHERE id = ? AND status = 'pending'
            "#,
            [id],
        )?;
        Ok(rows_affected > 0)
    }
}

const PRESCRIPTION_COLUMNS: &str = "id, patient_id, prescribed_by, items, status, \
     dispensed_at, dispensed_by, created_at, updated_at";

/// Fetch a prescription through any connection, including an open transaction.
pub(crate) fn get_prescription_conn(conn: &Connection, id: &str) -> DbResult<Option<Prescription>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM prescriptions WHERE id = ?", PRESCRIPTION_COLUMNS),
            [id],
            map_prescription_row,
        )
        .optional()?;
    row.map(prescription_from_row).transpose()
}

/// Flip a pending prescription to dispensed, stamping time and operator.
pub(crate) fn mark_dispensed(conn: &Connection, id: &str, dispensed_by: &str) -> DbResult<()> {
    let rows = conn.execute(
        r#"
        UPDATE prescriptions
        SET status = 'dispensed',
            dispensed_at = ?1,
            dispensed_by = ?2,
            updated_at = datetime('now')
        WHERE id = ?3 AND status = 'pending'
        "#,
        params![chrono::Utc::now().to_rfc3339(), dispensed_by, id],
    )?;
    if rows == 0 {
        return Err(DbError::Constraint(format!(
            "prescription {} is not pending",
            id
        )));
    }
    Ok(())
}

struct PrescriptionRow {
    id: String,
    patient_id: String,
    prescribed_by: String,
    items: String,
    status: String,
    dispensed_at: Option<String>,
    dispensed_by: Option<String>,
    created_at: String,
    updated_at: String,
}

fn map_prescription_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionRow> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        prescribed_by: row.get(2)?,
        items: row.get(3)?,
        status: row.get(4)?,
        dispensed_at: row.get(5)?,
        dispensed_by: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> DbResult<Prescription> {
    let status = PrescriptionStatus::parse(&row.status)
        .ok_or_else(|| DbError::Constraint(format!("unknown prescription status: {}", row.status)))?;
    let items: Vec<PrescriptionItem> = serde_json::from_str(&row.items)?;
    Ok(Prescription {
        id: row.id,
        patient_id: row.patient_id,
        prescribed_by: row.prescribed_by,
        items,
        status,
        dispensed_at: row.dispensed_at,
        dispensed_by: row.dispensed_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
