//! Patient and HMO policy database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{HmoPolicy, Patient, PatientType};

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let allergies_json = serde_json::to_string(&patient.allergies)?;
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, first_name, last_name, patient_type, hmo_policy_id,
                allergies, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.patient_type.as_str(),
                patient.hmo_policy_id,
                allergies_json,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let allergies_json = serde_json::to_string(&patient.allergies)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                first_name = ?2,
                last_name = ?3,
                patient_type = ?4,
                hmo_policy_id = ?5,
                allergies = ?6,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.patient_type.as_str(),
                patient.hmo_policy_id,
                allergies_json,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, first_name, last_name, patient_type, hmo_policy_id,
                       allergies, created_at, updated_at
                FROM patients
                WHERE id = ?
                "#,
                [id],
                map_patient_row,
            )
            .optional()?;
        row.map(patient_from_row).transpose()
    }

    /// Replace a patient's allergy list.
    pub fn update_allergies(&self, id: &str, allergies: &[String]) -> DbResult<bool> {
        let allergies_json = serde_json::to_string(allergies)?;
        let rows_affected = self.conn.execute(
            "UPDATE patients SET allergies = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![allergies_json, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Insert or update an HMO policy.
    pub fn upsert_hmo_policy(&self, policy: &HmoPolicy) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO hmo_policies (id, name, coverage_rate, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                coverage_rate = excluded.coverage_rate
            "#,
            params![
                policy.id,
                policy.name,
                policy.coverage_rate,
                policy.created_at
            ],
        )?;
        Ok(())
    }

    /// Get an HMO policy by ID.
    pub fn get_hmo_policy(&self, id: &str) -> DbResult<Option<HmoPolicy>> {
        self.conn
            .query_row(
                "SELECT id, name, coverage_rate, created_at FROM hmo_policies WHERE id = ?",
                [id],
                |row| {
                    Ok(HmoPolicy {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        coverage_rate: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Coverage rate applying to a patient's drug costs.
    ///
    /// Only HMO patients with a resolvable policy get a non-zero rate;
    /// a dangling or missing policy link degrades to 0 rather than erroring.
    pub fn coverage_rate_for(&self, patient: &Patient) -> DbResult<f64> {
        if patient.patient_type != PatientType::Hmo {
            return Ok(0.0);
        }
        let Some(policy_id) = patient.hmo_policy_id.as_deref() else {
            return Ok(0.0);
        };
        Ok(self
            .get_hmo_policy(policy_id)?
            .map(|p| p.coverage_rate)
            .unwrap_or(0.0))
    }
}

struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    patient_type: String,
    hmo_policy_id: Option<String>,
    allergies: String,
    created_at: String,
    updated_at: String,
}

fn map_patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        patient_type: row.get(3)?,
        hmo_policy_id: row.get(4)?,
        allergies: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn patient_from_row(row: PatientRow) -> DbResult<Patient> {
    let patient_type = PatientType::parse(&row.patient_type)
        .ok_or_else(|| DbError::Constraint(format!("unknown patient type: {}", row.patient_type)))?;
    let allergies: Vec<String> = serde_json::from_str(&row.allergies)?;
    Ok(Patient {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        patient_type,
        hmo_policy_id: row.hmo_policy_id,
        allergies,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
