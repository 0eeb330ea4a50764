//! Visit flow database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use super::{Database, DbResult};
use crate::models::VisitFlowRecord;

impl Database {
    /// Insert or update a visit flow record.
    pub fn upsert_visit_record(&self, record: &VisitFlowRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO visit_flow (
                visit_id, checked_in_at, vitals_completed_at,
                doctor_started_at, doctor_completed_at,
                lab_started_at, lab_completed_at,
                pharmacy_started_at, pharmacy_completed_at, checked_out_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(visit_id) DO UPDATE SET
                checked_in_at = excluded.checked_in_at,
                vitals_completed_at = excluded.vitals_completed_at,
                doctor_started_at = excluded.doctor_started_at,
                doctor_completed_at = excluded.doctor_completed_at,
                lab_started_at = excluded.lab_started_at,
                lab_completed_at = excluded.lab_completed_at,
                pharmacy_started_at = excluded.pharmacy_started_at,
                pharmacy_completed_at = excluded.pharmacy_completed_at,
                checked_out_at = excluded.checked_out_at
            "#,
            params![
                record.visit_id,
                record.checked_in_at.to_rfc3339(),
                record.vitals_completed_at.map(|t| t.to_rfc3339()),
                record.doctor_started_at.map(|t| t.to_rfc3339()),
                record.doctor_completed_at.map(|t| t.to_rfc3339()),
                record.lab_started_at.map(|t| t.to_rfc3339()),
                record.lab_completed_at.map(|t| t.to_rfc3339()),
                record.pharmacy_started_at.map(|t| t.to_rfc3339()),
                record.pharmacy_completed_at.map(|t| t.to_rfc3339()),
                record.checked_out_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// List visit records checked in within [from, to], oldest first.
    pub fn list_visit_records(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<VisitFlowRecord>> {
        let from_s = from.map(|t| t.to_rfc3339()).unwrap_or_default();
        // RFC3339 sorts lexicographically, so an empty lower bound and a
        // high sentinel upper bound cover the unbounded cases.
        let to_s = to
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "9999".to_string());

        let mut stmt = self.conn.prepare(
            r#"
            SELECT visit_id, checked_in_at, vitals_completed_at,
                   doctor_started_at, doctor_completed_at,
                   lab_started_at, lab_completed_at,
                   pharmacy_started_at, pharmacy_completed_at, checked_out_at
            FROM visit_flow
            WHERE checked_in_at >= ?1 AND checked_in_at <= ?2
            ORDER BY checked_in_at
            "#,
        )?;

        let rows = stmt.query_map(params![from_s, to_s], map_visit_row)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(super::DbError::from)?
            .into_iter()
            .map(visit_from_row)
            .collect()
    }
}

struct VisitRow {
    visit_id: String,
    checked_in_at: String,
    stamps: [Option<String>; 8],
}

fn map_visit_row(row: &Row<'_>) -> rusqlite::Result<VisitRow> {
    Ok(VisitRow {
        visit_id: row.get(0)?,
        checked_in_at: row.get(1)?,
        stamps: [
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
        ],
    })
}

fn parse_stamp(s: &str) -> DbResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn parse_opt_stamp(s: Option<&String>) -> DbResult<Option<DateTime<Utc>>> {
    s.map(|v| parse_stamp(v)).transpose()
}

fn visit_from_row(row: VisitRow) -> DbResult<VisitFlowRecord> {
    Ok(VisitFlowRecord {
        visit_id: row.visit_id,
        checked_in_at: parse_stamp(&row.checked_in_at)?,
        vitals_completed_at: parse_opt_stamp(row.stamps[0].as_ref())?,
        doctor_started_at: parse_opt_stamp(row.stamps[1].as_ref())?,
        doctor_completed_at: parse_opt_stamp(row.stamps[2].as_ref())?,
        lab_started_at: parse_opt_stamp(row.stamps[3].as_ref())?,
        lab_completed_at: parse_opt_stamp(row.stamps[4].as_ref())?,
        pharmacy_started_at: parse_opt_stamp(row.stamps[5].as_ref())?,
        pharmacy_completed_at: parse_opt_stamp(row.stamps[6].as_ref())?,
        checked_out_at: parse_opt_stamp(row.stamps[7].as_ref())?,
    })
}
