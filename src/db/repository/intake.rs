use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::IntakeRecord;

/// Storage format of `intake_records.date_taken`: always nine fractional
/// digits, so text order matches time order and nothing is truncated.
pub const DATE_TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Accepts any (or no) fractional part when reading back.
const DATE_TAKEN_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn format_timestamp(instant: NaiveDateTime) -> String {
    instant.format(DATE_TAKEN_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, DATE_TAKEN_PARSE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid date_taken '{raw}': {e}")))
}

pub fn insert_intake_record(conn: &Connection, record: &IntakeRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO intake_records (id, user_id, medication_name, date_taken, dosage, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id,
            record.user_id,
            record.medication_name,
            format_timestamp(record.date_taken),
            record.dosage,
            record.notes,
        ],
    )?;
    Ok(())
}

/// Hard-deletes an intake record.
pub fn delete_intake_record(conn: &Connection, record_id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM intake_records WHERE id = ?1",
        params![record_id],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "IntakeRecord".into(),
            id: record_id.into(),
        });
    }
    Ok(())
}

/// Fetches a user's intake records taken within `[start, end]` (inclusive),
/// optionally restricted to the given medication names.
/// Sorted by date_taken ascending.
pub fn fetch_intake_records(
    conn: &Connection,
    user_id: &str,
    medication_names: Option<&[String]>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<IntakeRecord>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, user_id, medication_name, date_taken, dosage, notes
         FROM intake_records
         WHERE user_id = ?1 AND date_taken >= ?2 AND date_taken <= ?3",
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
        Box::new(user_id.to_string()),
        Box::new(format_timestamp(start)),
        Box::new(format_timestamp(end)),
    ];

    if let Some(names) = medication_names {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (0..names.len())
            .map(|i| format!("?{}", params_vec.len() + i + 1))
            .collect();
        sql.push_str(&format!(
            " AND medication_name IN ({})",
            placeholders.join(", ")
        ));
        for name in names {
            params_vec.push(Box::new(name.clone()));
        }
    }

    sql.push_str(" ORDER BY date_taken ASC, id ASC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, user_id, medication_name, date_taken, dosage, notes) = row?;
        records.push(IntakeRecord {
            id,
            user_id,
            medication_name,
            date_taken: parse_timestamp(&date_taken)?,
            dosage,
            notes,
        });
    }
    Ok(records)
}
