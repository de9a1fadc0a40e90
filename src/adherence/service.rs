//! Journal-backed entry points: fetch a user's intake records from the
//! store, then run the engine over them.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::fetch_intake_records;
use crate::models::Frequency;

use super::engine::DefaultAdherenceEngine;
use super::reference::FrequencyResolver;
use super::types::{
    AdherenceEngine, AdherenceError, AdherencePeriod, AdherenceResult, MultiMedicationAdherence,
};

/// Adherence for all of a user's medications, or only `medication_names`.
/// Requested names without any intake still get a (zero) result.
pub fn compute_user_adherence<R: FrequencyResolver>(
    conn: &Connection,
    engine: &DefaultAdherenceEngine<R>,
    user_id: &str,
    medication_names: Option<&[String]>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<MultiMedicationAdherence, AdherenceError> {
    AdherencePeriod::new(start, end)?;

    let records = fetch_intake_records(conn, user_id, medication_names, start, end)?;
    tracing::debug!(user_id, records = records.len(), "Fetched intake records");

    match medication_names {
        Some(names) => engine.calculate_for_medications(&records, names, start, end),
        None => engine.calculate_multi_medication_adherence(&records, start, end),
    }
}

/// Adherence of one medication with an explicitly declared frequency.
pub fn compute_medication_adherence(
    conn: &Connection,
    engine: &impl AdherenceEngine,
    user_id: &str,
    medication_name: &str,
    frequency: Frequency,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<AdherenceResult, AdherenceError> {
    AdherencePeriod::new(start, end)?;

    let names = [medication_name.to_string()];
    let records = fetch_intake_records(conn, user_id, Some(&names[..]), start, end)?;

    let mut result = engine.calculate_adherence(&records, frequency, start, end)?;
    result.medication_name = Some(medication_name.to_string());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_intake_record, open_memory_database};
    use crate::models::{AdherenceTrend, IntakeRecord};
    use chrono::{Duration, NaiveDate};

    fn day(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(offset)
    }

    fn seed(conn: &Connection, user: &str, name: &str, offsets: impl IntoIterator<Item = i64>) {
        for d in offsets {
            let record = IntakeRecord::new(user, name, day(d) + Duration::hours(8));
            insert_intake_record(conn, &record).expect("seed intake");
        }
    }

    #[test]
    fn user_adherence_over_journal() {
        let conn = open_memory_database().unwrap();
        seed(&conn, "user-1", "Mesalamine", 0..31);
        seed(&conn, "user-1", "Humira", [0, 14, 28]);
        seed(&conn, "user-2", "Mesalamine", 0..5);
        // outside the window, never fetched
        seed(&conn, "user-1", "Mesalamine", [60, 61]);

        let engine: DefaultAdherenceEngine = DefaultAdherenceEngine::default();
        let result =
            compute_user_adherence(&conn, &engine, "user-1", None, day(0), day(30) + Duration::hours(23))
                .unwrap();

        assert_eq!(result.medications.len(), 2);
        assert_eq!(result.medications["Mesalamine"].actual_doses, 31);
        assert_eq!(result.medications["Mesalamine"].percentage, 100.0);
        assert_eq!(result.medications["Humira"].expected_doses, 2);
        assert_eq!(result.medications["Humira"].percentage, 100.0);
        assert_eq!(result.overall_percentage, 100.0);
    }

    #[test]
    fn requested_names_without_intake_are_included() {
        let conn = open_memory_database().unwrap();
        seed(&conn, "user-1", "Mesalamine", 0..10);

        let engine: DefaultAdherenceEngine = DefaultAdherenceEngine::default();
        let names = vec!["Mesalamine".to_string(), "Azathioprine".to_string()];
        let result = compute_user_adherence(
            &conn,
            &engine,
            "user-1",
            Some(&names[..]),
            day(0),
            day(9) + Duration::hours(23),
        )
        .unwrap();

        assert_eq!(result.medications["Azathioprine"].actual_doses, 0);
        assert_eq!(result.medications["Azathioprine"].trend, AdherenceTrend::InsufficientData);
        assert!((result.overall_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn single_medication_with_declared_frequency() {
        let conn = open_memory_database().unwrap();
        seed(&conn, "user-1", "Methotrexate", [0, 7, 21]);
        seed(&conn, "user-1", "Mesalamine", 0..28);

        let engine: DefaultAdherenceEngine = DefaultAdherenceEngine::default();
        let result = compute_medication_adherence(
            &conn,
            &engine,
            "user-1",
            "Methotrexate",
            Frequency::Weekly,
            day(0),
            day(27) + Duration::hours(23),
        )
        .unwrap();

        assert_eq!(result.medication_name.as_deref(), Some("Methotrexate"));
        assert_eq!(result.expected_doses, 4);
        assert_eq!(result.actual_doses, 3);
        assert!((result.percentage - 75.0).abs() < 1e-9);
        assert_eq!(result.quality_metrics.gap_analysis.total_gaps, 1);
    }

    #[test]
    fn sub_second_window_accepts_journal_records() {
        let conn = open_memory_database().unwrap();
        let eight = day(0) + Duration::hours(8);
        let record =
            IntakeRecord::new("user-1", "Mesalamine", eight + Duration::milliseconds(700));
        insert_intake_record(&conn, &record).unwrap();

        let engine: DefaultAdherenceEngine = DefaultAdherenceEngine::default();
        let result = compute_user_adherence(
            &conn,
            &engine,
            "user-1",
            None,
            eight + Duration::milliseconds(300),
            day(0) + Duration::hours(23),
        )
        .unwrap();
        assert_eq!(result.medications["Mesalamine"].actual_doses, 1);
    }

    #[test]
    fn reversed_period_fails_before_querying() {
        let conn = open_memory_database().unwrap();
        let engine: DefaultAdherenceEngine = DefaultAdherenceEngine::default();
        let err = compute_user_adherence(&conn, &engine, "user-1", None, day(5), day(0)).unwrap_err();
        assert!(matches!(err, AdherenceError::InvalidPeriod { .. }));
    }
}
