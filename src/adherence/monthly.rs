//! Calendar-month breakdown of intake records.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::models::{Frequency, IntakeRecord};

use super::expected::{adherence_percentage, expected_doses};
use super::types::{AdherencePeriod, MonthlyAdherenceData};

/// First day of the month containing `instant`.
fn month_start(instant: NaiveDateTime) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(instant.year(), instant.month(), 1)
}

fn next_month_start(first: NaiveDate) -> Option<NaiveDate> {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
}

/// Full calendar month starting at `first`: midnight of day one to the
/// last second of its final day.
pub fn month_period(first: NaiveDate) -> Option<AdherencePeriod> {
    let start = first.and_hms_opt(0, 0, 0)?;
    let end = next_month_start(first)?.and_hms_opt(0, 0, 0)? - Duration::seconds(1);
    AdherencePeriod::new(start, end).ok()
}

/// The part of the calendar month starting at `first` that lies inside
/// `outer`. `None` when they do not overlap.
pub fn clipped_month_period(first: NaiveDate, outer: &AdherencePeriod) -> Option<AdherencePeriod> {
    let month = month_period(first)?;
    AdherencePeriod::new(month.start.max(outer.start), month.end.min(outer.end)).ok()
}

/// Buckets records by calendar month, ascending. Months without any
/// record are not emitted. Expected doses cover only the part of each
/// month inside `outer`, so partial edge months are not penalised.
pub fn monthly_breakdown(
    records: &[IntakeRecord],
    frequency: Frequency,
    outer: &AdherencePeriod,
) -> Vec<MonthlyAdherenceData> {
    let mut buckets: BTreeMap<NaiveDate, Vec<IntakeRecord>> = BTreeMap::new();
    for record in records {
        if let Some(first) = month_start(record.date_taken) {
            buckets.entry(first).or_default().push(record.clone());
        }
    }

    buckets
        .into_iter()
        .filter_map(|(first, mut month_records)| {
            let period = clipped_month_period(first, outer)?;
            month_records.sort_by_key(|r| r.date_taken);

            let expected = expected_doses(frequency, &period);
            let actual = u32::try_from(month_records.len()).unwrap_or(u32::MAX);

            Some(MonthlyAdherenceData {
                month: first.and_hms_opt(0, 0, 0)?,
                expected_doses: expected,
                actual_doses: actual,
                adherence_percentage: adherence_percentage(expected, actual),
                records: month_records,
            })
        })
        .collect()
}
