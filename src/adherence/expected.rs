//! Expected dose counts and the capped adherence percentage.

use crate::models::{Frequency, IntakeRecord};

use super::types::AdherencePeriod;

/// Number of doses a fully adherent patient takes over `period`.
///
/// Interval schedules (weekly and longer) never drop below one dose,
/// as-needed medications always expect zero.
pub fn expected_doses(frequency: Frequency, period: &AdherencePeriod) -> u32 {
    let days = u32::try_from(period.inclusive_days()).unwrap_or(u32::MAX);

    match frequency {
        Frequency::Daily => days,
        Frequency::TwiceDaily => days.saturating_mul(2),
        Frequency::AsNeeded => 0,
        Frequency::Weekly | Frequency::BiWeekly | Frequency::Monthly | Frequency::Custom(_) => {
            let interval = frequency.interval_days().unwrap_or(1).max(1);
            (days / interval).max(1)
        }
    }
}

/// Records taken within the inclusive period.
pub fn actual_doses(records: &[IntakeRecord], period: &AdherencePeriod) -> u32 {
    let count = records
        .iter()
        .filter(|r| period.contains(r.date_taken))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// `actual / expected * 100`, capped at 100. Zero when nothing is expected.
pub fn adherence_percentage(expected: u32, actual: u32) -> f64 {
    if expected == 0 {
        return 0.0;
    }
    (f64::from(actual) / f64::from(expected) * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn day(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(offset)
    }

    fn period(days: i64) -> AdherencePeriod {
        AdherencePeriod::new(day(0), day(days - 1)).unwrap()
    }

    fn daily_records(count: i64) -> Vec<IntakeRecord> {
        (0..count)
            .map(|i| IntakeRecord::new("user-1", "Mesalamine", day(i) + Duration::hours(8)))
            .collect()
    }

    // ───────────────────────────────────────
    // expected_doses
    // ───────────────────────────────────────

    #[test]
    fn daily_counts_every_day_inclusive() {
        assert_eq!(expected_doses(Frequency::Daily, &period(31)), 31);
    }

    #[test]
    fn twice_daily_doubles() {
        assert_eq!(expected_doses(Frequency::TwiceDaily, &period(30)), 60);
    }

    #[test]
    fn interval_frequencies_truncate() {
        assert_eq!(expected_doses(Frequency::Weekly, &period(31)), 4);
        assert_eq!(expected_doses(Frequency::BiWeekly, &period(31)), 2);
        assert_eq!(expected_doses(Frequency::Monthly, &period(90)), 3);
        assert_eq!(expected_doses(Frequency::Custom(56), &period(180)), 3);
    }

    #[test]
    fn interval_frequencies_floor_at_one() {
        for freq in [
            Frequency::Weekly,
            Frequency::BiWeekly,
            Frequency::Monthly,
            Frequency::Custom(90),
        ] {
            assert_eq!(expected_doses(freq, &period(1)), 1, "{freq}");
        }
    }

    #[test]
    fn expected_never_below_one_except_as_needed() {
        for days in [1, 2, 6, 13, 29, 31, 365] {
            for freq in [
                Frequency::Daily,
                Frequency::TwiceDaily,
                Frequency::Weekly,
                Frequency::BiWeekly,
                Frequency::Monthly,
                Frequency::Custom(3),
            ] {
                assert!(expected_doses(freq, &period(days)) >= 1);
            }
            assert_eq!(expected_doses(Frequency::AsNeeded, &period(days)), 0);
        }
    }

    // ───────────────────────────────────────
    // actual_doses + percentage
    // ───────────────────────────────────────

    #[test]
    fn actual_ignores_records_outside_period() {
        let mut records = daily_records(31);
        records.push(IntakeRecord::new("user-1", "Mesalamine", day(45)));
        let p = AdherencePeriod::new(day(0), day(30) + Duration::hours(23)).unwrap();
        assert_eq!(actual_doses(&records, &p), 31);
    }

    #[test]
    fn dose_after_period_end_on_last_day_is_not_counted() {
        // period(31) ends at midnight of day 30; that day's dose is at 08:00
        assert_eq!(actual_doses(&daily_records(31), &period(31)), 30);
    }

    #[test]
    fn full_month_daily_is_one_hundred() {
        let p = AdherencePeriod::new(day(0), day(30) + Duration::hours(23)).unwrap();
        let expected = expected_doses(Frequency::Daily, &p);
        let actual = actual_doses(&daily_records(31), &p);
        assert_eq!(expected, 31);
        assert_eq!(actual, 31);
        assert_eq!(adherence_percentage(expected, actual), 100.0);
    }

    #[test]
    fn partial_adherence_ratio() {
        let pct = adherence_percentage(31, 28);
        assert!((pct - 90.3226).abs() < 0.001, "got {pct}");
    }

    #[test]
    fn over_taking_is_capped() {
        assert_eq!(adherence_percentage(31, 40), 100.0);
    }

    #[test]
    fn nothing_expected_is_zero_not_nan() {
        let pct = adherence_percentage(0, 12);
        assert_eq!(pct, 0.0);
        assert!(!pct.is_nan());
    }
}
