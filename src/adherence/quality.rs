//! Timing quality of an intake sequence: spacing regularity, significant
//! gaps and streaks of on-schedule doses.
//!
//! Everything here works on the consecutive deltas between doses of one
//! medication, sorted by `date_taken`, measured in seconds and reported
//! in days.

use crate::config::AdherenceThresholds;
use crate::models::{Frequency, IntakeRecord};

use super::types::{AdherenceQualityMetrics, GapAnalysis, StreakAnalysis};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Seconds between each dose and the next, in chronological order.
pub fn inter_dose_deltas(records: &[IntakeRecord]) -> Vec<f64> {
    let mut taken: Vec<_> = records.iter().map(|r| r.date_taken).collect();
    taken.sort();
    taken
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds() as f64 / 1000.0)
        .collect()
}

/// 0–100: `100 − stdDev / expected × 100`, clamped.
pub fn timing_consistency(deltas: &[f64], expected_secs: f64) -> f64 {
    if deltas.is_empty() || expected_secs <= 0.0 {
        return 0.0;
    }
    let score = 100.0 - (std_dev(deltas) / expected_secs) * 100.0;
    score.clamp(0.0, 100.0)
}

/// Counts and sizes the gaps longer than `significant_gap_multiplier` × expected.
pub fn analyze_gaps(
    deltas: &[f64],
    expected_secs: f64,
    thresholds: &AdherenceThresholds,
) -> GapAnalysis {
    let limit = expected_secs * thresholds.significant_gap_multiplier;
    let significant: Vec<f64> = deltas
        .iter()
        .copied()
        .filter(|&delta| delta > limit)
        .collect();

    if significant.is_empty() {
        return GapAnalysis::default();
    }

    GapAnalysis {
        total_gaps: u32::try_from(significant.len()).unwrap_or(u32::MAX),
        average_gap_days: mean(&significant) / SECONDS_PER_DAY,
        longest_gap_days: significant.iter().copied().fold(0.0, f64::max) / SECONDS_PER_DAY,
    }
}

/// Streaks count doses. The first dose opens a streak, each following dose
/// within `streak_gap_multiplier` × expected extends it, a longer gap closes
/// it and the next dose opens a new one.
///
/// The average covers closed streaks only; with none closed it is the open one.
pub fn analyze_streaks(
    deltas: &[f64],
    expected_secs: f64,
    thresholds: &AdherenceThresholds,
) -> StreakAnalysis {
    if deltas.is_empty() {
        return StreakAnalysis::default();
    }

    let limit = expected_secs * thresholds.streak_gap_multiplier;
    let mut closed: Vec<u32> = Vec::new();
    let mut current: u32 = 1;
    let mut longest: u32 = 0;

    for &delta in deltas {
        if delta <= limit {
            current += 1;
        } else {
            closed.push(current);
            longest = longest.max(current);
            current = 1;
        }
    }
    longest = longest.max(current);

    let average_streak = if closed.is_empty() {
        f64::from(current)
    } else {
        closed.iter().map(|&s| f64::from(s)).sum::<f64>() / closed.len() as f64
    };

    StreakAnalysis {
        current_streak: current,
        longest_streak: longest,
        average_streak,
    }
}

/// Full quality metrics for one medication's records.
///
/// Fewer than two records yields all zeros. Without a canonical interval
/// (as-needed) only the plain average gap is computed.
pub fn quality_metrics(
    records: &[IntakeRecord],
    frequency: Frequency,
    thresholds: &AdherenceThresholds,
) -> AdherenceQualityMetrics {
    let deltas = inter_dose_deltas(records);
    if deltas.is_empty() {
        return AdherenceQualityMetrics::default();
    }

    let average_gap_days = mean(&deltas) / SECONDS_PER_DAY;

    let Some(interval) = frequency.expected_interval() else {
        return AdherenceQualityMetrics {
            average_gap_days,
            ..AdherenceQualityMetrics::default()
        };
    };
    let expected_secs = interval.num_seconds() as f64;

    let streak_analysis = analyze_streaks(&deltas, expected_secs, thresholds);

    AdherenceQualityMetrics {
        timing_consistency: timing_consistency(&deltas, expected_secs),
        gap_analysis: analyze_gaps(&deltas, expected_secs, thresholds),
        average_gap_days,
        longest_streak: streak_analysis.longest_streak,
        current_streak: streak_analysis.current_streak,
        streak_analysis,
    }
}
