//! Trajectory of monthly adherence: recent window vs. the window before it.

use crate::config::AdherenceThresholds;
use crate::models::AdherenceTrend;

use super::types::MonthlyAdherenceData;

fn mean_percentage(months: &[MonthlyAdherenceData]) -> f64 {
    months.iter().map(|m| m.adherence_percentage).sum::<f64>() / months.len() as f64
}

/// Classifies chronologically sorted monthly buckets.
///
/// Recent = the last `trend_window` buckets, older = up to `trend_window`
/// buckets immediately before those. A mean difference beyond
/// `±trend_band` points is a trend, anything inside is stable.
pub fn analyze_trend(
    months: &[MonthlyAdherenceData],
    thresholds: &AdherenceThresholds,
) -> AdherenceTrend {
    if months.len() < 2 {
        return AdherenceTrend::InsufficientData;
    }

    let window = thresholds.trend_window.max(1);
    let split = months.len().saturating_sub(window);
    let recent = &months[split..];
    let older = &months[split.saturating_sub(window)..split];

    if recent.is_empty() || older.is_empty() {
        return AdherenceTrend::InsufficientData;
    }

    let change = mean_percentage(recent) - mean_percentage(older);

    if change > thresholds.trend_band {
        AdherenceTrend::Improving
    } else if change < -thresholds.trend_band {
        AdherenceTrend::Declining
    } else {
        AdherenceTrend::Stable
    }
}
