use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::config::AdherenceThresholds;
use crate::models::{AdherenceTrend, Frequency, IntakeRecord, ResolutionSource};

use super::expected::{actual_doses, adherence_percentage, expected_doses};
use super::monthly::monthly_breakdown;
use super::quality::quality_metrics;
use super::reference::{FrequencyResolver, FrequencyTable};
use super::trend::analyze_trend;
use super::types::{
    AdherenceEngine, AdherenceError, AdherencePeriod, AdherenceResult, MultiMedicationAdherence,
};

/// Stateless adherence engine: thresholds plus an injected frequency resolver.
pub struct DefaultAdherenceEngine<R = FrequencyTable> {
    pub(crate) thresholds: AdherenceThresholds,
    pub(crate) resolver: R,
}

impl Default for DefaultAdherenceEngine<FrequencyTable> {
    fn default() -> Self {
        Self::new(FrequencyTable::ibd_defaults(), AdherenceThresholds::default())
    }
}

impl<R: FrequencyResolver> DefaultAdherenceEngine<R> {
    pub fn new(resolver: R, thresholds: AdherenceThresholds) -> Self {
        Self {
            thresholds,
            resolver,
        }
    }

    pub fn thresholds(&self) -> &AdherenceThresholds {
        &self.thresholds
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Like `calculate_multi_medication_adherence`, but every name in
    /// `medication_names` gets a result even without a single record.
    pub fn calculate_for_medications(
        &self,
        records: &[IntakeRecord],
        medication_names: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<MultiMedicationAdherence, AdherenceError> {
        self.multi_medication(records, medication_names, start, end)
    }

    /// Per-medication results for every recorded name plus every name in
    /// `requested`, rolled into the unweighted overall figure.
    fn multi_medication(
        &self,
        records: &[IntakeRecord],
        requested: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<MultiMedicationAdherence, AdherenceError> {
        let period = AdherencePeriod::new(start, end)?;
        ensure_within_period(records, &period)?;

        let mut medications = BTreeMap::new();
        let mut fallback_medications = Vec::new();

        for (name, group) in group_by_medication(records) {
            let frequency = self.resolve_frequency(&name, &mut fallback_medications);
            let result = self.compute(Some(name.as_str()), &group, frequency, period);
            tracing::debug!(
                medication = %name,
                records = group.len(),
                expected = result.expected_doses,
                percentage = result.percentage,
                trend = result.trend.as_str(),
                "Medication adherence computed"
            );
            medications.insert(name, result);
        }

        for name in requested {
            if medications.contains_key(name) {
                continue;
            }
            let frequency = self.resolve_frequency(name, &mut fallback_medications);
            medications.insert(
                name.clone(),
                AdherenceResult::empty(Some(name.as_str()), frequency, period),
            );
        }

        let overall_percentage = overall_percentage(&medications);

        tracing::info!(
            medications = medications.len(),
            fallbacks = fallback_medications.len(),
            overall = overall_percentage,
            "Multi-medication adherence computed"
        );

        Ok(MultiMedicationAdherence {
            medications,
            overall_percentage,
            fallback_medications,
            period,
        })
    }

    /// Resolves a frequency; fallback resolutions are logged and recorded
    /// in `fallbacks` as a data-quality signal.
    fn resolve_frequency(&self, medication_name: &str, fallbacks: &mut Vec<String>) -> Frequency {
        let resolution = self.resolver.resolve(medication_name);
        if resolution.source == ResolutionSource::Fallback {
            tracing::warn!(
                medication = %medication_name,
                frequency = %resolution.frequency,
                "No frequency mapping, using fallback"
            );
            fallbacks.push(medication_name.to_string());
        }
        resolution.frequency
    }

    /// Runs every per-medication stage on already validated input.
    fn compute(
        &self,
        medication_name: Option<&str>,
        records: &[IntakeRecord],
        frequency: Frequency,
        period: AdherencePeriod,
    ) -> AdherenceResult {
        let expected = expected_doses(frequency, &period);
        let actual = actual_doses(records, &period);
        let monthly_averages = monthly_breakdown(records, frequency, &period);
        let trend = analyze_trend(&monthly_averages, &self.thresholds);

        AdherenceResult {
            medication_name: medication_name.map(str::to_string),
            percentage: adherence_percentage(expected, actual),
            expected_doses: expected,
            actual_doses: actual,
            trend,
            quality_metrics: quality_metrics(records, frequency, &self.thresholds),
            monthly_averages,
            period,
            frequency,
        }
    }
}

/// Rejects the first record outside `period`.
fn ensure_within_period(
    records: &[IntakeRecord],
    period: &AdherencePeriod,
) -> Result<(), AdherenceError> {
    match records.iter().find(|r| !period.contains(r.date_taken)) {
        Some(outside) => Err(AdherenceError::RecordOutsidePeriod {
            record_id: outside.id.clone(),
            date_taken: outside.date_taken,
        }),
        None => Ok(()),
    }
}

/// Keeps only the records inside `[start, end]`, for callers that prefer
/// filtering to being rejected.
pub fn filter_to_period(
    records: &[IntakeRecord],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<IntakeRecord>, AdherenceError> {
    let period = AdherencePeriod::new(start, end)?;
    Ok(records
        .iter()
        .filter(|r| period.contains(r.date_taken))
        .cloned()
        .collect())
}

/// Unweighted mean of the per-medication percentages, 0 when empty.
fn overall_percentage(medications: &BTreeMap<String, AdherenceResult>) -> f64 {
    if medications.is_empty() {
        return 0.0;
    }
    medications.values().map(|r| r.percentage).sum::<f64>() / medications.len() as f64
}

/// Groups records by exact medication name.
pub fn group_by_medication(records: &[IntakeRecord]) -> BTreeMap<String, Vec<IntakeRecord>> {
    let mut groups: BTreeMap<String, Vec<IntakeRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.medication_name.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

impl<R: FrequencyResolver> AdherenceEngine for DefaultAdherenceEngine<R> {
    fn calculate_adherence(
        &self,
        records: &[IntakeRecord],
        frequency: Frequency,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<AdherenceResult, AdherenceError> {
        let period = AdherencePeriod::new(start, end)?;
        ensure_within_period(records, &period)?;

        Ok(self.compute(None, records, frequency, period))
    }

    fn calculate_multi_medication_adherence(
        &self,
        records: &[IntakeRecord],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<MultiMedicationAdherence, AdherenceError> {
        self.multi_medication(records, &[], start, end)
    }
}

impl AdherenceResult {
    /// Result for a medication with no intake at all in the period.
    pub fn empty(
        medication_name: Option<&str>,
        frequency: Frequency,
        period: AdherencePeriod,
    ) -> Self {
        let expected = expected_doses(frequency, &period);
        Self {
            medication_name: medication_name.map(str::to_string),
            percentage: adherence_percentage(expected, 0),
            expected_doses: expected,
            actual_doses: 0,
            monthly_averages: Vec::new(),
            trend: AdherenceTrend::InsufficientData,
            quality_metrics: Default::default(),
            period,
            frequency,
        }
    }
}
