use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::{AdherenceTrend, Frequency, IntakeRecord, InvalidEnum};

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Inclusive calculation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherencePeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl AdherencePeriod {
    /// Rejects `end < start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, AdherenceError> {
        if end < start {
            return Err(AdherenceError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whole days between start and end, plus one (both endpoints count).
    pub fn inclusive_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Adherence of one medication over one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceResult {
    pub medication_name: Option<String>,
    /// 0–100, capped.
    pub percentage: f64,
    pub expected_doses: u32,
    pub actual_doses: u32,
    pub monthly_averages: Vec<MonthlyAdherenceData>,
    pub trend: AdherenceTrend,
    pub quality_metrics: AdherenceQualityMetrics,
    pub period: AdherencePeriod,
    pub frequency: Frequency,
}

impl AdherenceResult {
    /// False when no dose was expected (as-needed medication); the
    /// percentage is then reported as 0 but carries no information.
    pub fn is_meaningful(&self) -> bool {
        self.expected_doses > 0
    }
}

/// One calendar month of intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAdherenceData {
    /// First instant of the calendar month.
    pub month: NaiveDateTime,
    pub expected_doses: u32,
    pub actual_doses: u32,
    pub adherence_percentage: f64,
    pub records: Vec<IntakeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdherenceQualityMetrics {
    /// 0–100; higher means more regular spacing.
    pub timing_consistency: f64,
    pub gap_analysis: GapAnalysis,
    pub streak_analysis: StreakAnalysis,
    /// Mean of all consecutive inter-dose gaps, in days.
    pub average_gap_days: f64,
    pub longest_streak: u32,
    pub current_streak: u32,
}

/// Gaps longer than the significant-gap threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub total_gaps: u32,
    /// Mean of the significant gaps only, in days.
    pub average_gap_days: f64,
    pub longest_gap_days: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakAnalysis {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_streak: f64,
}

/// Orchestrated result across all medications of one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiMedicationAdherence {
    pub medications: BTreeMap<String, AdherenceResult>,
    /// Unweighted mean of the per-medication percentages.
    pub overall_percentage: f64,
    /// Medications whose frequency came from the fallback policy.
    pub fallback_medications: Vec<String>,
    pub period: AdherencePeriod,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum AdherenceError {
    #[error("Invalid period: end {end} is before start {start}")]
    InvalidPeriod {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Record {record_id} taken at {date_taken} falls outside the requested period")]
    RecordOutsidePeriod {
        record_id: String,
        date_taken: NaiveDateTime,
    },

    #[error(transparent)]
    InvalidFrequency(#[from] InvalidEnum),

    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ---------------------------------------------------------------------------
// Engine trait
// ---------------------------------------------------------------------------

/// Adherence calculations over an immutable snapshot of intake records.
pub trait AdherenceEngine {
    /// Adherence of a single medication with a known frequency.
    fn calculate_adherence(
        &self,
        records: &[IntakeRecord],
        frequency: Frequency,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<AdherenceResult, AdherenceError>;

    /// Groups records by medication, resolves each frequency and rolls
    /// the per-medication results into an overall figure.
    fn calculate_multi_medication_adherence(
        &self,
        records: &[IntakeRecord],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<MultiMedicationAdherence, AdherenceError>;
}
