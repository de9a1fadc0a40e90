use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Adherence";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "adherence_lib=info,warn"
}

/// Get the application data directory (~/Adherence/).
/// `None` when the home directory cannot be determined.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Default location of the intake journal database.
pub fn default_database_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("journal.db"))
}

/// Default location of the medication → frequency table.
pub fn default_frequency_table_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("frequencies.json"))
}

// ═══════════════════════════════════════════════════════════
// Engine thresholds
// ═══════════════════════════════════════════════════════════

/// Tunable constants of the adherence engine.
///
/// `Default` carries the reference values; deployments can override
/// individual fields from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdherenceThresholds {
    /// A gap longer than this multiple of the expected interval is significant.
    pub significant_gap_multiplier: f64,
    /// Consecutive doses within this multiple of the expected interval extend a streak.
    pub streak_gap_multiplier: f64,
    /// Percentage-point band around zero classified as a stable trend.
    pub trend_band: f64,
    /// Number of monthly buckets in each trend window.
    pub trend_window: usize,
}

impl Default for AdherenceThresholds {
    fn default() -> Self {
        Self {
            significant_gap_multiplier: 1.5,
            streak_gap_multiplier: 1.2,
            trend_band: 5.0,
            trend_window: 3,
        }
    }
}
