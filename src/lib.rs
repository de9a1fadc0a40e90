pub mod adherence; // Adherence engine: expected doses, monthly, trend, quality
pub mod config;
pub mod db; // Intake journal store
pub mod models;

use tracing_subscriber::EnvFilter;

pub use adherence::{
    AdherenceEngine, AdherenceError, AdherenceResult, DefaultAdherenceEngine, FrequencyTable,
    MultiMedicationAdherence,
};
pub use models::{AdherenceTrend, Frequency, IntakeRecord};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
