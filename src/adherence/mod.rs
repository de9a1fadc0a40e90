//! Medication adherence engine.
//!
//! Given a user's intake records and a dosing frequency, computes how closely
//! actual intake matched expected intake over a period: overall percentage,
//! calendar-month breakdown, trend, and timing quality (consistency, gaps,
//! streaks). All computation is pure over an immutable record snapshot;
//! the only I/O lives in `service`, which reads from the intake journal.

mod engine;
mod expected;
mod monthly;
mod quality;
mod reference;
mod service;
mod trend;
mod types;

pub use engine::*;
pub use expected::*;
pub use monthly::*;
pub use quality::*;
pub use reference::*;
pub use service::*;
pub use trend::*;
pub use types::*;
