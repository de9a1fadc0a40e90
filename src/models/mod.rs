pub mod enums;
pub mod intake;

pub use enums::{AdherenceTrend, Frequency, InvalidEnum, ResolutionSource};
pub use intake::IntakeRecord;
