//! Repository layer: entity-scoped database operations.

mod intake;

pub use intake::*;
