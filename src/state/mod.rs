//! Extraction state
//!
//! Tracks per-phase completion and resume points so that an invocation cut
//! short by its deadline can be picked up by the next one.
//!
//! # Overview
//!
//! - `ExtractionState` - one `PhaseState` per phase
//! - `Phase` - the fixed phase order
//! - `StateManager` - file persistence with atomic writes

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{ExtractionState, Phase, PhaseState, PhaseStatus};

#[cfg(test)]
mod tests;
