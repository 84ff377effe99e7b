//! Shared test fixtures and mocks for footfall crates.
//!
//! Provides scripted ground, recording observers, a mock collider and
//! ready-made biped rigs and configs.

pub mod fixtures;
pub mod mocks;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{biped_at_height, snap_config, standard_biped};
pub use mocks::{MockCollider, ObserverEvent, RecordingObserver, ScriptedGround};
