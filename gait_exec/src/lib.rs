//! # Gait library.
//!
//! This library allows other crates in the workspace (and the benches and integration tests) to
//! access items defined inside the gait crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Executable data store - the state shared between modules within one cycle
pub mod data_store;

/// Gait control module - turns requested directions into joint-angle frames
pub mod gait_ctrl;

/// Input module - classifies operator input into directions and actions
pub mod input;

/// Kinematics module - inverse and forward kinematics of a single leg
pub mod kinematics;

/// Executable parameters
pub mod params;
