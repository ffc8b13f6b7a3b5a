//! # Communications interface crate.
//!
//! Provides the interfaces shared between the gait core and its collaborators: the joint-angle
//! frames consumed by the actuation side and the input commands produced by the operator side.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Operator input commands (directions, keys, actions)
pub mod tc;

/// Command and response definitions for equipment (like the leg actuators)
pub mod eqpt;
