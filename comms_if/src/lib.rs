//! # Communications interface crate.
//!
//! Provides the types exchanged between the lane keeping core and its
//! collaborators: camera frames in, drive demands out, and tuning
//! telecommands from the operator.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands sent by the operator
pub mod tc;

/// Definitions for equipment (camera, drive motor, steering servo)
pub mod eqpt;
