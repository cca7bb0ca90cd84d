//! # Lane following library.
//!
//! This library allows other crates in the workspace, and the tests and benchmarks of this crate,
//! to access items defined inside the lane following crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - the state shared by the modules of the executable
pub mod data_store;

/// Drive output - converts steering demands into PWM commands
pub mod drive;

/// Frame sources - supply the camera frames to be processed
pub mod frame_src;

/// Lane detection module - estimates the lane boundaries and centre in a single frame
pub mod lane_det;

/// Executable parameters
pub mod params;

/// Steering control module - keeps the lane centre in the middle of the frame
pub mod steer_ctrl;
