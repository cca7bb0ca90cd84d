//! # Steering control module
//!
//! Converts the lane centre found by `lane_det` into a steering demand. The
//! lateral error is the horizontal offset of the lane centre from the middle
//! of the frame, in pixels, and is passed through a PID controller.
//!
//! Frames without a lane centre are dropouts. The controller is not run on a
//! dropout, so its integral and previous error are unaffected. Depending on
//! the `DropoutPolicy` no demand is produced, or the previous one is repeated.
//! A dropout is never reported as a zero demand.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SteerCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("Could not load the SteerCtrl parameters: {0}")]
    ParamsLoadError(util::params::LoadError),

    #[error("Could not initialise the SteerCtrl archives: {0}")]
    ArchiveInitError(util::archive::ArchiveError),

    #[error("The time step must be finite, found {0}")]
    NonFiniteDt(f64),
}
