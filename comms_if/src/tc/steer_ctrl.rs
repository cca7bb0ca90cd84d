//! # Steering control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Runtime tuning commands for the steering PID controller.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd")]
pub enum SteerCtrlTc {
    /// Replace the controller gains. Takes effect on the next control tick and does not clear the
    /// accumulated integral or the previous error.
    SetGains {
        /// Proportional gain
        k_p: f64,

        /// Integral gain
        k_i: f64,

        /// Derivative gain
        k_d: f64,
    },

    /// Report the current gains.
    GetGains,

    /// Clear the integral accumulator and previous error.
    Reset,
}
