//! Cyclic module interface
//!
//! `LaneDet` and `SteerCtrl` are both driven by the executable's frame loop in
//! the same way: initialised once from a parameter file, then processed once
//! per frame. This trait captures that lifecycle so the loop can treat them
//! uniformly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module driven once per frame.
pub trait State {
    /// Name of the module as it appears in log records.
    const NAME: &'static str;

    /// Data required during initialisation, usually the parameter file path.
    type InitData;
    type InitError;

    /// Data consumed by a single frame's processing.
    type InputData;
    /// Data produced by a single frame's processing.
    type OutputData;
    /// Diagnostics for a single frame's processing.
    type StatusReport;
    type ProcError;

    /// Load parameters and create any archives inside the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one frame.
    ///
    /// An error here means the frame's output is unusable. Conditions which
    /// are expected during normal running (nothing detected, for example) are
    /// carried in the output data rather than returned as errors.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
