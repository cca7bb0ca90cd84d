//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::drive::DriveDems;
use log::{info, warn};

use crate::{lane_det, steer_ctrl};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the vehicle has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    DriveError,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {

    // Cycle management

    /// Number of frames already processed
    pub num_frames: u64,

    /// Number of consecutive frames which took longer than the frame period
    pub num_consec_frame_overruns: u64,

    // Safe mode variables

    /// Determines if the vehicle is in safe mode.
    pub safe: bool,

    /// Gives the reason for the vehicle being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // LaneDet
    pub lane_det: lane_det::LaneDet,
    pub lane_det_output: Option<lane_det::LaneFrameResult>,
    pub lane_det_status_rpt: lane_det::StatusReport,

    // SteerCtrl
    pub steer_ctrl: steer_ctrl::SteerCtrl,
    pub steer_ctrl_output: steer_ctrl::OutputData,
    pub steer_ctrl_status_rpt: steer_ctrl::StatusReport,

    // Drive
    pub drive_dems: DriveDems,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the vehicle into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Safe mode is only disabled if the cause matches the one which enabled
    /// it, otherwise the original cause is returned as the error. If safe mode
    /// was not enabled `Ok(())` is returned.
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), SafeModeCause> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) if root_cause != cause => Err(root_cause),
            _ => {
                self.safe = false;
                self.safe_cause = None;
                info!("Make unsafe requested, root cause match, safe mode disabled");
                Ok(())
            }
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the outputs of the previous frame.
    pub fn cycle_start(&mut self) {
        self.lane_det_output = None;
        self.lane_det_status_rpt = lane_det::StatusReport::default();
        self.steer_ctrl_output = steer_ctrl::OutputData::default();
        self.steer_ctrl_status_rpt = steer_ctrl::StatusReport::default();
        self.drive_dems = DriveDems::default();
    }
}
