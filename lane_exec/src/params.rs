//! # Lane Executable Parameters
//!
//! This module provide parameters for the lane following executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

use crate::drive;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneExecParams {

    /// Directory containing the frames to process, relative to the software root if not absolute
    pub frames_dir: String,

    /// Target period of one frame cycle.
    ///
    /// Units: seconds
    pub frame_period_s: f64,

    /// Name of the LaneDet parameter file
    pub lane_det_params: String,

    /// Name of the SteerCtrl parameter file
    pub steer_ctrl_params: String,

    /// Whether to write the module archives
    #[serde(default = "default_archive")]
    pub archive: bool,

    /// Drive output mapping
    #[serde(default)]
    pub drive: drive::Params,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_archive() -> bool {
    true
}
