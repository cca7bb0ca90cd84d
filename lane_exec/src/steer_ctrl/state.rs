//! Implementations for the SteerCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{DropoutPolicy, Params, PidController, SteerCtrlError};
use crate::lane_det::LaneFrameResult;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering control module state
#[derive(Default)]
pub struct SteerCtrl {
    pub(crate) params: Params,

    pid: PidController,

    pub(crate) report: StatusReport,

    /// The last demand actually produced by the controller
    last_dem: Option<f64>,

    last_dt_s: f64,
    output: OutputData,

    arch_output: Option<Archiver>,
}

/// Input data to SteerCtrl.
pub struct InputData {
    /// Lane detection result of the latest frame
    pub lane: LaneFrameResult,

    /// Time since the previous call
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Output of SteerCtrl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    /// Steering demand, or `None` if there is no demand on this cycle.
    /// Positive demands steer towards the right of the frame.
    pub steer_dem: Option<f64>,
}

/// Status report for SteerCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// Lateral error of the lane centre, positive to the right of the middle
    /// of the frame.
    ///
    /// Units: pixels
    pub lat_error_px: Option<f64>,

    /// True if there was no lane centre on this cycle
    pub dropout: bool,

    /// True if the output is a repeat of an earlier demand
    pub held: bool,
}

/// One row of the output archive.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    dt_s: f64,
    lat_error_px: Option<f64>,
    dropout: bool,
    held: bool,
    steer_dem: Option<f64>,
    k_p: f64,
    k_i: f64,
    k_d: f64,
    integral: f64,
    prev_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerCtrl {
    /// Create a module from already loaded parameters, without archiving.
    pub fn with_params(params: Params) -> Self {
        let mut steer_ctrl = Self::default();
        steer_ctrl.set_params(params);
        steer_ctrl
    }

    fn set_params(&mut self, params: Params) {
        self.pid = PidController::new(params.k_p, params.k_i, params.k_d);
        self.params = params;
    }

    /// The controller, for inspection of its state.
    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    /// Replace the controller gains, see `PidController::set_gains`.
    pub fn set_gains(&mut self, k_p: f64, k_i: f64, k_d: f64) {
        debug!("SteerCtrl gains set to ({}, {}, {})", k_p, k_i, k_d);
        self.pid.set_gains(k_p, k_i, k_d);
    }

    /// Get the controller gains as `(k_p, k_i, k_d)`.
    pub fn gains(&self) -> (f64, f64, f64) {
        self.pid.get_gains()
    }

    /// Reset the controller state and forget any held demand.
    pub fn reset(&mut self) {
        debug!("SteerCtrl reset");
        self.pid.reset();
        self.last_dem = None;
    }
}

/// Horizontal offset of the lane centre from the middle of the frame, or
/// `None` if there is no centre.
pub fn lateral_error_px(lane: &LaneFrameResult) -> Option<f64> {
    lane.centre.map(|c| c.x as f64 - lane.frame_width as f64 / 2.0)
}

impl State for SteerCtrl {
    const NAME: &'static str = "SteerCtrl";

    type InitData = String;
    type InitError = SteerCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SteerCtrlError;

    /// Initialise the SteerCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params = params::load(&init_data)
            .map_err(SteerCtrlError::ParamsLoadError)?;
        self.set_params(params);

        self.arch_output = Some(
            Archiver::from_path(session, "steer_ctrl/output.csv")
                .map_err(SteerCtrlError::ArchiveInitError)?
        );

        Ok(())
    }

    /// Compute the steering demand for the latest lane detection result.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !input_data.dt_s.is_finite() {
            return Err(SteerCtrlError::NonFiniteDt(input_data.dt_s));
        }

        self.report = StatusReport::default();
        self.last_dt_s = input_data.dt_s;

        let output = match lateral_error_px(&input_data.lane) {
            Some(err) => {
                self.report.lat_error_px = Some(err);

                let dem = self.pid.compute(self.params.setpoint_px, err, input_data.dt_s);

                // The controller steers the error towards the setpoint, so a
                // centre to the right needs a demand to the right. A zero
                // output stays +0.0.
                let dem = if dem == 0.0 { 0.0 } else { -dem };
                self.last_dem = Some(dem);

                trace!("SteerCtrl lat error {:.1} px, demand {:.4}", err, dem);

                OutputData { steer_dem: Some(dem) }
            },
            None => {
                self.report.dropout = true;

                match self.params.dropout_policy {
                    DropoutPolicy::Skip => {
                        debug!("Lane centre dropout, no steering demand");
                        OutputData { steer_dem: None }
                    },
                    DropoutPolicy::Hold => {
                        debug!("Lane centre dropout, holding demand {:?}", self.last_dem);
                        self.report.held = self.last_dem.is_some();
                        OutputData { steer_dem: self.last_dem }
                    }
                }
            }
        };

        self.output = output;

        Ok((output, self.report))
    }
}

impl Archived for SteerCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let arch = match self.arch_output.as_mut() {
            Some(a) => a,
            None => return Ok(())
        };

        let state = self.pid.state();

        arch.serialise(OutputRecord {
            time_s: session::get_elapsed_seconds(),
            dt_s: self.last_dt_s,
            lat_error_px: self.report.lat_error_px,
            dropout: self.report.dropout,
            held: self.report.held,
            steer_dem: self.output.steer_dem,
            k_p: state.k_p,
            k_i: state.k_i,
            k_d: state.k_d,
            integral: state.integral,
            prev_error: state.prev_error,
        })
    }
}
