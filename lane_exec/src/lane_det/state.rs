//! Implementations for the LaneDet state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use comms_if::eqpt::cam::CamFrame;
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{run_pipeline, Frame, LaneDetError, LaneFrameResult, Params};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
    time::duration_to_seconds
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lane detection module state.
///
/// Nothing is carried from one frame to the next apart from the last result,
/// which is kept only for archiving.
#[derive(Default)]
pub struct LaneDet {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    last_result: Option<LaneFrameResult>,
    arch_frames: Option<Archiver>,
}

/// Input data to LaneDet.
pub struct InputData {
    /// The encoded camera frame to process.
    pub frame: CamFrame,
}

/// Status report for LaneDet processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Number of edge pixels in the whole frame.
    pub num_edge_px: usize,

    /// Number of edge pixels left after region masking.
    pub num_roi_edge_px: usize,

    /// Number of line segments detected.
    pub num_segments: usize,

    pub num_left_segments: usize,
    pub num_right_segments: usize,
    pub num_rejected_vertical: usize,
    pub num_rejected_shallow: usize,

    /// True if a centre could be estimated.
    pub centre_found: bool,

    /// Time taken to process the frame.
    ///
    /// Units: seconds
    pub proc_time_s: f64,
}

/// One row of the frame archive.
#[derive(Serialize)]
struct FrameRecord {
    time_s: f64,
    frame_width: u32,
    frame_height: u32,
    left_slope: Option<f64>,
    left_intercept: Option<f64>,
    right_slope: Option<f64>,
    right_intercept: Option<f64>,
    left_bottom_x: Option<i32>,
    left_top_x: Option<i32>,
    right_bottom_x: Option<i32>,
    right_top_x: Option<i32>,
    centre_x: Option<i32>,
    centre_y: Option<i32>,
    num_segments: usize,
    proc_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneDet {
    /// Create a module from already loaded parameters, without archiving.
    pub fn with_params(params: Params) -> Result<Self, LaneDetError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// The parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The result of the last processed frame.
    pub fn last_result(&self) -> Option<&LaneFrameResult> {
        self.last_result.as_ref()
    }
}

impl State for LaneDet {
    const NAME: &'static str = "LaneDet";

    type InitData = String;
    type InitError = LaneDetError;

    type InputData = InputData;
    type OutputData = LaneFrameResult;
    type StatusReport = StatusReport;
    type ProcError = LaneDetError;

    /// Initialise the LaneDet module.
    ///
    /// Expected init data is the path to the parameter file, relative to the
    /// params directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(&init_data)
            .map_err(LaneDetError::ParamsLoadError)?;
        params.validate()?;
        self.params = params;

        self.arch_frames = Some(
            Archiver::from_path(session, "lane_det/frames.csv")
                .map_err(LaneDetError::ArchiveInitError)?
        );

        Ok(())
    }

    /// Process a single frame.
    ///
    /// The only error is a frame which cannot be decoded. A frame without
    /// lanes, including an empty one, is a valid result with no lanes.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let frame = input_data.frame
            .to_cam_image()
            .map_err(LaneDetError::FrameDecodeError)?
            .image
            .to_rgb8();

        Ok(self.process_decoded(&frame))
    }
}

impl LaneDet {
    /// Run the pipeline on an already decoded frame, updating the status
    /// report and the archived result.
    pub fn process_decoded(&mut self, frame: &Frame) -> (LaneFrameResult, StatusReport) {
        let start = Utc::now();
        self.report = StatusReport::default();

        let result = run_pipeline(frame, &self.params, &mut self.report);

        self.report.centre_found = result.centre.is_some();
        self.report.proc_time_s = duration_to_seconds(Utc::now() - start)
            .unwrap_or(std::f64::NAN);

        match result.centre {
            Some(c) => trace!("Lane centre at ({}, {})", c.x, c.y),
            None => debug!(
                "No lane centre (left: {}, right: {})",
                result.left_lane.is_some(),
                result.right_lane.is_some()
            )
        }
        trace!("LaneDet report: {:?}", self.report);

        self.last_result = Some(result.clone());

        (result, self.report)
    }
}

impl Archived for LaneDet {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let (arch, result) = match (self.arch_frames.as_mut(), self.last_result.as_ref()) {
            (Some(a), Some(r)) => (a, r),
            _ => return Ok(())
        };

        let record = FrameRecord {
            time_s: session::get_elapsed_seconds(),
            frame_width: result.frame_width,
            frame_height: result.frame_height,
            left_slope: result.left_lane.map(|l| l.slope),
            left_intercept: result.left_lane.map(|l| l.intercept),
            right_slope: result.right_lane.map(|l| l.slope),
            right_intercept: result.right_lane.map(|l| l.intercept),
            left_bottom_x: result.left_endpoints.map(|e| e.bottom.x),
            left_top_x: result.left_endpoints.map(|e| e.top.x),
            right_bottom_x: result.right_endpoints.map(|e| e.bottom.x),
            right_top_x: result.right_endpoints.map(|e| e.top.x),
            centre_x: result.centre.map(|c| c.x),
            centre_y: result.centre.map(|c| c.y),
            num_segments: self.report.num_segments,
            proc_time_s: self.report.proc_time_s,
        };

        arch.serialise(record)
    }
}
