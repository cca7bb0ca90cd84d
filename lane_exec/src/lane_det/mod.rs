//! # Lane detection module
//!
//! Lane detection converts a single camera frame into an estimate of the two
//! lane boundaries directly ahead of the vehicle and the centre point between
//! them. Each frame is processed from scratch by a fixed pipeline:
//!
//! 1. Edge extraction: 5x5 binomial blur, conversion to intensity and a
//!    two-threshold (Canny) edge detector.
//! 2. Region masking: edges outside a trapezoidal region of interest are
//!    zeroed.
//! 3. Line segment detection: a probabilistic Hough transform over the masked
//!    edges.
//! 4. Classification: segments are fitted as `y = slope*x + intercept`, those
//!    which are vertical or too shallow are rejected, and the remainder are
//!    bucketed by the sign of their slope and averaged into one lane model per
//!    side.
//! 5. Extrapolation: each lane model is projected onto the bottom row of the
//!    image and a row at a fixed fraction of the image height.
//! 6. Centre estimation: the midpoint of the two bottom endpoints, only when
//!    both lanes are present.
//!
//! Image coordinates are in pixels with the origin in the top left corner and
//! y increasing downwards, so a left lane boundary seen by a forward facing
//! camera has a negative slope.
//!
//! No state is carried between frames. A missing lane or centre is reported
//! as `None` for that frame and is never filled in from earlier frames.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod centre;
mod classify;
mod edges;
mod extrap;
mod hough;
mod lane;
mod params;
mod roi;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::{GrayImage, RgbImage};

// Internal
pub use centre::*;
pub use classify::*;
pub use edges::*;
pub use extrap::*;
pub use hough::*;
pub use lane::*;
pub use params::*;
pub use roi::*;
pub use state::*;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A colour camera frame, the input to one pass of the pipeline.
pub type Frame = RgbImage;

/// A binary edge raster with the same dimensions as the frame it was
/// extracted from. Edge pixels have the value `EDGE_PX`, all others are zero.
pub type EdgeMap = GrayImage;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Value of an edge pixel in an `EdgeMap`.
pub const EDGE_PX: u8 = 255;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LaneDet operation.
#[derive(Debug, thiserror::Error)]
pub enum LaneDetError {
    #[error("Could not load the LaneDet parameters: {0}")]
    ParamsLoadError(util::params::LoadError),

    #[error("Invalid LaneDet parameters: {0}")]
    InvalidParams(String),

    #[error("Could not initialise the LaneDet archives: {0}")]
    ArchiveInitError(util::archive::ArchiveError),

    #[error("Could not decode the camera frame: {0}")]
    FrameDecodeError(image::ImageError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the full lane detection pipeline on one frame.
///
/// This is a pure function of the frame and the parameters.
pub fn process_frame(frame: &Frame, params: &Params) -> LaneFrameResult {
    run_pipeline(frame, params, &mut StatusReport::default())
}

/// Run the classification, extrapolation and centre estimation stages on a
/// set of already detected line segments for a frame of the given size.
pub fn lanes_from_segments(
    segments: &[LineSegment],
    frame_width: u32,
    frame_height: u32,
    params: &Params,
    report: &mut ClassifyReport
) -> LaneFrameResult {
    let lanes = aggregate_lanes(segments, params.min_abs_slope, report);

    let left_endpoints = lanes.left
        .as_ref()
        .map(|l| extrapolate(l, frame_height, params.upper_row_fraction));
    let right_endpoints = lanes.right
        .as_ref()
        .map(|l| extrapolate(l, frame_height, params.upper_row_fraction));

    let centre = estimate_centre(left_endpoints.as_ref(), right_endpoints.as_ref());

    LaneFrameResult {
        left_lane: lanes.left,
        right_lane: lanes.right,
        left_endpoints,
        right_endpoints,
        centre,
        frame_width,
        frame_height
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the pipeline, filling in the counters of the status report.
pub(crate) fn run_pipeline(
    frame: &Frame,
    params: &Params,
    report: &mut StatusReport
) -> LaneFrameResult {
    let (width, height) = frame.dimensions();

    let edges = extract_edges(frame, params);
    report.num_edge_px = count_edge_px(&edges);

    let polygon = roi_polygon(params, width, height);
    let masked = apply_region_mask(&edges, &polygon);
    report.num_roi_edge_px = count_edge_px(&masked);

    let segments = detect_segments(&masked, params);
    report.num_segments = segments.len();

    let mut classify_report = ClassifyReport::default();
    let result = lanes_from_segments(&segments, width, height, params, &mut classify_report);

    report.num_left_segments = classify_report.num_left;
    report.num_right_segments = classify_report.num_right;
    report.num_rejected_vertical = classify_report.num_rejected_vertical;
    report.num_rejected_shallow = classify_report.num_rejected_shallow;

    result
}

fn count_edge_px(edges: &EdgeMap) -> usize {
    edges.pixels().filter(|p| p[0] != 0).count()
}
