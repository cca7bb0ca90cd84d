//! Segment classification and lane aggregation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};
use util::maths::mean;

use super::{LaneModel, LineSegment};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The aggregated lane models of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LanePair {
    pub left: Option<LaneModel>,
    pub right: Option<LaneModel>,
}

/// Counts of how segments were classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyReport {
    pub num_left: usize,
    pub num_right: usize,
    pub num_rejected_vertical: usize,
    pub num_rejected_shallow: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which lane boundary a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneSide {
    Left,
    Right,
}

/// Outcome of classifying a single segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    Lane(LaneSide, LaneModel),

    /// Both endpoints share an x coordinate.
    RejectedVertical,

    /// Slope too close to horizontal. A slope of exactly zero always lands
    /// here, and would belong to neither side even with no slope limit.
    RejectedShallow,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Fit the line through both endpoints of a segment.
///
/// Returns `None` for a vertical segment.
pub fn fit_segment(seg: &LineSegment) -> Option<LaneModel> {
    if seg.is_vertical() {
        return None;
    }

    let slope = (seg.y2 - seg.y1) as f64 / (seg.x2 - seg.x1) as f64;
    let intercept = seg.y1 as f64 - slope * seg.x1 as f64;

    Some(LaneModel { slope, intercept })
}

/// Classify a segment as belonging to the left or right lane, or reject it.
pub fn classify_segment(seg: &LineSegment, min_abs_slope: f64) -> Classification {
    let model = match fit_segment(seg) {
        Some(m) => m,
        None => return Classification::RejectedVertical
    };

    if model.slope.abs() < min_abs_slope {
        return Classification::RejectedShallow;
    }

    if model.slope < 0.0 {
        Classification::Lane(LaneSide::Left, model)
    }
    else if model.slope > 0.0 {
        Classification::Lane(LaneSide::Right, model)
    }
    else {
        Classification::RejectedShallow
    }
}

/// Unweighted mean of the slopes and intercepts of a set of lane models.
pub fn average_lane(models: &[LaneModel]) -> Option<LaneModel> {
    Some(LaneModel {
        slope: mean(models.iter().map(|m| m.slope))?,
        intercept: mean(models.iter().map(|m| m.intercept))?,
    })
}

/// Classify all segments and average each side into a single lane model.
///
/// A side with no segments has no lane model.
pub fn aggregate_lanes(
    segments: &[LineSegment],
    min_abs_slope: f64,
    report: &mut ClassifyReport
) -> LanePair {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for seg in segments {
        match classify_segment(seg, min_abs_slope) {
            Classification::Lane(LaneSide::Left, m) => left.push(m),
            Classification::Lane(LaneSide::Right, m) => right.push(m),
            Classification::RejectedVertical => {
                trace!("Rejected vertical segment {:?}", seg);
                report.num_rejected_vertical += 1;
            },
            Classification::RejectedShallow => {
                trace!("Rejected shallow segment {:?}", seg);
                report.num_rejected_shallow += 1;
            }
        }
    }

    report.num_left += left.len();
    report.num_right += right.len();

    LanePair {
        left: average_lane(&left),
        right: average_lane(&right),
    }
}
