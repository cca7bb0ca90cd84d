//! Lane geometry types

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight line segment detected in the edge map, given by its two
/// endpoints in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// A lane boundary modelled as the line `y = slope*x + intercept` in image
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneModel {
    pub slope: f64,
    pub intercept: f64,
}

/// The visible extent of a lane boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneEndpoints {
    /// Point on the bottom row of the frame.
    pub bottom: Point2<i32>,

    /// Point on the upper extrapolation row.
    pub top: Point2<i32>,
}

/// Everything estimated from a single frame.
///
/// Each field is independently optional: a lane missing in this frame is
/// `None`, and the centre is only present when both lanes are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneFrameResult {
    pub left_lane: Option<LaneModel>,
    pub right_lane: Option<LaneModel>,
    pub left_endpoints: Option<LaneEndpoints>,
    pub right_endpoints: Option<LaneEndpoints>,
    pub centre: Option<Point2<i32>>,

    /// Dimensions of the frame the result was computed from.
    pub frame_width: u32,
    pub frame_height: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// A vertical segment has no finite slope.
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }

    /// Euclidian length of the segment.
    pub fn length(&self) -> f64 {
        let dx = (self.x2 - self.x1) as f64;
        let dy = (self.y2 - self.y1) as f64;
        dx.hypot(dy)
    }
}

impl LaneModel {
    /// The x coordinate of the line at row `y`.
    ///
    /// Not meaningful for a zero slope, which lane models never have.
    pub fn x_at(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

impl LaneFrameResult {
    /// True if both lanes and the centre were found.
    pub fn is_complete(&self) -> bool {
        self.left_lane.is_some() && self.right_lane.is_some() && self.centre.is_some()
    }
}
