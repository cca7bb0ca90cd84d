//! Lane centre estimation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;

use super::LaneEndpoints;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Midpoint of the bottom endpoints of both lanes, rounded down.
///
/// If either lane is missing there is no centre.
pub fn estimate_centre(
    left: Option<&LaneEndpoints>,
    right: Option<&LaneEndpoints>
) -> Option<Point2<i32>> {
    let (left, right) = (left?, right?);

    Some(Point2::new(
        (left.bottom.x + right.bottom.x).div_euclid(2),
        (left.bottom.y + right.bottom.y).div_euclid(2)
    ))
}
