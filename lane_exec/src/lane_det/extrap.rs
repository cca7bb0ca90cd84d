//! Lane extrapolation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;

use super::{LaneEndpoints, LaneModel};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Project a lane model onto the bottom row of the frame (`y = height`) and
/// the row at `floor(height * upper_row_fraction)`.
///
/// x coordinates are truncated towards zero and may lie outside the frame.
pub fn extrapolate(lane: &LaneModel, frame_height: u32, upper_row_fraction: f64) -> LaneEndpoints {
    let y_bottom = frame_height as i32;
    let y_top = (frame_height as f64 * upper_row_fraction).floor() as i32;

    LaneEndpoints {
        bottom: Point2::new(lane.x_at(y_bottom as f64) as i32, y_bottom),
        top: Point2::new(lane.x_at(y_top as f64) as i32, y_top),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_extrapolate() {
        let lane = LaneModel { slope: -1.0, intercept: 100.0 };
        let ends = extrapolate(&lane, 400, 0.8);

        assert_eq!(ends.bottom, Point2::new(-300, 400));
        assert_eq!(ends.top, Point2::new(-220, 320));
    }

    #[test]
    fn test_truncation() {
        // x = (480 - 0) / 0.7 = 685.71..., (384 - 0) / 0.7 = 548.57...
        let lane = LaneModel { slope: 0.7, intercept: 0.0 };
        let ends = extrapolate(&lane, 480, 0.8);
        assert_eq!(ends.bottom.x, 685);
        assert_eq!(ends.top, Point2::new(548, 384));

        // Truncated towards zero, not floored
        let lane = LaneModel { slope: -0.7, intercept: 0.0 };
        let ends = extrapolate(&lane, 480, 0.8);
        assert_eq!(ends.bottom.x, -685);
    }

    #[test]
    fn test_fraction_row_is_floored() {
        let lane = LaneModel { slope: 1.0, intercept: 0.0 };
        let ends = extrapolate(&lane, 401, 0.8);
        assert_eq!(ends.top.y, 320);
    }
}
