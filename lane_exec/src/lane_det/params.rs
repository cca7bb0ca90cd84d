//! Parameters structure for LaneDet

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{LaneDetError, MAX_BLUR_KERNEL_SIZE};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lane detection.
///
/// Every field has a default, so a parameter file only needs to contain the
/// values which differ from the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- EDGE EXTRACTION ----

    /// Size of the square binomial blur kernel applied before edge detection.
    /// Must be odd, a size of 1 disables the blur.
    ///
    /// Units: pixels
    pub blur_kernel_size: usize,

    /// Lower hysteresis threshold of the edge detector. Pixels with a gradient
    /// magnitude above this are edges if they connect to a strong edge.
    ///
    /// Units: L1 Sobel gradient magnitude of 8-bit intensity
    pub canny_low: f64,

    /// Upper hysteresis threshold of the edge detector. Pixels with a gradient
    /// magnitude above this are always edges.
    ///
    /// Units: L1 Sobel gradient magnitude of 8-bit intensity
    pub canny_high: f64,

    // ---- REGION OF INTEREST ----

    /// Vertices of the region of interest polygon, in order. The first vertex
    /// must not be repeated at the end.
    ///
    /// Units: pixels, at `roi_ref_resolution`
    pub roi_vertices_px: Vec<[i32; 2]>,

    /// The frame resolution (width, height) the ROI vertices were chosen for.
    ///
    /// Units: pixels
    pub roi_ref_resolution: [u32; 2],

    /// How the ROI vertices are applied to frames of other resolutions.
    pub roi_scaling: RoiScaling,

    // ---- LINE SEGMENT DETECTION ----

    /// Distance resolution of the Hough accumulator.
    ///
    /// Units: pixels
    pub hough_rho_px: f64,

    /// Angle resolution of the Hough accumulator.
    ///
    /// Units: radians
    pub hough_theta_rad: f64,

    /// Minimum number of accumulator votes for a line to be extracted.
    pub hough_threshold: u32,

    /// Minimum length of an extracted segment, 0 accepts any length.
    ///
    /// Units: pixels
    pub hough_min_line_length_px: u32,

    /// Maximum gap between edge pixels along a line which are joined into a
    /// single segment.
    ///
    /// Units: pixels
    pub hough_max_line_gap_px: u32,

    /// Maximum number of segments extracted from one frame, or no limit if not
    /// given.
    pub hough_max_lines: Option<usize>,

    /// Seed for the random order in which edge pixels are visited. The same
    /// seed and edge map always give the same segments.
    pub hough_seed: u64,

    // ---- CLASSIFICATION ----

    /// Segments with an absolute slope below this are rejected as not
    /// belonging to a lane (horizontal artifacts).
    pub min_abs_slope: f64,

    // ---- EXTRAPOLATION ----

    /// The upper endpoint of each lane is placed at this fraction of the frame
    /// height, the lower endpoint is always on the bottom row.
    pub upper_row_fraction: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Mapping of the ROI vertices onto the actual frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoiScaling {
    /// Vertices are absolute pixel coordinates, whatever the frame size.
    Fixed,

    /// Vertices are scaled from `roi_ref_resolution` to the frame size.
    Relative,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            canny_low: 75.0,
            canny_high: 150.0,
            roi_vertices_px: vec![
                [0, 380],   // bottom left
                [0, 270],   // top left
                [520, 270], // top right
                [633, 380], // bottom right
            ],
            roi_ref_resolution: [640, 480],
            roi_scaling: RoiScaling::Fixed,
            hough_rho_px: 1.0,
            hough_theta_rad: std::f64::consts::PI / 180.0,
            hough_threshold: 50,
            hough_min_line_length_px: 0,
            hough_max_line_gap_px: 200,
            hough_max_lines: None,
            hough_seed: 0x5EED,
            min_abs_slope: 0.3,
            upper_row_fraction: 0.8,
        }
    }
}

impl Params {
    /// Check that the parameters describe a usable pipeline.
    pub fn validate(&self) -> Result<(), LaneDetError> {
        let invalid = |msg: String| Err(LaneDetError::InvalidParams(msg));

        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return invalid(format!(
                "blur_kernel_size must be odd, found {}", self.blur_kernel_size
            ))
        }
        if self.blur_kernel_size > MAX_BLUR_KERNEL_SIZE {
            return invalid(format!(
                "blur_kernel_size must be at most {}, found {}",
                MAX_BLUR_KERNEL_SIZE, self.blur_kernel_size
            ))
        }
        if !(self.canny_low >= 0.0) || !(self.canny_low <= self.canny_high) {
            return invalid(format!(
                "Expected 0 <= canny_low <= canny_high, found {} and {}",
                self.canny_low, self.canny_high
            ))
        }
        if self.roi_vertices_px.len() < 3 {
            return invalid(format!(
                "The ROI needs at least 3 vertices, found {}", self.roi_vertices_px.len()
            ))
        }
        if self.roi_vertices_px.first() == self.roi_vertices_px.last() {
            return invalid(String::from(
                "The first ROI vertex must not be repeated as the last vertex"
            ))
        }
        if self.roi_ref_resolution[0] == 0 || self.roi_ref_resolution[1] == 0 {
            return invalid(String::from("roi_ref_resolution must be non-zero"))
        }
        if !(self.hough_rho_px > 0.0) || !(self.hough_theta_rad > 0.0) {
            return invalid(format!(
                "Hough resolutions must be positive, found rho = {}, theta = {}",
                self.hough_rho_px, self.hough_theta_rad
            ))
        }
        if self.hough_theta_rad > std::f64::consts::PI {
            return invalid(format!(
                "hough_theta_rad must not exceed pi, found {}", self.hough_theta_rad
            ))
        }
        if !(self.min_abs_slope >= 0.0) {
            return invalid(format!(
                "min_abs_slope must not be negative, found {}", self.min_abs_slope
            ))
        }
        if !(self.upper_row_fraction > 0.0 && self.upper_row_fraction <= 1.0) {
            return invalid(format!(
                "upper_row_fraction must be in (0, 1], found {}", self.upper_row_fraction
            ))
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = Params::default();
        params.validate().unwrap();

        assert_eq!(params.blur_kernel_size, 5);
        assert_eq!(params.hough_threshold, 50);
        assert_eq!(params.hough_max_line_gap_px, 200);
        assert_eq!(params.roi_scaling, RoiScaling::Fixed);
    }

    #[test]
    fn test_partial_file() {
        let params: Params = util::params::from_str(
            "canny_low = 50.0\nroi_scaling = \"Relative\"\n"
        ).unwrap();

        assert_eq!(params.canny_low, 50.0);
        assert_eq!(params.canny_high, 150.0);
        assert_eq!(params.roi_scaling, RoiScaling::Relative);
        assert_eq!(params.roi_vertices_px, Params::default().roi_vertices_px);
    }

    #[test]
    fn test_params_file_matches_defaults() {
        let params: Params = util::params::from_str(
            include_str!("../../../params/lane_det.toml")
        ).unwrap();
        assert_eq!(params, Params::default());
    }

    #[test]
    fn test_invalid() {
        let mut params = Params::default();
        params.blur_kernel_size = 4;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.blur_kernel_size = MAX_BLUR_KERNEL_SIZE;
        assert!(params.validate().is_ok());
        params.blur_kernel_size = 31;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.canny_low = 200.0;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.roi_vertices_px.push([0, 380]);
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.roi_vertices_px.truncate(2);
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.upper_row_fraction = 0.0;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.hough_theta_rad = 0.0;
        assert!(params.validate().is_err());
    }
}
