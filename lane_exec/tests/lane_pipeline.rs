//! # Lane pipeline integration tests
//!
//! Drive the whole per-frame pipeline, from segments or from synthetic frames, through to the
//! lane centre and the steering demand.

use chrono::Utc;
use comms_if::eqpt::cam::{CamFrame, ImageFormat};
use image::{Luma, Rgb};
use imageproc::{drawing::{draw_line_segment_mut, draw_polygon_mut}, point::Point};
use nalgebra::Point2;

use lane_lib::{
    lane_det::{self, *},
    steer_ctrl::{self, DropoutPolicy, SteerCtrl},
};
use util::module::State;

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

/// A dark 640x480 frame with bright stripes between the given centreline endpoints.
fn road_frame(stripes: &[((i32, i32), (i32, i32))]) -> Frame {
    let mut frame = Frame::from_pixel(640, 480, Rgb([35, 35, 40]));
    let half_width = 5;

    for &((x0, y0), (x1, y1)) in stripes {
        draw_polygon_mut(
            &mut frame,
            &[
                Point::new(x0 - half_width, y0),
                Point::new(x1 - half_width, y1),
                Point::new(x1 + half_width, y1),
                Point::new(x0 + half_width, y0),
            ],
            Rgb([240, 240, 240])
        );
    }

    frame
}

const LEFT_STRIPE: ((i32, i32), (i32, i32)) = ((60, 400), (260, 250));
const RIGHT_STRIPE: ((i32, i32), (i32, i32)) = ((580, 400), (380, 250));

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_exact_segments() {
    let segments = vec![
        LineSegment::new(0, 500, 250, 300),
        LineSegment::new(500, 300, 750, 500),
    ];
    let mut report = ClassifyReport::default();

    let result = lanes_from_segments(&segments, 800, 480, &Params::default(), &mut report);

    assert_eq!(result.left_lane, Some(LaneModel { slope: -0.8, intercept: 500.0 }));
    assert_eq!(result.right_lane, Some(LaneModel { slope: 0.8, intercept: -100.0 }));

    let left = result.left_endpoints.unwrap();
    let right = result.right_endpoints.unwrap();
    assert_eq!(left.bottom, Point2::new(25, 480));
    assert_eq!(left.top, Point2::new(145, 384));
    assert_eq!(right.bottom, Point2::new(725, 480));
    assert_eq!(right.top, Point2::new(605, 384));

    assert_eq!(result.centre, Some(Point2::new(375, 480)));
    assert!(result.is_complete());
}

#[test]
fn test_drawn_edge_raster() {
    // Three pixel wide lines on y = -0.8x + 500 and y = 0.8x - 100
    let mut edges = EdgeMap::new(800, 480);
    for offset in -1..=1 {
        let o = offset as f32;
        draw_line_segment_mut(&mut edges, (30.0, 476.0 + o), (250.0, 300.0 + o), Luma([EDGE_PX]));
        draw_line_segment_mut(&mut edges, (500.0, 300.0 + o), (720.0, 476.0 + o), Luma([EDGE_PX]));
    }

    let params = Params::default();
    let segments = detect_segments(&edges, &params);
    assert!(segments.len() >= 2);

    let mut report = ClassifyReport::default();
    let result = lanes_from_segments(&segments, 800, 480, &params, &mut report);

    let left = result.left_lane.expect("no left lane");
    let right = result.right_lane.expect("no right lane");
    assert!((left.slope + 0.8).abs() < 0.15, "left slope {}", left.slope);
    assert!((right.slope - 0.8).abs() < 0.15, "right slope {}", right.slope);

    let left_bottom = result.left_endpoints.unwrap().bottom;
    let right_bottom = result.right_endpoints.unwrap().bottom;
    let centre = result.centre.expect("no centre");

    assert_eq!(centre.x, (left_bottom.x + right_bottom.x).div_euclid(2));
    assert_eq!(centre.y, 480);
    assert!((centre.x - 375).abs() <= 20, "centre {:?}", centre);
}

#[test]
fn test_road_frame() {
    let frame = road_frame(&[LEFT_STRIPE, RIGHT_STRIPE]);
    let result = process_frame(&frame, &Params::default());

    let left = result.left_lane.expect("no left lane");
    let right = result.right_lane.expect("no right lane");
    assert!((left.slope + 0.75).abs() < 0.1, "left slope {}", left.slope);
    assert!((right.slope - 0.75).abs() < 0.1, "right slope {}", right.slope);

    // The scene is symmetric about x = 320
    let centre = result.centre.expect("no centre");
    assert!((centre.x - 320).abs() <= 20, "centre {:?}", centre);
    assert_eq!(centre.y, 480);
    assert_eq!((result.frame_width, result.frame_height), (640, 480));
}

#[test]
fn test_road_frame_single_lane() {
    let frame = road_frame(&[LEFT_STRIPE]);
    let result = process_frame(&frame, &Params::default());

    assert!(result.left_lane.is_some());
    assert!(result.left_endpoints.is_some());
    assert_eq!(result.right_lane, None);
    assert_eq!(result.right_endpoints, None);
    assert_eq!(result.centre, None);
}

#[test]
fn test_stripes_outside_roi_are_ignored() {
    // Entirely above the region of interest
    let frame = road_frame(&[((60, 200), (260, 50)), ((580, 200), (380, 50))]);
    let result = process_frame(&frame, &Params::default());

    assert_eq!(result.left_lane, None);
    assert_eq!(result.right_lane, None);
    assert_eq!(result.centre, None);
}

#[test]
fn test_uniform_frame() {
    let frame = Frame::from_pixel(640, 480, Rgb([128, 128, 128]));
    let result = process_frame(&frame, &Params::default());

    assert_eq!(result, LaneFrameResult {
        frame_width: 640,
        frame_height: 480,
        ..Default::default()
    });
}

#[test]
fn test_frame_to_steering_demand() {
    let mut lane_det = LaneDet::with_params(Params::default()).unwrap();
    let mut steer_ctrl = SteerCtrl::with_params(steer_ctrl::Params {
        k_p: 0.1,
        k_i: 0.0,
        k_d: 0.0,
        setpoint_px: 0.0,
        dropout_policy: DropoutPolicy::Skip,
    });

    let mut data = Vec::new();
    image::DynamicImage::ImageRgb8(road_frame(&[LEFT_STRIPE, RIGHT_STRIPE]))
        .write_to(&mut data, image::ImageOutputFormat::Png)
        .unwrap();
    let frame = CamFrame { timestamp: Utc::now(), format: ImageFormat::Png, data };

    let (lane, report) = lane_det.proc(&lane_det::InputData { frame }).unwrap();
    assert!(report.centre_found);
    assert!(report.num_segments >= 2);
    assert!(report.num_roi_edge_px <= report.num_edge_px);

    let centre_x = lane.centre.unwrap().x;
    let (out, rpt) = steer_ctrl.proc(&steer_ctrl::InputData { lane, dt_s: 0.1 }).unwrap();

    let lat_error = centre_x as f64 - 320.0;
    assert_eq!(rpt.lat_error_px, Some(lat_error));
    assert_eq!(out.steer_dem, Some(-(0.1 * (0.0 - lat_error))));
}

#[test]
fn test_undecodable_frame() {
    let mut lane_det = LaneDet::with_params(Params::default()).unwrap();
    let frame = CamFrame {
        timestamp: Utc::now(),
        format: ImageFormat::Jpeg(90),
        data: b"definitely not a jpeg".to_vec()
    };

    assert!(matches!(
        lane_det.proc(&lane_det::InputData { frame }),
        Err(LaneDetError::FrameDecodeError(_))
    ));
}
