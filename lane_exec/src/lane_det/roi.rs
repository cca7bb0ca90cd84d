//! Region of interest masking

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use super::{EdgeMap, Params, RoiScaling};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the ROI polygon for a frame of the given size.
pub fn roi_polygon(params: &Params, width: u32, height: u32) -> Vec<Point<i32>> {
    match params.roi_scaling {
        RoiScaling::Fixed => params.roi_vertices_px
            .iter()
            .map(|v| Point::new(v[0], v[1]))
            .collect(),
        RoiScaling::Relative => {
            let sx = width as f64 / params.roi_ref_resolution[0] as f64;
            let sy = height as f64 / params.roi_ref_resolution[1] as f64;
            params.roi_vertices_px
                .iter()
                .map(|v| Point::new(
                    (v[0] as f64 * sx).round() as i32,
                    (v[1] as f64 * sy).round() as i32
                ))
                .collect()
        }
    }
}

/// Zero every edge pixel outside the polygon.
///
/// Pixels on the polygon boundary are inside. Vertices may lie outside the
/// frame, in which case the polygon is clipped to it. A polygon with fewer than three distinct
/// vertices covers nothing.
pub fn apply_region_mask(edges: &EdgeMap, polygon: &[Point<i32>]) -> EdgeMap {
    let (width, height) = edges.dimensions();
    let mask = region_mask(width, height, polygon);

    EdgeMap::from_fn(width, height, |x, y| {
        Luma([edges.get_pixel(x, y)[0] & mask.get_pixel(x, y)[0]])
    })
}

/// Rasterise the polygon into a mask, inside pixels are 255.
pub fn region_mask(width: u32, height: u32, polygon: &[Point<i32>]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let poly = open_polygon(&clip_to_frame(polygon, width, height));
    if poly.len() >= 3 {
        draw_polygon_mut(&mut mask, &poly, Luma([255u8]));
    }

    mask
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Clip the polygon to the frame rectangle (Sutherland-Hodgman), so that the
/// rasteriser never sees an out of bounds vertex.
fn clip_to_frame(polygon: &[Point<i32>], width: u32, height: u32) -> Vec<Point<i32>> {
    let x_max = (width - 1) as f64;
    let y_max = (height - 1) as f64;

    // Each boundary as (axis, limit, keep_less_than)
    let boundaries = [(0, 0.0, false), (0, x_max, true), (1, 0.0, false), (1, y_max, true)];

    let mut poly: Vec<[f64; 2]> = polygon.iter().map(|p| [p.x as f64, p.y as f64]).collect();

    for &(axis, limit, keep_less) in boundaries.iter() {
        if poly.is_empty() {
            break;
        }
        let inside = |p: &[f64; 2]| if keep_less { p[axis] <= limit } else { p[axis] >= limit };

        let mut clipped = Vec::with_capacity(poly.len() + 2);
        for i in 0..poly.len() {
            let curr = poly[i];
            let prev = poly[(i + poly.len() - 1) % poly.len()];

            if inside(&curr) {
                if !inside(&prev) {
                    clipped.push(intersect(prev, curr, axis, limit));
                }
                clipped.push(curr);
            }
            else if inside(&prev) {
                clipped.push(intersect(prev, curr, axis, limit));
            }
        }
        poly = clipped;
    }

    poly.iter()
        .map(|p| Point::new(p[0].round() as i32, p[1].round() as i32))
        .collect()
}

/// Point on the segment `a`-`b` where coordinate `axis` equals `limit`.
fn intersect(a: [f64; 2], b: [f64; 2], axis: usize, limit: f64) -> [f64; 2] {
    let t = (limit - a[axis]) / (b[axis] - a[axis]);
    [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]
}

/// Remove repeated consecutive vertices, including a closing vertex equal to
/// the first one, which `draw_polygon_mut` does not accept.
fn open_polygon(polygon: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut poly: Vec<Point<i32>> = Vec::with_capacity(polygon.len());
    for p in polygon {
        if poly.last() != Some(p) {
            poly.push(*p);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    poly
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lane_det::EDGE_PX;

    fn full_edges(width: u32, height: u32) -> EdgeMap {
        EdgeMap::from_pixel(width, height, Luma([EDGE_PX]))
    }

    #[test]
    fn test_default_polygon() {
        let params = Params::default();
        let poly = roi_polygon(&params, 1280, 960);

        // Fixed scaling ignores the frame size
        assert_eq!(poly, vec![
            Point::new(0, 380), Point::new(0, 270), Point::new(520, 270), Point::new(633, 380)
        ]);
    }

    #[test]
    fn test_relative_polygon() {
        let mut params = Params::default();
        params.roi_scaling = RoiScaling::Relative;
        let poly = roi_polygon(&params, 1280, 960);

        assert_eq!(poly, vec![
            Point::new(0, 760), Point::new(0, 540), Point::new(1040, 540), Point::new(1266, 760)
        ]);
    }

    #[test]
    fn test_mask_default_roi() {
        let params = Params::default();
        let edges = full_edges(640, 480);
        let masked = apply_region_mask(&edges, &roi_polygon(&params, 640, 480));

        // Inside the trapezoid
        assert_eq!(masked.get_pixel(300, 300)[0], EDGE_PX);
        assert_eq!(masked.get_pixel(10, 375)[0], EDGE_PX);

        // Above, below and to the right of it
        assert_eq!(masked.get_pixel(300, 100)[0], 0);
        assert_eq!(masked.get_pixel(300, 450)[0], 0);
        assert_eq!(masked.get_pixel(639, 300)[0], 0);
    }

    #[test]
    fn test_mask_keeps_zero() {
        let edges = EdgeMap::new(50, 50);
        let poly = vec![Point::new(0, 0), Point::new(49, 0), Point::new(49, 49), Point::new(0, 49)];
        let masked = apply_region_mask(&edges, &poly);
        assert!(masked.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_degenerate_polygons() {
        let edges = full_edges(20, 20);

        let closed = vec![Point::new(0, 0), Point::new(19, 0), Point::new(19, 19), Point::new(0, 0)];
        let masked = apply_region_mask(&edges, &closed);
        assert_eq!(masked.get_pixel(15, 5)[0], EDGE_PX);

        let line = vec![Point::new(0, 0), Point::new(19, 19)];
        let masked = apply_region_mask(&edges, &line);
        assert!(masked.pixels().all(|p| p[0] == 0));

        let empty = apply_region_mask(&EdgeMap::new(0, 0), &closed);
        assert_eq!(empty.dimensions(), (0, 0));
    }

    #[test]
    fn test_clip() {
        let poly = vec![Point::new(-10, 5), Point::new(30, 5), Point::new(30, 15)];
        let clipped = clip_to_frame(&poly, 20, 20);

        assert!(clipped.iter().all(|p| p.x >= 0 && p.x <= 19 && p.y >= 0 && p.y <= 19));
        assert!(clipped.contains(&Point::new(0, 5)));
        assert!(clipped.contains(&Point::new(19, 5)));
    }

    #[test]
    fn test_default_roi_small_frame() {
        let params = Params::default();
        let edges = full_edges(320, 240);
        let masked = apply_region_mask(&edges, &roi_polygon(&params, 320, 240));

        // With fixed scaling the default ROI lies entirely below this frame
        assert!(masked.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_polygon_outside_frame() {
        let edges = full_edges(20, 20);
        let poly = vec![Point::new(-50, -50), Point::new(100, -50), Point::new(100, 100), Point::new(-50, 100)];
        let masked = apply_region_mask(&edges, &poly);
        assert!(masked.pixels().all(|p| p[0] == EDGE_PX));
    }
}
