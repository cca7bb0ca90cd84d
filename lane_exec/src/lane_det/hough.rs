//! Probabilistic Hough line segment detection
//!
//! Edge pixels are visited in a random (seeded) order. Each one votes into a
//! (theta, rho) accumulator, and as soon as a bin reaches the vote threshold
//! the corresponding line is walked in both directions from the pixel,
//! bridging gaps up to the allowed size. The pixels covered by the walk are
//! removed from the edge set and, if the segment is accepted, their votes are
//! withdrawn from the accumulator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{EdgeMap, LineSegment, Params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fixed point shift used when walking along a line.
const WALK_SHIFT: u32 = 16;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vote accumulator and the trigonometric table it is indexed through.
struct Accumulator {
    votes: Array2<i32>,

    /// `(cos(theta)/rho, sin(theta)/rho)` per angle bin.
    trig: Vec<(f32, f32)>,

    num_rho: usize,
}

impl Accumulator {
    fn new(width: u32, height: u32, rho: f64, theta: f64) -> Self {
        let num_angle = ((std::f64::consts::PI / theta).round() as usize).max(1);
        let num_rho = ((((width + height) * 2 + 1) as f64 / rho).round() as usize).max(1);

        let trig = (0..num_angle)
            .map(|n| {
                let angle = n as f64 * theta;
                ((angle.cos() / rho) as f32, (angle.sin() / rho) as f32)
            })
            .collect();

        Self {
            votes: Array2::zeros((num_angle, num_rho)),
            trig,
            num_rho,
        }
    }

    fn rho_index(&self, n: usize, x: i32, y: i32) -> usize {
        let (cos, sin) = self.trig[n];
        let r = (x as f32 * cos + y as f32 * sin).round() as i64 + (self.num_rho as i64 - 1) / 2;
        r.max(0).min(self.num_rho as i64 - 1) as usize
    }

    /// Add the votes for a point, returning the angle bin with the most votes
    /// and its count.
    fn vote(&mut self, x: i32, y: i32) -> (usize, i32) {
        let mut max_votes = i32::MIN;
        let mut max_n = 0;

        for n in 0..self.trig.len() {
            let r = self.rho_index(n, x, y);
            let v = &mut self.votes[[n, r]];
            *v += 1;
            if *v > max_votes {
                max_votes = *v;
                max_n = n;
            }
        }

        (max_n, max_votes)
    }

    fn unvote(&mut self, x: i32, y: i32) {
        for n in 0..self.trig.len() {
            let r = self.rho_index(n, x, y);
            self.votes[[n, r]] -= 1;
        }
    }
}

/// A fixed point walk along a line from a start pixel.
#[derive(Clone, Copy)]
struct Walk {
    /// True if x is the major axis, stepping one pixel at a time.
    x_major: bool,
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
}

impl Walk {
    fn new(acc: &Accumulator, n: usize, x: i32, y: i32) -> Self {
        let (cos, sin) = acc.trig[n];

        // Direction along the line is perpendicular to its normal
        let a = -sin;
        let b = cos;
        let (x, y) = (x as i64, y as i64);
        let one = (1i64 << WALK_SHIFT) as f32;
        let half = 1i64 << (WALK_SHIFT - 1);

        if a.abs() > b.abs() {
            Self {
                x_major: true,
                x0: x,
                y0: (y << WALK_SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round() as i64,
            }
        }
        else {
            Self {
                x_major: false,
                x0: (x << WALK_SHIFT) + half,
                y0: y,
                dx: (a * one / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
            }
        }
    }

    /// Pixel coordinates of step `k` in direction `sign`.
    fn pixel(&self, k: i32, sign: i32) -> (i32, i32) {
        let step = (sign * k) as i64;
        let x = self.x0 + step * self.dx;
        let y = self.y0 + step * self.dy;
        let (x, y) = if self.x_major {
            (x, y >> WALK_SHIFT)
        }
        else {
            (x >> WALK_SHIFT, y)
        };
        (x as i32, y as i32)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Detect straight line segments in a binary edge map.
///
/// Output order is the order of detection. The same edge map and parameters
/// always produce the same segments.
pub fn detect_segments(edges: &EdgeMap, params: &Params) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    let mut segments = Vec::new();
    if width == 0 || height == 0 {
        return segments;
    }

    let (w, h) = (width as i32, height as i32);
    let threshold = params.hough_threshold as i32;
    let min_length = params.hough_min_line_length_px as i32;
    let max_gap = params.hough_max_line_gap_px as i32;
    let max_lines = params.hough_max_lines.unwrap_or(usize::MAX);

    if max_lines == 0 {
        return segments;
    }

    let mut acc = Accumulator::new(width, height, params.hough_rho_px, params.hough_theta_rad);
    let mut rng = StdRng::seed_from_u64(params.hough_seed);

    // Pixels still available for new segments
    let mut mask: Vec<bool> = edges.pixels().map(|p| p[0] != 0).collect();
    let mut points: Vec<(i32, i32)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] != 0)
        .map(|(x, y, _)| (x as i32, y as i32))
        .collect();

    let in_frame = |x: i32, y: i32| x >= 0 && y >= 0 && x < w && y < h;
    let idx = |x: i32, y: i32| y as usize * width as usize + x as usize;

    while !points.is_empty() {
        let (x, y) = points.swap_remove(rng.gen_range(0..points.len()));

        // Already taken by another segment
        if !mask[idx(x, y)] {
            continue;
        }

        let (max_n, max_votes) = acc.vote(x, y);
        if max_votes < threshold {
            continue;
        }

        let walk = Walk::new(&acc, max_n, x, y);

        // Find the ends of the segment in both directions
        let mut ends = [(x, y); 2];
        for (end, &sign) in ends.iter_mut().zip([1, -1].iter()) {
            let mut gap = 0;
            for k in 0.. {
                let (px, py) = walk.pixel(k, sign);
                if !in_frame(px, py) {
                    break;
                }
                if mask[idx(px, py)] {
                    gap = 0;
                    *end = (px, py);
                }
                else {
                    gap += 1;
                    if gap > max_gap {
                        break;
                    }
                }
            }
        }

        let good_line = (ends[1].0 - ends[0].0).abs() >= min_length
            || (ends[1].1 - ends[0].1).abs() >= min_length;

        // Remove the segment's pixels, withdrawing their votes if it is kept
        for (end, &sign) in ends.iter().zip([1, -1].iter()) {
            for k in 0.. {
                let (px, py) = walk.pixel(k, sign);
                if !in_frame(px, py) {
                    break;
                }
                let i = idx(px, py);
                if mask[i] {
                    if good_line {
                        acc.unvote(px, py);
                    }
                    mask[i] = false;
                }
                if (px, py) == *end {
                    break;
                }
            }
        }

        if good_line {
            let seg = LineSegment::new(ends[0].0, ends[0].1, ends[1].0, ends[1].1);
            trace!("Hough segment {:?} ({} votes)", seg, max_votes);
            segments.push(seg);

            if segments.len() >= max_lines {
                break;
            }
        }
    }

    segments
}
