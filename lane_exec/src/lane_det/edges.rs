//! Edge extraction
//!
//! Blur, intensity conversion and a two threshold (Canny) edge detector. The
//! gradients come from `imageproc`'s Sobel filters, the suppression and
//! hysteresis stages are implemented here since `imageproc::edges::canny`
//! applies its own gaussian blur.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{GrayImage, Luma, Rgb};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use super::{EdgeMap, Frame, Params, EDGE_PX};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fixed point shift used in the direction tests of the suppression stage.
const DIR_SHIFT: i64 = 15;

/// tan(22.5 deg) in `DIR_SHIFT` fixed point.
const TAN_22_5: i64 = 13573;

/// Fixed point intensity weights for R, G and B, summing to 2^14.
const INTENSITY_WEIGHTS: [u32; 3] = [4899, 9617, 1868];
const INTENSITY_SHIFT: u32 = 14;

/// Largest blur kernel whose fixed point sums fit in a `u64`. The weights of
/// a size `k` kernel sum to `2^(2(k-1))` over both passes.
pub const MAX_BLUR_KERNEL_SIZE: usize = 29;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a frame into a binary edge map.
///
/// A uniform or empty frame gives an edge map with no edge pixels.
pub fn extract_edges(frame: &Frame, params: &Params) -> EdgeMap {
    let blurred = binomial_blur(frame, params.blur_kernel_size);
    let intensity = to_intensity(&blurred);
    canny(&intensity, params.canny_low, params.canny_high)
}

/// Smooth each channel of the frame with a square binomial kernel of the
/// given (odd) size. Borders are reflected without repeating the edge pixel.
///
/// Sizes above `MAX_BLUR_KERNEL_SIZE` are reduced to it.
pub fn binomial_blur(frame: &Frame, kernel_size: usize) -> Frame {
    let (width, height) = frame.dimensions();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return frame.clone();
    }
    let kernel_size = kernel_size.min(MAX_BLUR_KERNEL_SIZE);

    let kernel = binomial_kernel(kernel_size);
    let radius = (kernel_size / 2) as i64;
    let shift = 2 * (kernel_size as u32 - 1);
    let (w, h) = (width as usize, height as usize);

    // Horizontal pass, kept at full precision
    let mut rows = vec![[0u64; 3]; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - radius, w);
                let px = frame.get_pixel(sx as u32, y as u32);
                for c in 0..3 {
                    acc[c] += weight * px[c] as u64;
                }
            }
            rows[y * w + x] = acc;
        }
    }

    // Vertical pass with rounding back to 8 bits
    let half = 1u64 << (shift - 1);
    let mut blurred = Frame::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect_101(y as i64 + k as i64 - radius, h);
                let row = &rows[sy * w + x];
                for c in 0..3 {
                    acc[c] += weight * row[c];
                }
            }
            let mut px = [0u8; 3];
            for c in 0..3 {
                px[c] = ((acc[c] + half) >> shift).min(255) as u8;
            }
            blurred.put_pixel(x as u32, y as u32, Rgb(px));
        }
    }

    blurred
}

/// Convert a colour frame into 8-bit intensity.
pub fn to_intensity(frame: &Frame) -> GrayImage {
    let half = 1u32 << (INTENSITY_SHIFT - 1);

    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let px = frame.get_pixel(x, y);
        let sum: u32 = INTENSITY_WEIGHTS.iter()
            .zip(px.0.iter())
            .map(|(w, &c)| w * c as u32)
            .sum();
        Luma([((sum + half) >> INTENSITY_SHIFT) as u8])
    })
}

/// Two threshold edge detector on an intensity image.
///
/// Gradient magnitude is the L1 norm of the Sobel responses. Pixels which are
/// local maxima along the gradient direction and above `high` are edges, as
/// are maxima above `low` connected to them through other such maxima.
pub fn canny(image: &GrayImage, low: f64, high: f64) -> EdgeMap {
    let (width, height) = image.dimensions();
    let mut edges = EdgeMap::new(width, height);
    if width == 0 || height == 0 {
        return edges;
    }

    let (w, h) = (width as usize, height as usize);
    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);

    let dx: Vec<i32> = gx.pixels().map(|p| p[0] as i32).collect();
    let dy: Vec<i32> = gy.pixels().map(|p| p[0] as i32).collect();
    let mag: Vec<i32> = dx.iter().zip(dy.iter()).map(|(x, y)| x.abs() + y.abs()).collect();

    let low = low.floor() as i32;
    let high = high.floor() as i32;

    let mag_at = |x: i64, y: i64| -> i32 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            0
        }
        else {
            mag[y as usize * w + x as usize]
        }
    };

    // ---- NON-MAXIMUM SUPPRESSION ----

    let mut map = vec![PxClass::NotEdge; w * h];
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let m = mag[i];
            if m <= low {
                continue;
            }

            let (xi, yi) = (x as i64, y as i64);
            let xs = dx[i] as i64;
            let ys = dy[i] as i64;
            let ax = xs.abs();
            let ay = ys.abs() << DIR_SHIFT;

            let tg22x = ax * TAN_22_5;
            let is_max = if ay < tg22x {
                // Gradient mostly horizontal
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            }
            else {
                let tg67x = tg22x + (ax << (DIR_SHIFT + 1));
                if ay > tg67x {
                    // Gradient mostly vertical
                    m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
                }
                else {
                    let s = if (xs ^ ys) < 0 { -1 } else { 1 };
                    m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
                }
            };

            if !is_max {
                continue;
            }

            if m > high {
                map[i] = PxClass::Edge;
                stack.push(i);
            }
            else {
                map[i] = PxClass::Candidate;
            }
        }
    }

    // ---- HYSTERESIS ----

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as i64, (i / w) as i64);
        for ny in (y - 1)..=(y + 1) {
            for nx in (x - 1)..=(x + 1) {
                if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if map[j] == PxClass::Candidate {
                    map[j] = PxClass::Edge;
                    stack.push(j);
                }
            }
        }
    }

    for (i, class) in map.iter().enumerate() {
        if *class == PxClass::Edge {
            edges.put_pixel((i % w) as u32, (i / w) as u32, Luma([EDGE_PX]));
        }
    }

    edges
}

// ---------------------------------------------------------------------------
// PRIVATE ITEMS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PxClass {
    NotEdge,
    Candidate,
    Edge,
}

/// Row `size - 1` of Pascal's triangle.
fn binomial_kernel(size: usize) -> Vec<u64> {
    let mut kernel = vec![1u64];
    for _ in 1..size {
        let mut next = vec![1u64; kernel.len() + 1];
        for i in 1..kernel.len() {
            next[i] = kernel[i - 1] + kernel[i];
        }
        kernel = next;
    }
    kernel
}

/// Reflect an out of range index back into `0..len`, i.e. `dcb|abcd|cba`.
fn reflect_101(mut i: i64, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as i64 - 1;
    loop {
        if i < 0 {
            i = -i;
        }
        else if i > last {
            i = 2 * last - i;
        }
        else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn step_frame(width: u32, height: u32, step_x: u32) -> Frame {
        Frame::from_fn(width, height, |x, _| {
            if x < step_x { Rgb([20, 20, 20]) } else { Rgb([230, 230, 230]) }
        })
    }

    #[test]
    fn test_kernel() {
        assert_eq!(binomial_kernel(1), vec![1]);
        assert_eq!(binomial_kernel(5), vec![1, 4, 6, 4, 1]);
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-2, 1), 0);
        assert_eq!(reflect_101(-3, 2), 1);
    }

    #[test]
    fn test_intensity() {
        let frame = Frame::from_fn(3, 1, |x, _| match x {
            0 => Rgb([0, 0, 0]),
            1 => Rgb([255, 255, 255]),
            _ => Rgb([255, 0, 0]),
        });
        let gray = to_intensity(&frame);

        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 255);
        assert_eq!(gray.get_pixel(2, 0)[0], 76);
    }

    #[test]
    fn test_blur_uniform() {
        let frame = Frame::from_pixel(16, 9, Rgb([10, 128, 250]));
        assert_eq!(binomial_blur(&frame, 5), frame);
    }

    #[test]
    fn test_blur_largest_kernel() {
        let frame = Frame::from_pixel(40, 40, Rgb([255, 255, 255]));
        assert_eq!(binomial_blur(&frame, MAX_BLUR_KERNEL_SIZE), frame);

        // Oversized kernels are reduced rather than overflowing
        assert_eq!(binomial_blur(&frame, 33), frame);
    }

    #[test]
    fn test_uniform_frame_has_no_edges() {
        let frame = Frame::from_pixel(64, 48, Rgb([90, 90, 90]));
        let edges = extract_edges(&frame, &Params::default());

        assert_eq!(edges.dimensions(), (64, 48));
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new(0, 0);
        let edges = extract_edges(&frame, &Params::default());
        assert_eq!(edges.dimensions(), (0, 0));
    }

    #[test]
    fn test_step_edge() {
        let frame = step_frame(64, 48, 32);
        let edges = extract_edges(&frame, &Params::default());

        for y in 0..48 {
            let cols: Vec<u32> = (0..64).filter(|&x| edges.get_pixel(x, y)[0] == EDGE_PX).collect();

            // A single thin edge next to the step in every row
            assert!(!cols.is_empty(), "no edge in row {}", y);
            assert!(cols.len() <= 2, "thick edge in row {}: {:?}", y, cols);
            assert!(cols.iter().all(|&x| x >= 30 && x <= 33));
        }

        assert!(edges.pixels().all(|p| p[0] == 0 || p[0] == EDGE_PX));
    }

    #[test]
    fn test_weak_step_below_threshold() {
        // Gradient of a 10 level step never exceeds the low threshold
        let frame = Frame::from_fn(32, 32, |x, _| {
            if x < 16 { Rgb([100, 100, 100]) } else { Rgb([110, 110, 110]) }
        });
        let edges = extract_edges(&frame, &Params::default());
        assert!(edges.pixels().all(|p| p[0] == 0));
    }
}
