//! # Lane Detection Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::Rgb;
use imageproc::{drawing::draw_polygon_mut, point::Point};

use lane_lib::lane_det::{extract_edges, process_frame, Frame, Params};

fn lane_det_benchmark(c: &mut Criterion) {
    // ---- Build a synthetic road frame ----

    let mut frame = Frame::from_pixel(640, 480, Rgb([35, 35, 40]));
    for poly in [
        [Point::new(55, 400), Point::new(255, 250), Point::new(265, 250), Point::new(65, 400)],
        [Point::new(575, 400), Point::new(375, 250), Point::new(385, 250), Point::new(585, 400)],
    ].iter() {
        draw_polygon_mut(&mut frame, poly, Rgb([240, 240, 240]));
    }

    let params = Params::default();

    // ---- Run benchmarks ----

    c.bench_function("extract_edges 640x480", |b| {
        b.iter(|| extract_edges(black_box(&frame), &params))
    });

    c.bench_function("process_frame 640x480", |b| {
        b.iter(|| process_frame(black_box(&frame), &params))
    });
}

criterion_group!(benches, lane_det_benchmark);
criterion_main!(benches);
