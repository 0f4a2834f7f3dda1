use criterion::{black_box, criterion_group, criterion_main, Criterion};

use clubhead_core::{GrayImage, Landmark, PoseLandmarks, Roi};
use clubhead_detector::{
    detect_edges, extract_lines, preprocess_roi, ClubHeadDetector, DetectorParams, EdgeParams,
    HoughParams, PreprocessParams,
};

const W: usize = 640;
const H: usize = 480;

fn pose() -> PoseLandmarks {
    PoseLandmarks {
        left_wrist: Some(Landmark::new(0.40, 0.60, 0.9)),
        right_wrist: Some(Landmark::new(0.60, 0.60, 0.9)),
        left_elbow: Some(Landmark::new(0.35, 0.50, 0.9)),
        right_elbow: Some(Landmark::new(0.65, 0.50, 0.9)),
    }
}

fn shaft_image() -> GrayImage {
    let mut img = GrayImage::new(W, H);
    img.data.fill(20);
    let (sin, cos) = 50f32.to_radians().sin_cos();
    let (gx, gy) = (320.0f32, 288.0f32);
    for i in 0..=440 {
        let t = i as f32 * 0.5;
        let (x, y) = (gx + cos * t, gy + sin * t);
        for dy in -2..=2 {
            for dx in -2..=2 {
                let (px, py) = (x.round() as i64 + dx, y.round() as i64 + dy);
                if px >= 0 && py >= 0 {
                    img.set(px as usize, py as usize, 230);
                }
            }
        }
    }
    img
}

fn bench_stages(c: &mut Criterion) {
    let img = shaft_image();
    let roi = Roi {
        x: 32,
        y: 48,
        w: 576,
        h: 432,
    };
    let patch = preprocess_roi(&img, &roi, &PreprocessParams::default());
    let edges = detect_edges(&patch, &EdgeParams::default());

    c.bench_function("edges_576x432", |b| {
        b.iter(|| detect_edges(black_box(&patch), &EdgeParams::default()))
    });
    c.bench_function("hough_banded", |b| {
        b.iter(|| extract_lines(black_box(&edges), Some(56.0), &HoughParams::default()))
    });
    c.bench_function("hough_full", |b| {
        b.iter(|| extract_lines(black_box(&edges), None, &HoughParams::default()))
    });
}

fn bench_frame(c: &mut Criterion) {
    let img = shaft_image();
    let pose = pose();
    c.bench_function("detect_frame_640x480", |b| {
        let mut det = ClubHeadDetector::new(DetectorParams::default()).expect("detector");
        det.init(W, H).expect("init");
        b.iter(|| {
            det.detect_gray(black_box(img.clone()), &pose, 0.2)
                .expect("detect")
        })
    });
}

criterion_group!(benches, bench_stages, bench_frame);
criterion_main!(benches);
