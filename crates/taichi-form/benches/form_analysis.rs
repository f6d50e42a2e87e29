//! Benchmarks for form analysis.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use taichi_core::{Landmark, PoseFrame, PoseLandmark, SavitzkyGolayFilter};
use taichi_form::FormAnalyzer;

fn create_practice_sequence(n_frames: u64) -> Vec<PoseFrame> {
    (0..n_frames)
        .map(|i| {
            let t = i as f64 / 30.0;
            let sway = 0.01 * (t * 0.5).sin();
            let mut points: Vec<Landmark> = (0..PoseLandmark::COUNT)
                .map(|j| Landmark::new(0.5 + sway, 0.1 + j as f64 * 0.025, 0.0, 0.9))
                .collect();

            points[PoseLandmark::LeftWrist.index()] =
                Landmark::new(0.35 + 0.1 * t.sin(), 0.45 - 0.1 * t.cos(), 0.0, 0.9);
            points[PoseLandmark::RightWrist.index()] =
                Landmark::new(0.65 - 0.1 * t.sin(), 0.45 - 0.1 * t.cos(), 0.0, 0.9);
            points[PoseLandmark::LeftAnkle.index()] = Landmark::new(0.42, 0.9, 0.0, 0.9);
            points[PoseLandmark::RightAnkle.index()] = Landmark::new(0.58, 0.9, 0.0, 0.9);

            // Every 25th frame simulates a detection failure
            if i % 25 == 24 {
                PoseFrame::missing(i, t)
            } else {
                PoseFrame::detected(i, t, points)
            }
        })
        .collect()
}

fn benchmark_sequence_analysis(c: &mut Criterion) {
    let analyzer = FormAnalyzer::new();
    let sequence = create_practice_sequence(300);

    c.bench_function("analyze_sequence_300", |b| {
        b.iter(|| analyzer.analyze_sequence(black_box(&sequence)))
    });

    c.bench_function("compare_yang_24_300", |b| {
        b.iter(|| analyzer.compare_with_reference(black_box(&sequence), "yang_24"))
    });
}

fn benchmark_realtime(c: &mut Criterion) {
    let analyzer = FormAnalyzer::new();
    let sequence = create_practice_sequence(1);
    let landmarks = sequence[0].landmarks.clone().unwrap_or_default();

    c.bench_function("realtime_feedback", |b| {
        b.iter(|| analyzer.get_realtime_feedback(black_box(&landmarks)))
    });
}

fn benchmark_smoothing(c: &mut Criterion) {
    let filter = SavitzkyGolayFilter::new(5, 2).expect("valid filter parameters");
    let signal: Vec<f64> = (0..300)
        .map(|i| (i as f64 * 0.05).sin() + if i % 7 == 0 { 0.01 } else { 0.0 })
        .collect();

    c.bench_function("savitzky_golay_300", |b| {
        b.iter(|| filter.filter_signal(black_box(&signal)))
    });
}

criterion_group!(
    benches,
    benchmark_sequence_analysis,
    benchmark_realtime,
    benchmark_smoothing
);
criterion_main!(benches);
