//! Benchmarks for the per-frame collector path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2, ArrayView2};
use slouch_detector::{
    classifier::{Classifier, FitOptions, FitReport},
    collector::{CollectorSettings, SampleCollector},
    keypoints::{BodyPart, Keypoint, RequiredKeypointSet},
    Result,
};

/// Classifier that skips training so only collector overhead is measured
struct NullClassifier;

impl Classifier for NullClassifier {
    fn input_dim(&self) -> usize {
        10
    }

    fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array1<f32>> {
        Ok(Array1::zeros(inputs.nrows()))
    }

    fn fit(&mut self, inputs: Array2<f32>, _labels: Array1<f32>, options: &FitOptions) -> Result<FitReport> {
        Ok(FitReport {
            epochs: options.epochs,
            samples: inputs.nrows(),
            final_loss: 0.0,
        })
    }
}

/// All 17 parts with jittered positions, as a pose model would report them
fn noisy_frame(shift: f32) -> Vec<Keypoint> {
    BodyPart::ALL
        .iter()
        .enumerate()
        .map(|(i, &part)| {
            let x = 150.0 + i as f32 * 20.0 + 4.0 * rand::random::<f32>();
            let y = 120.0 + shift + 4.0 * rand::random::<f32>();
            Keypoint::new(part, x, y, 0.7 + 0.3 * rand::random::<f32>())
        })
        .collect()
}

fn collector(target_size: usize) -> SampleCollector {
    SampleCollector::new(CollectorSettings {
        required: RequiredKeypointSet::default(),
        min_part_confidence: 0.6,
        frame_width: 600.0,
        target_size,
        fit_options: FitOptions::default(),
        threshold: 0.6,
    })
    .unwrap()
}

fn benchmark_keypoint_gate(c: &mut Criterion) {
    let required = RequiredKeypointSet::default();
    let frame = noisy_frame(0.0);

    c.bench_function("required_set_check", |b| {
        b.iter(|| required.check(black_box(&frame), 0.6));
    });
}

fn benchmark_collection_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_cycle");
    let frames: Vec<Vec<Keypoint>> = (0..64).map(|i| noisy_frame(i as f32)).collect();

    for target_size in [10, 50, 200] {
        let collector = collector(target_size);
        group.bench_with_input(BenchmarkId::from_parameter(target_size), &target_size, |b, &target| {
            b.iter(|| {
                let mut state = collector.new_state();
                let mut classifier = NullClassifier;
                collector.start_collection(&mut state);
                for frame in frames.iter().cycle().take(2 * target + 1) {
                    black_box(collector.submit_frame(&mut state, frame, &mut classifier).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn benchmark_prediction(c: &mut Criterion) {
    let collector = collector(50);
    let frame = noisy_frame(30.0);

    c.bench_function("predict_frame", |b| {
        b.iter(|| collector.predict(black_box(&frame), &NullClassifier).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_keypoint_gate,
    benchmark_collection_cycle,
    benchmark_prediction
);
criterion_main!(benches);
