//! Benchmarks for the dense classifier head

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use slouch_detector::classifier::{dense::DenseClassifier, Activation, Classifier, FitOptions};

/// Two noisy clusters, half labeled slouching
fn dataset(samples_per_class: usize, features: usize) -> (Array2<f32>, Array1<f32>) {
    let rows = 2 * samples_per_class;
    let inputs = Array2::from_shape_fn((rows, features), |(row, _)| {
        let center = if row < samples_per_class { 0.45 } else { 0.25 };
        center + 0.05 * rand::random::<f32>()
    });
    let labels = Array1::from_shape_fn(rows, |row| if row < samples_per_class { 1.0 } else { 0.0 });
    (inputs, labels)
}

fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(20);

    for samples_per_class in [10, 50, 100] {
        let (inputs, labels) = dataset(samples_per_class, 10);
        group.bench_with_input(
            BenchmarkId::from_parameter(samples_per_class),
            &samples_per_class,
            |b, _| {
                b.iter(|| {
                    let mut model = DenseClassifier::new(10, 24, Activation::Linear, 0.001, Some(7)).unwrap();
                    model
                        .fit(inputs.clone(), labels.clone(), &FitOptions::default())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    let model = DenseClassifier::new(10, 24, Activation::Relu, 0.001, Some(7)).unwrap();

    for rows in [1, 32] {
        let (inputs, _) = dataset(rows, 10);
        let inputs = inputs.slice(ndarray::s![..rows, ..]).to_owned();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &inputs, |b, inputs| {
            b.iter(|| model.predict(black_box(inputs.view())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_fit, benchmark_predict);
criterion_main!(benches);
