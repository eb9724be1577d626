//! Benchmarks for SMO training and one-vs-one classification.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ksvm::kernel::KernelMatrix;
use ksvm::{BinaryClassifier, Classifier, MultiClassSVM, RBFKernel, SvmConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `per_class` noisy points around each of `classes` centroids on a diagonal
fn blobs(per_class: usize, classes: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(per_class * classes);
    let mut labels = Vec::with_capacity(per_class * classes);
    for class in 0..classes {
        let center = class as f64 * 5.0;
        for _ in 0..per_class {
            data.push(vec![
                center + rng.gen_range(-1.0..1.0),
                center + rng.gen_range(-1.0..1.0),
            ]);
            labels.push(class);
        }
    }
    (data, labels)
}

fn config() -> SvmConfig {
    SvmConfig {
        seed: Some(42),
        ..SvmConfig::default()
    }
}

fn bench_kernel_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_matrix");

    for size in [50, 100, 200].iter() {
        let (data, _) = blobs(*size / 2, 2, 1);
        let kernel = RBFKernel::new(0.5);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| KernelMatrix::compute(black_box(&kernel), black_box(&data)));
        });
    }

    group.finish();
}

fn bench_binary_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary_training");
    group.sample_size(20);

    for size in [50, 100, 200].iter() {
        let (data, labels) = blobs(*size / 2, 2, 2);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut classifier = BinaryClassifier::new(RBFKernel::new(0.5), config());
                classifier
                    .train(black_box(&data), black_box(&labels))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_multiclass(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiclass");
    group.sample_size(20);

    for classes in [3, 5].iter() {
        let (data, labels) = blobs(30, *classes, 3);

        group.bench_with_input(BenchmarkId::new("train", classes), classes, |b, &k| {
            b.iter(|| {
                MultiClassSVM::with_training(
                    RBFKernel::new(0.5),
                    config(),
                    black_box(&data),
                    black_box(&labels),
                    k,
                )
                .unwrap()
            });
        });

        let model =
            MultiClassSVM::with_training(RBFKernel::new(0.5), config(), &data, &labels, *classes)
                .unwrap();
        group.bench_with_input(BenchmarkId::new("classify", classes), classes, |b, _| {
            b.iter(|| model.classify(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_kernel_matrix,
    bench_binary_training,
    bench_multiclass
);
criterion_main!(benches);
