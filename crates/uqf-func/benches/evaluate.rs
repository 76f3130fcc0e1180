use criterion::{criterion_group, criterion_main, Criterion};
use uqf_core::{Matrix, Point, Sample};
use uqf_func::{
    CenteredFiniteDifferenceGradient, ClosureEvaluation, FiniteDifferenceGradient, Function,
    GradientImplementation, LinearEvaluation,
};

fn build_model() -> Function {
    let weights = Matrix::from_fn(4, 4, |i, j| 1.0 / (1.0 + i as f64 + j as f64));
    let linear = Function::new(
        LinearEvaluation::new(Point::zeros(4), Point::filled(4, 1.0), weights).unwrap(),
    );
    let nonlinear = Function::new(ClosureEvaluation::from_fn(4, 2, |x| {
        Point::from(vec![x[0].exp() + x[1] * x[2], (x[3] * x[0]).cos()])
    }));
    nonlinear.compose(&linear).unwrap()
}

fn bench_point(c: &mut Criterion) {
    let model = build_model();
    let x = Point::from(vec![0.1, 0.2, 0.3, 0.4]);
    c.bench_function("composed_point", |b| {
        b.iter(|| {
            let _ = model.evaluate(&x).unwrap();
        });
    });
}

fn bench_sample(c: &mut Criterion) {
    let model = build_model();
    let rows: Vec<[f64; 4]> = (0..256)
        .map(|i| {
            let t = i as f64 / 256.0;
            [t, 1.0 - t, t * t, 0.5]
        })
        .collect();
    let xs = Sample::from_rows(4, &rows).unwrap();
    c.bench_function("composed_sample_256", |b| {
        b.iter(|| {
            let _ = model.evaluate_sample(&xs).unwrap();
        });
    });
}

fn bench_gradient(c: &mut Criterion) {
    let engine =
        CenteredFiniteDifferenceGradient::new(FiniteDifferenceGradient::new(build_model()).unwrap());
    let x = Point::from(vec![0.1, 0.2, 0.3, 0.4]);
    c.bench_function("centered_gradient", |b| {
        b.iter(|| {
            let _ = engine.gradient(&x).unwrap();
        });
    });
}

criterion_group!(benches, bench_point, bench_sample, bench_gradient);
criterion_main!(benches);
