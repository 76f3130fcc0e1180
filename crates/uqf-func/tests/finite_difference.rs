use proptest::prelude::*;
use uqf_core::{Point, UqfError};
use uqf_func::{
    BlendedStep, CenteredFiniteDifferenceGradient, CenteredFiniteDifferenceHessian,
    ClosureEvaluation, ConstantStep, DifferentiationOpts, FiniteDifferenceGradient,
    FiniteDifferenceHessian, FiniteDifferenceStep, Function, GradientImplementation,
    HessianImplementation, NonCenteredFiniteDifferenceGradient, StepPolicy,
};

/// `(x, y) -> (x^2 y, sin x)`.
fn model() -> Function {
    Function::new(ClosureEvaluation::from_fn(2, 2, |x| {
        Point::from(vec![x[0] * x[0] * x[1], x[0].sin()])
    }))
}

fn at() -> Point {
    Point::from(vec![1.0, 2.0])
}

#[test]
fn centered_gradient_is_accurate() {
    let f = model();
    let engine = CenteredFiniteDifferenceGradient::new(FiniteDifferenceGradient::new(f.clone()).unwrap());
    let gradient = engine.gradient(&at()).unwrap();
    assert_eq!((gradient.nrows(), gradient.ncols()), (2, 2));
    assert!((gradient[(0, 0)] - 4.0).abs() < 1e-6);
    assert!((gradient[(1, 0)] - 1.0).abs() < 1e-6);
    assert!((gradient[(0, 1)] - 1.0f64.cos()).abs() < 1e-6);
    assert!(gradient[(1, 1)].abs() < 1e-6);
    assert_eq!(f.calls_number(), 4);
}

#[test]
fn forward_gradient_is_first_order() {
    let f = model();
    let base = FiniteDifferenceGradient::from_scalar(1e-6, f.clone()).unwrap();
    let engine = NonCenteredFiniteDifferenceGradient::new(base);
    let gradient = engine.gradient(&at()).unwrap();
    assert!((gradient[(0, 0)] - 4.0).abs() < 1e-4);
    assert!((gradient[(1, 0)] - 1.0).abs() < 1e-4);
    assert!((gradient[(0, 1)] - 1.0f64.cos()).abs() < 1e-4);
    assert_eq!(f.calls_number(), 3);
}

#[test]
fn centered_hessian_uses_one_batch() {
    let f = model();
    let base = FiniteDifferenceHessian::from_epsilon(Point::from(vec![1e-4, 2e-4]), f.clone()).unwrap();
    let engine = CenteredFiniteDifferenceHessian::new(base);
    let hessian = engine.hessian(&at()).unwrap();
    assert_eq!((hessian.size(), hessian.sheets()), (2, 2));

    let expected = [[[4.0, 2.0], [2.0, 0.0]], [[-(1.0f64.sin()), 0.0], [0.0, 0.0]]];
    for (k, sheet) in expected.iter().enumerate() {
        for i in 0..2 {
            for j in 0..2 {
                let value = hessian.get(i, j, k);
                assert!((value - sheet[i][j]).abs() < 1e-5, "H[{i}][{j}][{k}] = {value}");
                assert_eq!(value, hessian.get(j, i, k));
            }
        }
    }
    assert_eq!(f.calls_number(), 9);
}

#[test]
fn base_engines_are_not_implemented() {
    let gradient = FiniteDifferenceGradient::new(model()).unwrap();
    match gradient.gradient(&at()) {
        Err(UqfError::NotImplemented(info)) => {
            assert_eq!(info.context.get("class").map(String::as_str), Some("FiniteDifferenceGradient"))
        }
        other => panic!("unexpected result {other:?}"),
    }

    let hessian = FiniteDifferenceHessian::default();
    assert_eq!(hessian.input_dimension(), 0);
    assert!(!hessian.function().is_actual_implementation());
    assert!(matches!(hessian.hessian(&Point::zeros(0)), Err(UqfError::NotImplemented(_))));

    let unconfigured = CenteredFiniteDifferenceHessian::default();
    assert!(matches!(
        unconfigured.hessian(&Point::from(vec![1.0])),
        Err(UqfError::Dimension(_))
    ));
}

#[test]
fn step_construction_is_validated() {
    assert!(matches!(
        FiniteDifferenceHessian::from_scalar(0.0, model()),
        Err(UqfError::Parameter(_))
    ));
    assert!(matches!(
        FiniteDifferenceHessian::from_epsilon(Point::from(vec![1e-4, 0.0]), model()),
        Err(UqfError::Parameter(_))
    ));
    assert!(matches!(
        FiniteDifferenceGradient::from_epsilon(Point::filled(3, 1e-4), model()),
        Err(UqfError::Dimension(_))
    ));
    assert!(matches!(
        BlendedStep::new(Point::filled(2, 1e-4), Point::from(vec![1.0, 0.0])),
        Err(UqfError::Parameter(_))
    ));
    assert!(FiniteDifferenceStep::scalar(f64::NAN, 2).is_err());
}

#[test]
fn blended_step_scales_with_the_location() {
    let step = BlendedStep::new(Point::filled(2, 1e-3), Point::filled(2, 1.0)).unwrap();
    let h = step.step_at(&Point::from(vec![0.0, -9.0])).unwrap();
    assert!((h[0] - 1e-3).abs() < 1e-15);
    assert!((h[1] - 1e-2).abs() < 1e-15);
    assert_eq!(step.class_name(), "BlendedStep");
}

#[test]
fn options_drive_the_default_steps() {
    let opts = DifferentiationOpts {
        gradient_epsilon: 1e-6,
        blended_eta: 0.5,
        ..DifferentiationOpts::default()
    };
    let base = FiniteDifferenceGradient::with_opts(&opts, model()).unwrap();
    assert_eq!(base.step().class_name(), "BlendedStep");
    assert_eq!(base.epsilon().as_slice(), &[1e-6, 1e-6]);
    let gradient = CenteredFiniteDifferenceGradient::new(base).gradient(&at()).unwrap();
    assert!((gradient[(0, 0)] - 4.0).abs() < 1e-6);

    let hessian = FiniteDifferenceHessian::with_opts(&DifferentiationOpts::default(), model()).unwrap();
    assert_eq!(hessian.epsilon().as_slice(), &[1e-4, 1e-4]);
}

proptest! {
    #[test]
    fn constant_step_accepts_exactly_nonzero_components(
        components in proptest::collection::vec(
            prop_oneof![Just(0.0f64), 1e-8f64..1.0, -1.0f64..-1e-8],
            1..6,
        )
    ) {
        let all_nonzero = components.iter().all(|&value| value != 0.0);
        let dimension = components.len();
        let epsilon = Point::from(components);
        prop_assert_eq!(ConstantStep::new(epsilon.clone()).is_ok(), all_nonzero);
        let function = Function::new(ClosureEvaluation::from_fn(dimension, 1, |x| {
            Point::from(vec![x.iter().sum::<f64>()])
        }));
        prop_assert_eq!(FiniteDifferenceHessian::from_epsilon(epsilon, function).is_ok(), all_nonzero);
    }

    #[test]
    fn scalar_steps_broadcast(epsilon in prop_oneof![Just(0.0f64), 1e-8f64..1.0], dimension in 0usize..5) {
        let step = FiniteDifferenceStep::scalar(epsilon, dimension);
        prop_assert_eq!(step.is_ok(), epsilon != 0.0);
        if let Ok(step) = step {
            prop_assert_eq!(step.dimension(), dimension);
        }
    }
}
