use proptest::prelude::*;
use uqf_core::{Description, Point, UqfError};
use uqf_func::{
    AggregatedEvaluation, ClosureEvaluation, DifferentiationOpts, Function, ParametricEvaluation,
};

/// `x -> (a x, b x)` with `(a, b)` frozen to `parameter`.
fn scaled(parameter: [f64; 2]) -> Function {
    let base = Function::new(ClosureEvaluation::from_fn(3, 2, |x| {
        Point::from(vec![x[1] * x[0], x[2] * x[0]])
    }));
    Function::new(ParametricEvaluation::new(base, vec![1, 2], Point::from(parameter.to_vec())).unwrap())
}

/// `x -> x + c` on two components with `c` frozen to `offset`.
fn offset(offset: f64) -> Function {
    let base = Function::new(ClosureEvaluation::from_fn(3, 2, |x| {
        Point::from(vec![x[0] + x[2], x[1] + x[2]])
    }));
    Function::new(ParametricEvaluation::new(base, vec![2], Point::from(vec![offset])).unwrap())
}

/// `x -> x + c` on one component.
fn shift(c: f64) -> Function {
    let base = Function::new(ClosureEvaluation::from_fn(2, 1, |x| Point::from(vec![x[0] + x[1]])));
    Function::new(ParametricEvaluation::new(base, vec![1], Point::from(vec![c])).unwrap())
}

#[test]
fn composed_parameter_is_right_then_left() {
    let left = scaled([2.0, 3.0]);
    let right = offset(0.5);
    let composed = left.compose(&right.marginal(0).unwrap()).unwrap();
    assert_eq!(composed.parameter().as_slice(), &[0.5, 2.0, 3.0]);
    assert_eq!(composed.parameter_dimension(), 3);
    let labels: Vec<_> = composed.parameter_description().iter().cloned().collect();
    assert_eq!(labels, vec!["x2", "x1", "x2"]);
}

#[test]
fn composed_set_parameter_dispatches_each_half() {
    let left = scaled([2.0, 3.0]);
    let right = offset(0.5).marginal(1).unwrap();
    let mut composed = left.compose(&right).unwrap();
    composed.set_parameter(Point::from(vec![1.0, 4.0, 5.0])).unwrap();
    assert_eq!(composed.parameter().as_slice(), &[1.0, 4.0, 5.0]);
    assert_eq!(left.parameter().as_slice(), &[2.0, 3.0]);
    assert_eq!(right.parameter().as_slice(), &[0.5]);

    // (x0, x1) -> x1 + 1 -> (4 (x1 + 1), 5 (x1 + 1))
    let y = composed.evaluate(&Point::from(vec![0.0, 1.0])).unwrap();
    assert_eq!(y.as_slice(), &[8.0, 10.0]);

    let err = composed.set_parameter(Point::from(vec![1.0, 2.0])).unwrap_err();
    assert!(matches!(err, UqfError::Dimension(_)));
    assert_eq!(composed.parameter().as_slice(), &[1.0, 4.0, 5.0]);
}

#[test]
fn composed_parameter_description_splits_symmetrically() {
    let mut composed = scaled([2.0, 3.0]).compose(&offset(0.5).marginal(0).unwrap()).unwrap();
    let labels = Description::from_iter(["c", "a", "b"].map(String::from));
    composed.set_parameter_description(labels.clone()).unwrap();
    assert_eq!(composed.parameter_description(), labels);
}

#[test]
fn aggregated_stacks_outputs_and_parameters() {
    let first = scaled([2.0, 3.0]);
    let second = Function::new(ClosureEvaluation::from_fn(1, 1, |x| Point::from(vec![-x[0]])));
    let third = shift(1.0);
    let mut aggregated =
        Function::new(AggregatedEvaluation::new(vec![first, second, third.clone()]).unwrap());
    assert_eq!(aggregated.output_dimension(), 4);
    assert_eq!(aggregated.parameter().as_slice(), &[2.0, 3.0, 1.0]);

    let y = aggregated.evaluate(&Point::from(vec![2.0])).unwrap();
    assert_eq!(y.as_slice(), &[4.0, 6.0, -2.0, 3.0]);

    aggregated.set_parameter(Point::from(vec![1.0, 1.0, 0.0])).unwrap();
    let y = aggregated.evaluate(&Point::from(vec![2.0])).unwrap();
    assert_eq!(y.as_slice(), &[2.0, 2.0, -2.0, 2.0]);
    assert_eq!(third.parameter().as_slice(), &[1.0]);
}

#[test]
fn aggregated_rejects_empty_and_mismatched_inputs() {
    assert!(matches!(
        AggregatedEvaluation::new(Vec::new()),
        Err(UqfError::Parameter(_))
    ));
    let narrow = Function::new(ClosureEvaluation::from_fn(1, 1, |x| x.clone()));
    let wide = Function::new(ClosureEvaluation::from_fn(2, 1, |x| Point::from(vec![x[0]])));
    assert!(matches!(
        AggregatedEvaluation::new(vec![narrow, wide]),
        Err(UqfError::Dimension(_))
    ));
}

#[test]
fn parametric_rejects_duplicate_positions() {
    let base = Function::new(ClosureEvaluation::from_fn(3, 1, |x| Point::from(vec![x[0]])));
    let err = ParametricEvaluation::new(base.clone(), vec![1, 1], Point::zeros(2)).unwrap_err();
    assert!(matches!(err, UqfError::Parameter(_)));
    let err = ParametricEvaluation::new(base, vec![3], Point::zeros(1)).unwrap_err();
    assert!(matches!(err, UqfError::Dimension(_)));
}

#[test]
fn parameter_gradient_matches_the_analytic_one() {
    let f = scaled([2.0, 3.0]);
    let x = Point::from(vec![1.5]);
    let gradient = f.parameter_gradient(&x).unwrap();
    assert_eq!(gradient.nrows(), 2);
    assert_eq!(gradient.ncols(), 2);
    assert!((gradient[(0, 0)] - 1.5).abs() < 1e-6);
    assert!(gradient[(0, 1)].abs() < 1e-6);
    assert!(gradient[(1, 0)].abs() < 1e-6);
    assert!((gradient[(1, 1)] - 1.5).abs() < 1e-6);
    assert_eq!(f.calls_number(), 0);
    assert_eq!(f.parameter().as_slice(), &[2.0, 3.0]);
}

#[test]
fn parameter_gradient_uses_the_configured_step() {
    // f(x; p) = p^3, whose centered difference is 3 p^2 + h^2
    let cube = Function::new(ClosureEvaluation::from_fn(2, 1, |x| Point::from(vec![x[1].powi(3)])));
    let mut f = Function::new(ParametricEvaluation::new(cube, vec![1], Point::from(vec![1.0])).unwrap());
    let x = Point::from(vec![0.0]);
    assert!((f.parameter_gradient(&x).unwrap()[(0, 0)] - 3.0).abs() < 1e-6);

    f.configure_differentiation(&DifferentiationOpts {
        parameter_epsilon: 0.5,
        ..DifferentiationOpts::default()
    });
    assert_eq!(f.implementation().common().parameter_epsilon(), 0.5);
    assert_eq!(f.parameter_gradient(&x).unwrap()[(0, 0)], 3.25);
}

#[test]
fn marginal_parameter_gradient_selects_columns() {
    let f = scaled([2.0, 3.0]);
    let m = f.marginal_indices(&[1, 1, 0]).unwrap();
    let x = Point::from(vec![2.0]);
    let full = f.parameter_gradient(&x).unwrap();
    let projected = m.parameter_gradient(&x).unwrap();
    assert_eq!(projected.ncols(), 3);
    for row in 0..2 {
        assert_eq!(projected[(row, 0)], full[(row, 1)]);
        assert_eq!(projected[(row, 1)], full[(row, 1)]);
        assert_eq!(projected[(row, 2)], full[(row, 0)]);
    }
}

proptest! {
    #[test]
    fn composed_parameter_round_trip_is_idempotent(
        a in -5.0f64..5.0,
        b in -5.0f64..5.0,
        c in -5.0f64..5.0,
    ) {
        let left = scaled([a, b]);
        let right = offset(c).marginal(0).unwrap();
        let mut composed = left.compose(&right).unwrap();
        let parameter = composed.parameter();
        prop_assert_eq!(
            parameter.dimension(),
            left.parameter_dimension() + right.parameter_dimension()
        );
        composed.set_parameter(parameter.clone()).unwrap();
        prop_assert_eq!(composed.parameter(), parameter);
        let left_parameter = left.parameter();
        let right_parameter = right.parameter();
        prop_assert_eq!(left_parameter.as_slice(), &[a, b]);
        prop_assert_eq!(right_parameter.as_slice(), &[c]);
    }
}
