use proptest::prelude::*;
use uqf_core::{Matrix, Point, UqfError};
use uqf_func::{
    ClosureEvaluation, ComposedEvaluation, Function, IdentityEvaluation, LinearEvaluation,
    MarginalEvaluation, NoEvaluation,
};

fn linear(input: usize, output: usize) -> Function {
    let weights = Matrix::from_fn(output, input, |i, j| (i + 2 * j) as f64 + 1.0);
    Function::new(
        LinearEvaluation::new(Point::zeros(input), Point::filled(output, 0.5), weights).unwrap(),
    )
}

fn squares() -> Function {
    Function::new(ClosureEvaluation::from_fn(2, 3, |x| {
        Point::from(vec![x[0] * x[0], x[1] * x[1], x[0] * x[1]])
    }))
}

#[test]
fn composition_evaluates_left_of_right() {
    let left = linear(3, 2);
    let right = squares();
    let composed = left.compose(&right).unwrap();
    assert_eq!(composed.input_dimension(), 2);
    assert_eq!(composed.output_dimension(), 2);

    let x = Point::from(vec![1.0, 2.0]);
    let expected = left.evaluate(&right.evaluate(&x).unwrap()).unwrap();
    assert_eq!(composed.evaluate(&x).unwrap(), expected);
    assert_eq!(composed.input_description(), right.input_description());
    assert_eq!(composed.output_description(), left.output_description());
}

#[test]
fn mismatched_composition_reports_both_dimensions() {
    let err = ComposedEvaluation::new(linear(2, 1), linear(1, 3)).unwrap_err();
    match err {
        UqfError::Dimension(info) => {
            assert_eq!(info.code, "composition-mismatch");
            assert_eq!(info.context.get("left_input").map(String::as_str), Some("2"));
            assert_eq!(info.context.get("right_output").map(String::as_str), Some("3"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn marginal_of_composition_keeps_the_right_function() {
    let right = squares();
    let composed = linear(3, 2).compose(&right).unwrap();
    let marginal = composed.marginal(1).unwrap();
    assert_eq!(marginal.class_name(), "ComposedEvaluation");

    let body = marginal
        .implementation()
        .as_any()
        .downcast_ref::<ComposedEvaluation>()
        .unwrap();
    assert!(body.right_function().ptr_eq(&right));
    assert_eq!(body.left_function().class_name(), "MarginalEvaluation");

    let x = Point::from(vec![0.5, -1.5]);
    let full = composed.evaluate(&x).unwrap();
    assert_eq!(marginal.evaluate(&x).unwrap().as_slice(), &[full[1]]);
}

#[test]
fn marginal_keeps_duplicates_and_order() {
    let f = squares();
    let m = f.marginal_indices(&[2, 0, 2]).unwrap();
    let x = Point::from(vec![3.0, 4.0]);
    assert_eq!(m.evaluate(&x).unwrap().as_slice(), &[12.0, 9.0, 12.0]);
    assert_eq!(
        m.output_description().iter().cloned().collect::<Vec<_>>(),
        vec!["y2", "y0", "y2"]
    );
}

#[test]
fn marginal_of_marginal_composes_indices() {
    let f = squares();
    let first = f.marginal_indices(&[2, 1]).unwrap();
    let second = first.marginal(1).unwrap();
    let body = second
        .implementation()
        .as_any()
        .downcast_ref::<MarginalEvaluation>()
        .unwrap();
    assert_eq!(body.indices(), &[1]);
    assert!(body.base_function().ptr_eq(&f));
}

#[test]
fn marginal_rejects_out_of_range_indices() {
    let err = squares().marginal_indices(&[0, 3]).unwrap_err();
    assert!(matches!(err, UqfError::Dimension(_)));
    assert!(err.to_string().contains('3'));
}

#[test]
fn null_evaluation_is_empty_and_rejects_points() {
    let null = Function::new(NoEvaluation::new());
    assert_eq!(null.input_dimension(), 0);
    assert_eq!(null.output_dimension(), 0);
    assert!(!null.is_actual_implementation());
    assert!(null.evaluate(&Point::zeros(0)).unwrap().as_slice().is_empty());
    assert!(matches!(
        null.evaluate(&Point::from(vec![1.0])),
        Err(UqfError::Dimension(_))
    ));
    assert_eq!(null.calls_number(), 1);
    assert_eq!(Function::default(), null);
}

#[test]
fn structural_equality_ignores_identity() {
    let a = Function::new(IdentityEvaluation::new(2));
    let b = Function::new(IdentityEvaluation::new(2));
    assert!(!a.ptr_eq(&b));
    assert_eq!(a, b);
    assert_ne!(a, Function::new(IdentityEvaluation::new(3)));
    assert_eq!(linear(2, 2).compose(&a).unwrap(), linear(2, 2).compose(&b).unwrap());
}

proptest! {
    #[test]
    fn composition_succeeds_iff_dimensions_agree(
        left_in in 1usize..5,
        left_out in 1usize..5,
        right_in in 1usize..5,
        right_out in 1usize..5,
    ) {
        let left = linear(left_in, left_out);
        let right = linear(right_in, right_out);
        let result = left.compose(&right);
        prop_assert_eq!(result.is_ok(), left_in == right_out);
        prop_assert_eq!(left.calls_number(), 0);
        prop_assert_eq!(right.calls_number(), 0);
    }

    #[test]
    fn marginal_projects_full_output(
        x in proptest::collection::vec(-10.0f64..10.0, 2),
        indices in proptest::collection::vec(0usize..3, 1..6),
    ) {
        let f = squares();
        let m = f.marginal_indices(&indices).unwrap();
        let x = Point::from(x);
        let full = f.evaluate(&x).unwrap();
        let projected = m.evaluate(&x).unwrap();
        for (k, &index) in indices.iter().enumerate() {
            prop_assert_eq!(projected[k], full[index]);
        }
    }
}
