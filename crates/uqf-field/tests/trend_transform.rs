use proptest::prelude::*;
use uqf_core::{Matrix, Mesh, Point, Sample, UqfError};
use uqf_field::{FieldFunction, FieldFunctionImplementation, InverseTrendTransform, TrendTransform};
use uqf_func::{ClosureEvaluation, Function, LinearEvaluation};

/// `g(t) = slope * t`.
fn ramp(slope: f64) -> Function {
    let weights = Matrix::from_row_slice(1, 1, &[slope]);
    Function::new(LinearEvaluation::new(Point::zeros(1), Point::zeros(1), weights).unwrap())
}

fn three_steps() -> Mesh {
    Mesh::new(Sample::from_column(&[0.0, 1.0, 2.0]))
}

#[test]
fn trend_is_removed_and_reinstated() {
    let trend = TrendTransform::new(ramp(2.0), three_steps()).unwrap();
    let removed = trend.evaluate(&Sample::from_column(&[5.0, 5.0, 5.0])).unwrap();
    assert_eq!(removed.as_slice(), &[5.0, 3.0, 1.0]);

    let inverse = InverseTrendTransform::new(ramp(2.0), three_steps()).unwrap();
    let restored = inverse.evaluate(&Sample::from_column(&[5.0, 3.0, 1.0])).unwrap();
    assert_eq!(restored.as_slice(), &[5.0, 5.0, 5.0]);
}

#[test]
fn inverse_is_built_from_the_stored_trend() {
    let g = ramp(2.0);
    let trend = TrendTransform::new(g.clone(), three_steps()).unwrap();
    let inverse = trend.inverse().unwrap();
    assert!(inverse.trend_function().ptr_eq(&g));
    assert_eq!(inverse.class_name(), "InverseTrendTransform");
    assert_eq!(inverse.inverse().unwrap().class_name(), "TrendTransform");

    let values = Sample::from_column(&[1.0, -4.0, 0.5]);
    let round_trip = inverse.evaluate(&trend.evaluate(&values).unwrap()).unwrap();
    assert_eq!(round_trip, values);
}

#[test]
fn trend_must_take_mesh_coordinates() {
    let wide = Function::new(ClosureEvaluation::from_fn(2, 1, |x| Point::from(vec![x[0]])));
    assert!(matches!(
        TrendTransform::new(wide, three_steps()),
        Err(UqfError::Dimension(_))
    ));
}

#[test]
fn vector_trends_adjust_every_component() {
    // g(t) = (t, -t)
    let weights = Matrix::from_row_slice(2, 1, &[1.0, -1.0]);
    let g = Function::new(LinearEvaluation::new(Point::zeros(1), Point::zeros(2), weights).unwrap());
    let trend = FieldFunction::new(TrendTransform::new(g, three_steps()).unwrap());
    assert_eq!(trend.input_dimension(), 2);
    let values = Sample::from_rows(2, &[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]]).unwrap();
    let removed = trend.evaluate(&values).unwrap();
    assert_eq!(removed.as_slice(), &[1.0, 1.0, 0.0, 2.0, -1.0, 3.0]);

    let second = trend.marginal(1).unwrap();
    assert_eq!(second.output_dimension(), 1);
    assert_eq!(second.evaluate(&values).unwrap().as_slice(), &[1.0, 2.0, 3.0]);
    assert_eq!(trend.calls_number(), 1);
}

#[test]
fn transforms_act_on_fields() {
    let trend = FieldFunction::new(TrendTransform::new(ramp(1.0), three_steps()).unwrap());
    let field = uqf_core::Field::new(three_steps(), Sample::from_column(&[2.0, 2.0, 2.0])).unwrap();
    let detrended = trend.evaluate_field(&field).unwrap();
    assert_eq!(detrended.mesh(), field.mesh());
    assert_eq!(detrended.values().as_slice(), &[2.0, 1.0, 0.0]);
}

proptest! {
    #[test]
    fn inverse_undoes_the_transform(
        slope in -3.0f64..3.0,
        values in proptest::collection::vec(-100.0f64..100.0, 5),
    ) {
        let mesh = Mesh::regular_grid(-1.0, 0.5, 5).unwrap();
        let trend = TrendTransform::new(ramp(slope), mesh).unwrap();
        let inverse = trend.inverse().unwrap();
        let values = Sample::from_column(&values);
        let restored = inverse.evaluate(&trend.evaluate(&values).unwrap()).unwrap();
        for (a, b) in restored.as_slice().iter().zip(values.as_slice()) {
            prop_assert!((a - b).abs() <= 1e-9 * (1.0 + b.abs()));
        }
    }
}
