use std::sync::Arc;
use std::thread;

use uqf_core::{Description, Point, Sample, UqfError};
use uqf_func::{
    ClosureEvaluation, EvaluationOpts, EvaluationProxy, Function, HistoryStrategy,
    IdentityEvaluation, ParametricEvaluation,
};

fn shifted() -> Function {
    // f(x, a) = x + a, with a frozen as a parameter
    let base = Function::new(ClosureEvaluation::from_fn(2, 1, |x| Point::from(vec![x[0] + x[1]])));
    Function::new(ParametricEvaluation::new(base, vec![1], Point::from(vec![1.0])).unwrap())
}

#[test]
fn mutating_a_copy_leaves_the_original_untouched() {
    let a = shifted();
    let mut b = a.clone();
    assert!(a.ptr_eq(&b));
    assert!(a.is_shared());

    b.set_parameter(Point::from(vec![10.0])).unwrap();
    assert!(!a.ptr_eq(&b));
    assert_eq!(a.parameter().as_slice(), &[1.0]);
    assert_eq!(b.parameter().as_slice(), &[10.0]);

    let x = Point::from(vec![2.0]);
    assert_eq!(a.evaluate(&x).unwrap().as_slice(), &[3.0]);
    assert_eq!(b.evaluate(&x).unwrap().as_slice(), &[12.0]);
}

#[test]
fn unique_handles_mutate_in_place() {
    let mut a = shifted();
    let before = Arc::as_ptr(a.implementation_arc()) as *const () as usize;
    a.set_output_description(Description::from_iter(["total".to_owned()]))
        .unwrap();
    let after = Arc::as_ptr(a.implementation_arc()) as *const () as usize;
    assert_eq!(before, after);
    assert_eq!(a.output_description().get(0), Some("total"));
}

#[test]
fn description_setters_check_lengths() {
    let mut a = Function::new(IdentityEvaluation::new(2));
    let err = a
        .set_input_description(Description::build_default(3, "z"))
        .unwrap_err();
    assert!(matches!(err, UqfError::Dimension(_)));
    assert_eq!(a.input_description(), Description::build_default(2, "x"));
}

#[test]
fn shared_handles_share_one_counter() {
    let f = Function::new(IdentityEvaluation::new(1));
    let g = f.clone();
    let x = Point::from(vec![1.0]);
    for _ in 0..3 {
        f.evaluate(&x).unwrap();
    }
    g.evaluate(&x).unwrap();
    assert_eq!(f.calls_number(), 4);
    assert_eq!(g.calls_number(), 4);

    let composed = f.compose(&g).unwrap();
    let marginal = f.marginal(0).unwrap();
    composed.evaluate(&x).unwrap();
    marginal.evaluate(&x).unwrap();
    assert_eq!(f.calls_number(), 7);
    assert_eq!(composed.calls_number(), 1);
    assert_eq!(marginal.calls_number(), 1);
}

#[test]
fn rejected_calls_are_not_counted() {
    let f = Function::new(IdentityEvaluation::new(2));
    assert!(f.evaluate(&Point::from(vec![1.0])).is_err());
    assert!(f.evaluate_sample(&Sample::zeros(3, 1)).is_err());
    assert_eq!(f.calls_number(), 0);
}

#[test]
fn default_sample_path_counts_each_attempted_row() {
    let f = Function::new(ClosureEvaluation::new(1, 1, |x| {
        if x[0] < 0.0 {
            Err(UqfError::Evaluation(uqf_core::ErrorInfo::new("negative", "negative input")))
        } else {
            Ok(Point::from(vec![x[0].sqrt()]))
        }
    }));
    let good = Sample::from_column(&[1.0, 4.0, 9.0]);
    let ys = f.evaluate_sample(&good).unwrap();
    assert_eq!(ys.as_slice(), &[1.0, 2.0, 3.0]);
    assert_eq!(f.calls_number(), 3);

    let bad = Sample::from_column(&[1.0, -1.0, 4.0]);
    assert!(f.evaluate_sample(&bad).is_err());
    assert_eq!(f.calls_number(), 5);
}

#[test]
fn vectorized_sample_path_counts_rows() {
    let f = Function::new(IdentityEvaluation::new(2));
    let xs = Sample::zeros(5, 2);
    f.evaluate_sample(&xs).unwrap();
    assert_eq!(f.calls_number(), 5);
}

#[test]
fn non_finite_outputs_are_rejected_unless_disabled() {
    let mut f = Function::new(ClosureEvaluation::from_fn(1, 1, |x| Point::from(vec![1.0 / x[0]])));
    let zero = Point::from(vec![0.0]);
    match f.evaluate(&zero) {
        Err(UqfError::Evaluation(info)) => assert_eq!(info.code, "non-finite-output"),
        other => panic!("unexpected result {other:?}"),
    }
    f.set_check_output(false);
    assert!(f.evaluate(&zero).unwrap()[0].is_infinite());
}

#[test]
fn history_follows_its_strategy() {
    let mut f = Function::new(IdentityEvaluation::new(1));
    f.evaluate(&Point::from(vec![0.0])).unwrap();
    assert_eq!(f.history().input().size(), 0);

    f.enable_history(HistoryStrategy::Last(2));
    for value in [1.0, 2.0, 3.0] {
        f.evaluate(&Point::from(vec![value])).unwrap();
    }
    let history = f.history();
    assert_eq!(history.input().as_slice(), &[2.0, 3.0]);
    assert_eq!(history.output().as_slice(), &[2.0, 3.0]);

    f.enable_history(HistoryStrategy::Full);
    f.evaluate_sample(&Sample::from_column(&[4.0, 5.0, 6.0])).unwrap();
    assert_eq!(f.history().input().size(), 3);
    f.clear_history();
    assert_eq!(f.history().input().size(), 0);
    assert_eq!(f.history().strategy(), HistoryStrategy::Full);

    f.disable_history();
    f.evaluate(&Point::from(vec![7.0])).unwrap();
    assert!(!f.history().is_enabled());
    assert_eq!(f.history().input().size(), 0);
}

#[test]
fn composed_history_records_outer_pairs_only() {
    let inner = Function::new(ClosureEvaluation::from_fn(1, 1, |x| Point::from(vec![x[0] + 1.0])));
    let outer = Function::new(ClosureEvaluation::from_fn(1, 1, |x| Point::from(vec![x[0] * 10.0])));
    let mut composed = outer.compose(&inner).unwrap();
    composed.enable_history(HistoryStrategy::Full);
    composed.evaluate(&Point::from(vec![1.0])).unwrap();
    let history = composed.history();
    assert_eq!(history.input().as_slice(), &[1.0]);
    assert_eq!(history.output().as_slice(), &[20.0]);
    assert!(!inner.history().is_enabled());
}

#[test]
fn configure_applies_options() {
    let mut f = Function::new(IdentityEvaluation::new(1));
    f.configure(&EvaluationOpts {
        check_output: false,
        history: HistoryStrategy::Last(0),
    });
    assert!(!f.history().is_enabled());
    assert!(!f.implementation().common().check_output());
}

#[test]
fn options_apply_at_construction() {
    let opts = EvaluationOpts {
        check_output: false,
        history: HistoryStrategy::Full,
    };
    let f = Function::with_opts(IdentityEvaluation::new(1), &opts);
    assert!(!f.implementation().common().check_output());
    assert_eq!(f.history().strategy(), HistoryStrategy::Full);
    f.evaluate(&Point::from(vec![4.0])).unwrap();
    assert_eq!(f.history().input().as_slice(), &[4.0]);

    let plain = Function::new(IdentityEvaluation::new(1));
    assert!(plain.implementation().common().check_output());
    assert!(!plain.history().is_enabled());
}

#[test]
fn proxy_forwards_and_shares_the_counter() {
    let target = shifted();
    let proxy = Function::new(EvaluationProxy::new(target.clone()));
    let x = Point::from(vec![1.0]);
    assert_eq!(proxy.evaluate(&x).unwrap().as_slice(), &[2.0]);
    assert_eq!(target.calls_number(), 1);
    assert_eq!(proxy.calls_number(), 1);
    assert_eq!(proxy.parameter(), target.parameter());
    assert_eq!(proxy.input_description(), target.input_description());

    let mut edited = proxy.clone();
    edited.set_parameter(Point::from(vec![5.0])).unwrap();
    assert_eq!(target.parameter().as_slice(), &[1.0]);
    assert_eq!(proxy.parameter().as_slice(), &[1.0]);
    assert_eq!(edited.evaluate(&x).unwrap().as_slice(), &[6.0]);

    let marginal = proxy.marginal(0).unwrap();
    assert_eq!(marginal.class_name(), "MarginalEvaluation");
}

#[test]
fn concurrent_evaluations_count_every_call() {
    let f = Function::new(IdentityEvaluation::new(1));
    assert!(f.is_parallel());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let f = f.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    f.evaluate(&Point::from(vec![i as f64])).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(f.calls_number(), 1000);
}

#[test]
fn closure_parallel_flag_is_reported() {
    let serial = Function::new(ClosureEvaluation::from_fn(1, 1, |x| x.clone()).with_parallel(false));
    assert!(!serial.is_parallel());
    let composed = Function::new(IdentityEvaluation::new(1)).compose(&serial).unwrap();
    assert!(!composed.is_parallel());
}
