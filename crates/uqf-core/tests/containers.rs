use uqf_core::{Description, Point, Sample, SymmetricTensor};

#[test]
fn point_arithmetic_and_selection() {
    let a = Point::from(vec![1.0, 2.0, 3.0]);
    let b = Point::from(vec![0.5, 0.5, 0.5]);
    assert_eq!((&a + &b).as_slice(), &[1.5, 2.5, 3.5]);
    assert_eq!((&a - &b).as_slice(), &[0.5, 1.5, 2.5]);
    assert_eq!((&a * 2.0).as_slice(), &[2.0, 4.0, 6.0]);
    assert_eq!(a.select(&[2, 0, 2]).unwrap().as_slice(), &[3.0, 1.0, 3.0]);
    assert!(a.select(&[3]).is_err());
    assert_eq!(a.concat(&b).dimension(), 6);
    assert_eq!(a.slice(1, 3).unwrap().as_slice(), &[2.0, 3.0]);
}

#[test]
fn sample_rows_and_marginals() {
    let mut sample = Sample::from_rows(2, &[[1.0, 2.0], [3.0, 4.0]]).unwrap();
    assert_eq!(sample.size(), 2);
    assert!(sample.push(&Point::from(vec![1.0])).is_err());
    sample.push(&Point::from(vec![5.0, 6.0])).unwrap();
    assert_eq!(sample.point(2).as_slice(), &[5.0, 6.0]);

    let marginal = sample.marginal(&[1]).unwrap();
    assert_eq!(marginal.as_slice(), &[2.0, 4.0, 6.0]);
    assert!(sample.marginal(&[2]).is_err());

    let stacked = sample.stack(&marginal).unwrap();
    assert_eq!(stacked.dimension(), 3);
    assert_eq!(stacked.row(1), &[3.0, 4.0, 4.0]);

    sample.keep_last(1);
    assert_eq!(sample.size(), 1);
    assert_eq!(sample.row(0), &[5.0, 6.0]);
}

#[test]
fn zero_dimensional_samples_keep_their_size() {
    let sample = Sample::zeros(4, 0);
    assert_eq!(sample.size(), 4);
    assert_eq!(sample.rows().count(), 4);
}

#[test]
fn default_descriptions() {
    let description = Description::build_default(3, "x");
    assert_eq!(description.get(2), Some("x2"));
    let picked = description.select(&[1, 1]).unwrap();
    assert_eq!(picked, ["x1", "x1"].into_iter().collect::<Description>());
    assert!(description.select(&[3]).is_err());
}

#[test]
fn symmetric_tensor_mirrors_entries() {
    let mut tensor = SymmetricTensor::zeros(2, 1);
    tensor.set(0, 1, 0, 7.0);
    assert_eq!(tensor.get(1, 0, 0), 7.0);
    let sheet = tensor.sheet(0);
    assert_eq!(sheet[(0, 1)], 7.0);
    assert_eq!(sheet[(1, 1)], 0.0);
}
