use std::any::Any;
use std::sync::Arc;

use uqf_core::{check_dimension, Matrix, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::EvaluationImplementation;
use crate::persistence::{load_common, save_common, Advocate, Reader};

/// Affine map `y = constant + linear * (x - center)`.
///
/// `linear` has one row per output and one column per input.
#[derive(Debug, Clone)]
pub struct LinearEvaluation {
    common: EvaluationCommon,
    center: Point,
    constant: Point,
    linear: Matrix,
}

impl LinearEvaluation {
    /// Creates the affine map; sizes of the three terms must agree.
    pub fn new(center: Point, constant: Point, linear: Matrix) -> Result<Self, UqfError> {
        check_dimension("linear term columns", center.dimension(), linear.ncols())?;
        check_dimension("linear term rows", constant.dimension(), linear.nrows())?;
        Ok(Self {
            common: EvaluationCommon::new(center.dimension(), constant.dimension()),
            center,
            constant,
            linear,
        })
    }

    /// Center of the expansion.
    pub fn center(&self) -> &Point {
        &self.center
    }

    /// Value at the center.
    pub fn constant(&self) -> &Point {
        &self.constant
    }

    /// Linear term.
    pub fn linear(&self) -> &Matrix {
        &self.linear
    }

    pub(crate) fn load(reader: &Reader<'_>) -> Result<Self, UqfError> {
        let center = reader.point("center_")?;
        let constant = reader.point("constant_")?;
        let rows = reader.sample("linear_")?;
        check_dimension("stored linear term rows", constant.dimension(), rows.size())?;
        let linear = Matrix::from_fn(rows.size(), rows.dimension(), |i, j| rows.get(i, j));
        let mut evaluation = Self::new(center, constant, linear)?;
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl EvaluationImplementation for LinearEvaluation {
    fn class_name(&self) -> &'static str {
        "LinearEvaluation"
    }

    fn clone_body(&self) -> Arc<dyn EvaluationImplementation> {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn common(&self) -> &EvaluationCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EvaluationCommon {
        &mut self.common
    }

    fn compute(&self, x: &Point) -> Result<Point, UqfError> {
        let mut y = self.constant.clone();
        for (i, value) in y.as_mut_slice().iter_mut().enumerate() {
            for j in 0..self.center.dimension() {
                *value += self.linear[(i, j)] * (x[j] - self.center[j]);
            }
        }
        Ok(y)
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        let size = xs.size();
        let shifted = Matrix::from_fn(self.center.dimension(), size, |j, row| {
            xs.get(row, j) - self.center[j]
        });
        let product = &self.linear * shifted;
        let mut ys = Sample::zeros(size, self.constant.dimension());
        for row in 0..size {
            for i in 0..self.constant.dimension() {
                ys.set(row, i, self.constant[i] + product[(i, row)]);
            }
        }
        self.common.count_calls(size as u64);
        self.common.finish_sample(self.class_name(), xs, &ys)?;
        Ok(ys)
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        advocate.save_point("center_", &self.center);
        advocate.save_point("constant_", &self.constant);
        let mut rows = Sample::empty(self.linear.ncols());
        for i in 0..self.linear.nrows() {
            let row: Vec<f64> = self.linear.row(i).iter().copied().collect();
            rows.push_slice(&row)?;
        }
        advocate.save_sample("linear_", &rows);
        Ok(())
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| {
                self.center == other.center
                    && self.constant == other.constant
                    && self.linear == other.linear
                    && self.common.input_description() == other.common.input_description()
            })
    }
}
