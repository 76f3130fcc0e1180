use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uqf_core::{check_dimension, Description, ErrorInfo, Matrix, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::function::Function;
use crate::marginal::MarginalEvaluation;
use crate::persistence::Advocate;
use crate::shared::SharedBody;

/// Polymorphic body of a [`Function`].
///
/// Implementors provide [`compute`](Self::compute) on inputs whose dimension
/// has already been validated. The provided [`evaluate`](Self::evaluate)
/// wraps it with the dimension check, call counting, output checking and
/// history recording. Sample evaluation defaults to one point evaluation per
/// row; vectorized overrides of [`compute_sample`](Self::compute_sample)
/// report their calls through [`EvaluationCommon::count_calls`] and
/// [`EvaluationCommon::finish_sample`].
pub trait EvaluationImplementation: fmt::Debug + Send + Sync + 'static {
    /// Class name used in logs and persisted studies.
    fn class_name(&self) -> &'static str;

    /// Deep copy of the body, uniquely owned.
    fn clone_body(&self) -> Arc<dyn EvaluationImplementation>;

    /// Runtime type access used by structural comparisons.
    fn as_any(&self) -> &dyn Any;

    /// Shared state (descriptions, parameter, counter, history).
    fn common(&self) -> &EvaluationCommon;

    /// Mutable shared state.
    fn common_mut(&mut self) -> &mut EvaluationCommon;

    /// Evaluates a point whose dimension matches [`input_dimension`](Self::input_dimension).
    fn compute(&self, x: &Point) -> Result<Point, UqfError>;

    /// Stores the body's own attributes; children are stored through the advocate.
    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError>;

    /// Structural equality with another body.
    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool;

    /// Input dimension.
    fn input_dimension(&self) -> usize {
        self.common().input_description().len()
    }

    /// Output dimension.
    fn output_dimension(&self) -> usize {
        self.common().output_description().len()
    }

    /// Validated, counted point evaluation.
    fn evaluate(&self, x: &Point) -> Result<Point, UqfError> {
        check_dimension("input point", self.input_dimension(), x.dimension())?;
        self.common().count_calls(1);
        let y = self.compute(x)?;
        check_dimension("output point", self.output_dimension(), y.dimension())?;
        self.common().finish_point(self.class_name(), x, &y)?;
        Ok(y)
    }

    /// Validated sample evaluation.
    fn evaluate_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        check_dimension("input sample", self.input_dimension(), xs.dimension())?;
        self.compute_sample(xs)
    }

    /// Sample evaluation on a validated sample; one counted call per row attempted.
    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        let mut ys = Sample::empty(self.output_dimension());
        for row in xs.rows() {
            ys.push(&self.evaluate(&Point::from(row))?)?;
        }
        Ok(ys)
    }

    /// Input labels.
    fn input_description(&self) -> Description {
        self.common().input_description().clone()
    }

    /// Replaces the input labels.
    fn set_input_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.common_mut().set_input_description(description)
    }

    /// Output labels.
    fn output_description(&self) -> Description {
        self.common().output_description().clone()
    }

    /// Replaces the output labels.
    fn set_output_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.common_mut().set_output_description(description)
    }

    /// Parameter vector.
    fn parameter(&self) -> Point {
        self.common().parameter().clone()
    }

    /// Replaces the parameter vector.
    fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        self.common_mut().set_parameter(parameter)
    }

    /// Parameter labels.
    fn parameter_description(&self) -> Description {
        self.common().parameter_description().clone()
    }

    /// Replaces the parameter labels.
    fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.common_mut().set_parameter_description(description)
    }

    /// Dimension of the parameter vector.
    fn parameter_dimension(&self) -> usize {
        self.parameter().dimension()
    }

    /// Gradient with respect to the parameters, `parameterDimension x outputDimension`.
    ///
    /// Defaults to a centered finite difference computed on a private copy of
    /// the body, so neither the counter nor the history of `self` move. The
    /// step is [`EvaluationCommon::parameter_epsilon`].
    fn parameter_gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        check_dimension("input point", self.input_dimension(), x.dimension())?;
        let parameter = self.parameter();
        let size = parameter.dimension();
        let mut gradient = Matrix::zeros(size, self.output_dimension());
        if size == 0 {
            return Ok(gradient);
        }
        let epsilon = self.common().parameter_epsilon();
        let mut copy = self.clone_body();
        let body = Arc::get_mut(&mut copy).ok_or_else(|| {
            UqfError::Internal(ErrorInfo::new(
                "clone-not-unique",
                format!("{} clone is shared", self.class_name()),
            ))
        })?;
        for i in 0..size {
            let mut shifted = parameter.clone();
            shifted[i] = parameter[i] + epsilon;
            body.set_parameter(shifted.clone())?;
            let forward = body.compute(x)?;
            shifted[i] = parameter[i] - epsilon;
            body.set_parameter(shifted)?;
            let backward = body.compute(x)?;
            for (k, (f, b)) in forward.iter().zip(backward.iter()).enumerate() {
                gradient[(i, k)] = (f - b) / (2.0 * epsilon);
            }
        }
        Ok(gradient)
    }

    /// Number of counted evaluations.
    fn calls(&self) -> u64 {
        self.common().calls()
    }

    /// Marginal over the output components `indices` of `this`, whose body is `self`.
    fn marginal(&self, this: &Function, indices: &[usize]) -> Result<Function, UqfError> {
        Ok(Function::new(MarginalEvaluation::new(this.clone(), indices.to_vec())?))
    }

    /// Whether this body does actual work (false for the null object).
    fn is_actual_implementation(&self) -> bool {
        true
    }

    /// Whether concurrent evaluation of this body from several threads is safe.
    fn is_parallel(&self) -> bool {
        true
    }
}

impl SharedBody for dyn EvaluationImplementation {
    fn clone_shared(&self) -> Arc<Self> {
        self.clone_body()
    }

    fn body_name(&self) -> &'static str {
        self.class_name()
    }
}

/// Compares the state held in [`EvaluationCommon`] of two bodies.
pub fn same_common(left: &dyn EvaluationImplementation, right: &dyn EvaluationImplementation) -> bool {
    left.class_name() == right.class_name()
        && left.input_description() == right.input_description()
        && left.output_description() == right.output_description()
        && left.parameter() == right.parameter()
}

/// Fails unless every index lies in `[0, bound)`.
pub fn check_indices(what: &str, indices: &[usize], bound: usize) -> Result<(), UqfError> {
    match indices.iter().find(|&&index| index >= bound) {
        Some(&bad) => Err(UqfError::index_out_of_range(what, bad, bound)),
        None => Ok(()),
    }
}
