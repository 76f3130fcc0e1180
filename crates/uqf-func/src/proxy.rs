use std::any::Any;
use std::sync::Arc;

use uqf_core::{Description, Matrix, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::EvaluationImplementation;
use crate::function::Function;
use crate::persistence::{Advocate, Reader, StudyLoader};

/// Body that forwards every operation to a held function.
///
/// Calls are counted by the held body, and mutators detach the held body
/// through its own copy-on-write path.
#[derive(Debug, Clone)]
pub struct EvaluationProxy {
    function: Function,
}

impl EvaluationProxy {
    /// Forwards to `function`.
    pub fn new(function: Function) -> Self {
        Self { function }
    }

    /// The held function.
    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Replaces the held function.
    pub fn set_function(&mut self, function: Function) {
        self.function = function;
    }

    pub(crate) fn load(reader: &Reader<'_>, loader: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        Ok(Self::new(loader.load_function(reader.object("evaluation_")?)?))
    }
}

impl EvaluationImplementation for EvaluationProxy {
    fn class_name(&self) -> &'static str {
        "EvaluationProxy"
    }

    fn clone_body(&self) -> Arc<dyn EvaluationImplementation> {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn common(&self) -> &EvaluationCommon {
        self.function.implementation().common()
    }

    fn common_mut(&mut self) -> &mut EvaluationCommon {
        self.function.implementation_mut().common_mut()
    }

    fn compute(&self, x: &Point) -> Result<Point, UqfError> {
        self.function.implementation().compute(x)
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        advocate.save_function("evaluation_", &self.function)
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self.function == other.function)
    }

    fn input_dimension(&self) -> usize {
        self.function.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.function.output_dimension()
    }

    fn evaluate(&self, x: &Point) -> Result<Point, UqfError> {
        self.function.evaluate(x)
    }

    fn evaluate_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        self.function.evaluate_sample(xs)
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        self.function.implementation().compute_sample(xs)
    }

    fn input_description(&self) -> Description {
        self.function.input_description()
    }

    fn set_input_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.function.set_input_description(description)
    }

    fn output_description(&self) -> Description {
        self.function.output_description()
    }

    fn set_output_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.function.set_output_description(description)
    }

    fn parameter(&self) -> Point {
        self.function.parameter()
    }

    fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        self.function.set_parameter(parameter)
    }

    fn parameter_description(&self) -> Description {
        self.function.parameter_description()
    }

    fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.function.set_parameter_description(description)
    }

    fn parameter_dimension(&self) -> usize {
        self.function.parameter_dimension()
    }

    fn parameter_gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        self.function.parameter_gradient(x)
    }

    fn calls(&self) -> u64 {
        self.function.calls_number()
    }

    fn marginal(&self, _this: &Function, indices: &[usize]) -> Result<Function, UqfError> {
        self.function.marginal_indices(indices)
    }

    fn is_actual_implementation(&self) -> bool {
        self.function.is_actual_implementation()
    }

    fn is_parallel(&self) -> bool {
        self.function.is_parallel()
    }
}
