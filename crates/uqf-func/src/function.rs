use std::sync::Arc;

use uqf_core::{Description, Matrix, Point, Sample, UqfError};

use crate::composed::ComposedEvaluation;
use crate::evaluation::EvaluationImplementation;
use crate::history::{History, HistoryStrategy};
use crate::no_evaluation::NoEvaluation;
use crate::params::{DifferentiationOpts, EvaluationOpts};
use crate::shared::Shared;

/// Value-semantic handle around a shared evaluation body.
///
/// Cloning a `Function` shares the body, including its call counter. Every
/// mutator goes through copy-on-write, so a mutation through one handle is
/// never visible through another.
#[derive(Debug, Clone)]
pub struct Function {
    body: Shared<dyn EvaluationImplementation>,
}

impl Function {
    /// Wraps a concrete body.
    pub fn new<E: EvaluationImplementation>(body: E) -> Self {
        Self::from_arc(Arc::new(body))
    }

    /// Wraps a concrete body after applying `opts` to it.
    pub fn with_opts<E: EvaluationImplementation>(mut body: E, opts: &EvaluationOpts) -> Self {
        body.common_mut().configure(opts);
        Self::new(body)
    }

    /// Wraps an already shared body.
    pub fn from_arc(body: Arc<dyn EvaluationImplementation>) -> Self {
        Self {
            body: Shared::from_arc(body),
        }
    }

    /// Read access to the body.
    pub fn implementation(&self) -> &dyn EvaluationImplementation {
        self.body.get()
    }

    /// The shared body.
    pub fn implementation_arc(&self) -> &Arc<dyn EvaluationImplementation> {
        self.body.arc()
    }

    /// Mutable access to the body, detaching it first when shared.
    pub fn implementation_mut(&mut self) -> &mut dyn EvaluationImplementation {
        self.body.make_mut()
    }

    /// Whether another handle shares this body.
    pub fn is_shared(&self) -> bool {
        self.body.is_shared()
    }

    /// Whether both handles share one body.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        self.body.ptr_eq(&other.body)
    }

    pub(crate) fn identity(&self) -> usize {
        self.body.identity()
    }

    /// Class name of the body.
    pub fn class_name(&self) -> &'static str {
        self.implementation().class_name()
    }

    /// Input dimension.
    pub fn input_dimension(&self) -> usize {
        self.implementation().input_dimension()
    }

    /// Output dimension.
    pub fn output_dimension(&self) -> usize {
        self.implementation().output_dimension()
    }

    /// Evaluates a point.
    pub fn evaluate(&self, x: &Point) -> Result<Point, UqfError> {
        self.implementation().evaluate(x)
    }

    /// Evaluates every row of a sample.
    pub fn evaluate_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        self.implementation().evaluate_sample(xs)
    }

    /// Gradient with respect to the parameters.
    pub fn parameter_gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        self.implementation().parameter_gradient(x)
    }

    /// Input labels.
    pub fn input_description(&self) -> Description {
        self.implementation().input_description()
    }

    /// Replaces the input labels.
    pub fn set_input_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.implementation_mut().set_input_description(description)
    }

    /// Output labels.
    pub fn output_description(&self) -> Description {
        self.implementation().output_description()
    }

    /// Replaces the output labels.
    pub fn set_output_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.implementation_mut().set_output_description(description)
    }

    /// Parameter vector.
    pub fn parameter(&self) -> Point {
        self.implementation().parameter()
    }

    /// Replaces the parameter vector.
    pub fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        self.implementation_mut().set_parameter(parameter)
    }

    /// Parameter labels.
    pub fn parameter_description(&self) -> Description {
        self.implementation().parameter_description()
    }

    /// Replaces the parameter labels.
    pub fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.implementation_mut().set_parameter_description(description)
    }

    /// Dimension of the parameter vector.
    pub fn parameter_dimension(&self) -> usize {
        self.implementation().parameter_dimension()
    }

    /// Number of counted evaluations of the body.
    pub fn calls_number(&self) -> u64 {
        self.implementation().calls()
    }

    /// Restriction to output component `index`.
    pub fn marginal(&self, index: usize) -> Result<Function, UqfError> {
        self.marginal_indices(&[index])
    }

    /// Restriction to the output components `indices`, in order.
    pub fn marginal_indices(&self, indices: &[usize]) -> Result<Function, UqfError> {
        self.implementation().marginal(self, indices)
    }

    /// Composition `self ∘ right`.
    pub fn compose(&self, right: &Function) -> Result<Function, UqfError> {
        Ok(Function::new(ComposedEvaluation::new(self.clone(), right.clone())?))
    }

    /// Whether the body does actual work.
    pub fn is_actual_implementation(&self) -> bool {
        self.implementation().is_actual_implementation()
    }

    /// Whether concurrent evaluation is safe.
    pub fn is_parallel(&self) -> bool {
        self.implementation().is_parallel()
    }

    /// Applies evaluation options to this handle's body.
    pub fn configure(&mut self, opts: &EvaluationOpts) {
        self.implementation_mut().common_mut().configure(opts);
    }

    /// Applies differentiation options to this handle's body.
    pub fn configure_differentiation(&mut self, opts: &DifferentiationOpts) {
        self.implementation_mut().common_mut().configure_differentiation(opts);
    }

    /// Enables or disables the finite output check.
    pub fn set_check_output(&mut self, check_output: bool) {
        self.implementation_mut().common_mut().set_check_output(check_output);
    }

    /// Starts recording evaluations with the given strategy.
    pub fn enable_history(&mut self, strategy: HistoryStrategy) {
        self.implementation_mut().common_mut().set_history_strategy(strategy);
    }

    /// Stops recording evaluations.
    pub fn disable_history(&mut self) {
        self.enable_history(HistoryStrategy::Null);
    }

    /// Snapshot of the recorded evaluations.
    pub fn history(&self) -> History {
        self.implementation().common().history()
    }

    /// Forgets the recorded evaluations.
    pub fn clear_history(&self) {
        self.implementation().common().clear_history();
    }
}

impl Default for Function {
    fn default() -> Self {
        Function::new(NoEvaluation::new())
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.implementation().same_structure(other.implementation())
    }
}
