use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{check_dimension, Description, ErrorInfo, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::EvaluationImplementation;
use crate::function::Function;
use crate::persistence::{load_common, save_common, Advocate, Reader, StudyLoader};

/// Composition `left ∘ right`.
///
/// The parameter vector is the parameter of `right` followed by the parameter
/// of `left`; every parameter accessor splits or joins at
/// `right.parameter_dimension()`.
#[derive(Debug, Clone)]
pub struct ComposedEvaluation {
    common: EvaluationCommon,
    left: Function,
    right: Function,
}

impl ComposedEvaluation {
    /// Builds `left ∘ right`; `left` must accept what `right` produces.
    pub fn new(left: Function, right: Function) -> Result<Self, UqfError> {
        if left.input_dimension() != right.output_dimension() {
            return Err(UqfError::Dimension(
                ErrorInfo::new(
                    "composition-mismatch",
                    format!(
                        "cannot compose a left function of input dimension {} with a right function of output dimension {}",
                        left.input_dimension(),
                        right.output_dimension()
                    ),
                )
                .with_context("left_input", left.input_dimension())
                .with_context("right_output", right.output_dimension()),
            ));
        }
        debug!(
            left = left.class_name(),
            right = right.class_name(),
            input = right.input_dimension(),
            output = left.output_dimension(),
            "composed evaluation"
        );
        Ok(Self {
            common: EvaluationCommon::with_descriptions(
                right.input_description(),
                left.output_description(),
            ),
            left,
            right,
        })
    }

    /// Outer function.
    pub fn left_function(&self) -> &Function {
        &self.left
    }

    /// Inner function.
    pub fn right_function(&self) -> &Function {
        &self.right
    }

    pub(crate) fn load(reader: &Reader<'_>, loader: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let left = loader.load_function(reader.object("leftFunction_")?)?;
        let right = loader.load_function(reader.object("rightFunction_")?)?;
        let mut evaluation = Self::new(left, right)?;
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl EvaluationImplementation for ComposedEvaluation {
    fn class_name(&self) -> &'static str {
        "ComposedEvaluation"
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
        self.left.evaluate(&self.right.evaluate(x)?)
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        let ys = self.left.evaluate_sample(&self.right.evaluate_sample(xs)?)?;
        self.common.count_calls(xs.size() as u64);
        self.common.finish_sample(self.class_name(), xs, &ys)?;
        Ok(ys)
    }

    fn parameter(&self) -> Point {
        self.right.parameter().concat(&self.left.parameter())
    }

    fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        let right_size = self.right.parameter_dimension();
        let expected = right_size + self.left.parameter_dimension();
        check_dimension("composed parameter", expected, parameter.dimension())?;
        self.right.set_parameter(parameter.slice(0, right_size)?)?;
        self.left
            .set_parameter(parameter.slice(right_size, parameter.dimension())?)
    }

    fn parameter_description(&self) -> Description {
        self.right
            .parameter_description()
            .concat(&self.left.parameter_description())
    }

    fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        let split = self.right.parameter_dimension();
        let expected = split + self.left.parameter_dimension();
        check_dimension("composed parameter description", expected, description.len())?;
        self.right
            .set_parameter_description(description.slice(0, split)?)?;
        self.left
            .set_parameter_description(description.slice(split, description.len())?)
    }

    fn parameter_dimension(&self) -> usize {
        self.right.parameter_dimension() + self.left.parameter_dimension()
    }

    fn marginal(&self, _this: &Function, indices: &[usize]) -> Result<Function, UqfError> {
        let left = self.left.marginal_indices(indices)?;
        Ok(Function::new(ComposedEvaluation::new(left, self.right.clone())?))
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        advocate.save_function("leftFunction_", &self.left)?;
        advocate.save_function("rightFunction_", &self.right)
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self.left == other.left && self.right == other.right)
    }

    fn is_parallel(&self) -> bool {
        self.left.is_parallel() && self.right.is_parallel()
    }
}
