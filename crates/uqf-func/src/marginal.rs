use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{Description, Matrix, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::{check_indices, EvaluationImplementation};
use crate::function::Function;
use crate::persistence::{load_common, save_common, Advocate, Reader, StudyLoader};

/// Restriction of a function to some of its output components.
///
/// The base function is always evaluated in full and the requested
/// components are then picked in the given order. Repeated and permuted
/// indices are kept as given.
#[derive(Debug, Clone)]
pub struct MarginalEvaluation {
    common: EvaluationCommon,
    base: Function,
    indices: Vec<usize>,
}

impl MarginalEvaluation {
    /// Restricts `base` to the output components `indices`.
    pub fn new(base: Function, indices: Vec<usize>) -> Result<Self, UqfError> {
        check_indices("marginal output", &indices, base.output_dimension())?;
        let output_description = base.output_description().select(&indices)?;
        debug!(base = base.class_name(), ?indices, "marginal evaluation");
        Ok(Self {
            common: EvaluationCommon::with_descriptions(base.input_description(), output_description),
            base,
            indices,
        })
    }

    /// The restricted function.
    pub fn base_function(&self) -> &Function {
        &self.base
    }

    /// Selected output components.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn load(reader: &Reader<'_>, loader: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let base = loader.load_function(reader.object("evaluation_")?)?;
        let mut evaluation = Self::new(base, reader.indices("indices_")?)?;
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl EvaluationImplementation for MarginalEvaluation {
    fn class_name(&self) -> &'static str {
        "MarginalEvaluation"
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
        self.base.evaluate(x)?.select(&self.indices)
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        let ys = self.base.evaluate_sample(xs)?.marginal(&self.indices)?;
        self.common.count_calls(xs.size() as u64);
        self.common.finish_sample(self.class_name(), xs, &ys)?;
        Ok(ys)
    }

    fn parameter(&self) -> Point {
        self.base.parameter()
    }

    fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        self.base.set_parameter(parameter)
    }

    fn parameter_description(&self) -> Description {
        self.base.parameter_description()
    }

    fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.base.set_parameter_description(description)
    }

    fn parameter_dimension(&self) -> usize {
        self.base.parameter_dimension()
    }

    fn parameter_gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        let full = self.base.parameter_gradient(x)?;
        Ok(full.select_columns(self.indices.iter()))
    }

    fn marginal(&self, _this: &Function, indices: &[usize]) -> Result<Function, UqfError> {
        check_indices("marginal output", indices, self.indices.len())?;
        let composed = indices.iter().map(|&index| self.indices[index]).collect();
        Ok(Function::new(MarginalEvaluation::new(self.base.clone(), composed)?))
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        advocate.save_function("evaluation_", &self.base)?;
        advocate.save_indices("indices_", &self.indices);
        Ok(())
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self.base == other.base && self.indices == other.indices)
    }

    fn is_parallel(&self) -> bool {
        self.base.is_parallel()
    }
}
