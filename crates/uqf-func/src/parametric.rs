use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{check_dimension, ErrorInfo, Point, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::{check_indices, EvaluationImplementation};
use crate::function::Function;
use crate::persistence::{load_common, save_common, Advocate, Reader, StudyLoader};

/// Freezes some inputs of a function and exposes them as parameters.
///
/// The parameter vector holds the frozen values in the order of
/// `parameter_positions`; the remaining inputs keep their relative order.
#[derive(Debug, Clone)]
pub struct ParametricEvaluation {
    common: EvaluationCommon,
    function: Function,
    parameter_positions: Vec<usize>,
    input_positions: Vec<usize>,
}

impl ParametricEvaluation {
    /// Freezes the inputs at `positions` of `function` to `reference`.
    pub fn new(function: Function, positions: Vec<usize>, reference: Point) -> Result<Self, UqfError> {
        let full = function.input_dimension();
        check_indices("parametric position", &positions, full)?;
        check_dimension("parametric reference", positions.len(), reference.dimension())?;
        let unique: BTreeSet<usize> = positions.iter().copied().collect();
        if unique.len() != positions.len() {
            return Err(UqfError::Parameter(
                ErrorInfo::new("duplicate-position", "parametric positions must be distinct")
                    .with_context("positions", format!("{positions:?}")),
            ));
        }
        let input_positions: Vec<usize> = (0..full).filter(|index| !unique.contains(index)).collect();
        let description = function.input_description();
        let mut common = EvaluationCommon::with_descriptions(
            description.select(&input_positions)?,
            function.output_description(),
        )
        .with_parameter(reference);
        common.set_parameter_description(description.select(&positions)?)?;
        debug!(
            function = function.class_name(),
            frozen = positions.len(),
            "parametric evaluation"
        );
        Ok(Self {
            common,
            function,
            parameter_positions: positions,
            input_positions,
        })
    }

    /// The underlying function.
    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Inputs of the underlying function held as parameters.
    pub fn parameter_positions(&self) -> &[usize] {
        &self.parameter_positions
    }

    fn full_input(&self, x: &Point) -> Point {
        let mut full = Point::zeros(self.function.input_dimension());
        for (&position, &value) in self.input_positions.iter().zip(x.iter()) {
            full[position] = value;
        }
        let parameter = self.common.parameter();
        for (&position, &value) in self.parameter_positions.iter().zip(parameter.iter()) {
            full[position] = value;
        }
        full
    }

    pub(crate) fn load(reader: &Reader<'_>, loader: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let function = loader.load_function(reader.object("function_")?)?;
        let mut evaluation = Self::new(
            function,
            reader.indices("parametersPositions_")?,
            reader.point("parameter_")?,
        )?;
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl EvaluationImplementation for ParametricEvaluation {
    fn class_name(&self) -> &'static str {
        "ParametricEvaluation"
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
        self.function.evaluate(&self.full_input(x))
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        advocate.save_function("function_", &self.function)?;
        advocate.save_indices("parametersPositions_", &self.parameter_positions);
        Ok(())
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| {
                self.function == other.function
                    && self.parameter_positions == other.parameter_positions
                    && self.common.parameter() == other.common.parameter()
            })
    }

    fn is_parallel(&self) -> bool {
        self.function.is_parallel()
    }
}
