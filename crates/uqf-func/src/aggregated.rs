use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{check_dimension, Description, ErrorInfo, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::EvaluationImplementation;
use crate::function::Function;
use crate::persistence::{load_common, save_common, Advocate, Reader, StudyLoader};

/// Stacks the outputs of functions sharing one input.
///
/// Parameters are concatenated in function order.
#[derive(Debug, Clone)]
pub struct AggregatedEvaluation {
    common: EvaluationCommon,
    functions: Vec<Function>,
}

impl AggregatedEvaluation {
    /// Aggregates `functions`; at least one is required.
    pub fn new(functions: Vec<Function>) -> Result<Self, UqfError> {
        let first = functions.first().ok_or_else(|| {
            UqfError::Parameter(ErrorInfo::new(
                "empty-aggregation",
                "an aggregated evaluation needs at least one function",
            ))
        })?;
        let input_dimension = first.input_dimension();
        for function in &functions {
            check_dimension("aggregated input", input_dimension, function.input_dimension())?;
        }
        let output_description = functions
            .iter()
            .fold(Description::default(), |acc, function| {
                acc.concat(&function.output_description())
            });
        debug!(count = functions.len(), "aggregated evaluation");
        Ok(Self {
            common: EvaluationCommon::with_descriptions(first.input_description(), output_description),
            functions,
        })
    }

    /// Aggregated functions.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub(crate) fn load(reader: &Reader<'_>, loader: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let functions = reader
            .objects("functionsCollection_")?
            .into_iter()
            .map(|id| loader.load_function(id))
            .collect::<Result<Vec<_>, _>>()?;
        let mut evaluation = Self::new(functions)?;
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl EvaluationImplementation for AggregatedEvaluation {
    fn class_name(&self) -> &'static str {
        "AggregatedEvaluation"
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
        let mut values = Vec::with_capacity(self.output_dimension());
        for function in &self.functions {
            values.extend(function.evaluate(x)?.into_vec());
        }
        Ok(Point::from(values))
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        let mut ys = Sample::zeros(xs.size(), 0);
        for function in &self.functions {
            ys = ys.stack(&function.evaluate_sample(xs)?)?;
        }
        self.common.count_calls(xs.size() as u64);
        self.common.finish_sample(self.class_name(), xs, &ys)?;
        Ok(ys)
    }

    fn parameter(&self) -> Point {
        Point::from(
            self.functions
                .iter()
                .flat_map(|function| function.parameter().into_vec())
                .collect::<Vec<_>>(),
        )
    }

    fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        check_dimension("aggregated parameter", self.parameter_dimension(), parameter.dimension())?;
        let mut start = 0;
        for function in &mut self.functions {
            let end = start + function.parameter_dimension();
            function.set_parameter(parameter.slice(start, end)?)?;
            start = end;
        }
        Ok(())
    }

    fn parameter_description(&self) -> Description {
        self.functions
            .iter()
            .fold(Description::default(), |acc, function| {
                acc.concat(&function.parameter_description())
            })
    }

    fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        check_dimension(
            "aggregated parameter description",
            self.parameter_dimension(),
            description.len(),
        )?;
        let mut start = 0;
        for function in &mut self.functions {
            let end = start + function.parameter_dimension();
            function.set_parameter_description(description.slice(start, end)?)?;
            start = end;
        }
        Ok(())
    }

    fn parameter_dimension(&self) -> usize {
        self.functions
            .iter()
            .map(Function::parameter_dimension)
            .sum()
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        advocate.save_functions("functionsCollection_", &self.functions)
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self.functions == other.functions)
    }

    fn is_parallel(&self) -> bool {
        self.functions.iter().all(Function::is_parallel)
    }
}
