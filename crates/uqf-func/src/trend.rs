use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{Description, Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::EvaluationImplementation;
use crate::function::Function;
use crate::persistence::{load_common, save_common, Advocate, Reader, StudyLoader};

/// Removes a trend: `(t, v) -> v - g(t)`.
pub type TrendEvaluation = TrendAdjustment<true>;

/// Reinstates a trend: `(t, v) -> v + g(t)`.
pub type InverseTrendEvaluation = TrendAdjustment<false>;

/// Additive trend adjustment driven by a trend function `g`.
///
/// The input is the concatenation of a position `t` (dimension
/// `g.input_dimension()`) and a value `v` (dimension `g.output_dimension()`).
#[derive(Debug, Clone)]
pub struct TrendAdjustment<const REMOVE: bool> {
    common: EvaluationCommon,
    trend: Function,
}

impl<const REMOVE: bool> TrendAdjustment<REMOVE> {
    /// Wraps the trend function `trend`.
    pub fn new(trend: Function) -> Self {
        let input_description = trend.input_description().concat(&trend.output_description());
        debug!(
            remove = REMOVE,
            positions = trend.input_dimension(),
            values = trend.output_dimension(),
            "trend evaluation"
        );
        Self {
            common: EvaluationCommon::with_descriptions(input_description, trend.output_description()),
            trend,
        }
    }

    /// The trend function `g`.
    pub fn trend_function(&self) -> &Function {
        &self.trend
    }

    fn sign(&self) -> f64 {
        if REMOVE {
            -1.0
        } else {
            1.0
        }
    }

    pub(crate) fn load(reader: &Reader<'_>, loader: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let trend = loader.load_function(reader.object("function_")?)?;
        let mut evaluation = Self::new(trend);
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl<const REMOVE: bool> EvaluationImplementation for TrendAdjustment<REMOVE> {
    fn class_name(&self) -> &'static str {
        if REMOVE {
            "TrendEvaluation"
        } else {
            "InverseTrendEvaluation"
        }
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
        let split = self.trend.input_dimension();
        let trend = self.trend.evaluate(&x.slice(0, split)?)?;
        let value = x.slice(split, x.dimension())?;
        Ok(&value + &(&trend * self.sign()))
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        let split = self.trend.input_dimension();
        let positions: Vec<usize> = (0..split).collect();
        let values: Vec<usize> = (split..xs.dimension()).collect();
        let trend = self.trend.evaluate_sample(&xs.marginal(&positions)?)?;
        let mut ys = xs.marginal(&values)?;
        let sign = self.sign();
        for row in 0..ys.size() {
            for column in 0..ys.dimension() {
                ys.set(row, column, ys.get(row, column) + sign * trend.get(row, column));
            }
        }
        self.common.count_calls(xs.size() as u64);
        self.common.finish_sample(self.class_name(), xs, &ys)?;
        Ok(ys)
    }

    fn parameter(&self) -> Point {
        self.trend.parameter()
    }

    fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        self.trend.set_parameter(parameter)
    }

    fn parameter_description(&self) -> Description {
        self.trend.parameter_description()
    }

    fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.trend.set_parameter_description(description)
    }

    fn parameter_dimension(&self) -> usize {
        self.trend.parameter_dimension()
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        advocate.save_function("function_", &self.trend)
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self.trend == other.trend)
    }

    fn is_parallel(&self) -> bool {
        self.trend.is_parallel()
    }
}
