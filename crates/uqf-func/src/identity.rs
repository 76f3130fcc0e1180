use std::any::Any;
use std::sync::Arc;

use uqf_core::{Point, Sample, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::{same_common, EvaluationImplementation};
use crate::persistence::{load_common, save_common, Advocate, Reader};

/// `x -> x` in a given dimension.
#[derive(Debug, Clone)]
pub struct IdentityEvaluation {
    common: EvaluationCommon,
}

impl IdentityEvaluation {
    /// Identity on `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            common: EvaluationCommon::new(dimension, dimension),
        }
    }

    pub(crate) fn load(reader: &Reader<'_>) -> Result<Self, UqfError> {
        let dimension = reader.description("inputDescription_")?.len();
        let mut evaluation = Self::new(dimension);
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl EvaluationImplementation for IdentityEvaluation {
    fn class_name(&self) -> &'static str {
        "IdentityEvaluation"
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
        Ok(x.clone())
    }

    fn compute_sample(&self, xs: &Sample) -> Result<Sample, UqfError> {
        self.common.count_calls(xs.size() as u64);
        self.common.finish_sample(self.class_name(), xs, xs)?;
        Ok(xs.clone())
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        Ok(())
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        same_common(self, other)
    }
}
