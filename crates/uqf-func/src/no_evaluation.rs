use std::any::Any;
use std::sync::Arc;

use uqf_core::{Point, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::{same_common, EvaluationImplementation};
use crate::persistence::{load_common, save_common, Advocate, Reader};

/// Null object: zero input and output dimensions.
///
/// Placeholder for composites that are not configured yet. It can be built,
/// stored and compared, but any non-empty input is rejected.
#[derive(Debug, Clone)]
pub struct NoEvaluation {
    common: EvaluationCommon,
}

impl NoEvaluation {
    /// Creates the null evaluation.
    pub fn new() -> Self {
        Self {
            common: EvaluationCommon::new(0, 0),
        }
    }

    pub(crate) fn load(reader: &Reader<'_>) -> Result<Self, UqfError> {
        let mut evaluation = Self::new();
        load_common(reader, &mut evaluation.common)?;
        Ok(evaluation)
    }
}

impl Default for NoEvaluation {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationImplementation for NoEvaluation {
    fn class_name(&self) -> &'static str {
        "NoEvaluation"
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

    fn compute(&self, _x: &Point) -> Result<Point, UqfError> {
        Ok(Point::zeros(0))
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_common(advocate, &self.common);
        Ok(())
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        same_common(self, other)
    }

    fn is_actual_implementation(&self) -> bool {
        false
    }
}
