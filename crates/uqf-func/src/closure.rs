use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uqf_core::{Description, ErrorInfo, Point, UqfError};

use crate::common::EvaluationCommon;
use crate::evaluation::EvaluationImplementation;
use crate::persistence::Advocate;

type Callback = dyn Fn(&Point) -> Result<Point, UqfError> + Send + Sync;

/// Evaluation backed by a user supplied closure.
///
/// Such bodies cannot be stored in a study.
#[derive(Clone)]
pub struct ClosureEvaluation {
    common: EvaluationCommon,
    callback: Arc<Callback>,
    parallel: bool,
}

impl ClosureEvaluation {
    /// Wraps `callback` with the declared dimensions.
    pub fn new<F>(input_dimension: usize, output_dimension: usize, callback: F) -> Self
    where
        F: Fn(&Point) -> Result<Point, UqfError> + Send + Sync + 'static,
    {
        Self {
            common: EvaluationCommon::new(input_dimension, output_dimension),
            callback: Arc::new(callback),
            parallel: true,
        }
    }

    /// Wraps an infallible `callback`.
    pub fn from_fn<F>(input_dimension: usize, output_dimension: usize, callback: F) -> Self
    where
        F: Fn(&Point) -> Point + Send + Sync + 'static,
    {
        Self::new(input_dimension, output_dimension, move |x| Ok(callback(x)))
    }

    /// Replaces the default descriptions.
    pub fn with_descriptions(mut self, input: Description, output: Description) -> Result<Self, UqfError> {
        self.common.set_input_description(input)?;
        self.common.set_output_description(output)?;
        Ok(self)
    }

    /// Declares whether the closure may run concurrently.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl fmt::Debug for ClosureEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureEvaluation")
            .field("common", &self.common)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl EvaluationImplementation for ClosureEvaluation {
    fn class_name(&self) -> &'static str {
        "ClosureEvaluation"
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
        (self.callback)(x)
    }

    fn save(&self, _advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        Err(UqfError::Serde(
            ErrorInfo::new("not-persistable", "closure evaluations cannot be stored")
                .with_hint("replace the closure by a persistable evaluation before saving"),
        ))
    }

    fn same_structure(&self, other: &dyn EvaluationImplementation) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| {
                Arc::ptr_eq(&self.callback, &other.callback)
                    && self.common.input_description() == other.common.input_description()
                    && self.common.output_description() == other.common.output_description()
            })
    }

    fn is_parallel(&self) -> bool {
        self.parallel
    }
}
