use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;
use uqf_core::{check_dimension, Description, ErrorInfo, Point, Sample, UqfError};

use crate::history::{History, HistoryStrategy};
use crate::params::{DifferentiationOpts, EvaluationOpts};

/// State every evaluation body carries: descriptions, parameters, call
/// counter, output checking, history and the parameter differentiation step.
///
/// The call counter is the only field touched during evaluation besides the
/// history store, and is updated atomically.
#[derive(Debug)]
pub struct EvaluationCommon {
    input_description: Description,
    output_description: Description,
    parameter: Point,
    parameter_description: Description,
    calls: AtomicU64,
    check_output: bool,
    parameter_epsilon: f64,
    history: Mutex<History>,
}

impl EvaluationCommon {
    /// Creates the state for a body with default `x`/`y` descriptions.
    pub fn new(input_dimension: usize, output_dimension: usize) -> Self {
        Self::with_descriptions(
            Description::build_default(input_dimension, "x"),
            Description::build_default(output_dimension, "y"),
        )
    }

    /// Creates the state from explicit descriptions.
    pub fn with_descriptions(input_description: Description, output_description: Description) -> Self {
        let opts = EvaluationOpts::default();
        let history = History::new(
            opts.history,
            input_description.len(),
            output_description.len(),
        );
        Self {
            input_description,
            output_description,
            parameter: Point::zeros(0),
            parameter_description: Description::default(),
            calls: AtomicU64::new(0),
            check_output: opts.check_output,
            parameter_epsilon: DifferentiationOpts::default().parameter_epsilon,
            history: Mutex::new(history),
        }
    }

    /// Installs a parameter vector with default `p` labels.
    pub fn with_parameter(mut self, parameter: Point) -> Self {
        self.parameter_description = Description::build_default(parameter.dimension(), "p");
        self.parameter = parameter;
        self
    }

    /// Applies the given options.
    pub fn configure(&mut self, opts: &EvaluationOpts) {
        let opts = opts.sanitised();
        self.check_output = opts.check_output;
        self.set_history_strategy(opts.history);
    }

    /// Input labels.
    pub fn input_description(&self) -> &Description {
        &self.input_description
    }

    /// Replaces the input labels; the count must not change.
    pub fn set_input_description(&mut self, description: Description) -> Result<(), UqfError> {
        check_dimension("input description", self.input_description.len(), description.len())?;
        self.input_description = description;
        Ok(())
    }

    /// Output labels.
    pub fn output_description(&self) -> &Description {
        &self.output_description
    }

    /// Replaces the output labels; the count must not change.
    pub fn set_output_description(&mut self, description: Description) -> Result<(), UqfError> {
        check_dimension("output description", self.output_description.len(), description.len())?;
        self.output_description = description;
        Ok(())
    }

    /// Parameter vector.
    pub fn parameter(&self) -> &Point {
        &self.parameter
    }

    /// Replaces the parameter vector; the dimension must not change.
    pub fn set_parameter(&mut self, parameter: Point) -> Result<(), UqfError> {
        check_dimension("parameter", self.parameter.dimension(), parameter.dimension())?;
        self.parameter = parameter;
        Ok(())
    }

    /// Parameter labels.
    pub fn parameter_description(&self) -> &Description {
        &self.parameter_description
    }

    /// Replaces the parameter labels; the count must match the parameter.
    pub fn set_parameter_description(&mut self, description: Description) -> Result<(), UqfError> {
        check_dimension("parameter description", self.parameter.dimension(), description.len())?;
        self.parameter_description = description;
        Ok(())
    }

    /// Number of evaluations performed so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Adds `count` to the call counter.
    pub fn count_calls(&self, count: u64) {
        self.calls.fetch_add(count, Ordering::Relaxed);
    }

    /// Applies the parameter step of the given differentiation options.
    pub fn configure_differentiation(&mut self, opts: &DifferentiationOpts) {
        self.parameter_epsilon = opts.sanitised().parameter_epsilon;
    }

    /// Step used by the default parameter gradient.
    pub fn parameter_epsilon(&self) -> f64 {
        self.parameter_epsilon
    }

    /// Whether non-finite outputs are rejected.
    pub fn check_output(&self) -> bool {
        self.check_output
    }

    /// Enables or disables output checking.
    pub fn set_check_output(&mut self, check_output: bool) {
        self.check_output = check_output;
    }

    /// Snapshot of the recorded history.
    pub fn history(&self) -> History {
        self.lock_history().clone()
    }

    /// Active history strategy.
    pub fn history_strategy(&self) -> HistoryStrategy {
        self.lock_history().strategy()
    }

    /// Replaces the history strategy, dropping what was recorded.
    pub fn set_history_strategy(&mut self, strategy: HistoryStrategy) {
        let history = History::new(
            strategy,
            self.input_description.len(),
            self.output_description.len(),
        );
        *self
            .history
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = history;
    }

    /// Forgets the recorded pairs, keeping the strategy.
    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    /// Validates and records a point evaluation.
    pub fn finish_point(&self, class_name: &str, input: &Point, output: &Point) -> Result<(), UqfError> {
        if self.check_output && !output.is_finite() {
            warn!(class = class_name, "non-finite output rejected");
            return Err(non_finite(class_name, &format!("{:?}", input.as_slice())));
        }
        let mut history = self.lock_history();
        if history.is_enabled() {
            history.record_point(input, output)?;
        }
        Ok(())
    }

    /// Validates and records a sample evaluation.
    pub fn finish_sample(&self, class_name: &str, input: &Sample, output: &Sample) -> Result<(), UqfError> {
        if self.check_output && !output.is_finite() {
            warn!(class = class_name, size = input.size(), "non-finite output rejected");
            return Err(non_finite(class_name, &format!("sample of size {}", input.size())));
        }
        let mut history = self.lock_history();
        if history.is_enabled() {
            history.record_sample(input, output)?;
        }
        Ok(())
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clone for EvaluationCommon {
    fn clone(&self) -> Self {
        Self {
            input_description: self.input_description.clone(),
            output_description: self.output_description.clone(),
            parameter: self.parameter.clone(),
            parameter_description: self.parameter_description.clone(),
            calls: AtomicU64::new(self.calls()),
            check_output: self.check_output,
            parameter_epsilon: self.parameter_epsilon,
            history: Mutex::new(self.history()),
        }
    }
}

fn non_finite(class_name: &str, input: &str) -> UqfError {
    UqfError::Evaluation(
        ErrorInfo::new("non-finite-output", format!("{class_name} produced a non-finite value"))
            .with_context("class", class_name)
            .with_context("input", input),
    )
}
