use serde::{Deserialize, Serialize};
use uqf_core::{Point, Sample, UqfError};

/// Policy deciding which evaluated input/output pairs are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryStrategy {
    /// Nothing is recorded.
    #[default]
    Null,
    /// Every pair is recorded.
    Full,
    /// Only the most recent `n` pairs are kept.
    Last(usize),
}

/// Recorded input/output pairs of an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    strategy: HistoryStrategy,
    input: Sample,
    output: Sample,
}

impl History {
    /// Creates an empty history for the given dimensions.
    pub fn new(strategy: HistoryStrategy, input_dimension: usize, output_dimension: usize) -> Self {
        Self {
            strategy,
            input: Sample::empty(input_dimension),
            output: Sample::empty(output_dimension),
        }
    }

    /// Active strategy.
    pub fn strategy(&self) -> HistoryStrategy {
        self.strategy
    }

    /// Returns whether anything is being recorded.
    pub fn is_enabled(&self) -> bool {
        self.strategy != HistoryStrategy::Null
    }

    /// Recorded inputs.
    pub fn input(&self) -> &Sample {
        &self.input
    }

    /// Recorded outputs.
    pub fn output(&self) -> &Sample {
        &self.output
    }

    /// Forgets every recorded pair.
    pub fn clear(&mut self) {
        self.input = Sample::empty(self.input.dimension());
        self.output = Sample::empty(self.output.dimension());
    }

    pub(crate) fn record_point(&mut self, input: &Point, output: &Point) -> Result<(), UqfError> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.input.push(input)?;
        self.output.push(output)?;
        self.truncate();
        Ok(())
    }

    pub(crate) fn record_sample(&mut self, input: &Sample, output: &Sample) -> Result<(), UqfError> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.input.append(input)?;
        self.output.append(output)?;
        self.truncate();
        Ok(())
    }

    fn truncate(&mut self) {
        if let HistoryStrategy::Last(size) = self.strategy {
            self.input.keep_last(size);
            self.output.keep_last(size);
        }
    }
}
