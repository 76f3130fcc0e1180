use std::fmt;
use std::sync::Arc;

use uqf_core::{check_dimension, ErrorInfo, Point, UqfError};

/// Rule producing the per-dimension perturbation used around a point.
pub trait StepPolicy: fmt::Debug + Send + Sync {
    /// Class name used in logs.
    fn class_name(&self) -> &'static str;

    /// Base step, one nonzero component per input dimension.
    fn epsilon(&self) -> &Point;

    /// Step to use around `x`.
    fn step_at(&self, x: &Point) -> Result<Point, UqfError>;
}

/// Step equal to `epsilon` everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantStep {
    epsilon: Point,
}

impl ConstantStep {
    /// Creates the policy; every component must be finite and nonzero.
    pub fn new(epsilon: Point) -> Result<Self, UqfError> {
        check_nonzero(&epsilon)?;
        Ok(Self { epsilon })
    }
}

impl StepPolicy for ConstantStep {
    fn class_name(&self) -> &'static str {
        "ConstantStep"
    }

    fn epsilon(&self) -> &Point {
        &self.epsilon
    }

    fn step_at(&self, x: &Point) -> Result<Point, UqfError> {
        check_dimension("step location", self.epsilon.dimension(), x.dimension())?;
        Ok(self.epsilon.clone())
    }
}

/// Step `epsilon_i * (|x_i| + eta_i)`, scaling with the magnitude of `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendedStep {
    epsilon: Point,
    eta: Point,
}

impl BlendedStep {
    /// Creates the policy; `eta` must be positive so that no step vanishes.
    pub fn new(epsilon: Point, eta: Point) -> Result<Self, UqfError> {
        check_nonzero(&epsilon)?;
        check_dimension("blended step offset", epsilon.dimension(), eta.dimension())?;
        if let Some((index, value)) = eta
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || **value <= 0.0)
        {
            return Err(UqfError::Parameter(
                ErrorInfo::new("blended-eta", format!("offset component {index} must be positive, got {value}"))
                    .with_context("index", index),
            ));
        }
        Ok(Self { epsilon, eta })
    }

    /// Offset added to `|x|`.
    pub fn eta(&self) -> &Point {
        &self.eta
    }
}

impl StepPolicy for BlendedStep {
    fn class_name(&self) -> &'static str {
        "BlendedStep"
    }

    fn epsilon(&self) -> &Point {
        &self.epsilon
    }

    fn step_at(&self, x: &Point) -> Result<Point, UqfError> {
        check_dimension("step location", self.epsilon.dimension(), x.dimension())?;
        Ok(Point::from(
            self.epsilon
                .iter()
                .zip(self.eta.iter())
                .zip(x.iter())
                .map(|((epsilon, eta), value)| epsilon * (value.abs() + eta))
                .collect::<Vec<_>>(),
        ))
    }
}

/// Shared handle on a step policy.
#[derive(Debug, Clone)]
pub struct FiniteDifferenceStep {
    policy: Arc<dyn StepPolicy>,
}

impl FiniteDifferenceStep {
    /// Wraps a policy.
    pub fn new<P: StepPolicy + 'static>(policy: P) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Constant step `epsilon` in `dimension` directions.
    pub fn scalar(epsilon: f64, dimension: usize) -> Result<Self, UqfError> {
        if epsilon == 0.0 || !epsilon.is_finite() {
            return Err(zero_step(0, epsilon));
        }
        Ok(Self::new(ConstantStep::new(Point::filled(dimension, epsilon))?))
    }

    /// Constant step with one component per direction.
    pub fn constant(epsilon: Point) -> Result<Self, UqfError> {
        Ok(Self::new(ConstantStep::new(epsilon)?))
    }

    /// Blended step, see [`BlendedStep`].
    pub fn blended(epsilon: Point, eta: Point) -> Result<Self, UqfError> {
        Ok(Self::new(BlendedStep::new(epsilon, eta)?))
    }

    /// Base step.
    pub fn epsilon(&self) -> &Point {
        self.policy.epsilon()
    }

    /// Number of directions.
    pub fn dimension(&self) -> usize {
        self.policy.epsilon().dimension()
    }

    /// Step to use around `x`.
    pub fn step_at(&self, x: &Point) -> Result<Point, UqfError> {
        let step = self.policy.step_at(x)?;
        check_nonzero(&step)?;
        Ok(step)
    }

    /// Class name of the policy.
    pub fn class_name(&self) -> &'static str {
        self.policy.class_name()
    }
}

/// Zero-dimensional step used by unconfigured engines.
#[derive(Debug, Default)]
pub(crate) struct EmptyStep {
    epsilon: Point,
}

impl StepPolicy for EmptyStep {
    fn class_name(&self) -> &'static str {
        "EmptyStep"
    }

    fn epsilon(&self) -> &Point {
        &self.epsilon
    }

    fn step_at(&self, x: &Point) -> Result<Point, UqfError> {
        check_dimension("step location", 0, x.dimension())?;
        Ok(Point::zeros(0))
    }
}

fn check_nonzero(epsilon: &Point) -> Result<(), UqfError> {
    match epsilon
        .iter()
        .enumerate()
        .find(|(_, value)| **value == 0.0 || !value.is_finite())
    {
        Some((index, value)) => Err(zero_step(index, *value)),
        None => Ok(()),
    }
}

fn zero_step(index: usize, value: f64) -> UqfError {
    UqfError::Parameter(
        ErrorInfo::new(
            "degenerate-step",
            format!("finite difference step component {index} must be finite and nonzero, got {value}"),
        )
        .with_context("index", index),
    )
}
