use std::fmt;

use tracing::debug;
use uqf_core::{check_dimension, Matrix, Point, Sample, UqfError};

use crate::function::Function;
use crate::params::DifferentiationOpts;

use super::step::{EmptyStep, FiniteDifferenceStep};

/// Jacobian provider, `inputDimension x outputDimension`.
pub trait GradientImplementation: fmt::Debug + Send + Sync {
    /// Class name used in logs and errors.
    fn class_name(&self) -> &'static str;

    /// Input dimension of the differentiated function.
    fn input_dimension(&self) -> usize;

    /// Output dimension of the differentiated function.
    fn output_dimension(&self) -> usize;

    /// Gradient at `x`.
    fn gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        let _ = x;
        Err(UqfError::not_implemented(self.class_name(), "gradient"))
    }
}

/// Function and step policy shared by the finite-difference gradients.
///
/// On its own it computes nothing: [`GradientImplementation::gradient`]
/// reports a not-implemented error, and the centered or forward variants
/// supply the stencil.
#[derive(Debug, Clone)]
pub struct FiniteDifferenceGradient {
    step: FiniteDifferenceStep,
    function: Function,
}

impl FiniteDifferenceGradient {
    /// Uses the default gradient step for `function`.
    pub fn new(function: Function) -> Result<Self, UqfError> {
        let epsilon = DifferentiationOpts::default().gradient_epsilon;
        Self::from_scalar(epsilon, function)
    }

    /// Blended step built from `opts`.
    pub fn with_opts(opts: &DifferentiationOpts, function: Function) -> Result<Self, UqfError> {
        let opts = opts.sanitised();
        let dimension = function.input_dimension();
        let step = FiniteDifferenceStep::blended(
            Point::filled(dimension, opts.gradient_epsilon),
            Point::filled(dimension, opts.blended_eta),
        )?;
        Self::with_step(step, function)
    }

    /// Broadcasts a scalar step to every input dimension.
    pub fn from_scalar(epsilon: f64, function: Function) -> Result<Self, UqfError> {
        let step = FiniteDifferenceStep::scalar(epsilon, function.input_dimension())?;
        Self::with_step(step, function)
    }

    /// One step component per input dimension.
    pub fn from_epsilon(epsilon: Point, function: Function) -> Result<Self, UqfError> {
        Self::with_step(FiniteDifferenceStep::constant(epsilon)?, function)
    }

    /// Uses an explicit step policy.
    pub fn with_step(step: FiniteDifferenceStep, function: Function) -> Result<Self, UqfError> {
        check_dimension("gradient step", function.input_dimension(), step.dimension())?;
        debug!(
            function = function.class_name(),
            step = step.class_name(),
            "finite difference gradient"
        );
        Ok(Self { step, function })
    }

    /// Differentiated function.
    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Step policy.
    pub fn step(&self) -> &FiniteDifferenceStep {
        &self.step
    }

    /// Base step of the policy.
    pub fn epsilon(&self) -> &Point {
        self.step.epsilon()
    }

    fn prepare(&self, x: &Point) -> Result<Point, UqfError> {
        check_dimension("gradient location", self.function.input_dimension(), x.dimension())?;
        self.step.step_at(x)
    }
}

impl Default for FiniteDifferenceGradient {
    fn default() -> Self {
        Self {
            step: FiniteDifferenceStep::new(EmptyStep::default()),
            function: Function::default(),
        }
    }
}

impl GradientImplementation for FiniteDifferenceGradient {
    fn class_name(&self) -> &'static str {
        "FiniteDifferenceGradient"
    }

    fn input_dimension(&self) -> usize {
        self.function.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.function.output_dimension()
    }
}

/// Centered differences `(f(x + h e_i) - f(x - h e_i)) / 2h`.
#[derive(Debug, Clone, Default)]
pub struct CenteredFiniteDifferenceGradient {
    base: FiniteDifferenceGradient,
}

impl CenteredFiniteDifferenceGradient {
    /// Wraps the shared configuration.
    pub fn new(base: FiniteDifferenceGradient) -> Self {
        Self { base }
    }

    /// Shared configuration.
    pub fn base(&self) -> &FiniteDifferenceGradient {
        &self.base
    }
}

impl GradientImplementation for CenteredFiniteDifferenceGradient {
    fn class_name(&self) -> &'static str {
        "CenteredFiniteDifferenceGradient"
    }

    fn input_dimension(&self) -> usize {
        self.base.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.base.output_dimension()
    }

    fn gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        let step = self.base.prepare(x)?;
        let n = x.dimension();
        let mut points = Sample::empty(n);
        for i in 0..n {
            let mut shifted = x.clone();
            shifted[i] = x[i] + step[i];
            points.push(&shifted)?;
            shifted[i] = x[i] - step[i];
            points.push(&shifted)?;
        }
        let values = self.base.function.evaluate_sample(&points)?;
        let mut gradient = Matrix::zeros(n, self.output_dimension());
        for i in 0..n {
            for k in 0..self.output_dimension() {
                gradient[(i, k)] =
                    (values.get(2 * i, k) - values.get(2 * i + 1, k)) / (2.0 * step[i]);
            }
        }
        Ok(gradient)
    }
}

/// Forward differences `(f(x + h e_i) - f(x)) / h`.
#[derive(Debug, Clone, Default)]
pub struct NonCenteredFiniteDifferenceGradient {
    base: FiniteDifferenceGradient,
}

impl NonCenteredFiniteDifferenceGradient {
    /// Wraps the shared configuration.
    pub fn new(base: FiniteDifferenceGradient) -> Self {
        Self { base }
    }

    /// Shared configuration.
    pub fn base(&self) -> &FiniteDifferenceGradient {
        &self.base
    }
}

impl GradientImplementation for NonCenteredFiniteDifferenceGradient {
    fn class_name(&self) -> &'static str {
        "NonCenteredFiniteDifferenceGradient"
    }

    fn input_dimension(&self) -> usize {
        self.base.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.base.output_dimension()
    }

    fn gradient(&self, x: &Point) -> Result<Matrix, UqfError> {
        let step = self.base.prepare(x)?;
        let n = x.dimension();
        let mut points = Sample::empty(n);
        points.push(x)?;
        for i in 0..n {
            let mut shifted = x.clone();
            shifted[i] = x[i] + step[i];
            points.push(&shifted)?;
        }
        let values = self.base.function.evaluate_sample(&points)?;
        let mut gradient = Matrix::zeros(n, self.output_dimension());
        for i in 0..n {
            for k in 0..self.output_dimension() {
                gradient[(i, k)] = (values.get(i + 1, k) - values.get(0, k)) / step[i];
            }
        }
        Ok(gradient)
    }
}
