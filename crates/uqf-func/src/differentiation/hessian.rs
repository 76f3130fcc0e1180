use std::fmt;

use tracing::debug;
use uqf_core::{check_dimension, Point, Sample, SymmetricTensor, UqfError};

use crate::function::Function;
use crate::params::DifferentiationOpts;

use super::step::{EmptyStep, FiniteDifferenceStep};

/// Second-derivative provider, `inputDimension x inputDimension x outputDimension`.
pub trait HessianImplementation: fmt::Debug + Send + Sync {
    /// Class name used in logs and errors.
    fn class_name(&self) -> &'static str;

    /// Input dimension of the differentiated function.
    fn input_dimension(&self) -> usize;

    /// Output dimension of the differentiated function.
    fn output_dimension(&self) -> usize;

    /// Hessian at `x`, one symmetric sheet per output component.
    fn hessian(&self, x: &Point) -> Result<SymmetricTensor, UqfError> {
        let _ = x;
        Err(UqfError::not_implemented(self.class_name(), "hessian"))
    }
}

/// Function and step policy for finite-difference hessians.
#[derive(Debug, Clone)]
pub struct FiniteDifferenceHessian {
    step: FiniteDifferenceStep,
    function: Function,
}

impl FiniteDifferenceHessian {
    /// Uses the default hessian step for `function`.
    pub fn new(function: Function) -> Result<Self, UqfError> {
        let epsilon = DifferentiationOpts::default().hessian_epsilon;
        Self::from_scalar(epsilon, function)
    }

    /// Blended step built from `opts`.
    pub fn with_opts(opts: &DifferentiationOpts, function: Function) -> Result<Self, UqfError> {
        let opts = opts.sanitised();
        let dimension = function.input_dimension();
        let step = FiniteDifferenceStep::blended(
            Point::filled(dimension, opts.hessian_epsilon),
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
        check_dimension("hessian step", function.input_dimension(), step.dimension())?;
        debug!(
            function = function.class_name(),
            step = step.class_name(),
            "finite difference hessian"
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
}

impl Default for FiniteDifferenceHessian {
    fn default() -> Self {
        Self {
            step: FiniteDifferenceStep::new(EmptyStep::default()),
            function: Function::default(),
        }
    }
}

impl HessianImplementation for FiniteDifferenceHessian {
    fn class_name(&self) -> &'static str {
        "FiniteDifferenceHessian"
    }

    fn input_dimension(&self) -> usize {
        self.function.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.function.output_dimension()
    }
}

/// Centered second differences.
///
/// Diagonal terms use `(f(x+h_i) - 2f(x) + f(x-h_i)) / h_i^2`, mixed terms
/// the four corners `(f(++) - f(+-) - f(-+) + f(--)) / 4 h_i h_j`. All
/// stencil points go through a single sample evaluation.
#[derive(Debug, Clone, Default)]
pub struct CenteredFiniteDifferenceHessian {
    base: FiniteDifferenceHessian,
}

impl CenteredFiniteDifferenceHessian {
    /// Wraps the shared configuration.
    pub fn new(base: FiniteDifferenceHessian) -> Self {
        Self { base }
    }

    /// Shared configuration.
    pub fn base(&self) -> &FiniteDifferenceHessian {
        &self.base
    }
}

impl HessianImplementation for CenteredFiniteDifferenceHessian {
    fn class_name(&self) -> &'static str {
        "CenteredFiniteDifferenceHessian"
    }

    fn input_dimension(&self) -> usize {
        self.base.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.base.output_dimension()
    }

    fn hessian(&self, x: &Point) -> Result<SymmetricTensor, UqfError> {
        check_dimension("hessian location", self.input_dimension(), x.dimension())?;
        let step = self.base.step.step_at(x)?;
        let n = x.dimension();

        // row 0: x, then 2 rows per diagonal, then 4 rows per pair i < j
        let mut points = Sample::empty(n);
        points.push(x)?;
        for i in 0..n {
            let mut shifted = x.clone();
            shifted[i] = x[i] + step[i];
            points.push(&shifted)?;
            shifted[i] = x[i] - step[i];
            points.push(&shifted)?;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                for (si, sj) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
                    let mut shifted = x.clone();
                    shifted[i] = x[i] + si * step[i];
                    shifted[j] = x[j] + sj * step[j];
                    points.push(&shifted)?;
                }
            }
        }
        let values = self.base.function.evaluate_sample(&points)?;

        let sheets = self.output_dimension();
        let mut hessian = SymmetricTensor::zeros(n, sheets);
        for k in 0..sheets {
            let center = values.get(0, k);
            for i in 0..n {
                let plus = values.get(1 + 2 * i, k);
                let minus = values.get(2 + 2 * i, k);
                hessian.set(i, i, k, (plus - 2.0 * center + minus) / (step[i] * step[i]));
            }
            let mut row = 1 + 2 * n;
            for i in 0..n {
                for j in (i + 1)..n {
                    let mixed = values.get(row, k) - values.get(row + 1, k) - values.get(row + 2, k)
                        + values.get(row + 3, k);
                    hessian.set(i, j, k, mixed / (4.0 * step[i] * step[j]));
                    row += 4;
                }
            }
        }
        Ok(hessian)
    }
}
