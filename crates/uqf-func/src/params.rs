use serde::{Deserialize, Serialize};
use uqf_core::{ErrorInfo, UqfError};

use crate::history::HistoryStrategy;

/// Options applied to newly constructed evaluation bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOpts {
    /// Reject evaluations whose outputs are not finite.
    pub check_output: bool,
    /// History strategy installed on construction.
    #[serde(default)]
    pub history: HistoryStrategy,
}

impl Default for EvaluationOpts {
    fn default() -> Self {
        Self {
            check_output: true,
            history: HistoryStrategy::Null,
        }
    }
}

impl EvaluationOpts {
    /// Returns a sanitised copy; a `Last(0)` history degrades to `Null`.
    pub fn sanitised(&self) -> Self {
        let history = match self.history {
            HistoryStrategy::Last(0) => HistoryStrategy::Null,
            other => other,
        };
        Self {
            check_output: self.check_output,
            history,
        }
    }
}

/// Default step sizes used by the finite-difference engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentiationOpts {
    /// Relative step used by gradients.
    pub gradient_epsilon: f64,
    /// Relative step used by hessians.
    pub hessian_epsilon: f64,
    /// Step used when differentiating with respect to parameters.
    pub parameter_epsilon: f64,
    /// Offset added to `|x|` by blended steps.
    pub blended_eta: f64,
}

impl Default for DifferentiationOpts {
    fn default() -> Self {
        Self {
            gradient_epsilon: 1e-5,
            hessian_epsilon: 1e-4,
            parameter_epsilon: 1e-7,
            blended_eta: 1.0,
        }
    }
}

impl DifferentiationOpts {
    /// Returns a sanitised copy where unusable steps fall back to the defaults.
    pub fn sanitised(&self) -> Self {
        let defaults = Self::default();
        let pick = |value: f64, fallback: f64| {
            if value.is_finite() && value != 0.0 {
                value.abs()
            } else {
                fallback
            }
        };
        Self {
            gradient_epsilon: pick(self.gradient_epsilon, defaults.gradient_epsilon),
            hessian_epsilon: pick(self.hessian_epsilon, defaults.hessian_epsilon),
            parameter_epsilon: pick(self.parameter_epsilon, defaults.parameter_epsilon),
            blended_eta: if self.blended_eta.is_finite() && self.blended_eta > 0.0 {
                self.blended_eta
            } else {
                defaults.blended_eta
            },
        }
    }
}

fn map_err(err: serde_json::Error, code: &str) -> UqfError {
    UqfError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Reads evaluation options from JSON, sanitising the result.
pub fn evaluation_opts_from_json(json: &str) -> Result<EvaluationOpts, UqfError> {
    let opts: EvaluationOpts =
        serde_json::from_str(json).map_err(|err| map_err(err, "evaluation-opts-deserialize"))?;
    Ok(opts.sanitised())
}

/// Reads differentiation options from JSON, sanitising the result.
pub fn differentiation_opts_from_json(json: &str) -> Result<DifferentiationOpts, UqfError> {
    let opts: DifferentiationOpts = serde_json::from_str(json)
        .map_err(|err| map_err(err, "differentiation-opts-deserialize"))?;
    Ok(opts.sanitised())
}
