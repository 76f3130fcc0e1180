//! Finite-difference derivative engines and their step policies.

mod gradient;
mod hessian;
mod step;

pub use gradient::{
    CenteredFiniteDifferenceGradient, FiniteDifferenceGradient, GradientImplementation,
    NonCenteredFiniteDifferenceGradient,
};
pub use hessian::{CenteredFiniteDifferenceHessian, FiniteDifferenceHessian, HessianImplementation};
pub use step::{BlendedStep, ConstantStep, FiniteDifferenceStep, StepPolicy};
