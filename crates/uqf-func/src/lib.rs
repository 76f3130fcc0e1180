#![deny(missing_docs)]
#![doc = "Shared-body numerical function handles, their evaluation implementations and persistence."]

/// Output concatenation of several functions.
pub mod aggregated;
/// Evaluations backed by a user callback.
pub mod closure;
/// State carried by every evaluation body.
pub mod common;
/// Composition of two functions.
pub mod composed;
pub mod differentiation;
/// Evaluation implementation contract.
pub mod evaluation;
/// Copy-on-write function handle.
pub mod function;
/// Canonical hashing of persisted studies.
pub mod hash;
/// Input/output history recording.
pub mod history;
/// Identity map.
pub mod identity;
/// Affine maps.
pub mod linear;
/// Output restriction.
pub mod marginal;
/// Placeholder evaluation.
pub mod no_evaluation;
/// Partial application of some inputs as parameters.
pub mod parametric;
/// Evaluation and differentiation option structures.
pub mod params;
pub mod persistence;
/// Forwarding evaluation.
pub mod proxy;
/// Serde helpers for persisted studies.
#[path = "serde.rs"]
pub mod serde_io;
/// Shared body handle with copy-on-write detachment.
pub mod shared;
/// Additive trend removal and reinstatement.
pub mod trend;

pub use aggregated::AggregatedEvaluation;
pub use closure::ClosureEvaluation;
pub use common::EvaluationCommon;
pub use composed::ComposedEvaluation;
pub use differentiation::{
    BlendedStep, CenteredFiniteDifferenceGradient, CenteredFiniteDifferenceHessian,
    ConstantStep, FiniteDifferenceGradient, FiniteDifferenceHessian, FiniteDifferenceStep,
    GradientImplementation, HessianImplementation, NonCenteredFiniteDifferenceGradient,
    StepPolicy,
};
pub use evaluation::EvaluationImplementation;
pub use function::Function;
pub use hash::canonical_hash;
pub use history::{History, HistoryStrategy};
pub use identity::IdentityEvaluation;
pub use linear::LinearEvaluation;
pub use marginal::MarginalEvaluation;
pub use no_evaluation::NoEvaluation;
pub use parametric::ParametricEvaluation;
pub use params::{DifferentiationOpts, EvaluationOpts};
pub use persistence::{Advocate, Attribute, ObjectId, Reader, StoredObject, Study, StudyLoader, STUDY_SCHEMA};
pub use proxy::EvaluationProxy;
pub use shared::{Shared, SharedBody};
pub use trend::{InverseTrendEvaluation, TrendAdjustment, TrendEvaluation};
