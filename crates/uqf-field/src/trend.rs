use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{ErrorInfo, Mesh, Sample, UqfError};
use uqf_func::persistence::{Advocate, Reader, StudyLoader};
use uqf_func::{Function, TrendAdjustment};

use crate::common::{load_field_common, save_field_common, FieldFunctionCommon};
use crate::handle::FieldFunction;
use crate::implementation::FieldFunctionImplementation;
use crate::vertex_value::VertexValueFunction;

/// Removes a trend from a field: `v -> v - g(t)` at every vertex `t`.
pub type TrendTransform = TrendField<true>;

/// Reinstates a trend in a field: `v -> v + g(t)` at every vertex `t`.
pub type InverseTrendTransform = TrendField<false>;

/// Vertex-value function built from an additive trend adjustment.
///
/// The trend function is kept alongside the lifted adjustment so the opposite
/// transform can be rebuilt from it.
#[derive(Debug, Clone)]
pub struct TrendField<const REMOVE: bool> {
    lifted: VertexValueFunction,
    trend: Function,
}

impl<const REMOVE: bool> TrendField<REMOVE> {
    /// Builds the transform; `trend` must take mesh coordinates.
    pub fn new(trend: Function, mesh: Mesh) -> Result<Self, UqfError> {
        if trend.input_dimension() != mesh.dimension() {
            return Err(UqfError::Dimension(
                ErrorInfo::new(
                    "trend-input",
                    format!(
                        "a trend on a mesh of dimension {} must take {} inputs, got {}",
                        mesh.dimension(),
                        mesh.dimension(),
                        trend.input_dimension()
                    ),
                )
                .with_context("mesh_dimension", mesh.dimension())
                .with_context("trend_input", trend.input_dimension()),
            ));
        }
        debug!(remove = REMOVE, trend = trend.class_name(), "trend transform");
        let adjustment = Function::new(TrendAdjustment::<REMOVE>::new(trend.clone()));
        Ok(Self {
            lifted: VertexValueFunction::new(adjustment, mesh)?,
            trend,
        })
    }

    /// The trend function `g`.
    pub fn trend_function(&self) -> &Function {
        &self.trend
    }

    /// The lifted adjustment.
    pub fn adjustment(&self) -> &VertexValueFunction {
        &self.lifted
    }

    pub(crate) fn load(reader: &Reader<'_>, functions: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let trend = functions.load_function(reader.object("trend_")?)?;
        let mut transform = Self::new(trend, reader.mesh("inputMesh_")?)?;
        load_field_common(reader, transform.lifted.common_mut())?;
        Ok(transform)
    }
}

impl TrendField<true> {
    /// Transform reinstating the trend removed by `self`.
    pub fn inverse(&self) -> Result<InverseTrendTransform, UqfError> {
        InverseTrendTransform::new(self.trend.clone(), self.lifted.input_mesh().clone())
    }
}

impl TrendField<false> {
    /// Transform removing the trend reinstated by `self`.
    pub fn inverse(&self) -> Result<TrendTransform, UqfError> {
        TrendTransform::new(self.trend.clone(), self.lifted.input_mesh().clone())
    }
}

impl<const REMOVE: bool> FieldFunctionImplementation for TrendField<REMOVE> {
    fn class_name(&self) -> &'static str {
        if REMOVE {
            "TrendTransform"
        } else {
            "InverseTrendTransform"
        }
    }

    fn clone_body(&self) -> Arc<dyn FieldFunctionImplementation> {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn common(&self) -> &FieldFunctionCommon {
        self.lifted.common()
    }

    fn common_mut(&mut self) -> &mut FieldFunctionCommon {
        self.lifted.common_mut()
    }

    fn compute(&self, values: &Sample) -> Result<Sample, UqfError> {
        self.lifted.compute(values)
    }

    fn marginal(&self, indices: &[usize]) -> Result<FieldFunction, UqfError> {
        self.lifted.marginal(indices)
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_field_common(advocate, self.lifted.common());
        advocate.save_function("trend_", &self.trend)
    }

    fn same_structure(&self, other: &dyn FieldFunctionImplementation) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            self.trend == other.trend && self.lifted.input_mesh() == other.lifted.input_mesh()
        })
    }

    fn is_parallel(&self) -> bool {
        self.lifted.is_parallel()
    }
}
