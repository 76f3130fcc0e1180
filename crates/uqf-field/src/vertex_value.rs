use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{ErrorInfo, Mesh, Sample, UqfError};
use uqf_func::persistence::{Advocate, Reader, StudyLoader};
use uqf_func::Function;

use crate::common::{load_field_common, save_field_common, FieldFunctionCommon};
use crate::handle::FieldFunction;
use crate::implementation::FieldFunctionImplementation;

/// Applies a function of `(vertex coordinates, vertex value)` at every vertex.
///
/// The leading `mesh.dimension()` inputs of the function are fed from the
/// mesh, so callers only supply the remaining ones.
#[derive(Debug, Clone)]
pub struct VertexValueFunction {
    common: FieldFunctionCommon,
    function: Function,
}

impl VertexValueFunction {
    /// Builds the function; `function` must take at least the mesh coordinates.
    pub fn new(function: Function, mesh: Mesh) -> Result<Self, UqfError> {
        let spatial = mesh.dimension();
        if function.input_dimension() < spatial {
            return Err(UqfError::Dimension(
                ErrorInfo::new(
                    "vertex-value-input",
                    format!(
                        "a vertex value function needs at least {spatial} inputs for the coordinates, got {}",
                        function.input_dimension()
                    ),
                )
                .with_context("mesh_dimension", spatial)
                .with_context("function_input", function.input_dimension()),
            ));
        }
        let input_description = function
            .input_description()
            .slice(spatial, function.input_dimension())?;
        debug!(
            function = function.class_name(),
            vertices = mesh.vertex_count(),
            spatial,
            "vertex value function"
        );
        Ok(Self {
            common: FieldFunctionCommon::new(mesh, input_description, function.output_description()),
            function,
        })
    }

    /// The function of coordinates and values.
    pub fn function(&self) -> &Function {
        &self.function
    }

    pub(crate) fn load(reader: &Reader<'_>, functions: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let function = functions.load_function(reader.object("function_")?)?;
        let mut lifted = Self::new(function, reader.mesh("inputMesh_")?)?;
        load_field_common(reader, &mut lifted.common)?;
        Ok(lifted)
    }
}

impl FieldFunctionImplementation for VertexValueFunction {
    fn class_name(&self) -> &'static str {
        "VertexValueFunction"
    }

    fn clone_body(&self) -> Arc<dyn FieldFunctionImplementation> {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn common(&self) -> &FieldFunctionCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut FieldFunctionCommon {
        &mut self.common
    }

    fn compute(&self, values: &Sample) -> Result<Sample, UqfError> {
        let inputs = self.common.input_mesh().vertices().stack(values)?;
        self.function.evaluate_sample(&inputs)
    }

    fn marginal(&self, indices: &[usize]) -> Result<FieldFunction, UqfError> {
        let function = self.function.marginal_indices(indices)?;
        Ok(FieldFunction::new(VertexValueFunction::new(
            function,
            self.common.input_mesh().clone(),
        )?))
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_field_common(advocate, &self.common);
        advocate.save_function("function_", &self.function)
    }

    fn same_structure(&self, other: &dyn FieldFunctionImplementation) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            self.function == other.function && self.common.input_mesh() == other.common.input_mesh()
        })
    }

    fn is_parallel(&self) -> bool {
        self.function.is_parallel()
    }
}
