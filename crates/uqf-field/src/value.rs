use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{Mesh, Sample, UqfError};
use uqf_func::persistence::{Advocate, Reader, StudyLoader};
use uqf_func::Function;

use crate::common::{load_field_common, save_field_common, FieldFunctionCommon};
use crate::handle::FieldFunction;
use crate::implementation::FieldFunctionImplementation;

/// Applies a point function to the value stored at every vertex.
///
/// All vertices go through one sample evaluation of the function.
#[derive(Debug, Clone)]
pub struct ValueFunction {
    common: FieldFunctionCommon,
    function: Function,
}

impl ValueFunction {
    /// Lifts `function` to fields on `mesh`.
    pub fn new(function: Function, mesh: Mesh) -> Self {
        debug!(
            function = function.class_name(),
            vertices = mesh.vertex_count(),
            "value function"
        );
        Self {
            common: FieldFunctionCommon::new(mesh, function.input_description(), function.output_description()),
            function,
        }
    }

    /// The lifted function.
    pub fn function(&self) -> &Function {
        &self.function
    }

    pub(crate) fn load(reader: &Reader<'_>, functions: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let function = functions.load_function(reader.object("function_")?)?;
        let mut lifted = Self::new(function, reader.mesh("inputMesh_")?);
        load_field_common(reader, &mut lifted.common)?;
        Ok(lifted)
    }
}

impl FieldFunctionImplementation for ValueFunction {
    fn class_name(&self) -> &'static str {
        "ValueFunction"
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
        self.function.evaluate_sample(values)
    }

    fn marginal(&self, indices: &[usize]) -> Result<FieldFunction, UqfError> {
        let function = self.function.marginal_indices(indices)?;
        Ok(FieldFunction::new(ValueFunction::new(function, self.common.input_mesh().clone())))
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
