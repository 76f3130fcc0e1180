use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use uqf_core::{check_dimension, Description, ErrorInfo, Field, Mesh, Sample, UqfError};
use uqf_func::persistence::{Advocate, Reader, StudyLoader};
use uqf_func::Function;

use crate::common::{load_field_common, save_field_common, FieldFunctionCommon};
use crate::handle::FieldFunction;
use crate::implementation::FieldFunctionImplementation;

/// Replaces the values of a field by a function of the vertex coordinates.
///
/// The incoming values are only checked for shape, then discarded. Fields
/// are evaluated on their own mesh, and the result lives on that mesh.
#[derive(Debug, Clone)]
pub struct VertexFunction {
    common: FieldFunctionCommon,
    function: Function,
}

impl VertexFunction {
    /// Builds the function; `function` must take mesh coordinates.
    ///
    /// `input_dimension` is the dimension of the values of accepted fields.
    pub fn new(function: Function, mesh: Mesh, input_dimension: usize) -> Result<Self, UqfError> {
        if function.input_dimension() != mesh.dimension() {
            return Err(UqfError::Dimension(
                ErrorInfo::new(
                    "vertex-function-input",
                    format!(
                        "a vertex function needs an input dimension equal to the mesh dimension {}, got {}",
                        mesh.dimension(),
                        function.input_dimension()
                    ),
                )
                .with_context("mesh_dimension", mesh.dimension())
                .with_context("function_input", function.input_dimension()),
            ));
        }
        debug!(
            function = function.class_name(),
            vertices = mesh.vertex_count(),
            "vertex function"
        );
        Ok(Self {
            common: FieldFunctionCommon::new(
                mesh,
                Description::build_default(input_dimension, "v"),
                function.output_description(),
            ),
            function,
        })
    }

    /// The function of the coordinates.
    pub fn function(&self) -> &Function {
        &self.function
    }

    pub(crate) fn load(reader: &Reader<'_>, functions: &mut StudyLoader<'_>) -> Result<Self, UqfError> {
        let function = functions.load_function(reader.object("function_")?)?;
        let input_dimension = reader.description("inputDescription_")?.len();
        let mut lifted = Self::new(function, reader.mesh("inputMesh_")?, input_dimension)?;
        load_field_common(reader, &mut lifted.common)?;
        Ok(lifted)
    }
}

impl FieldFunctionImplementation for VertexFunction {
    fn class_name(&self) -> &'static str {
        "VertexFunction"
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

    fn compute(&self, _values: &Sample) -> Result<Sample, UqfError> {
        self.function.evaluate_sample(self.common.input_mesh().vertices())
    }

    fn evaluate_field(&self, field: &Field) -> Result<Field, UqfError> {
        let mesh = field.mesh();
        check_dimension("field values", self.input_dimension(), field.output_dimension())?;
        check_dimension("field mesh dimension", self.function.input_dimension(), mesh.dimension())?;
        self.common.count_calls(1);
        let values = self.function.evaluate_sample(mesh.vertices())?;
        Field::new(mesh.clone(), values)
    }

    fn marginal(&self, indices: &[usize]) -> Result<FieldFunction, UqfError> {
        let function = self.function.marginal_indices(indices)?;
        Ok(FieldFunction::new(VertexFunction::new(
            function,
            self.common.input_mesh().clone(),
            self.input_dimension(),
        )?))
    }

    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError> {
        save_field_common(advocate, &self.common);
        advocate.save_function("function_", &self.function)
    }

    fn same_structure(&self, other: &dyn FieldFunctionImplementation) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            self.function == other.function
                && self.common.input_mesh() == other.common.input_mesh()
                && self.input_dimension() == other.input_dimension()
        })
    }

    fn is_parallel(&self) -> bool {
        self.function.is_parallel()
    }
}
