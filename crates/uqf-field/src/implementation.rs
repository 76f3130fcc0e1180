use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uqf_core::{check_dimension, Description, ErrorInfo, Field, Mesh, Sample, UqfError};
use uqf_func::persistence::Advocate;
use uqf_func::SharedBody;

use crate::common::FieldFunctionCommon;
use crate::handle::FieldFunction;

/// Contract of a field-to-field operator body.
///
/// Values are passed as a sample with one row per mesh vertex. Every
/// accepted evaluation counts as a single call, whatever the vertex count.
pub trait FieldFunctionImplementation: fmt::Debug + Send + Sync + 'static {
    /// Class name used in logs and persisted studies.
    fn class_name(&self) -> &'static str;

    /// Deep copy of the body.
    fn clone_body(&self) -> Arc<dyn FieldFunctionImplementation>;

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;

    /// Shared state.
    fn common(&self) -> &FieldFunctionCommon;

    /// Mutable shared state.
    fn common_mut(&mut self) -> &mut FieldFunctionCommon;

    /// Computes output values from validated input values.
    fn compute(&self, values: &Sample) -> Result<Sample, UqfError>;

    /// Restriction to some output components.
    fn marginal(&self, indices: &[usize]) -> Result<FieldFunction, UqfError>;

    /// Stores the body's attributes.
    fn save(&self, advocate: &mut Advocate<'_>) -> Result<(), UqfError>;

    /// Structural equality with another body.
    fn same_structure(&self, other: &dyn FieldFunctionImplementation) -> bool;

    /// Whether concurrent evaluation is safe.
    fn is_parallel(&self) -> bool;

    /// Dimension of the values at each input vertex.
    fn input_dimension(&self) -> usize {
        self.common().input_description().len()
    }

    /// Dimension of the values at each output vertex.
    fn output_dimension(&self) -> usize {
        self.common().output_description().len()
    }

    /// Validated, counted evaluation of vertex values.
    fn evaluate(&self, values: &Sample) -> Result<Sample, UqfError> {
        check_dimension("field values", self.input_dimension(), values.dimension())?;
        check_dimension(
            "field vertex count",
            self.common().input_mesh().vertex_count(),
            values.size(),
        )?;
        self.common().count_calls(1);
        let output = self.compute(values)?;
        check_dimension("field output", self.output_dimension(), output.dimension())?;
        check_dimension(
            "field output vertex count",
            self.common().output_mesh().vertex_count(),
            output.size(),
        )?;
        Ok(output)
    }

    /// Evaluates a field, returning a field on the output mesh.
    ///
    /// The field must live on the input mesh.
    fn evaluate_field(&self, field: &Field) -> Result<Field, UqfError> {
        check_same_mesh(self.class_name(), self.common().input_mesh(), field.mesh())?;
        let values = self.evaluate(field.values())?;
        Field::new(self.common().output_mesh().clone(), values)
    }

    /// Input mesh.
    fn input_mesh(&self) -> &Mesh {
        self.common().input_mesh()
    }

    /// Output mesh.
    fn output_mesh(&self) -> &Mesh {
        self.common().output_mesh()
    }

    /// Input labels.
    fn input_description(&self) -> Description {
        self.common().input_description().clone()
    }

    /// Output labels.
    fn output_description(&self) -> Description {
        self.common().output_description().clone()
    }

    /// Number of evaluated fields.
    fn calls(&self) -> u64 {
        self.common().calls()
    }
}

impl SharedBody for dyn FieldFunctionImplementation {
    fn clone_shared(&self) -> Arc<Self> {
        self.clone_body()
    }

    fn body_name(&self) -> &'static str {
        self.class_name()
    }
}

/// Fails unless `field_mesh` is the mesh the body was built on.
pub fn check_same_mesh(class_name: &str, input_mesh: &Mesh, field_mesh: &Mesh) -> Result<(), UqfError> {
    if input_mesh == field_mesh {
        return Ok(());
    }
    Err(UqfError::Dimension(
        ErrorInfo::new(
            "field-mesh",
            format!("{class_name} was built on another mesh than the evaluated field"),
        )
        .with_context("expected_vertices", input_mesh.vertex_count())
        .with_context("field_vertices", field_mesh.vertex_count())
        .with_hint("rebuild the field function on the mesh of the field"),
    ))
}
