use std::sync::Arc;

use uqf_core::{Description, Field, Mesh, Sample, UqfError};
use uqf_func::Shared;

use crate::implementation::FieldFunctionImplementation;

/// Value-semantic handle around a shared field function body.
///
/// Mirrors [`uqf_func::Function`]: clones share the body and its counter,
/// mutators detach the body first when it is shared.
#[derive(Debug, Clone)]
pub struct FieldFunction {
    body: Shared<dyn FieldFunctionImplementation>,
}

impl FieldFunction {
    /// Wraps a concrete body.
    pub fn new<F: FieldFunctionImplementation>(body: F) -> Self {
        Self {
            body: Shared::from_arc(Arc::new(body)),
        }
    }

    /// Read access to the body.
    pub fn implementation(&self) -> &dyn FieldFunctionImplementation {
        self.body.get()
    }

    /// Mutable access to the body, detaching it first when shared.
    pub fn implementation_mut(&mut self) -> &mut dyn FieldFunctionImplementation {
        self.body.make_mut()
    }

    /// Whether both handles share one body.
    pub fn ptr_eq(&self, other: &FieldFunction) -> bool {
        self.body.ptr_eq(&other.body)
    }

    /// Whether another handle shares this body.
    pub fn is_shared(&self) -> bool {
        self.body.is_shared()
    }

    pub(crate) fn identity(&self) -> usize {
        self.body.identity()
    }

    /// Class name of the body.
    pub fn class_name(&self) -> &'static str {
        self.implementation().class_name()
    }

    /// Dimension of the values at each input vertex.
    pub fn input_dimension(&self) -> usize {
        self.implementation().input_dimension()
    }

    /// Dimension of the values at each output vertex.
    pub fn output_dimension(&self) -> usize {
        self.implementation().output_dimension()
    }

    /// Input mesh.
    pub fn input_mesh(&self) -> &Mesh {
        self.implementation().input_mesh()
    }

    /// Output mesh.
    pub fn output_mesh(&self) -> &Mesh {
        self.implementation().output_mesh()
    }

    /// Evaluates the values of a field, one row per vertex.
    pub fn evaluate(&self, values: &Sample) -> Result<Sample, UqfError> {
        self.implementation().evaluate(values)
    }

    /// Evaluates a field.
    pub fn evaluate_field(&self, field: &Field) -> Result<Field, UqfError> {
        self.implementation().evaluate_field(field)
    }

    /// Input labels.
    pub fn input_description(&self) -> Description {
        self.implementation().input_description()
    }

    /// Replaces the input labels.
    pub fn set_input_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.implementation_mut().common_mut().set_input_description(description)
    }

    /// Output labels.
    pub fn output_description(&self) -> Description {
        self.implementation().output_description()
    }

    /// Replaces the output labels.
    pub fn set_output_description(&mut self, description: Description) -> Result<(), UqfError> {
        self.implementation_mut().common_mut().set_output_description(description)
    }

    /// Number of evaluated fields.
    pub fn calls_number(&self) -> u64 {
        self.implementation().calls()
    }

    /// Restriction to output component `index`.
    pub fn marginal(&self, index: usize) -> Result<FieldFunction, UqfError> {
        self.marginal_indices(&[index])
    }

    /// Restriction to the output components `indices`, in order.
    pub fn marginal_indices(&self, indices: &[usize]) -> Result<FieldFunction, UqfError> {
        self.implementation().marginal(indices)
    }

    /// Whether concurrent evaluation is safe.
    pub fn is_parallel(&self) -> bool {
        self.implementation().is_parallel()
    }
}

impl PartialEq for FieldFunction {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.implementation().same_structure(other.implementation())
    }
}
