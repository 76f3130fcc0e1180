use std::sync::atomic::{AtomicU64, Ordering};

use uqf_core::{check_dimension, Description, Mesh, UqfError};
use uqf_func::persistence::{Advocate, Reader};

/// State carried by every field function body.
#[derive(Debug)]
pub struct FieldFunctionCommon {
    input_mesh: Mesh,
    output_mesh: Mesh,
    input_description: Description,
    output_description: Description,
    calls: AtomicU64,
}

impl FieldFunctionCommon {
    /// State for a body mapping fields on `mesh` to fields on the same mesh.
    pub fn new(mesh: Mesh, input_description: Description, output_description: Description) -> Self {
        Self {
            input_mesh: mesh.clone(),
            output_mesh: mesh,
            input_description,
            output_description,
            calls: AtomicU64::new(0),
        }
    }

    /// Mesh the input values live on.
    pub fn input_mesh(&self) -> &Mesh {
        &self.input_mesh
    }

    /// Mesh the output values live on.
    pub fn output_mesh(&self) -> &Mesh {
        &self.output_mesh
    }

    /// Labels of the values stored at each input vertex.
    pub fn input_description(&self) -> &Description {
        &self.input_description
    }

    /// Replaces the input labels; the count must not change.
    pub fn set_input_description(&mut self, description: Description) -> Result<(), UqfError> {
        check_dimension("field input description", self.input_description.len(), description.len())?;
        self.input_description = description;
        Ok(())
    }

    /// Labels of the values stored at each output vertex.
    pub fn output_description(&self) -> &Description {
        &self.output_description
    }

    /// Replaces the output labels; the count must not change.
    pub fn set_output_description(&mut self, description: Description) -> Result<(), UqfError> {
        check_dimension("field output description", self.output_description.len(), description.len())?;
        self.output_description = description;
        Ok(())
    }

    /// Number of fields evaluated so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Adds `count` to the call counter.
    pub fn count_calls(&self, count: u64) {
        self.calls.fetch_add(count, Ordering::Relaxed);
    }
}

impl Clone for FieldFunctionCommon {
    fn clone(&self) -> Self {
        Self {
            input_mesh: self.input_mesh.clone(),
            output_mesh: self.output_mesh.clone(),
            input_description: self.input_description.clone(),
            output_description: self.output_description.clone(),
            calls: AtomicU64::new(self.calls()),
        }
    }
}

/// Stores the mesh and descriptions of a field body.
pub fn save_field_common(advocate: &mut Advocate<'_>, common: &FieldFunctionCommon) {
    advocate.save_mesh("inputMesh_", common.input_mesh());
    advocate.save_description("inputDescription_", common.input_description());
    advocate.save_description("outputDescription_", common.output_description());
}

/// Restores the descriptions written by [`save_field_common`].
pub fn load_field_common(reader: &Reader<'_>, common: &mut FieldFunctionCommon) -> Result<(), UqfError> {
    common.set_input_description(reader.description("inputDescription_")?)?;
    common.set_output_description(reader.description("outputDescription_")?)
}
