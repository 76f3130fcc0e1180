//! Storage of field functions in a [`Study`].
//!
//! Field bodies are stored next to the point functions they wrap, so a
//! function shared by a field body and a point-level graph is stored once.

use std::collections::HashMap;

use uqf_core::{ErrorInfo, UqfError};
use uqf_func::persistence::{ObjectId, Study, StudyLoader};

use crate::handle::FieldFunction;
use crate::trend::{InverseTrendTransform, TrendTransform};
use crate::value::ValueFunction;
use crate::vertex::VertexFunction;
use crate::vertex_value::VertexValueFunction;

/// Stores a field function body, reusing the identifier of an already stored body.
pub fn store_field_function(study: &mut Study, function: &FieldFunction) -> Result<ObjectId, UqfError> {
    study.store(function.identity(), Box::new(function.clone()), |advocate| {
        function.implementation().save(advocate)?;
        Ok(function.class_name())
    })
}

/// Stores `function` under `label`.
pub fn add_field_function(study: &mut Study, label: &str, function: &FieldFunction) -> Result<ObjectId, UqfError> {
    let id = store_field_function(study, function)?;
    study.add_label(label, id)?;
    Ok(id)
}

/// Loads the field function stored under `label`.
pub fn load_field_function(study: &Study, label: &str) -> Result<FieldFunction, UqfError> {
    FieldStudyLoader::new(study).field_function(label)
}

/// Rebuilds field functions, sharing bodies stored once.
#[derive(Debug)]
pub struct FieldStudyLoader<'s> {
    functions: StudyLoader<'s>,
    fields: HashMap<ObjectId, FieldFunction>,
}

impl<'s> FieldStudyLoader<'s> {
    /// Loader over `study`.
    pub fn new(study: &'s Study) -> Self {
        Self {
            functions: StudyLoader::new(study),
            fields: HashMap::new(),
        }
    }

    /// Loader for the point functions of the same study.
    pub fn functions(&mut self) -> &mut StudyLoader<'s> {
        &mut self.functions
    }

    /// Loads the field function stored under `label`.
    pub fn field_function(&mut self, label: &str) -> Result<FieldFunction, UqfError> {
        let id = self.functions.study().label(label)?;
        self.load_field_function(id)
    }

    /// Loads field function `id`.
    pub fn load_field_function(&mut self, id: ObjectId) -> Result<FieldFunction, UqfError> {
        if let Some(function) = self.fields.get(&id) {
            return Ok(function.clone());
        }
        let reader = self.functions.reader(id)?;
        let functions = &mut self.functions;
        let function = match reader.class_name() {
            "ValueFunction" => FieldFunction::new(ValueFunction::load(&reader, functions)?),
            "VertexFunction" => FieldFunction::new(VertexFunction::load(&reader, functions)?),
            "VertexValueFunction" => FieldFunction::new(VertexValueFunction::load(&reader, functions)?),
            "TrendTransform" => FieldFunction::new(TrendTransform::load(&reader, functions)?),
            "InverseTrendTransform" => FieldFunction::new(InverseTrendTransform::load(&reader, functions)?),
            other => {
                return Err(UqfError::Serde(
                    ErrorInfo::new("unknown-class", format!("no field loader for class '{other}'"))
                        .with_context("class", other)
                        .with_context("id", id),
                ))
            }
        };
        self.fields.insert(id, function.clone());
        Ok(function)
    }
}
