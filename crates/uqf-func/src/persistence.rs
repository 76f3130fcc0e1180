//! Key-value persistence of function graphs.
//!
//! A [`Study`] stores every body once, keyed by a numeric identifier, with
//! its class name and an attribute map filled through an [`Advocate`].
//! Children are stored by reference, so bodies shared between several
//! parents are stored once and shared again when the study is loaded.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uqf_core::{Description, ErrorInfo, Mesh, Point, Sample, SchemaVersion, UqfError};

use crate::aggregated::AggregatedEvaluation;
use crate::common::EvaluationCommon;
use crate::composed::ComposedEvaluation;
use crate::function::Function;
use crate::history::HistoryStrategy;
use crate::identity::IdentityEvaluation;
use crate::linear::LinearEvaluation;
use crate::marginal::MarginalEvaluation;
use crate::no_evaluation::NoEvaluation;
use crate::parametric::ParametricEvaluation;
use crate::params::DifferentiationOpts;
use crate::proxy::EvaluationProxy;
use crate::trend::{InverseTrendEvaluation, TrendEvaluation};

/// Identifier of an object stored in a [`Study`].
pub type ObjectId = u64;

/// Schema written by this version of the crate.
pub const STUDY_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Value stored under an attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    /// Boolean flag.
    Bool(bool),
    /// Unsigned integer.
    Unsigned(u64),
    /// Real scalar.
    Real(f64),
    /// Free text.
    Text(String),
    /// Numeric vector.
    Point(Point),
    /// Numeric sample.
    Sample(Sample),
    /// Labels.
    Description(Description),
    /// Index list.
    Indices(Vec<usize>),
    /// Mesh.
    Mesh(Mesh),
    /// Reference to another stored object.
    Object(ObjectId),
    /// References to other stored objects, in order.
    Objects(Vec<ObjectId>),
}

/// One stored body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Class name used to pick the loader.
    pub class_name: String,
    /// Attributes written by the body.
    pub attributes: BTreeMap<String, Attribute>,
}

/// Collection of stored objects and the labels of the top-level entries.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Study {
    schema_version: SchemaVersion,
    next_id: ObjectId,
    objects: BTreeMap<ObjectId, StoredObject>,
    labels: BTreeMap<String, ObjectId>,
    #[serde(skip)]
    identities: HashMap<usize, ObjectId>,
    #[serde(skip)]
    retained: Vec<Box<dyn Any + Send + Sync>>,
}

impl Study {
    /// Creates an empty study.
    pub fn new() -> Self {
        Self {
            schema_version: STUDY_SCHEMA,
            ..Self::default()
        }
    }

    /// Schema the study was written with.
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Top-level labels and their object identifiers.
    pub fn labels(&self) -> &BTreeMap<String, ObjectId> {
        &self.labels
    }

    /// Stored object `id`.
    pub fn object(&self, id: ObjectId) -> Result<&StoredObject, UqfError> {
        self.objects.get(&id).ok_or_else(|| {
            UqfError::Serde(
                ErrorInfo::new("missing-object", format!("study holds no object {id}"))
                    .with_context("id", id),
            )
        })
    }

    /// Identifier stored under `label`.
    pub fn label(&self, label: &str) -> Result<ObjectId, UqfError> {
        self.labels.get(label).copied().ok_or_else(|| {
            UqfError::Serde(
                ErrorInfo::new("missing-label", format!("study holds no entry '{label}'"))
                    .with_context("label", label),
            )
        })
    }

    /// Stores `function` under `label`.
    pub fn add_function(&mut self, label: &str, function: &Function) -> Result<ObjectId, UqfError> {
        let id = self.store_function(function)?;
        self.labels.insert(label.to_owned(), id);
        Ok(id)
    }

    /// Records `id` under `label`.
    pub fn add_label(&mut self, label: &str, id: ObjectId) -> Result<(), UqfError> {
        self.object(id)?;
        self.labels.insert(label.to_owned(), id);
        Ok(())
    }

    /// Loads the function stored under `label`.
    pub fn load_function(&self, label: &str) -> Result<Function, UqfError> {
        StudyLoader::new(self).function(label)
    }

    /// Stores a function body, reusing the identifier of an already stored body.
    pub fn store_function(&mut self, function: &Function) -> Result<ObjectId, UqfError> {
        self.store(function.identity(), Box::new(function.clone()), |advocate| {
            function.implementation().save(advocate)?;
            Ok(function.class_name())
        })
    }

    /// Stores an object identified by `identity`.
    ///
    /// `retain` keeps the object alive while the study exists so that its
    /// identity cannot be reused by another allocation. `save` fills the
    /// attributes and returns the class name.
    pub fn store<F>(
        &mut self,
        identity: usize,
        retain: Box<dyn Any + Send + Sync>,
        save: F,
    ) -> Result<ObjectId, UqfError>
    where
        F: FnOnce(&mut Advocate<'_>) -> Result<&'static str, UqfError>,
    {
        if let Some(&id) = self.identities.get(&identity) {
            return Ok(id);
        }
        let mut advocate = Advocate {
            study: self,
            attributes: BTreeMap::new(),
        };
        let class_name = save(&mut advocate)?;
        let attributes = advocate.attributes;

        // A failed save registers nothing.
        let id = self.next_id;
        self.next_id += 1;
        self.identities.insert(identity, id);
        self.retained.push(retain);
        debug!(id, class = class_name, "stored object");
        self.objects.insert(
            id,
            StoredObject {
                class_name: class_name.to_owned(),
                attributes,
            },
        );
        Ok(id)
    }
}

impl PartialEq for Study {
    fn eq(&self, other: &Self) -> bool {
        self.schema_version == other.schema_version
            && self.objects == other.objects
            && self.labels == other.labels
    }
}

/// Attribute sink handed to a body while it is being stored.
pub struct Advocate<'a> {
    study: &'a mut Study,
    attributes: BTreeMap<String, Attribute>,
}

impl Advocate<'_> {
    /// Stores a raw attribute.
    pub fn save_attribute(&mut self, name: &str, attribute: Attribute) {
        self.attributes.insert(name.to_owned(), attribute);
    }

    /// Stores a flag.
    pub fn save_bool(&mut self, name: &str, value: bool) {
        self.save_attribute(name, Attribute::Bool(value));
    }

    /// Stores an unsigned integer.
    pub fn save_unsigned(&mut self, name: &str, value: u64) {
        self.save_attribute(name, Attribute::Unsigned(value));
    }

    /// Stores a real scalar.
    pub fn save_real(&mut self, name: &str, value: f64) {
        self.save_attribute(name, Attribute::Real(value));
    }

    /// Stores text.
    pub fn save_text(&mut self, name: &str, value: &str) {
        self.save_attribute(name, Attribute::Text(value.to_owned()));
    }

    /// Stores a point.
    pub fn save_point(&mut self, name: &str, value: &Point) {
        self.save_attribute(name, Attribute::Point(value.clone()));
    }

    /// Stores a sample.
    pub fn save_sample(&mut self, name: &str, value: &Sample) {
        self.save_attribute(name, Attribute::Sample(value.clone()));
    }

    /// Stores labels.
    pub fn save_description(&mut self, name: &str, value: &Description) {
        self.save_attribute(name, Attribute::Description(value.clone()));
    }

    /// Stores an index list.
    pub fn save_indices(&mut self, name: &str, value: &[usize]) {
        self.save_attribute(name, Attribute::Indices(value.to_vec()));
    }

    /// Stores a mesh.
    pub fn save_mesh(&mut self, name: &str, value: &Mesh) {
        self.save_attribute(name, Attribute::Mesh(value.clone()));
    }

    /// Stores a child function by reference.
    pub fn save_function(&mut self, name: &str, function: &Function) -> Result<(), UqfError> {
        let id = self.study.store_function(function)?;
        self.save_attribute(name, Attribute::Object(id));
        Ok(())
    }

    /// Stores child functions by reference, in order.
    pub fn save_functions(&mut self, name: &str, functions: &[Function]) -> Result<(), UqfError> {
        let ids = functions
            .iter()
            .map(|function| self.study.store_function(function))
            .collect::<Result<Vec<_>, _>>()?;
        self.save_attribute(name, Attribute::Objects(ids));
        Ok(())
    }

    /// The study being written, for storing children of other shapes.
    pub fn study(&mut self) -> &mut Study {
        self.study
    }
}

/// Read access to the attributes of one stored object.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'s> {
    id: ObjectId,
    object: &'s StoredObject,
}

impl<'s> Reader<'s> {
    /// Identifier of the object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Class name of the object.
    pub fn class_name(&self) -> &'s str {
        &self.object.class_name
    }

    /// Raw attribute `name`.
    pub fn attribute(&self, name: &str) -> Result<&'s Attribute, UqfError> {
        self.object.attributes.get(name).ok_or_else(|| {
            UqfError::Serde(
                ErrorInfo::new(
                    "missing-attribute",
                    format!("{} object {} has no attribute '{name}'", self.object.class_name, self.id),
                )
                .with_context("attribute", name),
            )
        })
    }

    /// Flag `name`.
    pub fn bool(&self, name: &str) -> Result<bool, UqfError> {
        match self.attribute(name)? {
            Attribute::Bool(value) => Ok(*value),
            _ => Err(self.wrong_kind(name, "bool")),
        }
    }

    /// Unsigned integer `name`.
    pub fn unsigned(&self, name: &str) -> Result<u64, UqfError> {
        match self.attribute(name)? {
            Attribute::Unsigned(value) => Ok(*value),
            _ => Err(self.wrong_kind(name, "unsigned")),
        }
    }

    /// Real scalar `name`.
    pub fn real(&self, name: &str) -> Result<f64, UqfError> {
        match self.attribute(name)? {
            Attribute::Real(value) => Ok(*value),
            _ => Err(self.wrong_kind(name, "real")),
        }
    }

    /// Text `name`.
    pub fn text(&self, name: &str) -> Result<&'s str, UqfError> {
        match self.attribute(name)? {
            Attribute::Text(value) => Ok(value),
            _ => Err(self.wrong_kind(name, "text")),
        }
    }

    /// Point `name`.
    pub fn point(&self, name: &str) -> Result<Point, UqfError> {
        match self.attribute(name)? {
            Attribute::Point(value) => Ok(value.clone()),
            _ => Err(self.wrong_kind(name, "point")),
        }
    }

    /// Sample `name`.
    pub fn sample(&self, name: &str) -> Result<Sample, UqfError> {
        match self.attribute(name)? {
            Attribute::Sample(value) => Ok(value.clone()),
            _ => Err(self.wrong_kind(name, "sample")),
        }
    }

    /// Labels `name`.
    pub fn description(&self, name: &str) -> Result<Description, UqfError> {
        match self.attribute(name)? {
            Attribute::Description(value) => Ok(value.clone()),
            _ => Err(self.wrong_kind(name, "description")),
        }
    }

    /// Index list `name`.
    pub fn indices(&self, name: &str) -> Result<Vec<usize>, UqfError> {
        match self.attribute(name)? {
            Attribute::Indices(value) => Ok(value.clone()),
            _ => Err(self.wrong_kind(name, "indices")),
        }
    }

    /// Mesh `name`.
    pub fn mesh(&self, name: &str) -> Result<Mesh, UqfError> {
        match self.attribute(name)? {
            Attribute::Mesh(value) => Ok(value.clone()),
            _ => Err(self.wrong_kind(name, "mesh")),
        }
    }

    /// Object reference `name`.
    pub fn object(&self, name: &str) -> Result<ObjectId, UqfError> {
        match self.attribute(name)? {
            Attribute::Object(value) => Ok(*value),
            _ => Err(self.wrong_kind(name, "object")),
        }
    }

    /// Object references `name`.
    pub fn objects(&self, name: &str) -> Result<Vec<ObjectId>, UqfError> {
        match self.attribute(name)? {
            Attribute::Objects(value) => Ok(value.clone()),
            _ => Err(self.wrong_kind(name, "objects")),
        }
    }

    fn wrong_kind(&self, name: &str, expected: &str) -> UqfError {
        UqfError::Serde(
            ErrorInfo::new(
                "attribute-kind",
                format!("attribute '{name}' of object {} is not a {expected}", self.id),
            )
            .with_context("attribute", name)
            .with_context("expected", expected),
        )
    }
}

/// Rebuilds functions from a study, sharing bodies that were shared when stored.
#[derive(Debug)]
pub struct StudyLoader<'s> {
    study: &'s Study,
    functions: HashMap<ObjectId, Function>,
}

impl<'s> StudyLoader<'s> {
    /// Creates a loader over `study`.
    pub fn new(study: &'s Study) -> Self {
        Self {
            study,
            functions: HashMap::new(),
        }
    }

    /// The study being read.
    pub fn study(&self) -> &'s Study {
        self.study
    }

    /// Attribute reader for object `id`.
    pub fn reader(&self, id: ObjectId) -> Result<Reader<'s>, UqfError> {
        let study = self.study;
        Ok(Reader {
            id,
            object: study.object(id)?,
        })
    }

    /// Loads the function stored under `label`.
    pub fn function(&mut self, label: &str) -> Result<Function, UqfError> {
        let id = self.study.label(label)?;
        self.load_function(id)
    }

    /// Loads function `id`, reusing the already loaded body when possible.
    pub fn load_function(&mut self, id: ObjectId) -> Result<Function, UqfError> {
        if let Some(function) = self.functions.get(&id) {
            return Ok(function.clone());
        }
        let reader = self.reader(id)?;
        let function = match reader.class_name() {
            "NoEvaluation" => Function::new(NoEvaluation::load(&reader)?),
            "IdentityEvaluation" => Function::new(IdentityEvaluation::load(&reader)?),
            "LinearEvaluation" => Function::new(LinearEvaluation::load(&reader)?),
            "ComposedEvaluation" => Function::new(ComposedEvaluation::load(&reader, self)?),
            "MarginalEvaluation" => Function::new(MarginalEvaluation::load(&reader, self)?),
            "AggregatedEvaluation" => Function::new(AggregatedEvaluation::load(&reader, self)?),
            "ParametricEvaluation" => Function::new(ParametricEvaluation::load(&reader, self)?),
            "TrendEvaluation" => Function::new(TrendEvaluation::load(&reader, self)?),
            "InverseTrendEvaluation" => Function::new(InverseTrendEvaluation::load(&reader, self)?),
            "EvaluationProxy" => Function::new(EvaluationProxy::load(&reader, self)?),
            other => {
                return Err(UqfError::Serde(
                    ErrorInfo::new("unknown-class", format!("no loader for class '{other}'"))
                        .with_context("class", other)
                        .with_context("id", id),
                ))
            }
        };
        self.functions.insert(id, function.clone());
        Ok(function)
    }
}

/// Stores descriptions, parameter, output checking, parameter step and
/// history strategy of a body. Recorded history is not stored.
pub fn save_common(advocate: &mut Advocate<'_>, common: &EvaluationCommon) {
    advocate.save_description("inputDescription_", common.input_description());
    advocate.save_description("outputDescription_", common.output_description());
    advocate.save_point("parameter_", common.parameter());
    advocate.save_description("parameterDescription_", common.parameter_description());
    advocate.save_bool("checkOutput_", common.check_output());
    advocate.save_real("parameterEpsilon_", common.parameter_epsilon());
    let (strategy, size) = match common.history_strategy() {
        HistoryStrategy::Null => ("Null", 0),
        HistoryStrategy::Full => ("Full", 0),
        HistoryStrategy::Last(size) => ("Last", size as u64),
    };
    advocate.save_text("historyStrategy_", strategy);
    advocate.save_unsigned("historySize_", size);
}

/// Restores what [`save_common`] stored into a freshly constructed body.
pub fn load_common(reader: &Reader<'_>, common: &mut EvaluationCommon) -> Result<(), UqfError> {
    common.set_input_description(reader.description("inputDescription_")?)?;
    common.set_output_description(reader.description("outputDescription_")?)?;
    common.set_parameter(reader.point("parameter_")?)?;
    common.set_parameter_description(reader.description("parameterDescription_")?)?;
    common.set_check_output(reader.bool("checkOutput_")?);
    common.configure_differentiation(&DifferentiationOpts {
        parameter_epsilon: reader.real("parameterEpsilon_")?,
        ..DifferentiationOpts::default()
    });
    let strategy = match reader.text("historyStrategy_")? {
        "Null" => HistoryStrategy::Null,
        "Full" => HistoryStrategy::Full,
        "Last" => HistoryStrategy::Last(reader.unsigned("historySize_")? as usize),
        other => {
            return Err(UqfError::Serde(
                ErrorInfo::new("history-strategy", format!("unknown history strategy '{other}'"))
                    .with_context("id", reader.id()),
            ))
        }
    };
    common.set_history_strategy(strategy);
    Ok(())
}
