#![deny(missing_docs)]
#![doc = "Field functions: point functions lifted to operators over values attached to mesh vertices."]

/// State carried by every field function body.
pub mod common;
/// Copy-on-write field function handle.
pub mod handle;
/// Field function implementation contract.
pub mod implementation;
pub mod persistence;
/// Trend removal and reinstatement over a mesh.
pub mod trend;
/// Pointwise lifting of a function of the vertex values.
pub mod value;
/// Lifting of a function of the vertex coordinates.
pub mod vertex;
/// Lifting of a function of the vertex coordinates and values.
pub mod vertex_value;

pub use common::FieldFunctionCommon;
pub use handle::FieldFunction;
pub use implementation::FieldFunctionImplementation;
pub use persistence::{add_field_function, load_field_function, store_field_function, FieldStudyLoader};
pub use trend::{InverseTrendTransform, TrendField, TrendTransform};
pub use value::ValueFunction;
pub use vertex::VertexFunction;
pub use vertex_value::VertexValueFunction;
