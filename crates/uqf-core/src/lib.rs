#![deny(missing_docs)]
#![doc = "Error taxonomy, numeric containers and mesh types shared by the UQF function framework."]

pub mod errors;
pub mod linalg;
pub mod mesh;
pub mod provenance;

pub use errors::{check_dimension, ErrorInfo, UqfError};
pub use linalg::{Description, Matrix, Point, Sample, SymmetricTensor};
pub use mesh::{Field, Mesh};
pub use provenance::SchemaVersion;
