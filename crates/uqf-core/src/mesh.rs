//! Meshes and the fields attached to their vertices.

use serde::{Deserialize, Serialize};

use crate::errors::{check_dimension, ErrorInfo, UqfError};
use crate::linalg::Sample;

/// Vertices and optional simplices describing a spatial or temporal grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Sample,
    #[serde(default)]
    simplices: Vec<Vec<usize>>,
}

impl Mesh {
    /// Creates a mesh made of isolated vertices.
    pub fn new(vertices: Sample) -> Self {
        Self {
            vertices,
            simplices: Vec::new(),
        }
    }

    /// Creates a mesh with simplices given as lists of vertex indices.
    pub fn with_simplices(vertices: Sample, simplices: Vec<Vec<usize>>) -> Result<Self, UqfError> {
        let count = vertices.size();
        for simplex in &simplices {
            if let Some(&bad) = simplex.iter().find(|&&index| index >= count) {
                return Err(UqfError::index_out_of_range("mesh simplex vertex", bad, count));
            }
        }
        Ok(Self {
            vertices,
            simplices,
        })
    }

    /// Builds the 1-D grid `start, start + step, ..` with `count` vertices.
    pub fn regular_grid(start: f64, step: f64, count: usize) -> Result<Self, UqfError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(UqfError::Parameter(
                ErrorInfo::new("grid-step", "regular grid step must be positive and finite")
                    .with_context("step", step),
            ));
        }
        let values: Vec<f64> = (0..count).map(|index| start + step * index as f64).collect();
        let simplices = (1..count).map(|index| vec![index - 1, index]).collect();
        Ok(Self {
            vertices: Sample::from_column(&values),
            simplices,
        })
    }

    /// Spatial dimension of the vertices.
    pub fn dimension(&self) -> usize {
        self.vertices.dimension()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.size()
    }

    /// Vertex coordinates, one row per vertex.
    pub fn vertices(&self) -> &Sample {
        &self.vertices
    }

    /// Simplices as vertex index lists.
    pub fn simplices(&self) -> &[Vec<usize>] {
        &self.simplices
    }
}

/// Values attached to the vertices of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    mesh: Mesh,
    values: Sample,
}

impl Field {
    /// Pairs `values` with `mesh`; one row per vertex is required.
    pub fn new(mesh: Mesh, values: Sample) -> Result<Self, UqfError> {
        check_dimension("field value count", mesh.vertex_count(), values.size())?;
        Ok(Self { mesh, values })
    }

    /// Underlying mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Field values, one row per vertex.
    pub fn values(&self) -> &Sample {
        &self.values
    }

    /// Dimension of the mesh vertices.
    pub fn spatial_dimension(&self) -> usize {
        self.mesh.dimension()
    }

    /// Dimension of the stored values.
    pub fn output_dimension(&self) -> usize {
        self.values.dimension()
    }

    /// Splits the field into its mesh and values.
    pub fn into_parts(self) -> (Mesh, Sample) {
        (self.mesh, self.values)
    }
}
