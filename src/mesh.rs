//! Triangle meshes and the turtle-frame transform that places them in world space.

use crate::turtle::Turtle;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Organ generators produce meshes in an organ-local frame where the organ
/// length runs along `+Z`. [`transform_to_frame`] moves them into world space.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangles as index triples into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Wraps raw vertex positions and index triples.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Total surface area. Faces referencing missing vertices are skipped.
    pub fn area(&self) -> f32 {
        self.faces
            .iter()
            .filter_map(|&[a, b, c]| {
                let a = self.vertices.get(a as usize)?;
                let b = self.vertices.get(b as usize)?;
                let c = self.vertices.get(c as usize)?;
                Some((*b - *a).cross(*c - *a).length() * 0.5)
            })
            .sum()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
        )
    }

    /// Returns a copy of this mesh with every vertex mapped through `matrix`.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| matrix.transform_point3(*v))
                .collect(),
            faces: self.faces.clone(),
        }
    }
}

/// Geometry attached to a graph node: one mesh, or several for compound organs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// A single mesh.
    Mesh(TriangleMesh),
    /// Several meshes belonging to the same node.
    Meshes(Vec<TriangleMesh>),
}

impl Geometry {
    /// The meshes of this geometry, one or several.
    pub fn meshes(&self) -> &[TriangleMesh] {
        match self {
            Self::Mesh(mesh) => std::slice::from_ref(mesh),
            Self::Meshes(meshes) => meshes,
        }
    }

    /// Summed surface area of all meshes.
    pub fn area(&self) -> f32 {
        self.meshes().iter().map(TriangleMesh::area).sum()
    }
}

impl From<TriangleMesh> for Geometry {
    fn from(mesh: TriangleMesh) -> Self {
        Self::Mesh(mesh)
    }
}

/// Builds the rigid transform of the turtle's current frame.
///
/// The basis is `x = up`, `z = heading`, `y = z × x`, followed by a translation
/// to the turtle position. Heading and up must not be parallel.
pub fn frame_matrix(turtle: &Turtle) -> Mat4 {
    let x = turtle.up;
    let z = turtle.heading;
    let y = z.cross(x);
    Mat4::from_cols(
        x.extend(0.0),
        y.extend(0.0),
        z.extend(0.0),
        turtle.position.extend(1.0),
    )
}

/// Places an organ-local mesh at the turtle's current frame.
pub fn transform_to_frame(turtle: &Turtle, mesh: &TriangleMesh) -> TriangleMesh {
    mesh.transformed(&frame_matrix(turtle))
}
