//! Flat render buffers.
//!
//! [`FlatMeshData`] is the hand-off format for renderers: interleaving-free
//! `f32` position and normal arrays plus a `u32` triangle index array.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::halfedge::HalfEdgeMesh;
use super::index::VertexId;

/// Flat vertex, normal, and index buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatMeshData {
    /// Vertex positions as `x, y, z` triples.
    pub positions: Vec<f32>,
    /// Unit vertex normals as `x, y, z` triples (zero for vertices without area).
    pub normals: Vec<f32>,
    /// Triangle vertex indices, three per face.
    pub indices: Vec<u32>,
}

impl FlatMeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}

/// Compute area-weighted vertex normals.
///
/// Each face adds its unnormalized edge cross product to its three vertices,
/// so larger faces weigh more. Sums with zero length stay zero.
pub fn vertex_normals(mesh: &HalfEdgeMesh) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); mesh.num_vertices()];

    for f in mesh.face_ids() {
        let cross = mesh.face_cross(f);
        for v in mesh.face_triangle(f) {
            normals[v.index()] += cross;
        }
    }

    for n in &mut normals {
        let len = n.norm();
        if len > 0.0 {
            *n /= len;
        }
    }

    normals
}

/// Flatten a half-edge mesh into render buffers.
///
/// Vertex order is preserved. Faces are emitted in face order with their
/// vertices in loop order, so winding matches the half-edge orientation.
pub fn to_flat_arrays(mesh: &HalfEdgeMesh) -> FlatMeshData {
    let positions = mesh
        .positions()
        .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
        .collect();

    let normals = vertex_normals(mesh)
        .into_iter()
        .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
        .collect();

    let indices = mesh
        .face_ids()
        .flat_map(|f| mesh.face_triangle(f).map(|v: VertexId| v.raw()))
        .collect();

    FlatMeshData {
        positions,
        normals,
        indices,
    }
}
