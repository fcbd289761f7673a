//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for building, querying, and flattening triangle meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a triangle mesh using
//! a half-edge data structure. Adjacency queries walk pointers instead of
//! scanning faces, which is what the subdivision and smoothing operators rely on.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use lathe::mesh::{build_from_profile, to_flat_arrays};
//!
//! let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
//! assert_eq!(mesh.num_vertices(), 10);
//!
//! let flat = to_flat_arrays(&mesh);
//! assert_eq!(flat.indices.len(), 8 * 3);
//! ```

mod builder;
mod flat;
mod halfedge;
mod index;

pub use builder::{
    build_from_cylinder, build_from_indexed, build_from_profile, build_from_triangles,
    to_face_vertex,
};
pub use flat::{to_flat_arrays, vertex_normals, FlatMeshData};
pub use halfedge::{
    Face, HalfEdge, HalfEdgeMesh, MeshStats, Vertex, VertexHalfEdgeIter, VertexNeighborIter,
};
pub use index::{FaceId, HalfEdgeId, VertexId};
