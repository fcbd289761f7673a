//! # Lathe
//!
//! Deterministic enrichment of coarse parametric surfaces.
//!
//! Lathe builds a half-edge triangle mesh from a revolved profile or a
//! cylinder, runs a composable pipeline of geometric operators over it
//! (Loop subdivision, Laplacian and Taubin smoothing, normal and noise
//! displacement), and hands the result back as flat render buffers or as a
//! versioned JSON document.
//!
//! ## Features
//!
//! - **Half-edge data structure**: adjacency queries with type-safe indices
//!   and correct boundary handling for open surfaces
//! - **Pure operators**: every operator returns a new mesh; identical inputs
//!   give bit-identical outputs
//! - **Failure containment**: the adapters fall back to the base mesh when a
//!   pipeline errors, panics, or produces non-finite positions
//! - **Portable documents**: flat buffers plus optional topology and metadata
//!
//! ## Quick Start
//!
//! ```
//! use lathe::prelude::*;
//!
//! let profile = ProfileDescription {
//!     points: vec![[1.0, 0.0], [0.5, 1.0]],
//!     segments: 4,
//! };
//!
//! let pipeline = sequence(vec![subdivide(1), smooth(2, 0.5)]);
//! let flat = apply_pipeline_to_profile(&profile, pipeline.as_ref());
//! assert_eq!(flat.face_count(), 32);
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use lathe::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.stats().boundary_edges, 0);
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use lathe::prelude::*;
//!
//! let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
//!
//! let v = VertexId::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! for face in mesh.vertex_faces(v) {
//!     let [a, b, c] = mesh.face_triangle(face);
//!     println!("Adjacent face {:?}: {:?} {:?} {:?}", face, a, b, c);
//! }
//! ```
//!
//! ## Documents
//!
//! ```
//! use lathe::prelude::*;
//!
//! let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
//! let doc = serialize(&mesh, &SerializeOptions::default().with_topology(true));
//!
//! let value = doc.to_value().unwrap();
//! let flat = deserialize_with_fallback(&value).unwrap();
//! assert_eq!(flat.vertex_count(), 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algo;
pub mod assets;
pub mod error;
pub mod io;
pub mod mesh;
pub mod pipeline;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use lathe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapters::{
        apply_pipeline_to_cylinder, apply_pipeline_to_profile, enrich, CylinderDescription,
        Enriched, MeshTier, ProfileDescription, SurfaceDescription,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::io::{
        deserialize_to_flat, deserialize_to_halfedge, deserialize_with_fallback, serialize,
        MeshDocument, MeshFormat, MeshMeta, SerializeOptions,
    };
    pub use crate::mesh::{
        build_from_cylinder, build_from_indexed, build_from_profile, build_from_triangles,
        to_flat_arrays, FaceId, FlatMeshData, HalfEdgeId, HalfEdgeMesh, VertexId,
    };
    pub use crate::pipeline::{
        conditional, displace_by_field, displace_by_function, displace_by_noise,
        displace_normal, op_fn, repeat_n, sequence, smooth, subdivide, taubin, MeshOp,
        MeshPipeline, PipelineTable, SharedOp,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_relative_eq;

    fn cap() -> ProfileDescription {
        ProfileDescription {
            points: vec![[0.0, 1.0], [0.3, 0.8], [0.5, 0.3], [0.2, 0.0]],
            segments: 8,
        }
    }

    fn assert_connectivity(mesh: &HalfEdgeMesh) {
        for he in mesh.halfedge_ids() {
            let twin = mesh.twin(he);
            if twin.is_valid() {
                assert_eq!(mesh.twin(twin), he);
            }
        }
        for f in mesh.face_ids() {
            let start = mesh.face(f).halfedge;
            let back = mesh.next(mesh.next(mesh.next(start)));
            assert_eq!(back, start);
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
        assert_eq!(mesh.num_vertices(), 10);
        assert_eq!(mesh.num_faces(), 8);
        assert!(mesh.stats().boundary_edges >= 1);

        let refined = subdivide(1).apply(&mesh).unwrap();
        assert_eq!(refined.num_faces(), 32);
    }

    #[test]
    fn test_connectivity_after_every_operator() {
        let base = build_from_profile(&cap().points, cap().segments).unwrap();
        assert_connectivity(&base);

        let ops = [
            subdivide(2),
            smooth(3, 0.5),
            taubin(2, 0.5, -0.53),
            displace_by_noise(0.02, 6.0),
            displace_normal(0.05),
        ];
        for op in &ops {
            let out = op.apply(&base).unwrap();
            assert_connectivity(&out);
            assert!(out.is_valid(), "{} broke connectivity", op.name());
        }
    }

    #[test]
    fn test_subdivision_growth() {
        let mesh = build_from_profile(&cap().points, cap().segments).unwrap();
        let stats = mesh.stats();
        let refined = subdivide(1).apply(&mesh).unwrap();

        assert_eq!(refined.num_faces(), 4 * stats.faces);
        assert_eq!(refined.num_vertices(), stats.vertices + stats.edges);
    }

    #[test]
    fn test_boundary_pin_holds_over_many_passes() {
        let mesh = build_from_profile(&cap().points, cap().segments).unwrap();
        let smoothed = smooth(25, 0.8).apply(&mesh).unwrap();

        for v in mesh.vertex_ids().filter(|&v| mesh.is_boundary_vertex(v)) {
            assert_eq!(smoothed.position(v), mesh.position(v));
        }
    }

    #[test]
    fn test_zero_displacement_is_identity() {
        let mesh = build_from_profile(&cap().points, cap().segments).unwrap();
        let same = displace_normal(0.0).apply(&mesh).unwrap();
        assert_eq!(same, mesh);
    }

    #[test]
    fn test_roundtrip_with_topology() {
        let mesh = subdivide(1)
            .apply(&build_from_profile(&cap().points, cap().segments).unwrap())
            .unwrap();
        let expected = to_flat_arrays(&mesh);

        let doc = serialize(&mesh, &SerializeOptions::default().with_topology(true));
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let flat = deserialize_with_fallback(&value).unwrap();

        assert_eq!(flat.vertex_count(), mesh.num_vertices());
        assert_eq!(flat.face_count(), mesh.num_faces());
        assert_eq!(flat.indices, expected.indices);
        for (a, b) in flat.positions.iter().zip(&expected.positions) {
            assert_relative_eq!(*a, *b);
        }
        for (a, b) in flat.normals.iter().zip(&expected.normals) {
            assert_relative_eq!(*a, *b);
        }
    }

    #[test]
    fn test_full_pipeline_is_byte_deterministic() {
        let table = PipelineTable::standard();
        let run = || {
            let result = enrich(&cap().into(), table.get("Morchella").as_ref());
            let mesh = build_from_indexed(&result.flat.positions, &result.flat.indices).unwrap();
            let doc = serialize(&mesh, &SerializeOptions::default().with_topology(true));
            (result.flat, doc.to_json().unwrap())
        };

        let (flat_a, json_a) = run();
        let (flat_b, json_b) = run();
        assert_eq!(flat_a, flat_b);
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn test_fallback_guarantee_for_throwing_pipelines() {
        let throwing = op_fn("throw", |_: &HalfEdgeMesh| -> Result<HalfEdgeMesh> {
            Err(MeshError::operator_failed("throw", "engineered failure"))
        });
        let panicking = op_fn("panic", |_: &HalfEdgeMesh| -> Result<HalfEdgeMesh> {
            panic!("engineered panic")
        });
        let cylinder = CylinderDescription::new(0.1, 0.15, 0.8, 8).with_height_segments(3);

        for pipeline in [throwing, panicking] {
            let flat = apply_pipeline_to_profile(&cap(), pipeline.as_ref());
            assert_eq!(flat.vertex_count(), 36);

            let flat = apply_pipeline_to_cylinder(&cylinder, pipeline.as_ref());
            assert_eq!(flat.vertex_count(), 9 * 4);
        }
    }

    #[test]
    fn test_every_standard_pipeline_enriches() {
        let table = PipelineTable::standard();
        let categories: Vec<String> = table.categories().map(str::to_string).collect();

        for category in categories.iter().map(String::as_str).chain(["Unlisted"]) {
            let result = enrich(&cap().into(), table.get(category).as_ref());
            assert_eq!(result.tier, MeshTier::Enriched, "{} fell back", category);
            assert!(result.flat.positions.iter().all(|c| c.is_finite()));
        }
    }
}
