//! Mesh construction utilities.
//!
//! This module provides functions for building half-edge meshes from indexed
//! triangle buffers, from a profile curve revolved around the height axis, and
//! from a (possibly tapered) cylinder.

use std::collections::HashMap;
use std::f64::consts::TAU;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from flat position and index buffers.
///
/// `positions` holds `x, y, z` triples and may be `f32` or `f64`; `indices`
/// holds one vertex triple per triangle. Twins are paired by looking up the
/// reversed directed edge. Edges without a partner keep a none twin and lie on
/// the boundary.
///
/// Only out-of-range indices and ragged buffers are rejected. Non-manifold or
/// degenerate input yields a mesh with stray boundary edges rather than an
/// error.
///
/// # Example
/// ```
/// use lathe::mesh::build_from_indexed;
///
/// let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
/// let mesh = build_from_indexed(&positions, &[0, 1, 2]).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_halfedges(), 3);
/// ```
pub fn build_from_indexed<T>(positions: &[T], indices: &[u32]) -> Result<HalfEdgeMesh>
where
    T: Copy + Into<f64>,
{
    if positions.len() % 3 != 0 {
        return Err(MeshError::MalformedBuffer {
            name: "positions",
            len: positions.len(),
        });
    }
    if indices.len() % 3 != 0 {
        return Err(MeshError::MalformedBuffer {
            name: "indices",
            len: indices.len(),
        });
    }

    let points: Vec<Point3<f64>> = positions
        .chunks_exact(3)
        .map(|c| Point3::new(c[0].into(), c[1].into(), c[2].into()))
        .collect();
    let faces: Vec<[usize; 3]> = indices
        .chunks_exact(3)
        .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
        .collect();

    build_from_triangles(&points, &faces)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Example
/// ```
/// use lathe::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<HalfEdgeMesh> {
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    mesh.vertices
        .extend(vertices.iter().map(|&pos| Vertex::new(pos)));

    // Unpaired directed edges (from, to) waiting for their reverse.
    let mut open_edges: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

    for (fi, face) in faces.iter().enumerate() {
        let base = mesh.halfedges.len();
        let face_id = FaceId::new(fi);

        for e in 0..3 {
            let from = face[e];
            let to = face[(e + 1) % 3];
            let he_id = HalfEdgeId::new(base + e);

            mesh.halfedges.push(HalfEdge {
                vertex: VertexId::new(to),
                face: face_id,
                next: HalfEdgeId::new(base + (e + 1) % 3),
                prev: HalfEdgeId::new(base + (e + 2) % 3),
                twin: HalfEdgeId::invalid(),
            });

            if !mesh.vertices[from].halfedge.is_valid() {
                mesh.vertices[from].halfedge = he_id;
            }

            match open_edges.remove(&(to, from)) {
                Some(other) => {
                    mesh.halfedges[he_id.index()].twin = other;
                    mesh.halfedges[other.index()].twin = he_id;
                }
                None => {
                    open_edges.insert((from, to), he_id);
                }
            }
        }

        mesh.faces.push(Face::new(HalfEdgeId::new(base)));
    }

    Ok(mesh)
}

/// Revolve a profile curve around the Y axis.
///
/// Each profile point is `[radius, height]`. The result has
/// `(segments + 1) * profile.len()` vertices: the closing ring duplicates the
/// first one geometrically but is not welded to it, so the seam is a boundary.
/// Each quad between neighbouring rings is split into two triangles wound so
/// that face normals point away from the axis.
pub fn build_from_profile(profile: &[[f64; 2]], segments: usize) -> Result<HalfEdgeMesh> {
    if segments == 0 {
        return Err(MeshError::invalid_param("segments", segments, "must be positive"));
    }

    let rows = profile.len();
    let mut positions = Vec::with_capacity((segments + 1) * rows * 3);
    for s in 0..=segments {
        let theta = s as f64 / segments as f64 * TAU;
        let (sin, cos) = theta.sin_cos();
        for &[radius, height] in profile {
            positions.extend_from_slice(&[radius * cos, height, radius * sin]);
        }
    }

    let mut indices = Vec::with_capacity(segments * rows.saturating_sub(1) * 6);
    for s in 0..segments {
        for r in 0..rows.saturating_sub(1) {
            let a = (s * rows + r) as u32;
            let b = a + 1;
            let c = ((s + 1) * rows + r + 1) as u32;
            let d = ((s + 1) * rows + r) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    build_from_indexed(&positions, &indices)
}

/// Build an open cylinder, optionally tapered, standing on the XZ plane.
///
/// The radius is interpolated linearly from `radius_bottom` at height zero to
/// `radius_top` at `height`, across `height_segments + 1` rows.
pub fn build_from_cylinder(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: usize,
    height_segments: usize,
) -> Result<HalfEdgeMesh> {
    if height_segments == 0 {
        return Err(MeshError::invalid_param(
            "height_segments",
            height_segments,
            "must be positive",
        ));
    }

    let profile: Vec<[f64; 2]> = (0..=height_segments)
        .map(|h| {
            let t = h as f64 / height_segments as f64;
            [radius_bottom + (radius_top - radius_bottom) * t, t * height]
        })
        .collect();

    build_from_profile(&profile, radial_segments)
}

/// Convert a half-edge mesh back to face-vertex representation.
///
/// Triangles are listed in face order with vertices in loop order.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.positions().copied().collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_triangle(f).map(VertexId::index))
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0];
        let mesh = build_from_indexed(&positions, &[0, 1, 2]).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_halfedges(), 3);
        assert!(mesh.is_valid());
        assert_eq!(mesh.stats().boundary_edges, 3);

        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_halfedge_points_to_next_vertex() {
        let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0];
        let mesh = build_from_indexed(&positions, &[0, 1, 2]).unwrap();

        let he0 = HalfEdgeId::new(0);
        assert_eq!(mesh.origin(he0), VertexId::new(0));
        assert_eq!(mesh.target(he0), VertexId::new(1));
        assert_eq!(mesh.vertex(VertexId::new(2)).halfedge, HalfEdgeId::new(2));
    }

    #[test]
    fn test_twins_are_paired() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();

        let paired: Vec<HalfEdgeId> = mesh
            .halfedge_ids()
            .filter(|&he| mesh.twin(he).is_valid())
            .collect();
        assert_eq!(paired.len(), 2);
        for he in paired {
            assert_eq!(mesh.twin(mesh.twin(he)), he);
            assert_eq!(mesh.target(he), mesh.origin(mesh.twin(he)));
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_invalid_index() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let result = build_from_indexed(&positions, &[0, 1, 5]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 5 })
        ));
    }

    #[test]
    fn test_ragged_buffers() {
        let result = build_from_indexed(&[0.0, 1.0], &[]);
        assert!(matches!(result, Err(MeshError::MalformedBuffer { name: "positions", len: 2 })));

        let result = build_from_indexed(&[0.0; 9], &[0, 1]);
        assert!(matches!(result, Err(MeshError::MalformedBuffer { name: "indices", len: 2 })));
    }

    #[test]
    fn test_no_faces_is_allowed() {
        let mesh = build_from_indexed(&[0.0, 0.0, 0.0], &[]).unwrap();
        assert_eq!(mesh.num_vertices(), 1);
        assert_eq!(mesh.num_faces(), 0);

        let v = VertexId::new(0);
        assert!(mesh.is_boundary_vertex(v));
        assert_eq!(mesh.vertex_neighbors(v).count(), 0);
        assert_eq!(mesh.vertex_faces(v).count(), 0);
    }

    #[test]
    fn test_profile_counts() {
        let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
        assert_eq!(mesh.num_vertices(), 10);
        assert_eq!(mesh.num_faces(), 8);
        assert!(mesh.stats().boundary_edges > 0);
        assert!(mesh.is_valid());

        let mesh = build_from_profile(&[[0.0, 1.0], [0.3, 0.8], [0.5, 0.3], [0.2, 0.0]], 8).unwrap();
        assert_eq!(mesh.num_vertices(), 36);
        assert_eq!(mesh.num_faces(), 48);
    }

    #[test]
    fn test_profile_seam_is_not_welded() {
        let mesh = build_from_profile(&[[1.0, 0.0], [1.0, 1.0]], 4).unwrap();
        let first = mesh.position(VertexId::new(0));
        let closing = mesh.position(VertexId::new(8));
        assert!((first - closing).norm() < 1e-12);

        // Two rims plus two seam columns.
        assert_eq!(mesh.stats().boundary_edges, 4 + 4 + 2);
    }

    #[test]
    fn test_profile_normals_face_outward() {
        let mesh = build_from_profile(&[[1.0, 0.0], [1.0, 1.0]], 8).unwrap();
        for f in mesh.face_ids() {
            let [p0, p1, p2] = mesh.face_positions(f);
            let centroid = (p0.coords + p1.coords + p2.coords) / 3.0;
            let radial = nalgebra::Vector3::new(centroid.x, 0.0, centroid.z);
            assert!(mesh.face_cross(f).dot(&radial) > 0.0);
        }
    }

    #[test]
    fn test_cylinder_rows() {
        let mesh = build_from_cylinder(0.5, 1.0, 2.0, 6, 3).unwrap();
        assert_eq!(mesh.num_vertices(), 7 * 4);
        assert_eq!(mesh.num_faces(), 6 * 3 * 2);

        // First profile row sits at the bottom with the bottom radius.
        let p = mesh.position(VertexId::new(0));
        assert!((p.x - 1.0).abs() < 1e-12 && p.y.abs() < 1e-12);
        let p = mesh.position(VertexId::new(3));
        assert!((p.x - 0.5).abs() < 1e-12 && (p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_segments_rejected() {
        assert!(build_from_profile(&[[1.0, 0.0], [1.0, 1.0]], 0).is_err());
        assert!(build_from_cylinder(1.0, 1.0, 1.0, 8, 0).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];

        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(out_verts, vertices);
        assert_eq!(out_faces, faces);
    }
}
