//! Vertex displacement along normals.
//!
//! Every variant recomputes area-weighted vertex normals (see
//! [`vertex_normals`]) and moves each vertex along its own normal by a
//! per-vertex magnitude. Positive magnitudes push outward. Vertices with a
//! zero normal stay where they are.

use nalgebra::Point3;
use rayon::prelude::*;

use super::noise::value_noise3;
use crate::mesh::{vertex_normals, HalfEdgeMesh};

/// Move every vertex along its normal by `magnitude(index, position)`.
///
/// With `parallel` set the magnitudes are evaluated with rayon; positions are
/// still collected in vertex order.
pub fn displace_along_normals<F>(mesh: &HalfEdgeMesh, parallel: bool, magnitude: F) -> HalfEdgeMesh
where
    F: Fn(usize, &Point3<f64>) -> f64 + Sync,
{
    let normals = vertex_normals(mesh);
    let step = |(i, p): (usize, &Point3<f64>)| p + normals[i] * magnitude(i, p);

    let positions: Vec<Point3<f64>> = if parallel {
        mesh.vertices
            .par_iter()
            .map(|v| &v.position)
            .enumerate()
            .map(step)
            .collect()
    } else {
        mesh.positions().enumerate().map(step).collect()
    };

    mesh.with_positions(positions)
}

/// Inflate (positive) or deflate (negative) by a constant amount.
pub fn displace_normal(mesh: &HalfEdgeMesh, amount: f64) -> HalfEdgeMesh {
    displace_along_normals(mesh, false, |_, _| amount)
}

/// Displace by a scalar function of position.
pub fn displace_by_function<F>(mesh: &HalfEdgeMesh, f: F) -> HalfEdgeMesh
where
    F: Fn(f64, f64, f64) -> f64 + Sync,
{
    displace_along_normals(mesh, false, |_, p| f(p.x, p.y, p.z))
}

/// Displace by a per-vertex scalar field times `scale`.
///
/// Vertices past the end of `field` are not moved.
pub fn displace_by_field(mesh: &HalfEdgeMesh, field: &[f64], scale: f64) -> HalfEdgeMesh {
    displace_along_normals(mesh, false, |i, _| {
        field.get(i).copied().unwrap_or(0.0) * scale
    })
}

/// Displace by `amplitude * value_noise3(position * frequency)`.
pub fn displace_by_noise(mesh: &HalfEdgeMesh, amplitude: f64, frequency: f64) -> HalfEdgeMesh {
    displace_along_normals(mesh, false, |_, p| {
        amplitude * value_noise3(p.x * frequency, p.y * frequency, p.z * frequency)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_profile, build_from_triangles, VertexId};
    use approx::assert_relative_eq;

    fn create_single_triangle() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    fn mean_radius(mesh: &HalfEdgeMesh) -> f64 {
        mesh.positions().map(|p| p.x.hypot(p.z)).sum::<f64>() / mesh.num_vertices() as f64
    }

    #[test]
    fn test_constant_moves_along_normal() {
        let mesh = create_single_triangle();
        let moved = displace_normal(&mesh, 0.25);

        for v in mesh.vertex_ids() {
            let delta = moved.position(v) - mesh.position(v);
            assert_relative_eq!(delta.z, 0.25, epsilon = 1e-12);
            assert_relative_eq!(delta.x, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_positive_inflates_profile() {
        let mesh = build_from_profile(&[[1.0, 0.0], [1.0, 0.5], [1.0, 1.0]], 16).unwrap();
        let inflated = displace_normal(&mesh, 0.1);
        let deflated = displace_normal(&mesh, -0.1);

        assert!(mean_radius(&inflated) > mean_radius(&mesh));
        assert!(mean_radius(&deflated) < mean_radius(&mesh));
    }

    #[test]
    fn test_field_defaults_missing_entries_to_zero() {
        let mesh = create_single_triangle();
        let moved = displace_by_field(&mesh, &[1.0], 2.0);

        assert_relative_eq!(moved.position(VertexId::new(0)).z, 2.0, epsilon = 1e-12);
        assert_eq!(moved.position(VertexId::new(1)), mesh.position(VertexId::new(1)));
        assert_eq!(moved.position(VertexId::new(2)), mesh.position(VertexId::new(2)));
    }

    #[test]
    fn test_function_sees_position() {
        let mesh = create_single_triangle();
        let moved = displace_by_function(&mesh, |x, y, _| x + 2.0 * y);

        assert_relative_eq!(moved.position(VertexId::new(0)).z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(moved.position(VertexId::new(1)).z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(moved.position(VertexId::new(2)).z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_noise_is_bounded_and_deterministic() {
        let mesh = build_from_profile(&[[0.5, 0.0], [0.8, 0.5], [0.3, 1.0]], 12).unwrap();
        let a = displace_by_noise(&mesh, 0.05, 6.0);
        let b = displace_by_noise(&mesh, 0.05, 6.0);
        assert_eq!(a, b);

        for v in mesh.vertex_ids() {
            assert!((a.position(v) - mesh.position(v)).norm() <= 0.05 + 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = build_from_profile(&[[0.5, 0.0], [0.8, 0.5], [0.3, 1.0]], 12).unwrap();
        let magnitude = |i: usize, p: &Point3<f64>| (i as f64 * 0.01) + p.y;
        assert_eq!(
            displace_along_normals(&mesh, false, magnitude),
            displace_along_normals(&mesh, true, magnitude)
        );
    }

    #[test]
    fn test_topology_unchanged() {
        let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
        let moved = displace_normal(&mesh, 0.3);
        assert_eq!(moved.num_faces(), mesh.num_faces());
        assert_eq!(moved.stats(), mesh.stats());
    }
}
