//! Loop subdivision for triangle meshes.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::{build_from_indexed, HalfEdgeMesh, VertexId};

use super::SubdivideOptions;

/// Performs Loop subdivision on a triangle mesh.
///
/// Each iteration quadruples the number of triangles. The input mesh is left
/// untouched; zero iterations return a copy.
///
/// # Vertex Rules
///
/// - **Edge vertex**: `1/2 * (v0 + v1)`
/// - **Interior vertex**: `(1 - n*β) * v + β * Σ(neighbors)`, with
///   `β = 3/16` for `n = 3` and `3/(8n)` otherwise
/// - **Boundary vertex**: unchanged
pub fn loop_subdivide(mesh: &HalfEdgeMesh, options: &SubdivideOptions) -> Result<HalfEdgeMesh> {
    let mut current = mesh.clone();
    for _ in 0..options.iterations {
        current = loop_subdivide_once(&current)?;
    }
    Ok(current)
}

/// Loop subdivision with progress reporting.
pub fn loop_subdivide_with_progress(
    mesh: &HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<HalfEdgeMesh> {
    let mut current = mesh.clone();
    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Loop subdivision");
        current = loop_subdivide_once(&current)?;
    }
    progress.report(options.iterations, options.iterations, "Loop subdivision");
    Ok(current)
}

/// Perform one iteration of Loop subdivision.
///
/// Even vertices keep their indices; odd vertices are appended in the order
/// their edges are first met while walking faces in order.
pub fn loop_subdivide_once(mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
    if mesh.num_faces() == 0 {
        return Ok(mesh.clone());
    }

    let mut positions: Vec<Point3<f64>> = mesh
        .vertex_ids()
        .map(|v| even_position(mesh, v))
        .collect();

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut indices: Vec<u32> = Vec::with_capacity(mesh.num_faces() * 12);

    for f in mesh.face_ids() {
        let fvs = mesh.face_halfedges(f).map(|he| mesh.target(he).raw());

        let mut midpoint = |a: u32, b: u32| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let pa = mesh.position(VertexId::new(a as usize));
                let pb = mesh.position(VertexId::new(b as usize));
                positions.push(nalgebra::center(pa, pb));
                (positions.len() - 1) as u32
            })
        };

        let [v0, v1, v2] = fvs;
        let m01 = midpoint(v0, v1);
        let m12 = midpoint(v1, v2);
        let m20 = midpoint(v2, v0);

        indices.extend_from_slice(&[
            v0, m01, m20, //
            m01, v1, m12, //
            m20, m12, v2, //
            m01, m12, m20,
        ]);
    }

    debug!(
        faces = indices.len() / 3,
        vertices = positions.len(),
        "loop subdivision pass"
    );

    let flat: Vec<f64> = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
    build_from_indexed(&flat, &indices)
}

fn even_position(mesh: &HalfEdgeMesh, v: VertexId) -> Point3<f64> {
    let pos = *mesh.position(v);
    if mesh.is_boundary_vertex(v) {
        return pos;
    }

    let (n, sum) = mesh
        .vertex_neighbors(v)
        .fold((0usize, Vector3::zeros()), |(n, sum), nb| {
            (n + 1, sum + mesh.position(nb).coords)
        });
    if n == 0 {
        return pos;
    }

    let beta = loop_beta(n);
    Point3::from(pos.coords * (1.0 - n as f64 * beta) + sum * beta)
}

/// Loop's even-vertex weight for valence `n`.
#[inline]
fn loop_beta(n: usize) -> f64 {
    if n == 3 {
        3.0 / 16.0
    } else {
        3.0 / (8.0 * n as f64)
    }
}
