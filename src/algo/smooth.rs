//! Mesh smoothing algorithms.
//!
//! # Algorithms
//!
//! - [`laplacian_smooth`]: Classic umbrella-operator smoothing (shrinks the mesh)
//! - [`taubin_smooth`]: Taubin's λ|μ smoothing (counteracts shrinkage)
//!
//! Both return a new mesh with the same topology. Boundary vertices are pinned
//! by default and vertices without neighbors never move.
//!
//! # Example
//!
//! ```
//! use lathe::mesh::build_from_profile;
//! use lathe::algo::smooth::{laplacian_smooth, SmoothOptions};
//!
//! let mesh = build_from_profile(&[[1.0, 0.0], [0.7, 0.5], [0.9, 1.0]], 8).unwrap();
//! let smoothed = laplacian_smooth(&mesh, &SmoothOptions::default().with_iterations(3));
//! assert_eq!(smoothed.num_vertices(), mesh.num_vertices());
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::debug;

use crate::mesh::{HalfEdgeMesh, VertexId};

/// Options for Laplacian smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothOptions {
    /// Number of smoothing iterations.
    pub iterations: usize,

    /// Blend factor toward the neighbor centroid. Values in `[0, 1]` relax
    /// toward the centroid; negative values push away from it.
    pub factor: f64,

    /// Keep boundary vertices fixed.
    pub pin_boundary: bool,

    /// Compute each pass with rayon. Results are identical either way.
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            factor: 0.5,
            pin_boundary: true,
            parallel: false,
        }
    }
}

impl SmoothOptions {
    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the blend factor. The value is used as given.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Set whether boundary vertices stay fixed.
    pub fn with_pin_boundary(mut self, pin: bool) -> Self {
        self.pin_boundary = pin;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Options for Taubin smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaubinOptions {
    /// Number of λ|μ pass pairs.
    pub iterations: usize,

    /// Positive (shrinking) factor.
    pub lambda: f64,

    /// Negative (inflating) factor. Its magnitude should exceed `lambda`.
    pub mu: f64,

    /// Keep boundary vertices fixed.
    pub pin_boundary: bool,

    /// Compute each pass with rayon.
    pub parallel: bool,
}

impl Default for TaubinOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            lambda: 0.5,
            mu: -0.53,
            pin_boundary: true,
            parallel: false,
        }
    }
}

impl TaubinOptions {
    /// Set the number of λ|μ pass pairs.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the positive factor.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set the negative factor.
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    /// Set whether boundary vertices stay fixed.
    pub fn with_pin_boundary(mut self, pin: bool) -> Self {
        self.pin_boundary = pin;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Performs a single Laplacian pass: `v' = v + factor * (centroid - v)`.
pub fn laplacian_smooth_once(mesh: &HalfEdgeMesh, factor: f64, pin_boundary: bool) -> HalfEdgeMesh {
    let pinned = pinned_vertices(mesh, pin_boundary);
    smooth_pass(mesh, &pinned, factor, false)
}

/// Performs Laplacian smoothing on a mesh.
///
/// Laplacian smoothing moves each vertex towards the centroid of its
/// neighbors. It tends to shrink the mesh over multiple iterations; for
/// shrinkage-resistant smoothing use [`taubin_smooth`].
///
/// # Algorithm
///
/// For each iteration:
/// 1. For each movable vertex v, compute the centroid c of its neighbors
/// 2. Move v towards c: `new_pos = old_pos + factor * (c - old_pos)`
///
/// All vertices in a pass read the previous pass's positions.
pub fn laplacian_smooth(mesh: &HalfEdgeMesh, options: &SmoothOptions) -> HalfEdgeMesh {
    debug!(
        iterations = options.iterations,
        factor = options.factor,
        "laplacian smoothing"
    );

    let pinned = pinned_vertices(mesh, options.pin_boundary);
    let mut current = mesh.clone();
    for _ in 0..options.iterations {
        current = smooth_pass(&current, &pinned, options.factor, options.parallel);
    }
    current
}

/// Performs Taubin smoothing on a mesh.
///
/// Each iteration applies a Laplacian pass with factor λ (smoothing)
/// followed by one with factor μ < 0 (inflation).
///
/// # Reference
///
/// Taubin, G. (1995). "A signal processing approach to fair surface design."
/// SIGGRAPH '95.
pub fn taubin_smooth(mesh: &HalfEdgeMesh, options: &TaubinOptions) -> HalfEdgeMesh {
    debug!(
        iterations = options.iterations,
        lambda = options.lambda,
        mu = options.mu,
        "taubin smoothing"
    );

    let pinned = pinned_vertices(mesh, options.pin_boundary);
    let mut current = mesh.clone();
    for _ in 0..options.iterations {
        current = smooth_pass(&current, &pinned, options.lambda, options.parallel);
        current = smooth_pass(&current, &pinned, options.mu, options.parallel);
    }
    current
}

/// Boundary status only depends on topology, which smoothing never changes.
fn pinned_vertices(mesh: &HalfEdgeMesh, pin_boundary: bool) -> Vec<bool> {
    if pin_boundary {
        mesh.vertex_ids()
            .map(|v| mesh.is_boundary_vertex(v))
            .collect()
    } else {
        vec![false; mesh.num_vertices()]
    }
}

fn smooth_pass(mesh: &HalfEdgeMesh, pinned: &[bool], factor: f64, parallel: bool) -> HalfEdgeMesh {
    let step = |i: usize| {
        let vid = VertexId::new(i);
        if pinned[i] {
            *mesh.position(vid)
        } else {
            compute_laplacian_step(mesh, vid, factor)
        }
    };

    let num_vertices = mesh.num_vertices();
    let new_positions: Vec<Point3<f64>> = if parallel {
        (0..num_vertices).into_par_iter().map(step).collect()
    } else {
        (0..num_vertices).map(step).collect()
    };

    mesh.with_positions(new_positions)
}

fn compute_laplacian_step(mesh: &HalfEdgeMesh, v: VertexId, factor: f64) -> Point3<f64> {
    let pos = *mesh.position(v);

    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for nb in mesh.vertex_neighbors(v) {
        sum += mesh.position(nb).coords;
        count += 1;
    }

    if count == 0 {
        return pos;
    }

    let centroid = Point3::from(sum / count as f64);
    pos + (centroid - pos) * factor
}
