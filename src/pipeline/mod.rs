//! Composable mesh pipelines.
//!
//! A pipeline is any [`MeshOp`]: something that reads a mesh and returns a new
//! one. Operators are shared as [`SharedOp`] (`Arc<dyn MeshOp>`) so the same
//! configured pipeline can be handed to many threads at once.
//!
//! # Example
//!
//! ```
//! use lathe::mesh::build_from_profile;
//! use lathe::pipeline::{displace_by_noise, sequence, smooth, subdivide, MeshOp};
//!
//! let pipeline = sequence(vec![subdivide(1), smooth(2, 0.5), displace_by_noise(0.02, 6.0)]);
//! assert_eq!(pipeline.names(), ["subdivide(1)", "smooth(2, 0.5)", "displaceByNoise(0.02, 6)"]);
//!
//! let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
//! let enriched = pipeline.apply(&mesh).unwrap();
//! assert_eq!(enriched.num_faces(), 32);
//! ```

mod ops;
mod runner;
pub mod table;

use std::sync::Arc;

pub use ops::{
    Conditional, DisplaceByField, DisplaceByFunction, DisplaceByNoise, DisplaceNormal, FnOp,
    Repeat, Sequence, Smooth, Subdivide, Taubin,
};
pub use runner::{MeshPipeline, StepReport};
pub use table::{PipelineTable, StandardPipelines};

use crate::algo::smooth::{SmoothOptions, TaubinOptions};
use crate::algo::subdivide::SubdivideOptions;
use crate::error::{MeshError, Result};
use crate::mesh::HalfEdgeMesh;

/// A mesh-to-mesh operation.
///
/// Implementations must be pure: the same input mesh always yields the same
/// output mesh, and the input is never modified.
pub trait MeshOp: Send + Sync {
    /// Apply the operation.
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh>;

    /// A short stable label such as `subdivide(1)`.
    fn name(&self) -> String;

    /// Labels of the primitive steps, in application order.
    fn names(&self) -> Vec<String> {
        vec![self.name()]
    }
}

/// A reference-counted, thread-safe operator.
pub type SharedOp = Arc<dyn MeshOp>;

/// Loop subdivision, `iterations` passes.
pub fn subdivide(iterations: usize) -> SharedOp {
    Arc::new(Subdivide(SubdivideOptions::new(iterations)))
}

/// Laplacian smoothing with boundary vertices pinned.
pub fn smooth(iterations: usize, factor: f64) -> SharedOp {
    Arc::new(Smooth(
        SmoothOptions::default()
            .with_iterations(iterations)
            .with_factor(factor),
    ))
}

/// Taubin λ|μ smoothing with boundary vertices pinned.
pub fn taubin(iterations: usize, lambda: f64, mu: f64) -> SharedOp {
    Arc::new(Taubin(
        TaubinOptions::default()
            .with_iterations(iterations)
            .with_lambda(lambda)
            .with_mu(mu),
    ))
}

/// Constant displacement along vertex normals.
pub fn displace_normal(amount: f64) -> SharedOp {
    Arc::new(DisplaceNormal { amount })
}

/// Displacement by a function of vertex position.
pub fn displace_by_function<F>(f: F) -> SharedOp
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync + 'static,
{
    Arc::new(DisplaceByFunction::new(f))
}

/// Displacement by a per-vertex scalar field.
pub fn displace_by_field(field: Vec<f64>, scale: f64) -> SharedOp {
    Arc::new(DisplaceByField { field, scale })
}

/// Displacement by lattice value noise.
pub fn displace_by_noise(amplitude: f64, frequency: f64) -> SharedOp {
    Arc::new(DisplaceByNoise {
        amplitude,
        frequency,
    })
}

/// Apply `ops` left to right. An empty sequence is the identity.
pub fn sequence(ops: Vec<SharedOp>) -> SharedOp {
    Arc::new(Sequence(ops))
}

/// Apply `op` only when `predicate` holds for the incoming mesh.
pub fn conditional<P>(predicate: P, op: SharedOp) -> SharedOp
where
    P: Fn(&HalfEdgeMesh) -> bool + Send + Sync + 'static,
{
    Arc::new(Conditional::new(predicate, op))
}

/// Apply `op` `n` times, feeding each output into the next application.
pub fn repeat_n(n: usize, op: SharedOp) -> SharedOp {
    Arc::new(Repeat { n, op })
}

/// Wrap a closure as a named operator.
pub fn op_fn<F>(name: impl Into<String>, f: F) -> SharedOp
where
    F: Fn(&HalfEdgeMesh) -> Result<HalfEdgeMesh> + Send + Sync + 'static,
{
    Arc::new(FnOp::new(name, f))
}

/// Fail if any vertex position is NaN or infinite.
pub fn ensure_finite(mesh: &HalfEdgeMesh) -> Result<()> {
    match mesh
        .positions()
        .position(|p| !p.iter().all(|c| c.is_finite()))
    {
        Some(vertex) => Err(MeshError::NonFinitePosition { vertex }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_profile, VertexId};
    use nalgebra::Point3;

    fn base_mesh() -> HalfEdgeMesh {
        build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap()
    }

    #[test]
    fn test_sequence_applies_in_order() {
        let log = op_fn("tag", |m: &HalfEdgeMesh| {
            // Only succeeds after subdivision ran first.
            if m.num_faces() == 32 {
                Ok(m.clone())
            } else {
                Err(MeshError::operator_failed("tag", "ran too early"))
            }
        });

        let pipeline = sequence(vec![subdivide(1), log]);
        assert!(pipeline.apply(&base_mesh()).is_ok());
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let mesh = base_mesh();
        assert_eq!(sequence(Vec::new()).apply(&mesh).unwrap(), mesh);
    }

    #[test]
    fn test_conditional() {
        let mesh = base_mesh();
        let small_only = conditional(|m| m.num_faces() < 10, subdivide(1));

        let once = small_only.apply(&mesh).unwrap();
        assert_eq!(once.num_faces(), 32);

        let twice = small_only.apply(&once).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_repeat_matches_iterations() {
        let mesh = base_mesh();
        let repeated = repeat_n(2, subdivide(1)).apply(&mesh).unwrap();
        let direct = subdivide(2).apply(&mesh).unwrap();
        assert_eq!(repeated, direct);

        assert_eq!(repeat_n(0, subdivide(1)).apply(&mesh).unwrap(), mesh);
    }

    #[test]
    fn test_errors_propagate() {
        let failing = op_fn("boom", |_: &HalfEdgeMesh| Err(MeshError::operator_failed("boom", "no")));
        let pipeline = sequence(vec![subdivide(1), failing, smooth(1, 0.5)]);
        assert!(matches!(
            pipeline.apply(&base_mesh()),
            Err(MeshError::OperatorFailed { .. })
        ));
    }

    #[test]
    fn test_names() {
        assert_eq!(subdivide(2).name(), "subdivide(2)");
        assert_eq!(smooth(3, 0.5).name(), "smooth(3, 0.5)");
        assert_eq!(taubin(2, 0.5, -0.53).name(), "taubin(2, 0.5, -0.53)");
        assert_eq!(displace_normal(0.02).name(), "displaceNormal(0.02)");
        assert_eq!(displace_by_noise(0.04, 12.0).name(), "displaceByNoise(0.04, 12)");
        assert_eq!(displace_by_field(vec![1.0], 2.0).name(), "displaceByField(2)");
        assert_eq!(displace_by_function(|_, _, _| 0.0).name(), "displaceByFunction");
        assert_eq!(repeat_n(3, smooth(1, 0.5)).name(), "repeat(3, smooth(1, 0.5))");
        assert_eq!(smooth(1, 1.3).name(), "smooth(1, 1.3)");
        assert_eq!(smooth(1, -0.2).name(), "smooth(1, -0.2)");

        let nested = sequence(vec![subdivide(1), sequence(vec![smooth(2, 0.5), displace_normal(0.1)])]);
        assert_eq!(
            nested.names(),
            ["subdivide(1)", "smooth(2, 0.5)", "displaceNormal(0.1)"]
        );
        assert_eq!(
            nested.name(),
            "sequence(subdivide(1), sequence(smooth(2, 0.5), displaceNormal(0.1)))"
        );
    }

    #[test]
    fn test_smooth_factor_passes_through() {
        // The middle ring has interior vertices that pinned smoothing can move.
        let mesh = build_from_profile(&[[1.0, 0.0], [0.6, 0.5], [0.3, 1.0]], 8).unwrap();
        let relaxed = smooth(1, 0.5).apply(&mesh).unwrap();
        let pushed = smooth(1, -0.2).apply(&mesh).unwrap();

        assert_ne!(relaxed, mesh);
        assert_ne!(pushed, mesh);
        assert_ne!(pushed, relaxed);
    }

    #[test]
    fn test_operators_do_not_mutate_input() {
        let mesh = base_mesh();
        let before = mesh.clone();
        let pipeline = sequence(vec![
            subdivide(1),
            smooth(2, 0.5),
            taubin(1, 0.5, -0.53),
            displace_by_noise(0.02, 6.0),
            displace_normal(0.01),
        ]);
        let _ = pipeline.apply(&mesh).unwrap();
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_ensure_finite() {
        let mut mesh = base_mesh();
        assert!(ensure_finite(&mesh).is_ok());

        mesh.set_position(VertexId::new(3), Point3::new(0.0, f64::NAN, 0.0));
        assert!(matches!(
            ensure_finite(&mesh),
            Err(MeshError::NonFinitePosition { vertex: 3 })
        ));
    }
}
