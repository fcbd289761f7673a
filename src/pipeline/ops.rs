//! Operator types behind the pipeline constructors.

use std::fmt;
use std::sync::Arc;

use super::{MeshOp, SharedOp};
use crate::algo::displace;
use crate::algo::smooth::{laplacian_smooth, taubin_smooth, SmoothOptions, TaubinOptions};
use crate::algo::subdivide::{loop_subdivide, SubdivideOptions};
use crate::error::Result;
use crate::mesh::HalfEdgeMesh;

/// Loop subdivision.
#[derive(Debug, Clone, Copy)]
pub struct Subdivide(pub SubdivideOptions);

impl MeshOp for Subdivide {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        loop_subdivide(mesh, &self.0)
    }

    fn name(&self) -> String {
        format!("subdivide({})", self.0.iterations)
    }
}

/// Laplacian smoothing.
#[derive(Debug, Clone, Copy)]
pub struct Smooth(pub SmoothOptions);

impl MeshOp for Smooth {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        Ok(laplacian_smooth(mesh, &self.0))
    }

    fn name(&self) -> String {
        format!("smooth({}, {})", self.0.iterations, self.0.factor)
    }
}

/// Taubin λ|μ smoothing.
#[derive(Debug, Clone, Copy)]
pub struct Taubin(pub TaubinOptions);

impl MeshOp for Taubin {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        Ok(taubin_smooth(mesh, &self.0))
    }

    fn name(&self) -> String {
        format!(
            "taubin({}, {}, {})",
            self.0.iterations, self.0.lambda, self.0.mu
        )
    }
}

/// Constant normal displacement.
#[derive(Debug, Clone, Copy)]
pub struct DisplaceNormal {
    /// Signed distance; positive is outward.
    pub amount: f64,
}

impl MeshOp for DisplaceNormal {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        Ok(displace::displace_normal(mesh, self.amount))
    }

    fn name(&self) -> String {
        format!("displaceNormal({})", self.amount)
    }
}

/// Displacement by a function of position.
#[derive(Clone)]
pub struct DisplaceByFunction {
    f: Arc<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>,
}

impl DisplaceByFunction {
    /// Wrap a magnitude function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }
}

impl fmt::Debug for DisplaceByFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaceByFunction").finish_non_exhaustive()
    }
}

impl MeshOp for DisplaceByFunction {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        Ok(displace::displace_by_function(mesh, |x, y, z| (self.f)(x, y, z)))
    }

    fn name(&self) -> String {
        "displaceByFunction".to_string()
    }
}

/// Displacement by a per-vertex scalar field.
#[derive(Debug, Clone)]
pub struct DisplaceByField {
    /// One magnitude per vertex, in vertex order.
    pub field: Vec<f64>,
    /// Multiplier applied to every field value.
    pub scale: f64,
}

impl MeshOp for DisplaceByField {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        Ok(displace::displace_by_field(mesh, &self.field, self.scale))
    }

    fn name(&self) -> String {
        format!("displaceByField({})", self.scale)
    }
}

/// Displacement by lattice value noise.
#[derive(Debug, Clone, Copy)]
pub struct DisplaceByNoise {
    /// Peak displacement.
    pub amplitude: f64,
    /// Spatial frequency applied to positions before sampling.
    pub frequency: f64,
}

impl MeshOp for DisplaceByNoise {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        Ok(displace::displace_by_noise(mesh, self.amplitude, self.frequency))
    }

    fn name(&self) -> String {
        format!("displaceByNoise({}, {})", self.amplitude, self.frequency)
    }
}

/// Left-to-right composition.
#[derive(Clone)]
pub struct Sequence(pub Vec<SharedOp>);

impl MeshOp for Sequence {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        let mut current = mesh.clone();
        for op in &self.0 {
            current = op.apply(&current)?;
        }
        Ok(current)
    }

    fn name(&self) -> String {
        let inner: Vec<String> = self.0.iter().map(|op| op.name()).collect();
        format!("sequence({})", inner.join(", "))
    }

    fn names(&self) -> Vec<String> {
        self.0.iter().flat_map(|op| op.names()).collect()
    }
}

/// Apply an operator only when a predicate holds.
#[derive(Clone)]
pub struct Conditional {
    predicate: Arc<dyn Fn(&HalfEdgeMesh) -> bool + Send + Sync>,
    op: SharedOp,
}

impl Conditional {
    /// Guard `op` with `predicate`.
    pub fn new<P>(predicate: P, op: SharedOp) -> Self
    where
        P: Fn(&HalfEdgeMesh) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            op,
        }
    }
}

impl MeshOp for Conditional {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        if (self.predicate)(mesh) {
            self.op.apply(mesh)
        } else {
            Ok(mesh.clone())
        }
    }

    fn name(&self) -> String {
        format!("when({})", self.op.name())
    }
}

/// Apply an operator a fixed number of times.
#[derive(Clone)]
pub struct Repeat {
    /// Number of applications.
    pub n: usize,
    /// The repeated operator.
    pub op: SharedOp,
}

impl MeshOp for Repeat {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        let mut current = mesh.clone();
        for _ in 0..self.n {
            current = self.op.apply(&current)?;
        }
        Ok(current)
    }

    fn name(&self) -> String {
        format!("repeat({}, {})", self.n, self.op.name())
    }
}

/// A named closure operator.
#[derive(Clone)]
pub struct FnOp {
    name: String,
    f: Arc<dyn Fn(&HalfEdgeMesh) -> Result<HalfEdgeMesh> + Send + Sync>,
}

impl FnOp {
    /// Wrap `f` under `name`.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&HalfEdgeMesh) -> Result<HalfEdgeMesh> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl MeshOp for FnOp {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        (self.f)(mesh)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
