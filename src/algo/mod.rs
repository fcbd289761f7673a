//! Mesh processing algorithms.
//!
//! Every algorithm reads a mesh and returns a new one; inputs are never
//! modified.
//!
//! - **Subdivision**: Loop subdivision with midpoint edge vertices
//! - **Smoothing**: Laplacian and Taubin λ|μ smoothing
//! - **Displacement**: moving vertices along their normals by a constant,
//!   a function, a per-vertex field, or value noise

pub mod displace;
pub mod noise;
pub mod smooth;
pub mod subdivide;

mod progress;

pub use progress::Progress;
