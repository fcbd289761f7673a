//! Mesh subdivision.
//!
//! # Loop Subdivision
//!
//! Each iteration of Loop subdivision (Loop, 1987):
//!
//! 1. Moves every interior ("even") vertex toward its neighbors using Loop's
//!    vertex weights; boundary vertices stay where they are
//! 2. Inserts one ("odd") vertex per edge at the edge midpoint
//! 3. Splits each triangle into 4 smaller triangles
//!
//! Odd vertices use the plain midpoint rather than Loop's 3/8, 1/8 edge
//! stencil, so repeated passes converge to a flatter surface than textbook
//! Loop subdivision.
//!
//! # Example
//!
//! ```
//! use lathe::mesh::build_from_profile;
//! use lathe::algo::subdivide::{loop_subdivide, SubdivideOptions};
//!
//! let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
//! let refined = loop_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
//! assert_eq!(refined.num_faces(), 32);
//! ```
//!
//! # References
//!
//! - Loop, C. (1987). "Smooth Subdivision Surfaces Based on Triangles."
//!   Master's thesis, University of Utah.

mod loop_subdivision;

pub use loop_subdivision::{loop_subdivide, loop_subdivide_once, loop_subdivide_with_progress};

/// Options for subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivideOptions {
    /// Number of subdivision iterations.
    pub iterations: usize,
}

impl SubdivideOptions {
    /// Create options with the specified number of iterations.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}
