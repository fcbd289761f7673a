//! Named step runner with per-step diagnostics.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{MeshOp, SharedOp};
use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::HalfEdgeMesh;

/// What one step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Step name as given to [`MeshPipeline::add`].
    pub name: String,
    /// Vertex count after the step.
    pub vertices: usize,
    /// Face count after the step.
    pub faces: usize,
    /// Wall-clock time spent in the step.
    pub elapsed: Duration,
}

struct Step {
    name: String,
    op: SharedOp,
}

/// An ordered list of named operators.
///
/// ```
/// use lathe::mesh::build_from_profile;
/// use lathe::pipeline::{smooth, subdivide, MeshPipeline};
///
/// let pipeline = MeshPipeline::new()
///     .add("refine", subdivide(1))
///     .add("relax", smooth(2, 0.5));
///
/// let mesh = build_from_profile(&[[1.0, 0.0], [0.5, 1.0]], 4).unwrap();
/// let (result, reports) = pipeline.execute_with_report(&mesh).unwrap();
/// assert_eq!(result.num_faces(), 32);
/// assert_eq!(reports[0].name, "refine");
/// ```
#[derive(Default)]
pub struct MeshPipeline {
    steps: Vec<Step>,
    progress: Option<Progress>,
    verbose: bool,
}

impl MeshPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named step.
    pub fn add(mut self, name: impl Into<String>, op: SharedOp) -> Self {
        self.push(name, op);
        self
    }

    /// Append a named step in place.
    pub fn push(&mut self, name: impl Into<String>, op: SharedOp) {
        self.steps.push(Step {
            name: name.into(),
            op,
        });
    }

    /// Report `(step, total, name)` before each step and once at the end.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Log vertex and face counts plus timing after every step.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in order.
    pub fn names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name.clone()).collect()
    }

    /// Run every step in order.
    pub fn execute(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        self.run(mesh, |_| {})
    }

    /// Run every step in order and collect a report per step.
    pub fn execute_with_report(&self, mesh: &HalfEdgeMesh) -> Result<(HalfEdgeMesh, Vec<StepReport>)> {
        let mut reports = Vec::with_capacity(self.steps.len());
        let result = self.run(mesh, |report| reports.push(report))?;
        Ok((result, reports))
    }

    fn run(&self, mesh: &HalfEdgeMesh, mut on_step: impl FnMut(StepReport)) -> Result<HalfEdgeMesh> {
        let total = self.steps.len();
        let mut current = mesh.clone();

        for (i, step) in self.steps.iter().enumerate() {
            if let Some(progress) = &self.progress {
                progress.report(i, total, &step.name);
            }

            let start = Instant::now();
            current = step.op.apply(&current)?;
            let elapsed = start.elapsed();

            if self.verbose {
                debug!(
                    step = %step.name,
                    vertices = current.num_vertices(),
                    faces = current.num_faces(),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "mesh step complete"
                );
            }

            on_step(StepReport {
                name: step.name.clone(),
                vertices: current.num_vertices(),
                faces: current.num_faces(),
                elapsed,
            });
        }

        if let Some(progress) = &self.progress {
            progress.report(total, total, "done");
        }
        Ok(current)
    }
}

impl MeshOp for MeshPipeline {
    fn apply(&self, mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh> {
        self.execute(mesh)
    }

    fn name(&self) -> String {
        format!("pipeline({})", MeshPipeline::names(self).join(", "))
    }

    fn names(&self) -> Vec<String> {
        MeshPipeline::names(self)
    }
}

impl fmt::Debug for MeshPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshPipeline")
            .field("steps", &self.names())
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}
