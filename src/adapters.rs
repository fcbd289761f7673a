//! Parametric descriptions in, render buffers out.
//!
//! The adapters build a half-edge mesh from a profile or cylinder description,
//! run a pipeline over it, and flatten the result. If anything goes wrong on
//! the way (an operator error, a panic, or a non-finite position) they fall
//! back to the un-enriched base mesh built from the same description. They
//! never fail.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_cylinder, build_from_profile, to_flat_arrays, FlatMeshData, HalfEdgeMesh};
use crate::pipeline::{ensure_finite, MeshOp};

/// A profile curve revolved around the Y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDescription {
    /// `[radius, height]` pairs, bottom to top or top to bottom.
    pub points: Vec<[f64; 2]>,
    /// Number of angular steps around the axis.
    pub segments: usize,
}

fn one() -> usize {
    1
}

/// An open, possibly tapered cylinder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CylinderDescription {
    /// Radius at the top.
    pub radius_top: f64,
    /// Radius at the bottom.
    pub radius_bottom: f64,
    /// Height along Y.
    pub height: f64,
    /// Number of angular steps around the axis.
    pub radial_segments: usize,
    /// Number of rows along the height.
    #[serde(default = "one")]
    pub height_segments: usize,
}

impl CylinderDescription {
    /// A cylinder with a single row of quads.
    pub fn new(radius_top: f64, radius_bottom: f64, height: f64, radial_segments: usize) -> Self {
        Self {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
            height_segments: 1,
        }
    }

    /// Set the number of rows along the height.
    pub fn with_height_segments(mut self, height_segments: usize) -> Self {
        self.height_segments = height_segments;
        self
    }
}

/// Either kind of parametric surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SurfaceDescription {
    /// A revolved profile.
    Profile(ProfileDescription),
    /// A cylinder.
    Cylinder(CylinderDescription),
}

impl SurfaceDescription {
    /// Build the base half-edge mesh.
    pub fn to_halfedge(&self) -> Result<HalfEdgeMesh> {
        match self {
            SurfaceDescription::Profile(p) => profile_to_halfedge(p),
            SurfaceDescription::Cylinder(c) => cylinder_to_halfedge(c),
        }
    }
}

impl From<ProfileDescription> for SurfaceDescription {
    fn from(p: ProfileDescription) -> Self {
        SurfaceDescription::Profile(p)
    }
}

impl From<CylinderDescription> for SurfaceDescription {
    fn from(c: CylinderDescription) -> Self {
        SurfaceDescription::Cylinder(c)
    }
}

/// Which fallback tier produced a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshTier {
    /// The pipeline ran to completion.
    Enriched,
    /// The pipeline failed and the base mesh was used instead.
    Base,
}

/// Flat buffers plus the tier that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Enriched {
    /// Render buffers.
    pub flat: FlatMeshData,
    /// Whether the pipeline output or the base mesh is in `flat`.
    pub tier: MeshTier,
}

/// Revolve a profile description.
pub fn profile_to_halfedge(profile: &ProfileDescription) -> Result<HalfEdgeMesh> {
    build_from_profile(&profile.points, profile.segments)
}

/// Build a cylinder description.
pub fn cylinder_to_halfedge(cylinder: &CylinderDescription) -> Result<HalfEdgeMesh> {
    build_from_cylinder(
        cylinder.radius_top,
        cylinder.radius_bottom,
        cylinder.height,
        cylinder.radial_segments,
        cylinder.height_segments,
    )
}

/// Base-tier buffers for a profile. Empty if the profile cannot be built.
pub fn fallback_mesh_from_profile(profile: &ProfileDescription) -> FlatMeshData {
    base_flat(&profile.clone().into())
}

/// Base-tier buffers for a cylinder. Empty if the cylinder cannot be built.
pub fn fallback_mesh_from_cylinder(cylinder: &CylinderDescription) -> FlatMeshData {
    base_flat(&cylinder.clone().into())
}

/// Run `pipeline` on a profile, falling back to the base mesh on failure.
pub fn apply_pipeline_to_profile(profile: &ProfileDescription, pipeline: &dyn MeshOp) -> FlatMeshData {
    enrich(&profile.clone().into(), pipeline).flat
}

/// Run `pipeline` on a cylinder, falling back to the base mesh on failure.
pub fn apply_pipeline_to_cylinder(cylinder: &CylinderDescription, pipeline: &dyn MeshOp) -> FlatMeshData {
    enrich(&cylinder.clone().into(), pipeline).flat
}

/// Run `pipeline` on a surface and report which tier the result came from.
///
/// If even the base mesh cannot be built the result is empty base-tier data.
pub fn enrich(surface: &SurfaceDescription, pipeline: &dyn MeshOp) -> Enriched {
    match enrich_to_halfedge(surface, pipeline) {
        Ok((mesh, tier)) => Enriched {
            flat: to_flat_arrays(&mesh),
            tier,
        },
        Err(err) => {
            debug!(error = %err, "base mesh unavailable; returning empty buffers");
            Enriched {
                flat: FlatMeshData::default(),
                tier: MeshTier::Base,
            }
        }
    }
}

/// Like [`enrich`] but keeps the half-edge mesh.
///
/// Errors only when the base mesh itself cannot be built.
pub fn enrich_to_halfedge(
    surface: &SurfaceDescription,
    pipeline: &dyn MeshOp,
) -> Result<(HalfEdgeMesh, MeshTier)> {
    let base = surface.to_halfedge()?;

    match run_guarded(&base, pipeline) {
        Ok(mesh) => Ok((mesh, MeshTier::Enriched)),
        Err(err) => {
            debug!(
                pipeline = %pipeline.name(),
                error = %err,
                "pipeline failed; falling back to base mesh"
            );
            Ok((base, MeshTier::Base))
        }
    }
}

fn run_guarded(base: &HalfEdgeMesh, pipeline: &dyn MeshOp) -> Result<HalfEdgeMesh> {
    let mesh = panic::catch_unwind(AssertUnwindSafe(|| pipeline.apply(base)))
        .map_err(|payload| MeshError::operator_failed(pipeline.name(), panic_message(&*payload)))??;
    ensure_finite(&mesh)?;
    Ok(mesh)
}

fn base_flat(surface: &SurfaceDescription) -> FlatMeshData {
    surface
        .to_halfedge()
        .map(|mesh| to_flat_arrays(&mesh))
        .unwrap_or_default()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
