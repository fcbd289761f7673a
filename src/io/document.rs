//! Versioned mesh documents.
//!
//! A [`MeshDocument`] carries flat render buffers, element counts, and
//! optionally the full half-edge topology and generation metadata. It
//! serializes to JSON with camelCase field names.
//!
//! Reading is forgiving by contract: every `deserialize_*` function accepts
//! an arbitrary [`serde_json::Value`] and returns `None` for anything it
//! cannot use, so callers can move on to their next fallback.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::mesh::{
    build_from_indexed, to_flat_arrays, Face, FaceId, FlatMeshData, HalfEdge, HalfEdgeId,
    HalfEdgeMesh, Vertex, VertexId,
};

/// Current document version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Layout tag of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    /// Flat buffers only.
    Indexed,
    /// Flat buffers plus half-edge topology.
    Halfedge,
}

/// Half-edge connectivity as stored in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    /// Every half-edge, in mesh order.
    pub halfedges: Vec<HalfEdge>,
    /// Outgoing half-edge per vertex, `-1` for isolated vertices.
    pub vertex_halfedges: Vec<HalfEdgeId>,
    /// One half-edge per face.
    pub face_halfedges: Vec<HalfEdgeId>,
}

/// Generation metadata. Passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshMeta {
    /// Category label the pipeline was chosen for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Operator names in application order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipeline: Vec<String>,

    /// Caller-supplied timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    /// Hash of the parametric input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,

    /// Any other fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A serialized mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDocument {
    /// Document version, currently [`DOCUMENT_VERSION`].
    pub version: u32,
    /// Layout tag.
    pub format: MeshFormat,
    /// Vertex positions as `x, y, z` triples.
    pub positions: Vec<f32>,
    /// Vertex normals as `x, y, z` triples.
    pub normals: Vec<f32>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of faces.
    pub face_count: usize,
    /// Half-edge topology, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<Topology>,
    /// Generation metadata, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MeshMeta>,
}

impl MeshDocument {
    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Options for [`serialize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializeOptions {
    /// Include the half-edge topology block.
    pub include_topology: bool,
    /// Explicit format tag; derived from `include_topology` when unset.
    pub format: Option<MeshFormat>,
    /// Metadata to attach.
    pub meta: Option<MeshMeta>,
}

impl SerializeOptions {
    /// Set whether to include topology.
    pub fn with_topology(mut self, include: bool) -> Self {
        self.include_topology = include;
        self
    }

    /// Force a format tag.
    pub fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Attach metadata.
    pub fn with_meta(mut self, meta: MeshMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Serialize a mesh into a document.
pub fn serialize(mesh: &HalfEdgeMesh, options: &SerializeOptions) -> MeshDocument {
    let flat = to_flat_arrays(mesh);
    let format = options.format.unwrap_or(if options.include_topology {
        MeshFormat::Halfedge
    } else {
        MeshFormat::Indexed
    });

    let topology = options.include_topology.then(|| Topology {
        halfedges: mesh.halfedges.clone(),
        vertex_halfedges: mesh.vertices.iter().map(|v| v.halfedge).collect(),
        face_halfedges: mesh.faces.iter().map(|f| f.halfedge).collect(),
    });

    MeshDocument {
        version: DOCUMENT_VERSION,
        format,
        positions: flat.positions,
        normals: flat.normals,
        indices: flat.indices,
        vertex_count: mesh.num_vertices(),
        face_count: mesh.num_faces(),
        topology,
        meta: options.meta.clone(),
    }
}

/// The buffers every reader needs. Topology is read separately so a stale
/// or corrupt topology block never blocks the flat path.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    version: u32,
    #[serde(default)]
    positions: Vec<f32>,
    #[serde(default)]
    normals: Vec<f32>,
    #[serde(default)]
    indices: Vec<u32>,
}

impl RawDocument {
    fn parse(value: &Value) -> Option<Self> {
        let raw = RawDocument::deserialize(value).ok()?;
        let usable = raw.version == DOCUMENT_VERSION
            && !raw.positions.is_empty()
            && !raw.indices.is_empty()
            && raw.positions.len() % 3 == 0
            && raw.indices.len() % 3 == 0
            && raw.positions.iter().all(|c| c.is_finite());
        usable.then_some(raw)
    }

    fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn indices_in_range(&self) -> bool {
        let n = self.vertex_count();
        self.indices.iter().all(|&i| (i as usize) < n)
    }
}

/// Read a document straight into render buffers.
///
/// Requires version 1, non-empty whole-triple buffers, one normal per
/// position, and in-range indices.
pub fn deserialize_to_flat(value: &Value) -> Option<FlatMeshData> {
    let raw = RawDocument::parse(value)?;
    if raw.normals.len() != raw.positions.len() || !raw.indices_in_range() {
        return None;
    }

    Some(FlatMeshData {
        positions: raw.positions,
        normals: raw.normals,
        indices: raw.indices,
    })
}

/// Read a document into a half-edge mesh.
///
/// Uses the topology block directly when it is present and consistent with
/// the buffers. Otherwise adjacency is rebuilt from the index buffer.
pub fn deserialize_to_halfedge(value: &Value) -> Option<HalfEdgeMesh> {
    let raw = RawDocument::parse(value)?;
    if !raw.indices_in_range() {
        return None;
    }

    value
        .get("topology")
        .filter(|t| !t.is_null())
        .and_then(|t| Topology::deserialize(t).ok())
        .and_then(|topology| mesh_from_topology(&raw, topology))
        .or_else(|| build_from_indexed(&raw.positions, &raw.indices).ok())
}

/// Try the flat reader, then the half-edge reader followed by flattening.
///
/// `None` means neither could use the document.
pub fn deserialize_with_fallback(value: &Value) -> Option<FlatMeshData> {
    deserialize_to_flat(value).or_else(|| deserialize_to_halfedge(value).map(|m| to_flat_arrays(&m)))
}

fn mesh_from_topology(raw: &RawDocument, topology: Topology) -> Option<HalfEdgeMesh> {
    let nv = raw.vertex_count();
    let nh = topology.halfedges.len();
    let nf = topology.face_halfedges.len();

    let he_ok = |he: HalfEdgeId| he.is_valid() && he.index() < nh;
    let he_or_none = |he: HalfEdgeId| !he.is_valid() || he.index() < nh;
    let vertex_ok = |v: VertexId| v.is_valid() && v.index() < nv;
    let face_or_none = |f: FaceId| !f.is_valid() || f.index() < nf;

    let consistent = topology.vertex_halfedges.len() == nv
        && nf == raw.face_count()
        && nh == 3 * nf
        && topology.halfedges.iter().all(|he| {
            vertex_ok(he.vertex)
                && face_or_none(he.face)
                && he_ok(he.next)
                && he_ok(he.prev)
                && he_or_none(he.twin)
        })
        && topology.vertex_halfedges.iter().all(|&he| he_or_none(he))
        && topology.face_halfedges.iter().all(|&he| he_ok(he));
    if !consistent {
        return None;
    }

    let vertices = raw
        .positions
        .chunks_exact(3)
        .zip(&topology.vertex_halfedges)
        .map(|(p, &halfedge)| Vertex {
            position: [p[0] as f64, p[1] as f64, p[2] as f64].into(),
            halfedge,
        })
        .collect();
    let faces = topology.face_halfedges.into_iter().map(Face::new).collect();

    Some(HalfEdgeMesh::from_parts(vertices, topology.halfedges, faces))
}
