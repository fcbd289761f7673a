//! Mesh persistence.
//!
//! Meshes are exchanged as in-memory [`MeshDocument`] values. Reading and
//! writing files is left to the caller.

pub mod document;

pub use document::{
    deserialize_to_flat, deserialize_to_halfedge, deserialize_with_fallback, serialize,
    MeshDocument, MeshFormat, MeshMeta, SerializeOptions, Topology, DOCUMENT_VERSION,
};
