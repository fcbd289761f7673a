//! Batch mesh asset generation.
//!
//! Each [`MeshAssetRequest`] names a category, a primary profile, and an
//! optional secondary cylinder. The primary surface goes through the
//! category's pipeline and the secondary through the table's secondary
//! pipeline. Both are serialized to [`MeshDocument`]s with metadata and a
//! manifest entry. Requests are independent and run in parallel; a failing
//! request never affects the others.
//!
//! Nothing here touches the file system. Callers write `documents` wherever
//! they like and use the manifest keys to name them.

use std::collections::BTreeMap;
use std::hash::Hasher;
use std::time::{Duration, Instant};

use fnv::FnvHasher;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adapters::{enrich_to_halfedge, CylinderDescription, MeshTier, ProfileDescription, SurfaceDescription};
use crate::error::Result;
use crate::io::{serialize, MeshDocument, MeshFormat, MeshMeta, SerializeOptions};
use crate::pipeline::{PipelineTable, SharedOp};

/// One item to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshAssetRequest {
    /// Unique identifier; manifest keys are `{id}-primary` and `{id}-secondary`.
    pub id: String,
    /// Category label used to pick the primary pipeline.
    pub category: String,
    /// The main surface.
    pub primary: ProfileDescription,
    /// An optional supporting cylinder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<CylinderDescription>,
}

/// Batch options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Include half-edge topology in every document.
    pub include_topology: bool,
    /// Timestamp recorded as `meta.generatedAt`.
    pub generated_at: Option<String>,
    /// Process requests with rayon.
    pub parallel: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_topology: false,
            generated_at: None,
            parallel: true,
        }
    }
}

impl GenerateOptions {
    /// Set whether documents carry topology.
    pub fn with_topology(mut self, include: bool) -> Self {
        self.include_topology = include;
        self
    }

    /// Set the recorded timestamp.
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = Some(generated_at.into());
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Summary of one generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Document key, also the map key.
    pub key: String,
    /// FNV-1a hash of the document JSON, 16 hex digits.
    pub hash: String,
    /// Document format tag.
    pub format: MeshFormat,
    /// Vertex count.
    pub vertices: usize,
    /// Face count.
    pub faces: usize,
    /// Document JSON length in bytes.
    pub size: usize,
    /// Whether the pipeline output or the base mesh was stored.
    pub tier: MeshTier,
    /// Category of the originating request.
    pub category: String,
}

/// Aggregate counts for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Requests submitted.
    pub total: usize,
    /// Requests that produced all their documents.
    pub succeeded: usize,
    /// Requests that produced nothing.
    pub failed: usize,
    /// Vertices across all documents.
    pub vertices: usize,
    /// Faces across all documents.
    pub faces: usize,
    /// Wall-clock time for the batch.
    pub duration: Duration,
}

/// Everything a batch produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeneration {
    /// Documents by key.
    pub documents: BTreeMap<String, MeshDocument>,
    /// Manifest entries by key.
    pub manifest: BTreeMap<String, ManifestEntry>,
    /// Aggregate counts.
    pub stats: GenerationStats,
}

/// FNV-1a hash of a value's JSON encoding as 16 hex digits.
pub fn source_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value)?;
    Ok(fnv_hex(&bytes))
}

fn fnv_hex(bytes: &[u8]) -> String {
    let mut hasher = FnvHasher::default();
    hasher.write(bytes);
    format!("{:016x}", hasher.finish())
}

/// Generate documents for every request.
pub fn generate_mesh_assets(
    requests: &[MeshAssetRequest],
    table: &PipelineTable,
    options: &GenerateOptions,
) -> MeshGeneration {
    let start = Instant::now();

    let results: Vec<Result<Vec<(MeshDocument, ManifestEntry)>>> = if options.parallel {
        requests
            .par_iter()
            .map(|r| generate_request(r, table, options))
            .collect()
    } else {
        requests
            .iter()
            .map(|r| generate_request(r, table, options))
            .collect()
    };

    let mut out = MeshGeneration::default();
    out.stats.total = requests.len();

    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(items) => {
                out.stats.succeeded += 1;
                for (doc, entry) in items {
                    out.stats.vertices += entry.vertices;
                    out.stats.faces += entry.faces;
                    out.documents.insert(entry.key.clone(), doc);
                    out.manifest.insert(entry.key.clone(), entry);
                }
            }
            Err(err) => {
                out.stats.failed += 1;
                warn!(id = %request.id, error = %err, "mesh asset generation failed");
            }
        }
    }

    out.stats.duration = start.elapsed();
    info!(
        total = out.stats.total,
        succeeded = out.stats.succeeded,
        failed = out.stats.failed,
        vertices = out.stats.vertices,
        faces = out.stats.faces,
        duration_ms = out.stats.duration.as_millis() as u64,
        "mesh asset generation complete"
    );

    out
}

fn generate_request(
    request: &MeshAssetRequest,
    table: &PipelineTable,
    options: &GenerateOptions,
) -> Result<Vec<(MeshDocument, ManifestEntry)>> {
    let mut items = Vec::with_capacity(2);

    let primary = SurfaceDescription::Profile(request.primary.clone());
    items.push(generate_one(
        format!("{}-primary", request.id),
        &primary,
        table.get(&request.category),
        request,
        options,
    )?);

    if let Some(secondary) = &request.secondary {
        let secondary = SurfaceDescription::Cylinder(secondary.clone());
        items.push(generate_one(
            format!("{}-secondary", request.id),
            &secondary,
            table.secondary(),
            request,
            options,
        )?);
    }

    Ok(items)
}

fn generate_one(
    key: String,
    surface: &SurfaceDescription,
    pipeline: SharedOp,
    request: &MeshAssetRequest,
    options: &GenerateOptions,
) -> Result<(MeshDocument, ManifestEntry)> {
    let (mesh, tier) = enrich_to_halfedge(surface, pipeline.as_ref())?;

    let meta = MeshMeta {
        category: Some(request.category.clone()),
        pipeline: match tier {
            MeshTier::Enriched => pipeline.names(),
            MeshTier::Base => Vec::new(),
        },
        generated_at: options.generated_at.clone(),
        source_hash: Some(source_hash(surface)?),
        ..MeshMeta::default()
    };

    let serialize_options = SerializeOptions::default()
        .with_topology(options.include_topology)
        .with_meta(meta);
    let doc = serialize(&mesh, &serialize_options);
    let json = doc.to_json()?;

    let entry = ManifestEntry {
        hash: fnv_hex(json.as_bytes()),
        format: doc.format,
        vertices: doc.vertex_count,
        faces: doc.face_count,
        size: json.len(),
        tier,
        category: request.category.clone(),
        key,
    };

    Ok((doc, entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::io::deserialize_with_fallback;
    use crate::mesh::HalfEdgeMesh;
    use crate::pipeline::op_fn;

    fn request(id: &str, category: &str) -> MeshAssetRequest {
        MeshAssetRequest {
            id: id.to_string(),
            category: category.to_string(),
            primary: ProfileDescription {
                points: vec![[0.0, 1.0], [0.3, 0.8], [0.5, 0.3], [0.2, 0.0]],
                segments: 8,
            },
            secondary: Some(CylinderDescription::new(0.1, 0.12, 0.6, 6)),
        }
    }

    #[test]
    fn test_batch_produces_documents_and_manifest() {
        let requests = vec![request("a", "Amanita"), request("b", "Morchella")];
        let out = generate_mesh_assets(&requests, &PipelineTable::standard(), &GenerateOptions::default());

        assert_eq!(out.stats.total, 2);
        assert_eq!(out.stats.succeeded, 2);
        assert_eq!(out.stats.failed, 0);
        assert_eq!(
            out.manifest.keys().collect::<Vec<_>>(),
            ["a-primary", "a-secondary", "b-primary", "b-secondary"]
        );

        let entry = &out.manifest["a-primary"];
        assert_eq!(entry.tier, MeshTier::Enriched);
        assert_eq!(entry.format, MeshFormat::Indexed);
        assert_eq!(entry.faces, 48 * 4);
        assert_eq!(entry.category, "Amanita");
        assert_eq!(entry.hash.len(), 16);

        let total_faces: usize = out.manifest.values().map(|e| e.faces).sum();
        assert_eq!(out.stats.faces, total_faces);
    }

    #[test]
    fn test_document_meta() {
        let options = GenerateOptions::default().with_generated_at("2024-05-01T12:00:00Z");
        let out = generate_mesh_assets(&[request("a", "Hericium")], &PipelineTable::standard(), &options);

        let meta = out.documents["a-primary"].meta.clone().unwrap();
        assert_eq!(meta.category.as_deref(), Some("Hericium"));
        assert_eq!(meta.pipeline, ["subdivide(1)"]);
        assert_eq!(meta.generated_at.as_deref(), Some("2024-05-01T12:00:00Z"));
        assert_eq!(
            meta.source_hash,
            Some(source_hash(&SurfaceDescription::Profile(request("a", "Hericium").primary)).unwrap())
        );

        let stem_meta = out.documents["a-secondary"].meta.clone().unwrap();
        assert_eq!(stem_meta.pipeline, ["subdivide(1)", "smooth(1, 0.5)"]);
    }

    #[test]
    fn test_manifest_matches_documents() {
        let out = generate_mesh_assets(&[request("a", "Tuber")], &PipelineTable::standard(), &GenerateOptions::default());

        for (key, entry) in &out.manifest {
            let json = out.documents[key].to_json().unwrap();
            assert_eq!(entry.size, json.len());
            assert_eq!(entry.hash, fnv_hex(json.as_bytes()));

            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            let flat = deserialize_with_fallback(&value).unwrap();
            assert_eq!(flat.face_count(), entry.faces);
        }
    }

    #[test]
    fn test_failed_pipeline_records_base_tier() {
        let mut table = PipelineTable::standard();
        table.insert(
            "Broken",
            op_fn("broken", |_: &HalfEdgeMesh| Err(MeshError::operator_failed("broken", "always"))),
        );

        let out = generate_mesh_assets(&[request("x", "Broken")], &table, &GenerateOptions::default());
        let entry = &out.manifest["x-primary"];
        assert_eq!(entry.tier, MeshTier::Base);
        assert_eq!(entry.faces, 48);
        assert!(out.documents["x-primary"].meta.as_ref().unwrap().pipeline.is_empty());
        assert_eq!(out.manifest["x-secondary"].tier, MeshTier::Enriched);
    }

    #[test]
    fn test_unbuildable_request_fails_alone() {
        let mut bad = request("bad", "Amanita");
        bad.primary.segments = 0;
        let requests = vec![bad, request("good", "Amanita")];

        let out = generate_mesh_assets(&requests, &PipelineTable::standard(), &GenerateOptions::default());
        assert_eq!(out.stats.failed, 1);
        assert_eq!(out.stats.succeeded, 1);
        assert!(out.manifest.contains_key("good-primary"));
        assert!(!out.manifest.keys().any(|k| k.starts_with("bad")));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let requests: Vec<MeshAssetRequest> = ["Amanita", "Xylaria", "Trametes", "Unknown"]
            .iter()
            .enumerate()
            .map(|(i, c)| request(&format!("r{}", i), c))
            .collect();
        let table = PipelineTable::standard();

        let parallel = generate_mesh_assets(&requests, &table, &GenerateOptions::default());
        let sequential = generate_mesh_assets(&requests, &table, &GenerateOptions::default().with_parallel(false));

        assert_eq!(parallel.documents, sequential.documents);
        assert_eq!(parallel.manifest, sequential.manifest);
    }

    #[test]
    fn test_source_hash_is_stable() {
        let a = source_hash(&request("a", "Amanita").primary).unwrap();
        let b = source_hash(&request("b", "Boletus").primary).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, source_hash(&CylinderDescription::new(1.0, 1.0, 1.0, 8)).unwrap());

        // FNV-1a 64 offset basis for empty input.
        assert_eq!(fnv_hex(b""), "cbf29ce484222325");
    }
}
