//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for triangle meshes.
//!
//! # Structure
//!
//! - Each face owns three **half-edges** forming a closed `next`/`prev` loop
//! - Each half-edge stores the vertex it points **to**, its face, `next`, `prev`,
//!   and its **twin** (the same undirected edge traversed the other way)
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! No half-edges are created outside the faces. A half-edge whose twin is
//! none lies on the boundary. Walks around a boundary vertex therefore stop
//! part-way and are resumed in the opposite direction.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::index::{FaceId, HalfEdgeId, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge, or none for an isolated vertex.
    pub halfedge: HalfEdgeId,
}

impl Vertex {
    /// Create a new isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A directed half-edge.
///
/// Serializes as `{vertex, face, next, prev, twin}` with `-1` for none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfEdge {
    /// The vertex this half-edge points to.
    pub vertex: VertexId,

    /// The face to the left, or none.
    pub face: FaceId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The opposite half-edge, or none on a boundary edge.
    pub twin: HalfEdgeId,
}

impl HalfEdge {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            vertex: VertexId::invalid(),
            face: FaceId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
        }
    }

    /// Check if this half-edge lies on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.twin.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangular face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

impl Face {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId) -> Self {
        Self { halfedge }
    }
}

/// Element counts of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshStats {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of faces.
    pub faces: usize,
    /// Number of undirected edges.
    pub edges: usize,
    /// Number of edges with only one half-edge.
    pub boundary_edges: usize,
}

/// A half-edge mesh data structure for triangle meshes.
///
/// Meshes are values: operators read one mesh and return a new one. Indices
/// are stable within a mesh but are renumbered freely by operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_faces * 3),
            faces: Vec::with_capacity(num_faces),
        }
    }

    /// Assemble a mesh from raw element arrays without recomputing adjacency.
    ///
    /// The caller is responsible for the arrays being mutually consistent.
    pub fn from_parts(vertices: Vec<Vertex>, halfedges: Vec<HalfEdge>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            halfedges,
            faces,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertices[v.index()].position = pos;
    }

    /// Return a copy of this mesh with every vertex moved to `positions`.
    ///
    /// Topology is shared verbatim; `positions` must have one entry per vertex.
    pub fn with_positions(&self, positions: Vec<Point3<f64>>) -> HalfEdgeMesh {
        debug_assert_eq!(positions.len(), self.vertices.len());
        let vertices = self
            .vertices
            .iter()
            .zip(positions)
            .map(|(v, position)| Vertex {
                position,
                halfedge: v.halfedge,
            })
            .collect();

        HalfEdgeMesh {
            vertices,
            halfedges: self.halfedges.clone(),
            faces: self.faces.clone(),
        }
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn target(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).vertex
    }

    /// Get the vertex a half-edge originates from.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.target(self.prev(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary vertices.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true;
        }

        let mut he = start;
        for _ in 0..=self.halfedges.len() {
            let twin = self.twin(he);
            if !twin.is_valid() {
                return true;
            }
            he = self.next(twin);
            if he == start {
                return false;
            }
        }
        false
    }

    /// Compute the valence (number of distinct neighbors) of a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_neighbors(v).count()
    }

    /// Count vertices, faces, undirected edges, and boundary edges.
    pub fn stats(&self) -> MeshStats {
        let mut edges = 0;
        let mut boundary_edges = 0;
        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.twin.is_valid() {
                edges += 1;
                boundary_edges += 1;
            } else if he.twin.index() > i {
                edges += 1;
            }
        }

        MeshStats {
            vertices: self.vertices.len(),
            faces: self.faces.len(),
            edges,
            boundary_edges,
        }
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all vertex positions in index order.
    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.vertices.iter().map(|v| &v.position)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over the outgoing half-edges of a vertex.
    ///
    /// Walks `twin -> next` first. If that walk runs into a boundary it resumes
    /// from the start in the other direction (`prev -> twin`), so boundary
    /// vertices still see their whole fan.
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over the distinct vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId) -> VertexNeighborIter<'_> {
        VertexNeighborIter {
            ring: self.vertex_halfedges(v),
            seen: Vec::new(),
            closed: false,
        }
    }

    /// Iterate over the distinct faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        let mut seen: Vec<FaceId> = Vec::new();
        self.vertex_halfedges(v).filter_map(move |he| {
            let f = self.face_of(he);
            if f.is_valid() && !seen.contains(&f) {
                seen.push(f);
                Some(f)
            } else {
                None
            }
        })
    }

    /// Get the three half-edges of a face in loop order.
    pub fn face_halfedges(&self, f: FaceId) -> [HalfEdgeId; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [he0, he1, he2]
    }

    /// Get the three vertices of a triangular face in loop order.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let [he0, he1, _] = self.face_halfedges(f);
        [self.origin(he0), self.target(he0), self.target(he1)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Cross product of a face's two edge vectors (twice the area, not normalized).
    pub fn face_cross(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Compute the unit normal of a face.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        self.face_cross(f).normalize()
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        0.5 * self.face_cross(f).norm()
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Validation ====================

    /// Check that connectivity is internally consistent.
    ///
    /// Verifies twin symmetry, twin endpoint agreement, `next`/`prev`
    /// agreement, three-step face loop closure, and outgoing vertex pointers.
    pub fn is_valid(&self) -> bool {
        let nh = self.halfedges.len();
        let in_range = |he: HalfEdgeId| he.is_valid() && he.index() < nh;

        for he in &self.halfedges {
            if !he.vertex.is_valid() || he.vertex.index() >= self.vertices.len() {
                return false;
            }
            if !in_range(he.next) || !in_range(he.prev) {
                return false;
            }
            if he.twin.is_valid() && he.twin.index() >= nh {
                return false;
            }
        }

        for (id, he) in self.halfedges() {
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return false;
            }
            if he.twin.is_valid() {
                if self.twin(he.twin) != id {
                    return false;
                }
                if he.vertex != self.origin(he.twin) {
                    return false;
                }
            }
        }

        for (fid, f) in self.faces() {
            if !in_range(f.halfedge) || self.face_of(f.halfedge) != fid {
                return false;
            }
            let [_, _, he2] = self.face_halfedges(fid);
            if self.next(he2) != f.halfedge {
                return false;
            }
        }

        for (vid, v) in self.vertices() {
            if v.halfedge.is_valid() && (!in_range(v.halfedge) || self.origin(v.halfedge) != vid) {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Forward,
    Backward,
    Done,
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    walk: Walk,
    dangling: HalfEdgeId,
    budget: usize,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            walk: if start.is_valid() { Walk::Forward } else { Walk::Done },
            dangling: HalfEdgeId::invalid(),
            // Guards against malformed loops that never return to `start`.
            budget: mesh.num_halfedges() + 1,
        }
    }

    /// The incoming boundary half-edge that closes an open fan.
    ///
    /// Only known once the iterator is exhausted; none for interior vertices.
    pub fn dangling(&self) -> Option<HalfEdgeId> {
        self.dangling.is_valid().then_some(self.dangling)
    }
}

impl<'a> Iterator for VertexHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.budget == 0 {
            self.walk = Walk::Done;
        }
        self.budget = self.budget.saturating_sub(1);

        match self.walk {
            Walk::Done => None,
            Walk::Forward => {
                let result = self.current;
                let twin = self.mesh.twin(result);
                if !twin.is_valid() {
                    self.walk = Walk::Backward;
                    self.current = self.start;
                } else {
                    // twin(he) points back at v, so next(twin(he)) leaves v again.
                    let following = self.mesh.next(twin);
                    if following == self.start {
                        self.walk = Walk::Done;
                    } else {
                        self.current = following;
                    }
                }
                Some(result)
            }
            Walk::Backward => {
                let incoming = self.mesh.prev(self.current);
                let twin = self.mesh.twin(incoming);
                if !twin.is_valid() {
                    self.dangling = incoming;
                    self.walk = Walk::Done;
                    return None;
                }
                if twin == self.start {
                    self.walk = Walk::Done;
                    return None;
                }
                self.current = twin;
                Some(twin)
            }
        }
    }
}

/// Iterator over the distinct neighbors of a vertex.
pub struct VertexNeighborIter<'a> {
    ring: VertexHalfEdgeIter<'a>,
    seen: Vec<VertexId>,
    closed: bool,
}

impl VertexNeighborIter<'_> {
    fn visit(&mut self, v: VertexId) -> bool {
        if self.seen.contains(&v) {
            false
        } else {
            self.seen.push(v);
            true
        }
    }
}

impl<'a> Iterator for VertexNeighborIter<'a> {
    type Item = VertexId;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.ring.mesh;
        while let Some(he) = self.ring.next() {
            let target = mesh.target(he);
            if self.visit(target) {
                return Some(target);
            }
        }

        if !self.closed {
            self.closed = true;
            if let Some(incoming) = self.ring.dangling() {
                let source = mesh.origin(incoming);
                if self.visit(source) {
                    return Some(source);
                }
            }
        }
        None
    }
}
