use crate::{
    element::{Edge, Face, Halfedge, Handle, Vertex, EH, FH, HH, VH},
    error::Error,
    iterator,
    status::Status,
};
use std::collections::HashMap;

/// Scratch buffers reused across topological edits, to avoid allocating in
/// hot loops.
#[derive(Default)]
pub(crate) struct TopolCache {
    pub(crate) halfedges: Vec<HH>,
}

/// Halfedge connectivity of a triangle mesh.
///
/// Elements live in flat arenas and are addressed by their handles. Both
/// halfedges of an edge are stored together, so the halfedge `h` belongs to
/// the edge `h >> 1` and its opposite is `h ^ 1`. Removing elements only flags
/// them as deleted; the storage is compacted by garbage collection.
pub struct Topology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    vstatus: Vec<Status>,
    estatus: Vec<Status>,
    fstatus: Vec<Status>,
    live_vertices: usize,
    live_edges: usize,
    live_faces: usize,
}

impl Topology {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nverts),
            edges: Vec::with_capacity(nedges),
            faces: Vec::with_capacity(nfaces),
            vstatus: Vec::with_capacity(nverts),
            estatus: Vec::with_capacity(nedges),
            fstatus: Vec::with_capacity(nfaces),
            live_vertices: 0,
            live_edges: 0,
            live_faces: 0,
        }
    }

    /// Build the connectivity of `nverts` vertices and the given triangles.
    ///
    /// Every triangle is a triplet of vertex indices in counter-clockwise
    /// winding order. Vertices not referenced by any triangle are kept as
    /// isolated vertices. The input must describe an oriented manifold: an
    /// error is returned if any directed edge is used twice, or if the faces
    /// around a vertex do not form a single fan.
    pub fn from_triangles(nverts: usize, triangles: &[[u32; 3]]) -> Result<Self, Error> {
        let mut topol = Self::with_capacity(nverts, triangles.len() * 3 / 2 + 1, triangles.len());
        for _ in 0..nverts {
            topol.add_vertex();
        }
        let mut degree = vec![0usize; nverts];
        let mut directed: HashMap<(u32, u32), HH> = HashMap::with_capacity(triangles.len() * 3);
        for (fi, tri) in triangles.iter().enumerate() {
            if let Some(&vi) = tri.iter().find(|vi| **vi as usize >= nverts) {
                return Err(Error::InvalidVertexIndex {
                    face: fi,
                    vertex: vi as usize,
                    count: nverts,
                });
            }
            let [a, b, c] = *tri;
            if a == b || b == c || c == a {
                return Err(Error::DegenerateFace(fi));
            }
            let mut hs = [HH::from(0u32); 3];
            for (i, (from, to)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
                if let Some(&h) = directed.get(&(from, to)) {
                    return Err(Error::ComplexHalfedge(h));
                }
                let h = match directed.get(&(to, from)) {
                    Some(&oh) => oh.opposite(),
                    None => {
                        let e = topol.new_edge(from.into(), to.into());
                        degree[from as usize] += 1;
                        degree[to as usize] += 1;
                        e.halfedge(false)
                    }
                };
                directed.insert((from, to), h);
                hs[i] = h;
            }
            // The face starts at the halfedge pointing to the first vertex, so
            // the face-vertex circulator reproduces the input winding.
            let f = topol.new_face(hs[2]);
            for (i, &h) in hs.iter().enumerate() {
                topol.halfedge_mut(h).face = Some(f);
                topol.link_halfedges(h, hs[(i + 1) % 3]);
            }
        }
        // Close the boundary loops. A manifold vertex has at most one gap in
        // its fan, so at most one outgoing boundary halfedge.
        let boundary: Vec<HH> = topol
            .halfedges()
            .filter(|h| topol.is_boundary_halfedge(*h))
            .collect();
        let mut boundary_out: Vec<Option<HH>> = vec![None; nverts];
        for &h in &boundary {
            let v = topol.tail_vertex(h);
            if boundary_out[v.index() as usize].replace(h).is_some() {
                return Err(Error::ComplexVertex(v));
            }
        }
        for &h in &boundary {
            let v = topol.head_vertex(h);
            let next = boundary_out[v.index() as usize].ok_or(Error::ComplexVertex(v))?;
            topol.link_halfedges(h, next);
        }
        for (vi, bh) in boundary_out.iter().enumerate() {
            if let Some(bh) = bh {
                topol.vertices[vi].halfedge = Some(*bh);
            }
        }
        // Two fans sharing an interior vertex are not caught above. Such a
        // vertex cannot reach all of its edges by circulating.
        for v in topol.vertices() {
            if iterator::voh_ccw_iter(&topol, v).count() != degree[v.index() as usize] {
                return Err(Error::ComplexVertex(v));
            }
        }
        Ok(topol)
    }

    fn add_vertex(&mut self) -> VH {
        let vi = self.vertices.len() as u32;
        self.vertices.push(Vertex { halfedge: None });
        self.vstatus.push(Status::default());
        self.live_vertices += 1;
        vi.into()
    }

    fn new_edge(&mut self, from: VH, to: VH) -> EH {
        let e: EH = self.edges.len().into();
        let (h, oh) = e.halfedges();
        self.edges.push(Edge {
            halfedges: [
                Halfedge {
                    face: None,
                    vertex: to,
                    next: h,
                    prev: h,
                },
                Halfedge {
                    face: None,
                    vertex: from,
                    next: oh,
                    prev: oh,
                },
            ],
        });
        self.estatus.push(Status::default());
        self.live_edges += 1;
        for (v, out) in [(from, h), (to, oh)] {
            let vertex = self.vertex_mut(v);
            if vertex.halfedge.is_none() {
                vertex.halfedge = Some(out);
            }
        }
        e
    }

    fn new_face(&mut self, halfedge: HH) -> FH {
        let f: FH = self.faces.len().into();
        self.faces.push(Face { halfedge });
        self.fstatus.push(Status::default());
        self.live_faces += 1;
        f
    }

    fn halfedge(&self, h: HH) -> &Halfedge {
        &self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    pub(crate) fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    pub(crate) fn vertex_mut(&mut self, v: VH) -> &mut Vertex {
        &mut self.vertices[v.index() as usize]
    }

    pub(crate) fn face_mut(&mut self, f: FH) -> &mut Face {
        &mut self.faces[f.index() as usize]
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.vertices[v.index() as usize].halfedge
    }

    pub fn head_vertex(&self, h: HH) -> VH {
        self.halfedge(h).vertex
    }

    pub fn tail_vertex(&self, h: HH) -> VH {
        self.halfedge(h.opposite()).vertex
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).prev
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).next
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.halfedge(h).face
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.faces[f.index() as usize].halfedge
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.halfedge(h).face.is_none()
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        let (h, oh) = e.halfedges();
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(oh)
    }

    /// Isolated vertices count as boundary vertices.
    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        match self.vertex_halfedge(v) {
            Some(h) => self.is_boundary_halfedge(h),
            None => true,
        }
    }

    pub fn is_manifold_vertex(&self, v: VH) -> bool {
        /* The outgoing halfedge of a boundary vertex is always the boundary
         * halfedge, so only the first outgoing halfedge is allowed to be on
         * the boundary. Any other boundary halfedge means a second gap in the
         * fan around the vertex.
         */
        iterator::voh_ccw_iter(self, v)
            .skip(1)
            .all(|h| !self.is_boundary_halfedge(h))
    }

    pub fn is_deleted_vertex(&self, v: VH) -> bool {
        self.vstatus[v.index() as usize].deleted()
    }

    pub fn is_deleted_edge(&self, e: EH) -> bool {
        self.estatus[e.index() as usize].deleted()
    }

    /// Both halfedges of an edge are deleted together with it.
    pub fn is_deleted_halfedge(&self, h: HH) -> bool {
        self.is_deleted_edge(h.edge())
    }

    pub fn is_deleted_face(&self, f: FH) -> bool {
        self.fstatus[f.index() as usize].deleted()
    }

    pub(crate) fn delete_vertex(&mut self, v: VH) {
        let status = &mut self.vstatus[v.index() as usize];
        if !status.deleted() {
            status.set_deleted(true);
            self.live_vertices -= 1;
        }
    }

    pub(crate) fn delete_edge(&mut self, e: EH) {
        let status = &mut self.estatus[e.index() as usize];
        if !status.deleted() {
            status.set_deleted(true);
            self.live_edges -= 1;
        }
    }

    pub(crate) fn delete_face(&mut self, f: FH) {
        let status = &mut self.fstatus[f.index() as usize];
        if !status.deleted() {
            status.set_deleted(true);
            self.live_faces -= 1;
        }
    }

    /// Number of vertices in storage, including deleted ones.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges in storage, including deleted ones.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.num_edges() * 2
    }

    /// Number of faces in storage, including deleted ones.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_live_vertices(&self) -> usize {
        self.live_vertices
    }

    pub fn num_live_edges(&self) -> usize {
        self.live_edges
    }

    pub fn num_live_faces(&self) -> usize {
        self.live_faces
    }

    /// All vertices in storage. Use [`Self::live_vertices`] to skip deleted
    /// ones.
    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_vertices() as u32)).map(|i| i.into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        (0..(self.num_halfedges() as u32)).map(|i| i.into())
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..(self.num_edges() as u32)).map(|i| i.into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..(self.num_faces() as u32)).map(|i| i.into())
    }

    pub fn live_vertices(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.vertices().filter(|v| !self.is_deleted_vertex(*v))
    }

    pub fn live_halfedges(&self) -> impl Iterator<Item = HH> + use<'_> {
        self.halfedges().filter(|h| !self.is_deleted_halfedge(*h))
    }

    pub fn live_edges(&self) -> impl Iterator<Item = EH> + use<'_> {
        self.edges().filter(|e| !self.is_deleted_edge(*e))
    }

    pub fn live_faces(&self) -> impl Iterator<Item = FH> + use<'_> {
        self.faces().filter(|f| !self.is_deleted_face(*f))
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        iterator::voh_ccw_iter(self, from).find(|h| self.head_vertex(*h) == to)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        iterator::voh_ccw_iter(self, v).count()
    }

    pub fn face_valence(&self, f: FH) -> usize {
        iterator::fh_ccw_iter(self, f).count()
    }

    pub(crate) fn link_halfedges(&mut self, prev: HH, next: HH) {
        self.halfedge_mut(prev).next = next;
        self.halfedge_mut(next).prev = prev;
    }

    /// Point the vertex at its boundary halfedge, if it has one.
    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VH) {
        let h = iterator::voh_ccw_iter(self, v).find(|h| self.is_boundary_halfedge(*h));
        if let Some(h) = h {
            self.vertex_mut(v).halfedge = Some(h);
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
