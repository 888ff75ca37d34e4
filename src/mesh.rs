use crate::{
    decimate::plane,
    element::{Handle, HasTopology, EH, FH, HH, VH},
    error::Error,
    iterator,
    topol::{TopolCache, Topology},
};
use glam::{DVec3, DVec4};

/// Triangle mesh with double precision vertex positions.
pub struct TriMesh {
    topol: Topology,
    points: Vec<DVec3>,
    cache: TopolCache,
}

impl Default for TriMesh {
    fn default() -> Self {
        TriMesh {
            topol: Topology::new(),
            points: Vec::new(),
            cache: TopolCache::default(),
        }
    }
}

impl HasTopology for TriMesh {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl TriMesh {
    /// Create a mesh from vertex positions and triangles, where each triangle
    /// is a triplet of indices into `points` in counter-clockwise order.
    pub fn from_triangles(points: Vec<DVec3>, triangles: &[[u32; 3]]) -> Result<Self, Error> {
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFiniteCoordinate(i));
        }
        let topol = Topology::from_triangles(points.len(), triangles)?;
        Ok(TriMesh {
            topol,
            points,
            cache: TopolCache::default(),
        })
    }

    /// Number of vertices in storage, including deleted vertices.
    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    /// Number of edges in storage, including deleted edges.
    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    /// Number of faces in storage, including deleted faces.
    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn num_live_vertices(&self) -> usize {
        self.topol.num_live_vertices()
    }

    pub fn num_live_edges(&self) -> usize {
        self.topol.num_live_edges()
    }

    pub fn num_live_faces(&self) -> usize {
        self.topol.num_live_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        self.topol.halfedges()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        self.topol.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        self.topol.faces()
    }

    pub fn live_vertices(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.topol.live_vertices()
    }

    pub fn live_halfedges(&self) -> impl Iterator<Item = HH> + use<'_> {
        self.topol.live_halfedges()
    }

    pub fn live_edges(&self) -> impl Iterator<Item = EH> + use<'_> {
        self.topol.live_edges()
    }

    pub fn live_faces(&self) -> impl Iterator<Item = FH> + use<'_> {
        self.topol.live_faces()
    }

    pub fn is_deleted_vertex(&self, v: VH) -> bool {
        self.topol.is_deleted_vertex(v)
    }

    pub fn is_deleted_halfedge(&self, h: HH) -> bool {
        self.topol.is_deleted_halfedge(h)
    }

    pub fn is_deleted_edge(&self, e: EH) -> bool {
        self.topol.is_deleted_edge(e)
    }

    pub fn is_deleted_face(&self, f: FH) -> bool {
        self.topol.is_deleted_face(f)
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        self.topol.is_boundary_vertex(v)
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        self.topol.is_boundary_edge(e)
    }

    pub fn is_manifold_vertex(&self, v: VH) -> bool {
        self.topol.is_manifold_vertex(v)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        self.topol.vertex_valence(v)
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        self.topol.find_halfedge(from, to)
    }

    pub fn point(&self, v: VH) -> DVec3 {
        self.points[v.index() as usize]
    }

    pub fn set_point(&mut self, v: VH, pos: DVec3) {
        self.points[v.index() as usize] = pos;
    }

    /// Positions of all vertices in storage, indexed by vertex handle.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// The three vertices of a face, in winding order.
    pub fn face_vertices(&self, f: FH) -> [VH; 3] {
        let h0 = self.topol.face_halfedge(f);
        let h1 = self.topol.next_halfedge(h0);
        let h2 = self.topol.next_halfedge(h1);
        [h0, h1, h2].map(|h| self.topol.head_vertex(h))
    }

    pub fn face_points(&self, f: FH) -> [DVec3; 3] {
        self.face_vertices(f).map(|v| self.point(v))
    }

    /// The plane of a face as `(a, b, c, d)`, see [`plane::face_plane`].
    pub fn face_plane(&self, f: FH) -> DVec4 {
        let [p0, p1, p2] = self.face_points(f);
        plane::face_plane(p0, p1, p2)
    }

    pub fn face_area(&self, f: FH) -> f64 {
        let [p0, p1, p2] = self.face_points(f);
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    /// Total area of all live faces.
    pub fn area(&self) -> f64 {
        self.live_faces().map(|f| self.face_area(f)).sum()
    }

    pub fn voh_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_ccw_iter(&self.topol, v)
    }

    pub fn voh_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_cw_iter(&self.topol, v)
    }

    pub fn vih_ccw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::vih_ccw_iter(&self.topol, v)
    }

    pub fn vih_cw_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::vih_cw_iter(&self.topol, v)
    }

    pub fn vv_ccw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_ccw_iter(&self.topol, v)
    }

    pub fn vv_cw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_cw_iter(&self.topol, v)
    }

    pub fn ve_ccw_iter(&self, v: VH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::ve_ccw_iter(&self.topol, v)
    }

    pub fn vf_ccw_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_ccw_iter(&self.topol, v)
    }

    pub fn vf_cw_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_cw_iter(&self.topol, v)
    }

    pub fn fh_ccw_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_ccw_iter(&self.topol, f)
    }

    pub fn fh_cw_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_cw_iter(&self.topol, f)
    }

    pub fn fv_ccw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_ccw_iter(&self.topol, f)
    }

    pub fn fv_cw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_cw_iter(&self.topol, f)
    }

    pub fn fe_ccw_iter(&self, f: FH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::fe_ccw_iter(&self.topol, f)
    }

    pub fn ff_ccw_iter(&self, f: FH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ff_ccw_iter(&self.topol, f)
    }

    pub fn loop_ccw_iter(&self, h: HH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::loop_ccw_iter(&self.topol, h)
    }

    pub fn loop_cw_iter(&self, h: HH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::loop_cw_iter(&self.topol, h)
    }

    /// Check whether collapsing `h` keeps the mesh manifold. See
    /// [`Self::collapse_edge`].
    pub fn check_edge_collapse(&self, h: HH) -> bool {
        self.topol.check_edge_collapse(h)
    }

    /// Collapse the halfedge `h`: its tail vertex is merged into its head
    /// vertex, whose position is left unchanged.
    ///
    /// The tail vertex, the edge and the triangles on either side of the edge
    /// are marked deleted. Storage is not compacted until
    /// [`Self::garbage_collection`] is called. The collapse must have been
    /// checked with [`Self::check_edge_collapse`].
    pub fn collapse_edge(&mut self, h: HH) {
        assert!(
            !self.topol.is_deleted_edge(h.edge()),
            "Illegal collapse of deleted halfedge {h}"
        );
        debug_assert!(
            self.topol.check_edge_collapse(h),
            "Illegal collapse of halfedge {h}"
        );
        self.topol.collapse_edge(h, &mut self.cache);
    }

    /// Validate the connectivity of the live part of the mesh.
    pub fn check_topology(&self) -> Result<(), Error> {
        self.topol.check()
    }

    /// Live faces as index triplets into [`Self::points`].
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.live_faces()
            .map(|f| self.face_vertices(f).map(|v| v.index()))
            .collect()
    }

    /// Remove all deleted elements from storage. Handles of the remaining
    /// elements are invalidated: vertices and faces keep their relative order
    /// and are renumbered from zero.
    pub fn garbage_collection(&mut self) -> Result<(), Error> {
        let mut vmap = vec![u32::MAX; self.num_vertices()];
        let mut points = Vec::with_capacity(self.num_live_vertices());
        for v in self.topol.live_vertices() {
            vmap[v.index() as usize] = points.len() as u32;
            points.push(self.point(v));
        }
        let triangles: Vec<[u32; 3]> = self
            .live_faces()
            .map(|f| self.face_vertices(f).map(|v| vmap[v.index() as usize]))
            .collect();
        *self = Self::from_triangles(points, &triangles)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::TriMesh;
    use crate::{element::Handle, error::Error, macros::assert_float_eq};
    use glam::dvec3;

    #[test]
    fn t_face_vertices_winding() {
        let mesh = TriMesh::from_triangles(
            vec![dvec3(0., 0., 0.), dvec3(1., 0., 0.), dvec3(0., 1., 0.)],
            &[[1, 2, 0]],
        )
        .expect("Cannot create triangle");
        assert_eq!(
            [1, 2, 0],
            mesh.face_vertices(0u32.into()).map(|v| v.index())
        );
        let plane = mesh.face_plane(0u32.into());
        assert_float_eq!(plane.z, 1.0, 1e-12);
        assert_float_eq!(plane.w, 0.0, 1e-12);
        assert_float_eq!(mesh.area(), 0.5, 1e-12);
    }

    #[test]
    fn t_non_finite_point() {
        assert!(matches!(
            TriMesh::from_triangles(
                vec![dvec3(0., 0., 0.), dvec3(f64::NAN, 0., 0.), dvec3(0., 1., 0.)],
                &[[0, 1, 2]],
            ),
            Err(Error::NonFiniteCoordinate(1))
        ));
    }

    #[test]
    fn t_garbage_collection() {
        let mut mesh = TriMesh::octahedron(1.0).expect("Cannot create octahedron");
        let h = mesh
            .find_halfedge(0u32.into(), 4u32.into())
            .expect("Cannot find halfedge");
        mesh.set_point(4u32.into(), dvec3(0.5, 0.0, 0.5));
        mesh.collapse_edge(h);
        assert_eq!((6, 12, 8), (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()));
        mesh.garbage_collection()
            .expect("Garbage collection failed");
        assert_eq!((5, 9, 6), (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()));
        assert_eq!(
            (5, 9, 6),
            (
                mesh.num_live_vertices(),
                mesh.num_live_edges(),
                mesh.num_live_faces()
            )
        );
        mesh.check_topology().expect("Topology is broken");
        // The former vertex 4 moved down to index 3.
        assert_eq!(dvec3(0.5, 0.0, 0.5), mesh.point(3u32.into()));
        let tris = mesh.triangles();
        mesh.garbage_collection()
            .expect("Garbage collection failed");
        assert_eq!(tris, mesh.triangles());
    }

    #[test]
    #[should_panic(expected = "Illegal collapse")]
    fn t_illegal_collapse_panics() {
        let mut mesh = TriMesh::octahedron(1.0).expect("Cannot create octahedron");
        let h = mesh
            .find_halfedge(0u32.into(), 4u32.into())
            .expect("Cannot find halfedge");
        mesh.collapse_edge(h);
        mesh.collapse_edge(h);
    }
}
