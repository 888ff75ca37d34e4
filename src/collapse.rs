use crate::{
    element::{HH, VH},
    iterator,
    topol::{TopolCache, Topology},
};

impl Topology {
    /// The apex of the triangle on the left of `h`, i.e. the vertex opposite
    /// to the edge, or `None` if `h` is a boundary halfedge.
    fn triangle_apex(&self, h: HH) -> Option<VH> {
        self.halfedge_face(h)
            .map(|_| self.head_vertex(self.next_halfedge(h)))
    }

    /// Check the triangle on the left of `h`. Returns `false` if removing it
    /// would disconnect the mesh or leave behind a lone triangle.
    fn check_side(&self, h: HH) -> bool {
        if self.is_boundary_halfedge(h) {
            return true;
        }
        let outer = [
            self.next_halfedge(h).opposite(),
            self.prev_halfedge(h).opposite(),
        ];
        match outer.map(|oh| self.halfedge_face(oh)) {
            [None, None] => false,
            [Some(fa), Some(fb)] => fa != fb,
            [Some(_), None] | [None, Some(_)] => {
                // The collapse merges the two outer edges into one. If that
                // makes every edge of the remaining neighbor a boundary edge,
                // the neighbor ends up as an isolated triangle.
                let g = if self.is_boundary_halfedge(outer[0]) {
                    outer[1]
                } else {
                    outer[0]
                };
                !(self.is_boundary_halfedge(self.next_halfedge(g).opposite())
                    && self.is_boundary_halfedge(self.prev_halfedge(g).opposite()))
            }
        }
    }

    /// Check whether the halfedge `h` can be collapsed, merging its tail
    /// vertex into its head vertex, without breaking the manifold
    /// connectivity of the mesh.
    pub fn check_edge_collapse(&self, h: HH) -> bool {
        if self.is_deleted_edge(h.edge()) {
            return false;
        }
        let oh = h.opposite();
        let v0 = self.tail_vertex(h);
        let v1 = self.head_vertex(h);
        if self.is_deleted_vertex(v0) || self.is_deleted_vertex(v1) {
            return false;
        }
        if !self.check_side(h) || !self.check_side(oh) {
            return false;
        }
        let vl = self.triangle_apex(h);
        let vr = self.triangle_apex(oh);
        if let (Some(l), Some(r)) = (vl, vr) {
            if l == r {
                return false;
            }
            // Last edge of a tetrahedron.
            if self.find_halfedge(l, r).is_some()
                && self.vertex_valence(l) == 3
                && self.vertex_valence(r) == 3
            {
                return false;
            }
        }
        // Collapsing an interior edge between two boundary vertices would pinch
        // the surface into a non-manifold vertex.
        if self.is_boundary_vertex(v0)
            && self.is_boundary_vertex(v1)
            && !self.is_boundary_halfedge(h)
            && !self.is_boundary_halfedge(oh)
        {
            return false;
        }
        // Link condition: the only common neighbors of the two vertices may be
        // the apexes of the triangles incident on the edge.
        iterator::vv_ccw_iter(self, v0)
            .filter(|n| Some(*n) != vl && Some(*n) != vr)
            .all(|n| iterator::vv_ccw_iter(self, v1).all(|m| m != n))
    }

    /// Remove the loop of two halfedges `h` and `next(h)` that is left behind
    /// when the third edge of a triangle is collapsed. The edge of `h` is
    /// deleted and `next(h)` takes its place in the face on the other side.
    fn collapse_degenerate_triangle(&mut self, h: HH) {
        let h1 = self.next_halfedge(h);
        let o = h.opposite();
        let o1 = h1.opposite();
        let v0 = self.head_vertex(h);
        let v1 = self.head_vertex(h1);
        let fh = self.halfedge_face(h);
        let fo = self.halfedge_face(o);
        debug_assert_eq!(self.next_halfedge(h1), h);
        debug_assert_ne!(h1, o);
        // Rewire halfedge -> halfedge.
        self.link_halfedges(h1, self.next_halfedge(o));
        self.link_halfedges(self.prev_halfedge(o), h1);
        // Rewire halfedge -> face.
        self.halfedge_mut(h1).face = fo;
        // Rewire vertex -> halfedge.
        self.vertex_mut(v0).halfedge = Some(h1);
        self.adjust_outgoing_halfedge(v0);
        self.vertex_mut(v1).halfedge = Some(o1);
        self.adjust_outgoing_halfedge(v1);
        // Rewire face -> halfedge.
        if let Some(fo) = fo {
            if self.face_halfedge(fo) == o {
                self.face_mut(fo).halfedge = h1;
            }
        }
        if let Some(fh) = fh {
            self.delete_face(fh);
        }
        self.delete_edge(h.edge());
    }

    /// Collapse the halfedge `h`, merging its tail vertex into its head
    /// vertex. The tail vertex, the edge and the triangles on either side of
    /// it are deleted. The caller is expected to have checked the collapse
    /// with [`Self::check_edge_collapse`].
    pub(crate) fn collapse_edge(&mut self, h: HH, cache: &mut TopolCache) {
        let hn = self.next_halfedge(h);
        let hp = self.prev_halfedge(h);
        let o = h.opposite();
        let on = self.next_halfedge(o);
        let op = self.prev_halfedge(o);
        let fh = self.halfedge_face(h);
        let fo = self.halfedge_face(o);
        let vh = self.head_vertex(h);
        let vo = self.head_vertex(o);
        // Rewire halfedge -> vertex.
        let hcache = &mut cache.halfedges;
        hcache.clear();
        hcache.extend(iterator::vih_ccw_iter(self, vo));
        for ih in hcache.drain(..) {
            self.halfedge_mut(ih).vertex = vh;
        }
        // Rewire halfedge -> halfedge.
        self.link_halfedges(hp, hn);
        self.link_halfedges(op, on);
        // Rewire face -> halfedge.
        if let Some(fh) = fh {
            self.face_mut(fh).halfedge = hn;
        }
        if let Some(fo) = fo {
            self.face_mut(fo).halfedge = on;
        }
        // Rewire vertex -> halfedge.
        if self.vertex_halfedge(vh) == Some(o) {
            self.vertex_mut(vh).halfedge = Some(hn);
        }
        self.adjust_outgoing_halfedge(vh);
        self.vertex_mut(vo).halfedge = None;
        self.delete_edge(h.edge());
        self.delete_vertex(vo);
        // The loops that contained the collapsed halfedges are now left with
        // two halfedges each, if they were triangles.
        if self.next_halfedge(hn) == hp {
            self.collapse_degenerate_triangle(hn);
        }
        if self.next_halfedge(on) == op {
            self.collapse_degenerate_triangle(on);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::Handle,
        iterator,
        topol::{
            test::{loop_mesh, octahedron},
            TopolCache, Topology,
        },
    };

    fn tetrahedron() -> Topology {
        Topology::from_triangles(4, &[[0, 2, 1], [0, 3, 2], [0, 1, 3], [1, 2, 3]])
            .expect("Cannot create tetrahedron")
    }

    #[test]
    fn t_octahedron_check_edge_collapse() {
        let topol = octahedron();
        assert!(topol.halfedges().all(|h| topol.check_edge_collapse(h)));
    }

    #[test]
    fn t_tetrahedron_check_edge_collapse() {
        let topol = tetrahedron();
        assert_eq!(12, topol.num_halfedges());
        assert!(topol.halfedges().all(|h| !topol.check_edge_collapse(h)));
    }

    #[test]
    fn t_flat_quad_check_edge_collapse() {
        // Any collapse of two triangles leaves one isolated triangle or
        // pinches the diagonal.
        let topol = Topology::from_triangles(4, &[[0, 1, 2], [0, 2, 3]])
            .expect("Cannot create quad");
        assert!(topol.halfedges().all(|h| !topol.check_edge_collapse(h)));
    }

    #[test]
    fn t_single_triangle_check_edge_collapse() {
        let topol = Topology::from_triangles(3, &[[0, 1, 2]]).expect("Cannot create triangle");
        assert!(topol.halfedges().all(|h| !topol.check_edge_collapse(h)));
    }

    #[test]
    fn t_loop_mesh_check_edge_collapse() {
        let topol = loop_mesh();
        // These edges connect the outer boundary to the hole.
        for (a, b) in [(1u32, 5u32), (4, 5), (9, 13), (6, 7), (10, 11), (2, 6)] {
            let h = topol
                .find_halfedge(a.into(), b.into())
                .expect("Cannot find halfedge");
            assert!(!topol.check_edge_collapse(h));
            assert!(!topol.check_edge_collapse(h.opposite()));
        }
        let h = topol
            .find_halfedge(0u32.into(), 1u32.into())
            .expect("Cannot find halfedge");
        assert!(topol.check_edge_collapse(h));
    }

    #[test]
    fn t_octahedron_edge_collapse() {
        let mut topol = octahedron();
        let mut cache = TopolCache::default();
        let h = topol
            .find_halfedge(0u32.into(), 4u32.into())
            .expect("Cannot find halfedge");
        assert!(topol.check_edge_collapse(h));
        topol.collapse_edge(h, &mut cache);
        assert_eq!(
            (5, 9, 6),
            (
                topol.num_live_vertices(),
                topol.num_live_edges(),
                topol.num_live_faces()
            )
        );
        assert!(topol.is_deleted_vertex(0u32.into()));
        assert!(topol.is_deleted_edge(h.edge()));
        let mut nbs = iterator::vv_ccw_iter(&topol, 4u32.into())
            .map(|v| v.index())
            .collect::<Vec<_>>();
        nbs.sort();
        assert_eq!(nbs, vec![1, 2, 3, 5]);
        // Faces that survived only reference live vertices.
        for f in topol.live_faces() {
            assert_eq!(3, topol.face_valence(f));
            assert!(iterator::fv_ccw_iter(&topol, f).all(|v| !topol.is_deleted_vertex(v)));
        }
    }

    #[test]
    fn t_octahedron_double_edge_collapse() {
        let mut topol = octahedron();
        let mut cache = TopolCache::default();
        for (a, b) in [(0u32, 4u32), (1, 2)] {
            let h = topol
                .find_halfedge(a.into(), b.into())
                .expect("Cannot find halfedge");
            assert!(topol.check_edge_collapse(h));
            topol.collapse_edge(h, &mut cache);
        }
        // Four vertices left, every pair connected: a tetrahedron.
        assert_eq!(
            (4, 6, 4),
            (
                topol.num_live_vertices(),
                topol.num_live_edges(),
                topol.num_live_faces()
            )
        );
        assert!(topol.live_halfedges().all(|h| !topol.check_edge_collapse(h)));
    }

    #[test]
    fn t_loop_mesh_boundary_edge_collapse() {
        let mut topol = loop_mesh();
        let mut cache = TopolCache::default();
        let h = topol
            .find_halfedge(0u32.into(), 1u32.into())
            .expect("Cannot find halfedge");
        topol.collapse_edge(h, &mut cache);
        assert_eq!(
            (15, 30, 15),
            (
                topol.num_live_vertices(),
                topol.num_live_edges(),
                topol.num_live_faces()
            )
        );
        assert!(topol.is_boundary_vertex(1u32.into()));
        assert!(topol.is_manifold_vertex(1u32.into()));
    }
}
