use crate::{element::Handle, error::Error, iterator, topol::Topology};

fn check_vertices(topol: &Topology, hvisited: &mut [bool]) -> Result<(), Error> {
    hvisited.fill(false);
    for v in topol.live_vertices() {
        if let Some(h) = topol.vertex_halfedge(v) {
            if h.index() as usize >= topol.num_halfedges() {
                return Err(Error::InvalidHalfedge(h));
            }
            if topol.is_deleted_halfedge(h) {
                return Err(Error::DeletedHalfedge(h));
            }
            // The outgoing halfedge must be a boundary halfedge, or none of the
            // halfedges are boundary.
            if !topol.is_boundary_halfedge(h)
                && iterator::voh_ccw_iter(topol, v).any(|h| topol.is_boundary_halfedge(h))
            {
                return Err(Error::OutgoingHalfedgeNotBoundary(v));
            }
            if topol.tail_vertex(h) != v {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        // Both circulators must visit the same halfedges exactly once.
        for h in iterator::voh_ccw_iter(topol, v) {
            if std::mem::replace(&mut hvisited[h.index() as usize], true) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
        for h in iterator::voh_cw_iter(topol, v) {
            if !std::mem::replace(&mut hvisited[h.index() as usize], false) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
    }
    Ok(())
}

fn check_halfedges(topol: &Topology, hflags: &mut [bool]) -> Result<(), Error> {
    for h in topol.live_halfedges() {
        let head = topol.head_vertex(h);
        let tail = topol.tail_vertex(h);
        if head == tail {
            return Err(Error::DegenerateHalfedge(h));
        }
        let prev = topol.prev_halfedge(h);
        let next = topol.next_halfedge(h);
        for nb in [prev, next] {
            if topol.is_deleted_halfedge(nb) {
                return Err(Error::DeletedHalfedge(nb));
            }
        }
        if topol.is_deleted_vertex(head) {
            return Err(Error::DeletedVertex(head));
        }
        if let Some(f) = topol.halfedge_face(h) {
            if topol.is_deleted_face(f) {
                return Err(Error::DeletedFace(f));
            }
        }
        if topol.next_halfedge(prev) != h
            || topol.prev_halfedge(next) != h
            || head != topol.tail_vertex(next)
            || tail != topol.head_vertex(prev)
        {
            return Err(Error::InvalidHalfedgeLink(h));
        }
        if !iterator::voh_ccw_iter(topol, tail).any(|hh| hh == h)
            || !iterator::vih_ccw_iter(topol, head).any(|hh| hh == h)
        {
            return Err(Error::InvalidHalfedgeVertexLink(h));
        }
    }
    // Every halfedge must belong to exactly one loop, and all halfedges of a
    // loop share the same face.
    hflags.fill(false);
    for h in topol.live_halfedges() {
        if hflags[h.index() as usize] {
            continue;
        }
        let f = topol.halfedge_face(h);
        for lh in iterator::loop_ccw_iter(topol, h) {
            if std::mem::replace(&mut hflags[lh.index() as usize], true) {
                return Err(Error::InvalidLoopTopology(lh));
            }
            if topol.halfedge_face(lh) != f {
                return Err(Error::InconsistentFaceInLoop(lh));
            }
        }
    }
    Ok(())
}

fn check_faces(topol: &Topology) -> Result<(), Error> {
    for f in topol.live_faces() {
        let h = topol.face_halfedge(f);
        if topol.is_deleted_halfedge(h) {
            return Err(Error::DeletedHalfedge(h));
        }
        if topol.halfedge_face(h) != Some(f) {
            return Err(Error::InvalidFaceHalfedgeLink(f, h));
        }
        let valence = topol.face_valence(f);
        if valence != 3 {
            return Err(Error::NotATriangle(f, valence));
        }
    }
    Ok(())
}

impl Topology {
    /// Validate the connectivity of all live elements.
    pub fn check(&self) -> Result<(), Error> {
        let mut hvisited = vec![false; self.num_halfedges()].into_boxed_slice();
        check_vertices(self, &mut hvisited)?;
        check_halfedges(self, &mut hvisited)?;
        check_faces(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::Error,
        topol::{
            test::{loop_mesh, octahedron},
            TopolCache,
        },
    };

    #[test]
    fn t_check_fresh_meshes() {
        octahedron().check().expect("Octahedron is invalid");
        loop_mesh().check().expect("Loop mesh is invalid");
    }

    #[test]
    fn t_check_after_collapses() {
        let mut topol = loop_mesh();
        let mut cache = TopolCache::default();
        let mut collapsed = 0usize;
        // Greedily collapse whatever is allowed, in handle order.
        for h in topol.halfedges() {
            if topol.check_edge_collapse(h) {
                topol.collapse_edge(h, &mut cache);
                topol.check().expect("Topology broken by collapse");
                collapsed += 1;
            }
        }
        assert!(collapsed > 0);
        assert!(topol.num_live_faces() < 16);
    }

    #[test]
    fn t_check_detects_broken_face_link() {
        let mut topol = octahedron();
        let f0 = 0u32.into();
        let other = topol.face_halfedge(1u32.into());
        topol.face_mut(f0).halfedge = other;
        assert!(matches!(
            topol.check(),
            Err(Error::InvalidFaceHalfedgeLink(f, h)) if f == f0 && h == other
        ));
    }
}
