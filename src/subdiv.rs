use crate::{element::Handle, error::Error, mesh::TriMesh};
use std::collections::HashMap;
use tracing::debug;

impl TriMesh {
    /// Split every triangle into four by inserting a vertex at the midpoint of
    /// every edge. The new vertices lie on the original faces, so the shape of
    /// the mesh does not change.
    ///
    /// Only live elements are subdivided, and the returned mesh is compact:
    /// the original vertices come first, in handle order, followed by the
    /// edge midpoints.
    pub fn subdivide_midpoint(&self) -> Result<Self, Error> {
        let mut vmap = vec![u32::MAX; self.num_vertices()];
        let mut points = Vec::with_capacity(self.num_live_vertices() + self.num_live_edges());
        for v in self.live_vertices() {
            vmap[v.index() as usize] = points.len() as u32;
            points.push(self.point(v));
        }
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::with_capacity(self.num_live_edges());
        let mut triangles = Vec::with_capacity(self.num_live_faces() * 4);
        for f in self.live_faces() {
            let [v0, v1, v2] = self.face_vertices(f).map(|v| vmap[v.index() as usize]);
            let mut midpoint = |a: u32, b: u32| -> u32 {
                *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                    let mid = (points[a as usize] + points[b as usize]) * 0.5;
                    points.push(mid);
                    (points.len() - 1) as u32
                })
            };
            let m01 = midpoint(v0, v1);
            let m12 = midpoint(v1, v2);
            let m20 = midpoint(v2, v0);
            triangles.extend([
                [v0, m01, m20],
                [v1, m12, m01],
                [v2, m20, m12],
                [m01, m12, m20],
            ]);
        }
        Self::from_triangles(points, &triangles)
    }

    /// Repeatedly apply [`Self::subdivide_midpoint`] until the mesh has at
    /// least `target` faces. A mesh without faces is returned unchanged.
    pub fn subdivide_to_face_count(self, target: usize) -> Result<Self, Error> {
        let mut mesh = self;
        while mesh.num_live_faces() > 0 && mesh.num_live_faces() < target {
            mesh = mesh.subdivide_midpoint()?;
            debug!(
                vertices = mesh.num_vertices(),
                faces = mesh.num_faces(),
                "Subdivided mesh"
            );
        }
        Ok(mesh)
    }
}
