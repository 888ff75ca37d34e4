//! Quadric error metric simplification.
//!
//! Every vertex carries a [`Quadric`] measuring the squared distance to the
//! planes of its incident faces. The cost of collapsing an edge is the error
//! of the combined quadric of its endpoints at the best placement of the
//! merged vertex. Edges are collapsed cheapest first, until the mesh has the
//! requested number of faces.

mod cost;
mod heap;
mod params;
pub(crate) mod plane;
mod quadric;

pub use cost::{evaluate, Candidate, CollapseCost, Placement, DET_EPSILON};
pub use params::SimplifyParams;
pub use plane::{face_plane, face_plane_with_epsilon, PLANE_EPSILON};
pub use quadric::Quadric;

use crate::{
    element::{Handle, EH, HH, VH},
    error::Error,
    mesh::TriMesh,
};
use glam::DVec3;
use heap::Heap;
use std::fmt::Display;
use tracing::{debug, info, trace, warn};

/// Stages of a [`Simplifier`]. Initializing is the seeding of quadrics and
/// queue inside [`Simplifier::new`], which returns in [`Phase::Collapsing`].
/// [`Simplifier::finish`] moves to [`Phase::Done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Collapsing,
    Done,
}

/// Queue entry. Entries compare by cost, then by edge index.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Entry {
    cost: f64,
    edge: EH,
    stamp: u32,
}

/// A live edge popped from the queue, not yet checked for collapse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCollapse {
    pub edge: EH,
    /// Collapses the tail of this halfedge into its head.
    pub halfedge: HH,
    pub cost: f64,
    pub target: DVec3,
}

/// Outcome of a single [`Simplifier::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The edge was collapsed into the given vertex.
    Collapsed(VH),
    /// The edge cannot be collapsed without breaking the mesh.
    Rejected(EH),
    /// No candidates are left.
    Exhausted,
}

/// Statistics of a simplification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub initial_faces: usize,
    pub final_faces: usize,
    pub target_faces: usize,
    pub collapses: usize,
    pub rejected: usize,
    pub stale: usize,
    /// The queue ran out of candidates before the target was reached.
    pub stopped_early: bool,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} faces (target {}), {} collapses, {} rejected, {} stale",
            self.initial_faces,
            self.final_faces,
            self.target_faces,
            self.collapses,
            self.rejected,
            self.stale
        )?;
        if self.stopped_early {
            write!(f, ", stopped early")?;
        }
        Ok(())
    }
}

fn edge_cost(mesh: &TriMesh, quadrics: &[Quadric], e: EH, det_epsilon: f64) -> CollapseCost {
    let h = e.halfedge(false);
    let v0 = h.tail(mesh);
    let v1 = h.head(mesh);
    evaluate(
        &quadrics[v0.index() as usize],
        &quadrics[v1.index() as usize],
        mesh.point(v0),
        mesh.point(v1),
        det_epsilon,
    )
}

fn vertex_quadric(mesh: &TriMesh, v: VH, plane_epsilon: f64) -> Quadric {
    let q = Quadric::of_vertex_with_epsilon(mesh, v, plane_epsilon);
    assert!(q.is_finite(), "Quadric of vertex {v} is not finite: {q:?}");
    q
}

/// Greedy edge collapse driven by a priority queue of edge costs.
///
/// Collapsing an edge changes the costs of all edges around the surviving
/// vertex. Instead of updating their queue entries in place, every edge
/// carries a stamp that is bumped when the edge is queued again. Entries with
/// an old stamp, or of an edge that has since been deleted, are discarded
/// when popped.
pub struct Simplifier<'a> {
    mesh: &'a mut TriMesh,
    params: SimplifyParams,
    phase: Phase,
    quadrics: Vec<Quadric>,
    stamps: Vec<u32>,
    targets: Vec<DVec3>,
    heap: Heap<Entry>,
    ring: Vec<VH>,
    dirty_edges: Vec<EH>,
    initial_faces: usize,
    target_faces: usize,
    collapses: usize,
    rejected: usize,
    stale: usize,
    stopped_early: bool,
}

impl<'a> Simplifier<'a> {
    /// Compute the quadrics of all vertices and queue every edge.
    pub fn new(mesh: &'a mut TriMesh, params: SimplifyParams) -> Self {
        let mut quadrics = vec![Quadric::ZERO; mesh.num_vertices()];
        for v in mesh.live_vertices() {
            quadrics[v.index() as usize] = vertex_quadric(mesh, v, params.plane_epsilon);
        }
        let mut targets = vec![DVec3::ZERO; mesh.num_edges()];
        let mut heap = Heap::with_capacity(mesh.num_live_edges() * 2);
        for e in mesh.live_edges() {
            let c = edge_cost(mesh, &quadrics, e, params.det_epsilon);
            targets[e.index() as usize] = c.placement.position();
            heap.push(Entry {
                cost: c.cost,
                edge: e,
                stamp: 0,
            });
        }
        info!(
            vertices = mesh.num_live_vertices(),
            edges = mesh.num_live_edges(),
            faces = mesh.num_live_faces(),
            "Queued edges for simplification"
        );
        let initial_faces = mesh.num_live_faces();
        let stamps = vec![0u32; mesh.num_edges()];
        Simplifier {
            mesh,
            params,
            phase: Phase::Collapsing,
            quadrics,
            stamps,
            targets,
            heap,
            ring: Vec::new(),
            dirty_edges: Vec::new(),
            initial_faces,
            target_faces: params.target_faces,
            collapses: 0,
            rejected: 0,
            stale: 0,
            stopped_early: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mesh(&self) -> &TriMesh {
        &*self.mesh
    }

    pub fn quadric(&self, v: VH) -> &Quadric {
        &self.quadrics[v.index() as usize]
    }

    /// Number of entries in the queue, including stale ones.
    pub fn queued(&self) -> usize {
        self.heap.len()
    }

    /// Pop entries until one refers to a live edge with an up to date cost.
    pub fn next_candidate(&mut self) -> Option<EdgeCollapse> {
        if self.phase != Phase::Collapsing {
            return None;
        }
        while let Some(entry) = self.heap.pop() {
            let ei = entry.edge.index() as usize;
            if self.mesh.is_deleted_edge(entry.edge) || self.stamps[ei] != entry.stamp {
                self.stale += 1;
                continue;
            }
            return Some(EdgeCollapse {
                edge: entry.edge,
                halfedge: entry.edge.halfedge(false),
                cost: entry.cost,
                target: self.targets[ei],
            });
        }
        None
    }

    /// Collapse the candidate if that keeps the mesh manifold. The surviving
    /// vertex is moved to the target. The quadrics of the survivor and its
    /// neighbors are recomputed, and every edge touching them is queued again
    /// with a fresh cost. Rejected candidates are not queued again.
    pub fn try_collapse(&mut self, candidate: EdgeCollapse) -> Step {
        assert_eq!(
            self.phase,
            Phase::Collapsing,
            "Cannot collapse edges in phase {:?}",
            self.phase
        );
        let h = candidate.halfedge;
        if !self.mesh.check_edge_collapse(h) {
            debug!(edge = %candidate.edge, cost = candidate.cost, "Rejected collapse");
            self.rejected += 1;
            return Step::Rejected(candidate.edge);
        }
        let v = h.head(&*self.mesh);
        trace!(
            from = %h.tail(&*self.mesh),
            to = %v,
            cost = candidate.cost,
            "Collapsing edge"
        );
        self.mesh.set_point(v, candidate.target);
        self.mesh.collapse_edge(h);
        self.collapses += 1;
        let mesh = &*self.mesh;
        // The survivor moved and its fan lost two triangles, which changes the
        // faces of every vertex in its one-ring.
        self.ring.clear();
        self.ring.push(v);
        self.ring.extend(mesh.vv_ccw_iter(v));
        self.dirty_edges.clear();
        for &u in &self.ring {
            self.quadrics[u.index() as usize] =
                vertex_quadric(mesh, u, self.params.plane_epsilon);
            self.dirty_edges.extend(mesh.ve_ccw_iter(u));
        }
        self.dirty_edges.sort_unstable();
        self.dirty_edges.dedup();
        for &e in &self.dirty_edges {
            let ei = e.index() as usize;
            let c = edge_cost(mesh, &self.quadrics, e, self.params.det_epsilon);
            self.stamps[ei] = self.stamps[ei].wrapping_add(1);
            self.targets[ei] = c.placement.position();
            self.heap.push(Entry {
                cost: c.cost,
                edge: e,
                stamp: self.stamps[ei],
            });
        }
        Step::Collapsed(v)
    }

    pub fn step(&mut self) -> Step {
        match self.next_candidate() {
            Some(candidate) => self.try_collapse(candidate),
            None => Step::Exhausted,
        }
    }

    /// Collapse edges until the mesh has at most `target` faces, or no
    /// candidates are left. Returns the number of collapses.
    pub fn run(&mut self, target: usize) -> usize {
        if self.phase != Phase::Collapsing {
            return 0;
        }
        self.target_faces = target;
        let before = self.collapses;
        while self.mesh.num_live_faces() > target {
            if self.step() == Step::Exhausted {
                self.stopped_early = true;
                warn!(
                    faces = self.mesh.num_live_faces(),
                    target, "Ran out of collapsible edges before reaching the target"
                );
                break;
            }
        }
        info!(
            faces = self.mesh.num_live_faces(),
            collapses = self.collapses - before,
            rejected = self.rejected,
            "Simplification finished"
        );
        self.collapses - before
    }

    /// Remove the deleted elements from the mesh and report the statistics.
    /// Nothing can be collapsed afterwards.
    pub fn finish(&mut self) -> Result<Summary, Error> {
        self.phase = Phase::Done;
        self.heap.clear();
        self.mesh.garbage_collection()?;
        Ok(Summary {
            initial_faces: self.initial_faces,
            final_faces: self.mesh.num_faces(),
            target_faces: self.target_faces,
            collapses: self.collapses,
            rejected: self.rejected,
            stale: self.stale,
            stopped_early: self.stopped_early,
        })
    }
}

/// Simplify the mesh down to `params.target_faces` faces and compact it.
pub fn simplify(mesh: &mut TriMesh, params: SimplifyParams) -> Result<Summary, Error> {
    let mut simplifier = Simplifier::new(mesh, params);
    simplifier.run(params.target_faces);
    simplifier.finish()
}

#[cfg(test)]
mod test {
    use super::{evaluate, simplify, Phase, Quadric, Simplifier, SimplifyParams, Step};
    use crate::{element::Handle, macros::assert_float_eq, mesh::TriMesh};
    use glam::{dvec3, DVec3};
    use std::f64::consts::PI;

    fn params(target: usize) -> SimplifyParams {
        SimplifyParams::default().with_target_faces(target)
    }

    fn sphere(target_faces: usize) -> TriMesh {
        let mesh = TriMesh::icosahedron(1.0)
            .and_then(|m| m.subdivide_to_face_count(target_faces))
            .expect("Cannot create mesh");
        let points: Vec<DVec3> = mesh.points().iter().map(|p| p.normalize()).collect();
        TriMesh::from_triangles(points, &mesh.triangles()).expect("Cannot create sphere")
    }

    /// Hexagonal bipyramid whose top apex is split into two vertices at the
    /// same position, joined by two zero-area triangles.
    fn split_bipyramid() -> TriMesh {
        let mut points: Vec<DVec3> = (0..6)
            .map(|k| {
                let t = k as f64 * PI / 3.0;
                dvec3(t.cos(), t.sin(), 0.0)
            })
            .collect();
        points.extend([
            dvec3(0.0, 0.0, 1.0),
            dvec3(0.0, 0.0, -1.0),
            dvec3(0.0, 0.0, 1.0),
        ]);
        let mut triangles: Vec<[u32; 3]> = (0..6u32)
            .map(|k| [(k + 1) % 6, k, 7])
            .collect();
        triangles.extend([
            [0, 1, 6],
            [1, 2, 6],
            [2, 3, 6],
            [3, 4, 8],
            [4, 5, 8],
            [5, 0, 8],
            [0, 6, 8],
            [3, 8, 6],
        ]);
        TriMesh::from_triangles(points, &triangles).expect("Cannot create mesh")
    }

    #[test]
    fn t_octahedron_target_four() {
        let mut mesh = TriMesh::octahedron(1.0).expect("Cannot create octahedron");
        let summary = simplify(&mut mesh, params(4)).expect("Simplification failed");
        assert!((4..=8).contains(&summary.final_faces));
        assert_eq!(8, summary.initial_faces);
        assert_eq!(mesh.num_faces(), summary.final_faces);
        mesh.check_topology().expect("Topology is broken");
        let mut buf = Vec::new();
        mesh.write_obj(&mut buf).expect("Cannot write mesh");
        let copy = TriMesh::read_obj(&mut std::io::Cursor::new(buf)).expect("Cannot read mesh");
        copy.check_topology().expect("Topology is broken");
        assert_eq!(summary.final_faces, copy.num_faces());
    }

    #[test]
    fn t_flat_quad_never_one_face() {
        let mut mesh = TriMesh::flat_quad(1.0).expect("Cannot create quad");
        let summary = simplify(&mut mesh, params(1)).expect("Simplification failed");
        assert!(summary.final_faces == 0 || summary.final_faces == 2);
        assert_eq!(2, summary.final_faces);
        assert_eq!(0, summary.collapses);
        assert_eq!(5, summary.rejected);
        assert!(summary.stopped_early);
        mesh.check_topology().expect("Topology is broken");
    }

    #[test]
    fn t_zero_length_edge_first() {
        let mut mesh = split_bipyramid();
        assert_eq!((9, 21, 14), (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()));
        let mut simp = Simplifier::new(&mut mesh, params(0));
        let candidate = simp.next_candidate().expect("No candidates");
        let h = candidate.halfedge;
        let mut ends = [h.tail(simp.mesh()).index(), h.head(simp.mesh()).index()];
        ends.sort();
        assert_eq!([6, 8], ends);
        assert_float_eq!(candidate.cost, 0.0, 1e-12);
        assert!((candidate.target - dvec3(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!(matches!(simp.try_collapse(candidate), Step::Collapsed(_)));
        assert_eq!(12, simp.mesh().num_live_faces());
        // Everything left has a real cost.
        let next = simp.next_candidate().expect("No candidates");
        assert!(next.cost > 1e-6);
        simp.mesh().check_topology().expect("Topology is broken");
    }

    #[test]
    fn t_target_above_face_count() {
        for target in [20, 100] {
            let mut mesh = TriMesh::icosahedron(1.0).expect("Cannot create icosahedron");
            let before = mesh.triangles();
            let points = mesh.points().to_vec();
            let summary = simplify(&mut mesh, params(target)).expect("Simplification failed");
            assert_eq!(0, summary.collapses);
            assert_eq!(0, summary.rejected);
            assert!(!summary.stopped_early);
            assert_eq!(before, mesh.triangles());
            assert_eq!(points, mesh.points());
        }
    }

    fn assert_quadrics_current(simp: &Simplifier) {
        let mesh = simp.mesh();
        for v in mesh.live_vertices() {
            let fresh = Quadric::of_vertex(mesh, v);
            assert!(
                simp.quadric(v).matrix().abs_diff_eq(*fresh.matrix(), 1e-12),
                "Stale quadric at {v}"
            );
        }
    }

    #[test]
    fn t_neighbor_quadrics_after_collapse() {
        let mut mesh = TriMesh::octahedron(1.0).expect("Cannot create octahedron");
        let mut simp = Simplifier::new(&mut mesh, params(0));
        let c = simp.next_candidate().expect("No candidates");
        let h = c.halfedge;
        let apexes = [h.next(simp.mesh()), h.opposite().next(simp.mesh())]
            .map(|nh| nh.head(simp.mesh()));
        assert!(matches!(simp.try_collapse(c), Step::Collapsed(_)));
        for v in apexes {
            // Each apex lost one of its four triangles.
            assert_eq!(3, simp.mesh().vf_ccw_iter(v).count());
        }
        assert_quadrics_current(&simp);
    }

    #[test]
    fn t_popped_costs_are_current() {
        let mut mesh = sphere(320);
        let mut simp = Simplifier::new(&mut mesh, params(0));
        while simp.mesh().num_live_faces() > 100 {
            let Some(c) = simp.next_candidate() else {
                panic!("Ran out of candidates");
            };
            let mesh = simp.mesh();
            let h = c.halfedge;
            let (v0, v1) = (h.tail(mesh), h.head(mesh));
            let fresh = evaluate(
                &Quadric::of_vertex(mesh, v0),
                &Quadric::of_vertex(mesh, v1),
                mesh.point(v0),
                mesh.point(v1),
                super::DET_EPSILON,
            );
            assert_float_eq!(fresh.cost, c.cost, 1e-9 * (1.0 + c.cost.abs()));
            assert!((fresh.placement.position() - c.target).length() < 1e-9);
            simp.try_collapse(c);
        }
        assert_quadrics_current(&simp);
        assert!(simp.queued() > 0);
    }

    #[test]
    fn t_sphere_reaches_target() {
        let mut mesh = sphere(320);
        let area = mesh.area();
        let summary = simplify(&mut mesh, params(50)).expect("Simplification failed");
        assert_eq!(320, summary.initial_faces);
        assert!(summary.final_faces <= 50);
        assert!(!summary.stopped_early);
        // A closed mesh loses two faces per collapse.
        assert_eq!(320 - 2 * summary.collapses, summary.final_faces);
        assert!(summary.stale > 0);
        mesh.check_topology().expect("Topology is broken");
        assert!(mesh.edges().all(|e| !mesh.is_boundary_edge(e)));
        // The shape stays close to the unit sphere.
        assert!((mesh.area() - area).abs() < 0.25 * area);
        for v in mesh.vertices() {
            assert!((mesh.point(v).length() - 1.0).abs() < 0.25);
        }
    }

    #[test]
    fn t_finish_is_final() {
        let mut mesh = sphere(80);
        let mut simp = Simplifier::new(&mut mesh, params(40));
        assert_eq!(Phase::Collapsing, simp.phase());
        simp.run(40);
        let summary = simp.finish().expect("Garbage collection failed");
        assert_eq!(Phase::Done, simp.phase());
        assert_eq!(None, simp.next_candidate());
        assert_eq!(Step::Exhausted, simp.step());
        assert_eq!(0, simp.run(0));
        // Compacting again does not change anything.
        let again = simp.finish().expect("Garbage collection failed");
        assert_eq!(summary, again);
    }

    #[test]
    fn t_summary_display() {
        let mut mesh = TriMesh::flat_quad(1.0).expect("Cannot create quad");
        let summary = simplify(&mut mesh, params(1)).expect("Simplification failed");
        assert_eq!(
            "2 -> 2 faces (target 1), 0 collapses, 5 rejected, 0 stale, stopped early",
            format!("{summary}")
        );
    }
}
