/*!
Triangle mesh simplification using the quadric error metric of Garland and
Heckbert.

# Overview

+ [`TriMesh`] stores a manifold triangle mesh in a halfedge data structure.
  Vertex positions are [`glam::DVec3`]. Meshes are created from index
  triplets, from the builtin primitives such as [`TriMesh::icosahedron`], or
  loaded from Wavefront OBJ files with [`TriMesh::load_obj`].

+ Edges are collapsed by merging the tail of a halfedge into its head. Deleted
  elements stay in storage, with their handles intact, until
  [`TriMesh::garbage_collection`] is called.

+ [`Simplifier`] repeatedly collapses the edge with the smallest quadric
  error, until the mesh has the requested number of faces. [`simplify`] runs
  all of it in one call:

```
use qemesh::{simplify, SimplifyParams, TriMesh};

let mut mesh = TriMesh::icosahedron(1.0)
    .and_then(|m| m.subdivide_to_face_count(500))
    .unwrap();
let summary = simplify(&mut mesh, SimplifyParams::default().with_target_faces(100)).unwrap();
assert!(summary.final_faces <= 100);
assert_eq!(summary.final_faces, mesh.num_faces());
```
*/

mod check;
mod collapse;
mod decimate;
mod element;
mod error;
mod iterator;
mod macros;
mod mesh;
mod obj;
mod primitive;
mod status;
mod subdiv;
mod topol;

pub use decimate::{
    evaluate, face_plane, face_plane_with_epsilon, simplify, Candidate, CollapseCost,
    EdgeCollapse, Phase, Placement, Quadric, Simplifier, SimplifyParams, Step, Summary,
    DET_EPSILON, PLANE_EPSILON,
};
pub use element::{Handle, HasTopology, EH, FH, HH, VH};
pub use error::Error;
pub use mesh::TriMesh;
pub use status::Status;
pub use topol::Topology;
