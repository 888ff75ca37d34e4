use crate::element::{EH, FH, HH, VH};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Construction.
    #[error("Mesh has no faces")]
    EmptyMesh,
    #[error("Face {face} refers to vertex {vertex}, but the mesh only has {count} vertices")]
    InvalidVertexIndex {
        face: usize,
        vertex: usize,
        count: usize,
    },
    #[error("Face {0} repeats a vertex")]
    DegenerateFace(usize),
    #[error("Face {face} has {arity} vertices, only triangles are supported")]
    NonTriangleFace { face: usize, arity: usize },
    #[error("Vertex {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),
    // Topology.
    #[error("{0} is not manifold")]
    ComplexVertex(VH),
    #[error("{0} is shared by more than two faces")]
    ComplexHalfedge(HH),
    #[error("{0} points to an invalid halfedge")]
    InvalidHalfedge(HH),
    #[error("{0} is deleted but still referenced")]
    DeletedHalfedge(HH),
    #[error("{0} is deleted but still referenced")]
    DeletedVertex(VH),
    #[error("{0} is deleted but still referenced")]
    DeletedEdge(EH),
    #[error("{0} is deleted but still referenced")]
    DeletedFace(FH),
    #[error("{0} starts and ends at the same vertex")]
    DegenerateHalfedge(HH),
    #[error("Outgoing halfedge of {0} is not a boundary halfedge")]
    OutgoingHalfedgeNotBoundary(VH),
    #[error("Outgoing halfedges of {0} are inconsistent")]
    InvalidOutgoingHalfedges(VH),
    #[error("Links of {0} are inconsistent")]
    InvalidHalfedgeLink(HH),
    #[error("{0} is not found around its vertices")]
    InvalidHalfedgeVertexLink(HH),
    #[error("Loop through {0} is broken")]
    InvalidLoopTopology(HH),
    #[error("Loop through {0} has inconsistent faces")]
    InconsistentFaceInLoop(HH),
    #[error("{0} and {1} are not linked")]
    InvalidFaceHalfedgeLink(FH, HH),
    #[error("{0} has {1} vertices, expected a triangle")]
    NotATriangle(FH, usize),
    // Obj.
    #[error("Invalid obj file: {0}")]
    InvalidObjFile(PathBuf),
    #[error("Failed to load obj: {0}")]
    ObjLoadFailed(String),
    #[error("Incorrect number of coordinates: {0}")]
    IncorrectNumberOfCoordinates(usize),
    #[error("Failed to write obj: {0}")]
    ObjWriteFailed(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn t_error_display() {
        let err = Error::NonTriangleFace { face: 3, arity: 4 };
        assert_eq!(
            "Face 3 has 4 vertices, only triangles are supported",
            format!("{err}")
        );
        let err = Error::ComplexVertex(5u32.into());
        assert!(format!("{err}").contains("VH(5)"));
    }
}
