use crate::{error::Error, mesh::TriMesh};
use glam::{dvec3, DVec3};

/// Platonic solids.
impl TriMesh {
    /// Create a tetrahedron centered at the origin. The vertices of the mesh
    /// lie on the sphere of the given radius.
    pub fn tetrahedron(radius: f64) -> Result<Self, Error> {
        let a = radius * (1.0f64 / 3.0);
        let b = radius * (8.0 / 9.0f64).sqrt();
        let c = radius * (2.0 / 9.0f64).sqrt();
        let d = radius * (2.0 / 3.0f64).sqrt();
        Self::from_triangles(
            vec![
                dvec3(0.0, 0.0, radius),
                dvec3(-c, d, -a),
                dvec3(-c, -d, -a),
                dvec3(b, 0.0, -a),
            ],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 1], [3, 2, 1]],
        )
    }

    /// Create an octahedron centered at the origin, with its vertices on the
    /// coordinate axes at the given distance.
    pub fn octahedron(radius: f64) -> Result<Self, Error> {
        Self::from_triangles(
            vec![
                dvec3(radius, 0.0, 0.0),
                dvec3(0.0, radius, 0.0),
                dvec3(-radius, 0.0, 0.0),
                dvec3(0.0, -radius, 0.0),
                dvec3(0.0, 0.0, radius),
                dvec3(0.0, 0.0, -radius),
            ],
            &[
                [0, 4, 3],
                [1, 4, 0],
                [2, 4, 1],
                [3, 4, 2],
                [3, 5, 0],
                [0, 5, 1],
                [1, 5, 2],
                [2, 5, 3],
            ],
        )
    }

    /// Create an icosahedron centered at the origin. The vertices of the mesh
    /// lie on the sphere of the given radius.
    pub fn icosahedron(radius: f64) -> Result<Self, Error> {
        const A: f64 = 0.5257311121191336;
        const B: f64 = 0.8506508083520399;
        let points: Vec<DVec3> = [
            (0.0, A, -B),
            (A, B, 0.0),
            (-A, B, 0.0),
            (0.0, A, B),
            (0.0, -A, B),
            (-B, 0.0, A),
            (0.0, -A, -B),
            (B, 0.0, -A),
            (B, 0.0, A),
            (-B, 0.0, -A),
            (A, -B, 0.0),
            (-A, -B, 0.0),
        ]
        .iter()
        .map(|&(x, y, z)| dvec3(x, y, z) * radius)
        .collect();
        Self::from_triangles(
            points,
            &[
                [2, 1, 0],
                [1, 2, 3],
                [5, 4, 3],
                [4, 8, 3],
                [7, 6, 0],
                [6, 9, 0],
                [11, 10, 4],
                [10, 11, 6],
                [9, 5, 2],
                [5, 9, 11],
                [8, 7, 1],
                [7, 8, 10],
                [2, 5, 3],
                [8, 1, 3],
                [9, 2, 0],
                [1, 7, 0],
                [11, 9, 6],
                [7, 10, 6],
                [5, 11, 4],
                [10, 8, 4],
            ],
        )
    }
}

impl TriMesh {
    /// A square of the given size in the XY plane, split into two triangles
    /// along the diagonal from the origin.
    /// ```text
    ///    3-----------2
    ///    |         / |
    ///    |       /   |
    ///    |     /     |
    ///    |   /       |
    ///    | /         |
    ///    0-----------1
    /// ```
    pub fn flat_quad(size: f64) -> Result<Self, Error> {
        Self::from_triangles(
            vec![
                dvec3(0.0, 0.0, 0.0),
                dvec3(size, 0.0, 0.0),
                dvec3(size, size, 0.0),
                dvec3(0.0, size, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
    }
}
