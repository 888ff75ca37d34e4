use glam::{DVec3, DVec4};

/// Cross product length below which a triangle is considered degenerate.
pub const PLANE_EPSILON: f64 = 1e-12;

/// The plane through a triangle as `(a, b, c, d)`, where `(a, b, c)` is the
/// unit normal following the counter-clockwise winding of the points, and
/// `ax + by + cz + d = 0` holds on the plane.
///
/// Zero-area triangles, i.e. with collinear or coincident points, have no
/// well-defined normal and produce the zero vector.
pub fn face_plane(p0: DVec3, p1: DVec3, p2: DVec3) -> DVec4 {
    face_plane_with_epsilon(p0, p1, p2, PLANE_EPSILON)
}

/// Same as [`face_plane`], with a custom threshold for degeneracy.
pub fn face_plane_with_epsilon(p0: DVec3, p1: DVec3, p2: DVec3, epsilon: f64) -> DVec4 {
    let n = (p1 - p0).cross(p2 - p0);
    let len = n.length();
    if len < epsilon {
        return DVec4::ZERO;
    }
    let n = n / len;
    n.extend(-n.dot(p0))
}
