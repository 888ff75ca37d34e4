use super::plane::{face_plane_with_epsilon, PLANE_EPSILON};
use crate::{element::VH, mesh::TriMesh};
use glam::{DMat4, DVec3, DVec4};
use std::{
    iter::Sum,
    ops::{Add, AddAssign},
};
use tracing::debug;

/// Symmetric 4x4 matrix accumulating squared distances to a set of planes.
///
/// For a plane `p = (a, b, c, d)` the quadric is the outer product `p pᵗ`, and
/// the squared distance of a point `x` to the plane is `[x 1] Q [x 1]ᵗ`.
/// Quadrics of several planes add up to measure the sum of squared distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric(DMat4);

impl Default for Quadric {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Quadric {
    pub const ZERO: Self = Quadric(DMat4::ZERO);

    pub fn from_plane(plane: DVec4) -> Self {
        Quadric(DMat4::from_cols(
            plane * plane.x,
            plane * plane.y,
            plane * plane.z,
            plane * plane.w,
        ))
    }

    /// Sum of the quadrics of the faces incident on the vertex.
    pub fn of_vertex(mesh: &TriMesh, v: VH) -> Self {
        Self::of_vertex_with_epsilon(mesh, v, PLANE_EPSILON)
    }

    /// Same as [`Self::of_vertex`], with a custom threshold for degenerate
    /// faces. Degenerate faces contribute nothing.
    pub fn of_vertex_with_epsilon(mesh: &TriMesh, v: VH, epsilon: f64) -> Self {
        mesh.vf_ccw_iter(v)
            .map(|f| {
                let [p0, p1, p2] = mesh.face_points(f);
                let plane = face_plane_with_epsilon(p0, p1, p2, epsilon);
                if plane == DVec4::ZERO {
                    debug!(face = %f, vertex = %v, "Degenerate face has no plane");
                }
                Self::from_plane(plane)
            })
            .sum()
    }

    pub fn matrix(&self) -> &DMat4 {
        &self.0
    }

    /// Evaluate `[p 1] Q [p 1]ᵗ`.
    pub fn error(&self, p: DVec3) -> f64 {
        self.form(p.extend(1.0))
    }

    /// Evaluate `hᵗ Q h` for a homogeneous point.
    pub fn form(&self, h: DVec4) -> f64 {
        h.dot(self.0 * h)
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Quadric {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Quadric(self.0 + rhs.0)
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Quadric {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, q| acc + q)
    }
}
