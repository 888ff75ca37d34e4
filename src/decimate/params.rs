use super::{cost::DET_EPSILON, plane::PLANE_EPSILON};

/// Parameters of a simplification run.
///
/// ```
/// use qemesh::SimplifyParams;
///
/// let params = SimplifyParams::default()
///     .with_target_faces(500)
///     .with_det_epsilon(1e-10);
/// assert_eq!(500, params.target_faces);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyParams {
    /// Collapsing stops once the number of live faces is at or below this.
    pub target_faces: usize,
    /// Determinant threshold for solving the optimal vertex position.
    pub det_epsilon: f64,
    /// Cross product length below which a face has no plane.
    pub plane_epsilon: f64,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            target_faces: 0,
            det_epsilon: DET_EPSILON,
            plane_epsilon: PLANE_EPSILON,
        }
    }
}

impl SimplifyParams {
    #[must_use]
    pub fn with_target_faces(mut self, target: usize) -> Self {
        self.target_faces = target;
        self
    }

    #[must_use]
    pub fn with_det_epsilon(mut self, epsilon: f64) -> Self {
        self.det_epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_plane_epsilon(mut self, epsilon: f64) -> Self {
        self.plane_epsilon = epsilon;
        self
    }
}
