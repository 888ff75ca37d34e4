use super::quadric::Quadric;
use glam::{DMat4, DVec3, DVec4};

/// Threshold on the determinant of the placement system below which the
/// combined quadric is treated as singular.
pub const DET_EPSILON: f64 = 1e-12;

/// Discrete candidate positions tried when the optimal position cannot be
/// solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    First,
    Second,
    Midpoint,
}

/// Where the merged vertex goes after a collapse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// The position minimizing the combined quadric error.
    Solved(DVec3),
    /// The combined quadric is singular, and the cheapest of the discrete
    /// candidates was picked.
    Fallback(DVec3, Candidate),
}

impl Placement {
    pub fn position(&self) -> DVec3 {
        match self {
            Placement::Solved(p) | Placement::Fallback(p, _) => *p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseCost {
    pub cost: f64,
    pub placement: Placement,
}

/// The cost of merging two vertices with quadrics `q0` and `q1`, positioned
/// at `p0` and `p1`.
///
/// The optimal position minimizes `xᵗ (q0 + q1) x`, found by solving the
/// linear system made of the first three rows of the combined quadric and
/// `(0, 0, 0, 1)` as the last row. If the determinant of that system is not
/// above `det_epsilon`, the error is instead evaluated at both endpoints and
/// the midpoint, and the smallest wins. Ties go to the first endpoint, then
/// the second.
pub fn evaluate(q0: &Quadric, q1: &Quadric, p0: DVec3, p1: DVec3, det_epsilon: f64) -> CollapseCost {
    let q = *q0 + *q1;
    let m = q.matrix();
    let system = DMat4::from_cols(m.row(0), m.row(1), m.row(2), DVec4::W).transpose();
    if system.determinant().abs() > det_epsilon {
        let target = system.inverse() * DVec4::W;
        return CollapseCost {
            cost: q.form(target),
            placement: Placement::Solved(target.truncate()),
        };
    }
    let mid = (p0 + p1) * 0.5;
    let (e0, e1, e2) = (q.error(p0), q.error(p1), q.error(mid));
    let (cost, pos, candidate) = if e0 <= e1 && e0 <= e2 {
        (e0, p0, Candidate::First)
    } else if e1 <= e0 && e1 <= e2 {
        (e1, p1, Candidate::Second)
    } else {
        (e2, mid, Candidate::Midpoint)
    };
    CollapseCost {
        cost,
        placement: Placement::Fallback(pos, candidate),
    }
}
