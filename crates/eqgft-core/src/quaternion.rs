use std::ops::Sub;

use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;

/// Field value Q(x) = w + i·x + j·y + k·z, a point on S³ once normalized.
///
/// `PartialEq` is tolerance-based; exact bitwise comparisons of field
/// samples are never meaningful after normalization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Quaternion {
    fn eq(&self, other: &Self) -> bool {
        (self.w - other.w).abs() < EPSILON
            && (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.z - other.z).abs() < EPSILON
    }
}

impl Quaternion {
    /// Create a new quaternion, automatically normalized.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }.normalize()
    }

    /// Create without normalizing. Used for raw field components and
    /// finite-difference derivatives, which are not points on S³.
    pub fn raw(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Identity quaternion (1, 0, 0, 0).
    pub fn identity() -> Self {
        Self::raw(1.0, 0.0, 0.0, 0.0)
    }

    /// Euclidean norm |q|.
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalize to unit length. Returns identity if near-zero magnitude.
    pub fn normalize(self) -> Self {
        let norm = self.norm();
        if norm < EPSILON {
            return Self::identity();
        }
        self.scale(1.0 / norm)
    }

    /// 4D dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn scale(self, s: f64) -> Self {
        Self::raw(self.w * s, self.x * s, self.y * s, self.z * s)
    }

    /// Convert to [q0, q1, q2, q3] array for serialization.
    pub fn to_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }
}

/// Component-wise difference; the result is not a point on S³.
impl Sub for Quaternion {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::raw(
            self.w - rhs.w,
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
        )
    }
}

/// Determinant of the 4×4 matrix whose rows are the given quaternions.
///
/// For a map into S³ with rows `[q, ∂ₓq, ∂ᵧq, ∂𝓏q]` this is the oriented
/// volume density pulled back from the sphere.
pub fn det4(rows: [Quaternion; 4]) -> f64 {
    let m = rows.map(Quaternion::to_array);
    // Laplace expansion along the first row over 3×3 minors.
    let minor = |col: usize| -> f64 {
        let mut sub = [[0.0; 3]; 3];
        for (r, row) in m.iter().skip(1).enumerate() {
            let mut c = 0;
            for (j, v) in row.iter().enumerate() {
                if j != col {
                    sub[r][c] = *v;
                    c += 1;
                }
            }
        }
        sub[0][0] * (sub[1][1] * sub[2][2] - sub[1][2] * sub[2][1])
            - sub[0][1] * (sub[1][0] * sub[2][2] - sub[1][2] * sub[2][0])
            + sub[0][2] * (sub[1][0] * sub[2][1] - sub[1][1] * sub[2][0])
    };
    (0..4)
        .map(|col| {
            let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
            sign * m[0][col] * minor(col)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit(q: Quaternion) {
        assert!(
            (q.norm() - 1.0).abs() < 1e-10,
            "quaternion not unit: norm = {}",
            q.norm()
        );
    }

    #[test]
    fn test_normalize() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
        assert_unit(q);
        assert!((q.w - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_near_zero() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn test_raw_keeps_magnitude() {
        let q = Quaternion::raw(3.0, 4.0, 0.0, 0.0);
        assert!((q.norm() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_dot_orthogonal() {
        let a = Quaternion::identity();
        let c = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        assert!(a.dot(c).abs() < EPSILON);
    }

    #[test]
    fn test_to_array_order() {
        let q = Quaternion::raw(0.1, -0.7, 0.3, 0.2);
        assert_eq!(q.to_array(), [0.1, -0.7, 0.3, 0.2]);
    }

    #[test]
    fn test_det4_identity_rows() {
        let rows = [
            Quaternion::raw(1.0, 0.0, 0.0, 0.0),
            Quaternion::raw(0.0, 1.0, 0.0, 0.0),
            Quaternion::raw(0.0, 0.0, 1.0, 0.0),
            Quaternion::raw(0.0, 0.0, 0.0, 1.0),
        ];
        assert!((det4(rows) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_det4_swap_flips_sign() {
        let rows = [
            Quaternion::raw(0.0, 1.0, 0.0, 0.0),
            Quaternion::raw(1.0, 0.0, 0.0, 0.0),
            Quaternion::raw(0.0, 0.0, 2.0, 0.0),
            Quaternion::raw(0.0, 0.0, 0.0, 3.0),
        ];
        assert!((det4(rows) + 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_det4_singular() {
        let q = Quaternion::raw(0.3, 0.1, -0.2, 0.5);
        let rows = [q, q.scale(2.0), Quaternion::raw(0.0, 1.0, 0.0, 0.0), Quaternion::identity()];
        assert!(det4(rows).abs() < 1e-12);
    }
}
