//! Quaternionic field generators: random S³ samples and the analytic
//! N_H = 1 hopfion on a cubic lattice.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EqgftError, Result};
use crate::quaternion::{Quaternion, det4};

/// Default lattice used by the demo report: 20³ points over [-5, 5]³.
pub const DEFAULT_GRID_SIDE: usize = 20;
pub const DEFAULT_GRID_EXTENT: f64 = 5.0;

/// Default soliton core scale R.
pub const DEFAULT_CORE_RADIUS: f64 = 1.0;

/// Draw `n` field samples from two independent uniform angles.
///
/// The raw components `amp·(cos φ₁, sin φ₁ cos φ₂, sin φ₁ sin φ₂, sin φ₂)`
/// do not lie on S³ on their own, so each sample is normalized. Only the
/// sign of `amp` survives normalization, so the angle terms are scaled by
/// `amp.signum()` and |q| = 1 for every amplitude, however large. A zero
/// or NaN amplitude yields the identity.
pub fn generate_q_field(n: usize, amp: f64, rng: &mut impl Rng) -> Vec<Quaternion> {
    if amp == 0.0 || amp.is_nan() {
        return vec![Quaternion::identity(); n];
    }
    let sign = amp.signum();
    (0..n)
        .map(|_| {
            let phi1 = rng.random_range(0.0..TAU);
            let phi2 = rng.random_range(0.0..TAU);
            // |raw|² = 1 + sin² φ₂, never degenerate.
            Quaternion::new(
                sign * phi1.cos(),
                sign * phi1.sin() * phi2.cos(),
                sign * phi1.sin() * phi2.sin(),
                sign * phi2.sin(),
            )
        })
        .collect()
}

/// Closed reference curve (cos t, sin t, sin 2t), t ∈ [0, 2π], for
/// drawing the hopfion's linking ring.
pub fn hopf_ring(n: usize) -> Vec<[f64; 3]> {
    linspace(0.0, TAU, n)
        .into_iter()
        .map(|t| [t.cos(), t.sin(), (2.0 * t).sin()])
        .collect()
}

/// Analytic hopfion approximation at position `r` with core scale `big_r`.
///
/// Inverse stereographic projection R³ → S³: with a = R / (ρ² + R²),
/// Q = ((ρ² − R²)·a, 2Rx·a, 2Ry·a, 2Rz·a), renormalized against rounding.
pub fn hopfion_initial_guess(r: [f64; 3], big_r: f64) -> Quaternion {
    let [x, y, z] = r;
    let rho2 = x * x + y * y + z * z;
    let a = big_r / (rho2 + big_r * big_r);
    Quaternion::new(
        (rho2 - big_r * big_r) * a,
        2.0 * big_r * x * a,
        2.0 * big_r * y * a,
        2.0 * big_r * z * a,
    )
}

/// Hopfion field sampled on `linspace(-extent, extent, side)³`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HopfionField {
    pub side: usize,
    pub extent: f64,
    pub spacing: f64,
    /// Lattice points in `ij` order: x varies slowest, z fastest.
    pub positions: Vec<[f64; 3]>,
    pub values: Vec<Quaternion>,
}

/// Evaluate [`hopfion_initial_guess`] on a cubic lattice.
///
/// At least three points per side are needed for the central differences
/// in [`HopfionField::topological_charge`].
pub fn hopfion_field(side: usize, extent: f64, big_r: f64) -> Result<HopfionField> {
    if side < 3 {
        return Err(EqgftError::InvalidParameter(format!(
            "grid side must be at least 3, got {side}"
        )));
    }
    if extent.is_nan() || extent <= 0.0 {
        return Err(EqgftError::InvalidParameter(format!(
            "grid extent must be positive, got {extent}"
        )));
    }

    let axis = linspace(-extent, extent, side);
    let spacing = axis[1] - axis[0];

    let mut positions = Vec::with_capacity(side.pow(3));
    for &x in &axis {
        for &y in &axis {
            for &z in &axis {
                positions.push([x, y, z]);
            }
        }
    }
    let values = positions
        .iter()
        .map(|&r| hopfion_initial_guess(r, big_r))
        .collect();

    Ok(HopfionField {
        side,
        extent,
        spacing,
        positions,
        values,
    })
}

impl HopfionField {
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.side + j) * self.side + k
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numerical S³ degree of the field:
    /// (1 / 2π²) Σ det[Q, ∂ₓQ, ∂ᵧQ, ∂𝓏Q] dx³ over interior lattice points.
    ///
    /// The sign follows the lattice orientation; the analytic hopfion gives
    /// a value near −1 whose magnitude approaches 1 as the grid is refined
    /// and enlarged.
    pub fn topological_charge(&self) -> f64 {
        let n = self.side;
        let h2 = 2.0 * self.spacing;
        let mut total = 0.0;
        for i in 1..n - 1 {
            for j in 1..n - 1 {
                for k in 1..n - 1 {
                    let q = self.values[self.index(i, j, k)];
                    let dx = (self.values[self.index(i + 1, j, k)]
                        - self.values[self.index(i - 1, j, k)])
                        .scale(1.0 / h2);
                    let dy = (self.values[self.index(i, j + 1, k)]
                        - self.values[self.index(i, j - 1, k)])
                        .scale(1.0 / h2);
                    let dz = (self.values[self.index(i, j, k + 1)]
                        - self.values[self.index(i, j, k - 1)])
                        .scale(1.0 / h2);
                    total += det4([q, dx, dy, dz]);
                }
            }
        }
        total * self.spacing.powi(3) / (2.0 * PI * PI)
    }
}

/// `n` evenly spaced values over the closed interval [start, end].
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn assert_unit(q: Quaternion) {
        assert!(
            (q.norm() - 1.0).abs() < 1e-9,
            "sample not on S³: |q| = {}",
            q.norm()
        );
    }

    #[test]
    fn test_q_field_samples_are_unit() {
        let mut rng = rng();
        for amp in [1.0, 0.25, 3.0, -2.0, 1e-6, 1e160, 1e200, -1e300, f64::INFINITY] {
            let samples = generate_q_field(500, amp, &mut rng);
            assert_eq!(samples.len(), 500);
            samples.into_iter().for_each(assert_unit);
        }
    }

    #[test]
    fn test_q_field_zero_amplitude_is_identity() {
        let mut rng = rng();
        for q in generate_q_field(10, 0.0, &mut rng) {
            assert_eq!(q, Quaternion::identity());
        }
    }

    #[test]
    fn test_q_field_amplitude_only_contributes_its_sign() {
        let unit = generate_q_field(50, 1.0, &mut rng());
        let huge = generate_q_field(50, 1e200, &mut rng());
        let negative = generate_q_field(50, -0.5, &mut rng());
        assert_eq!(unit, huge);
        for (u, n) in unit.iter().zip(&negative) {
            assert_eq!(*n, u.scale(-1.0));
        }
    }

    #[test]
    fn test_q_field_nan_amplitude_is_identity() {
        for q in generate_q_field(5, f64::NAN, &mut rng()) {
            assert_eq!(q, Quaternion::identity());
        }
    }

    #[test]
    fn test_q_field_covers_both_hemispheres() {
        let mut rng = rng();
        let samples = generate_q_field(1000, 1.0, &mut rng);
        assert!(samples.iter().any(|q| q.w > 0.5));
        assert!(samples.iter().any(|q| q.w < -0.5));
        assert!(samples.iter().any(|q| q.z > 0.5));
        assert!(samples.iter().any(|q| q.z < -0.5));
    }

    #[test]
    fn test_q_field_seeded_is_reproducible() {
        let a = generate_q_field(20, 1.0, &mut rng());
        let b = generate_q_field(20, 1.0, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_hopfion_limits() {
        // Core maps to the south pole, infinity to the north pole.
        assert_eq!(
            hopfion_initial_guess([0.0, 0.0, 0.0], 1.0),
            Quaternion::new(-1.0, 0.0, 0.0, 0.0)
        );
        let far = hopfion_initial_guess([1e6, 0.0, 0.0], 1.0);
        assert!((far.w - 1.0).abs() < 1e-9);
        // ρ = R lands on the equator.
        let eq = hopfion_initial_guess([0.0, 1.0, 0.0], 1.0);
        assert_eq!(eq, Quaternion::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn test_hopfion_field_layout() {
        let field = hopfion_field(5, 2.0, 1.0).unwrap();
        assert_eq!(field.len(), 125);
        assert!((field.spacing - 1.0).abs() < 1e-12);
        assert_eq!(field.positions[0], [-2.0, -2.0, -2.0]);
        assert_eq!(field.positions[1], [-2.0, -2.0, -1.0]);
        assert_eq!(field.positions[124], [2.0, 2.0, 2.0]);
        // Centre of an odd lattice is the origin.
        assert_eq!(field.positions[62], [0.0, 0.0, 0.0]);
        field.values.iter().copied().for_each(assert_unit);
    }

    #[test]
    fn test_hopfion_field_rejects_small_grid() {
        assert!(matches!(
            hopfion_field(2, 5.0, 1.0),
            Err(EqgftError::InvalidParameter(_))
        ));
        assert!(hopfion_field(10, 0.0, 1.0).is_err());
        assert!(hopfion_field(10, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_topological_charge_fine_grid() {
        let field = hopfion_field(41, 5.0, 1.0).unwrap();
        let charge = field.topological_charge();
        assert!(
            (charge.abs() - 1.0).abs() < 0.15,
            "expected |N| ≈ 1, got {charge}"
        );
        assert!(charge < 0.0, "lattice orientation gives a negative degree");
    }

    #[test]
    fn test_topological_charge_improves_with_refinement() {
        let coarse = hopfion_field(DEFAULT_GRID_SIDE, DEFAULT_GRID_EXTENT, DEFAULT_CORE_RADIUS)
            .unwrap()
            .topological_charge();
        let fine = hopfion_field(41, DEFAULT_GRID_EXTENT, DEFAULT_CORE_RADIUS)
            .unwrap()
            .topological_charge();
        assert!(coarse.abs() > 0.5, "coarse estimate too small: {coarse}");
        assert!((fine.abs() - 1.0).abs() < (coarse.abs() - 1.0).abs());
    }

    #[test]
    fn test_topological_charge_constant_field_is_zero() {
        let mut field = hopfion_field(6, 1.0, 1.0).unwrap();
        field.values.fill(Quaternion::identity());
        assert!(field.topological_charge().abs() < 1e-12);
    }

    #[test]
    fn test_hopf_ring_closed() {
        let ring = hopf_ring(100);
        assert_eq!(ring.len(), 100);
        let first = ring[0];
        let last = ring[99];
        for d in 0..3 {
            assert!((first[d] - last[d]).abs() < 1e-12);
        }
        for p in &ring {
            assert!((p[0] * p[0] + p[1] * p[1] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(-1.0, 1.0, 5);
        assert_eq!(v, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
    }
}
