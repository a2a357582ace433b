//! Closed-form EQGFT predictions.

use std::f64::consts::PI;

use crate::constants::{ALPHA, C, E_CHARGE, HBAR, M_E};

/// ω_z = 2 mₑ c² / ħ [Hz]
pub fn zitterbewegung_frequency() -> f64 {
    2.0 * M_E * C * C / HBAR
}

/// λ_z = ħ / (2 mₑ c) [m]
pub fn zitterbewegung_amplitude() -> f64 {
    HBAR / (2.0 * M_E * C)
}

/// α(M) = (M / (2π mₑ))²
pub fn fine_structure_from_m(m: f64) -> f64 {
    (m / (2.0 * PI * M_E)).powi(2)
}

/// E_crit = M² c³ / (e ħ) [V/m]
pub fn critical_field(m: f64) -> f64 {
    m * m * C.powi(3) / (E_CHARGE * HBAR)
}

/// 𝒜 = κ α
pub fn polarization_asymmetry(kappa: f64) -> f64 {
    kappa * ALPHA
}
