//! Physical constants (SI) and EQGFT model parameters.

/// Reduced Planck constant [J·s]
pub const HBAR: f64 = 1.054_571_817e-34;

/// Speed of light in vacuum [m/s]
pub const C: f64 = 299_792_458.0;

/// Elementary charge [C]
pub const E_CHARGE: f64 = 1.602_176_634e-19;

/// Electron rest mass [kg]
pub const M_E: f64 = 9.109_383_701_5e-31;

/// Fine structure constant
pub const ALPHA: f64 = 0.007_297_352_569_3;

/// EQGFT mass scale: 275 keV/c² expressed in kg.
pub const M_EQGFT: f64 = 275.0e3 * E_CHARGE / (C * C);

/// Default coupling κ in 𝒜 = κα.
pub const DEFAULT_KAPPA: f64 = 0.20;

/// Default systematic error on a measured asymmetry.
pub const DEFAULT_SYS_ERROR: f64 = 1e-4;

/// Two-sided significance level of the reported intervals (95% CL).
pub const INTERVAL_ALPHA: f64 = 0.05;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-12;
