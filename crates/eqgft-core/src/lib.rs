//! EQGFT (effective quaternion geometric field theory) toolkit core.
//!
//! Quaternionic field samples on S³, the analytic N_H = 1 hopfion,
//! closed-form zitterbewegung and asymmetry predictions, a Monte Carlo
//! counting experiment, and the statistics used to read it out.
//!
//! Zero I/O: every random draw goes through a caller-supplied `rand::Rng`.

pub mod analysis;
pub mod constants;
pub mod error;
pub mod experiment;
pub mod field;
pub mod physics;
pub mod quaternion;
pub mod sensitivity;

pub use analysis::{AnalysisResult, analyze, clopper_pearson, null_band};
pub use constants::{ALPHA, DEFAULT_KAPPA, DEFAULT_SYS_ERROR, M_EQGFT};
pub use error::{EqgftError, Result};
pub use experiment::{ExperimentConfig, SimulationResult, simulate};
pub use field::{HopfionField, generate_q_field, hopf_ring, hopfion_field, hopfion_initial_guess};
pub use physics::{
    critical_field, fine_structure_from_m, polarization_asymmetry, zitterbewegung_amplitude,
    zitterbewegung_frequency,
};
pub use quaternion::Quaternion;
pub use sensitivity::{
    SensitivityCurve, default_sensitivity_curve, events_for_significance, sensitivity_curve,
};
