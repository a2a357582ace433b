//! Monte Carlo emulation of the polarization-asymmetry counting experiment.

use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_KAPPA, DEFAULT_SYS_ERROR};
use crate::error::{EqgftError, Result};
use crate::physics::polarization_asymmetry;

/// Event count of the demo report run.
pub const DEFAULT_EVENTS: u64 = 50_000;

/// Parameters of one simulated run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub n_events: u64,
    pub kappa: f64,
    pub systematic_error: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_events: DEFAULT_EVENTS,
            kappa: DEFAULT_KAPPA,
            systematic_error: DEFAULT_SYS_ERROR,
        }
    }
}

impl ExperimentConfig {
    pub fn simulate(&self, rng: &mut impl Rng) -> Result<SimulationResult> {
        simulate(self.n_events, self.kappa, self.systematic_error, rng)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub n_events: u64,
    pub n_plus: u64,
    pub n_minus: u64,
    pub a_true: f64,
    pub a_meas: f64,
    pub stat_error: f64,
    pub sys_error: f64,
    pub total_error: f64,
    pub significance_vs_qed: f64,
    /// |A_meas − κα| within one combined-error band.
    pub consistent_with_eqgft: bool,
    /// |A_meas| within one combined-error band (QED predicts A = 0).
    pub consistent_with_qed: bool,
}

/// Measured asymmetry (N₊ − N₋) / N. The sum is taken in f64 so any pair
/// of counts is accepted.
pub fn asymmetry(n_plus: u64, n_minus: u64) -> f64 {
    let n = n_plus as f64 + n_minus as f64;
    (n_plus as f64 - n_minus as f64) / n
}

/// Binomial error on an asymmetry: √((1 − A²) / N).
pub fn statistical_error(a: f64, n: u64) -> f64 {
    ((1.0 - a * a) / n as f64).sqrt()
}

/// Statistical and systematic errors combined in quadrature.
pub fn combine_errors(stat: f64, sys: f64) -> f64 {
    stat.hypot(sys)
}

/// |A| / σ, or +∞ when the combined error vanishes.
pub fn significance(a: f64, total_error: f64) -> f64 {
    if total_error > 0.0 {
        a.abs() / total_error
    } else {
        f64::INFINITY
    }
}

/// Run one counting experiment of `n_events` with true asymmetry κα.
///
/// N₊ is a single draw from Binomial(N, (1 + A)/2). The caller owns the
/// random source, so seeding it makes the run reproducible.
pub fn simulate(
    n_events: u64,
    kappa: f64,
    sys_error: f64,
    rng: &mut impl Rng,
) -> Result<SimulationResult> {
    if n_events == 0 {
        return Err(EqgftError::InvalidParameter(
            "simulation needs at least one event".into(),
        ));
    }
    if sys_error.is_nan() || sys_error < 0.0 {
        return Err(EqgftError::InvalidParameter(format!(
            "systematic error must be non-negative, got {sys_error}"
        )));
    }

    let a_true = polarization_asymmetry(kappa);
    let p_plus = (1.0 + a_true) / 2.0;
    let sampler = Binomial::new(n_events, p_plus)
        .map_err(|e| EqgftError::distribution("binomial sampler", e))?;

    let n_plus = sampler.sample(rng);
    let n_minus = n_events - n_plus;

    let a_meas = asymmetry(n_plus, n_minus);
    let stat_error = statistical_error(a_meas, n_events);
    let total_error = combine_errors(stat_error, sys_error);

    Ok(SimulationResult {
        n_events,
        n_plus,
        n_minus,
        a_true,
        a_meas,
        stat_error,
        sys_error,
        total_error,
        significance_vs_qed: significance(a_meas, total_error),
        consistent_with_eqgft: (a_meas - a_true).abs() <= total_error,
        consistent_with_qed: a_meas.abs() <= total_error,
    })
}
