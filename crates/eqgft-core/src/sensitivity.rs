//! Expected discovery reach of the asymmetry measurement as a function of
//! the number of recorded events.

use serde::{Deserialize, Serialize};

use crate::error::{EqgftError, Result};

/// Discovery threshold drawn on the sensitivity plot.
pub const DISCOVERY_SIGMA: f64 = 5.0;

/// Event count of the planned run, marked on the sensitivity plot.
pub const PLANNED_EVENTS: f64 = 200_000.0;

/// Expected significance σ(N) = |𝒜| / √((1 − 𝒜²)/N) over a log sweep of N.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensitivityCurve {
    pub asymmetry: f64,
    /// (N, σ) pairs with N increasing geometrically.
    pub points: Vec<(f64, f64)>,
}

/// Expected significance for `n` events of true asymmetry `a`,
/// statistical error only.
pub fn expected_significance(a: f64, n: f64) -> f64 {
    a.abs() / ((1.0 - a * a) / n).sqrt()
}

/// Events needed for `a` to reach `sigma`: N = σ²(1 − 𝒜²)/𝒜².
pub fn events_for_significance(a: f64, sigma: f64) -> f64 {
    sigma * sigma * (1.0 - a * a) / (a * a)
}

/// Sweep N over `steps` log-spaced values from `n_min` to `n_max`.
pub fn sensitivity_curve(a: f64, n_min: f64, n_max: f64, steps: usize) -> Result<SensitivityCurve> {
    if !(n_min > 0.0 && n_max > n_min) {
        return Err(EqgftError::InvalidParameter(format!(
            "sweep needs 0 < n_min < n_max, got {n_min}..{n_max}"
        )));
    }
    if steps < 2 {
        return Err(EqgftError::InvalidParameter(format!(
            "sweep needs at least 2 steps, got {steps}"
        )));
    }

    let (lo, hi) = (n_min.log10(), n_max.log10());
    let points = (0..steps)
        .map(|i| {
            let n = 10f64.powf(lo + (hi - lo) * i as f64 / (steps - 1) as f64);
            (n, expected_significance(a, n))
        })
        .collect();

    Ok(SensitivityCurve {
        asymmetry: a,
        points,
    })
}

/// Default sweep of the report: 10³ to 10⁶ events, 50 points.
pub fn default_sensitivity_curve(a: f64) -> Result<SensitivityCurve> {
    sensitivity_curve(a, 1e3, 1e6, 50)
}

impl SensitivityCurve {
    /// First swept N whose expected significance reaches `sigma`.
    pub fn first_reaching(&self, sigma: f64) -> Option<f64> {
        self.points.iter().find(|(_, s)| *s >= sigma).map(|(n, _)| *n)
    }
}
