//! Counting-statistics analysis of raw ± counts.
//!
//! Two 95% intervals are produced for an observed asymmetry:
//!
//! - the exact Clopper–Pearson interval on the observed counts, which is the
//!   reported confidence interval and drives the consistency flags;
//! - the acceptance band of the null hypothesis N₊ = N₋, taken from the
//!   quantiles of Binomial(N, ½) and mapped through A = 2p − 1.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, Binomial, ContinuousCDF, DiscreteCDF};

use crate::constants::{DEFAULT_KAPPA, INTERVAL_ALPHA};
use crate::error::{EqgftError, Result};
use crate::experiment::{asymmetry, combine_errors, significance, statistical_error};
use crate::physics::polarization_asymmetry;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub asymmetry: f64,
    pub stat_error: f64,
    pub sys_error: f64,
    pub total_error: f64,
    /// Clopper–Pearson 95% interval on 𝒜, as [low, high].
    pub confidence_interval_95: [f64; 2],
    /// 95% acceptance band of 𝒜 under the null hypothesis p = ½.
    pub null_band_95: [f64; 2],
    pub eqgft_prediction: f64,
    pub consistent_with_eqgft: bool,
    pub consistent_with_qed: bool,
    pub sigma_deviation_from_qed: f64,
}

/// Map a probability of a positive outcome onto an asymmetry.
fn to_asymmetry(p: f64) -> f64 {
    2.0 * p - 1.0
}

/// Null-hypothesis band: `ppf(α/2)` and `ppf(1 − α/2)` of Binomial(N, ½),
/// divided by N and mapped to 𝒜.
///
/// `ppf(q)` is the smallest count k with CDF(k) ≥ q.
pub fn null_band(n: u64, alpha: f64) -> Result<[f64; 2]> {
    let null = Binomial::new(0.5, n).map_err(|e| EqgftError::distribution("binomial quantile", e))?;
    let k_low = null.inverse_cdf(alpha / 2.0);
    let k_high = null.inverse_cdf(1.0 - alpha / 2.0);
    Ok([
        to_asymmetry(k_low as f64 / n as f64),
        to_asymmetry(k_high as f64 / n as f64),
    ])
}

/// Exact Clopper–Pearson interval for `k` successes in `n` trials, on 𝒜.
///
/// Bounds come from the Beta quantiles `Beta(k, n − k + 1).ppf(α/2)` and
/// `Beta(k + 1, n − k).ppf(1 − α/2)`; the degenerate ends k = 0 and k = n
/// pin the bound to p = 0 and p = 1.
pub fn clopper_pearson(k: u64, n: u64, alpha: f64) -> Result<[f64; 2]> {
    if k > n {
        return Err(EqgftError::InvalidParameter(format!(
            "{k} successes out of {n} trials"
        )));
    }
    let p_low = if k == 0 {
        0.0
    } else {
        Beta::new(k as f64, (n - k + 1) as f64)
            .map_err(|e| EqgftError::distribution("beta quantile", e))?
            .inverse_cdf(alpha / 2.0)
    };
    let p_high = if k == n {
        1.0
    } else {
        Beta::new((k + 1) as f64, (n - k) as f64)
            .map_err(|e| EqgftError::distribution("beta quantile", e))?
            .inverse_cdf(1.0 - alpha / 2.0)
    };
    Ok([to_asymmetry(p_low), to_asymmetry(p_high)])
}

fn contains(interval: [f64; 2], value: f64) -> bool {
    interval[0] <= value && value <= interval[1]
}

/// Full analysis of a ± count pair against the EQGFT prediction (κ = 0.20)
/// and against QED (𝒜 = 0).
pub fn analyze(counts_plus: u64, counts_minus: u64, sys_error: f64) -> Result<AnalysisResult> {
    let n = counts_plus.checked_add(counts_minus).ok_or_else(|| {
        EqgftError::InvalidParameter(format!(
            "total count overflows: {counts_plus} + {counts_minus}"
        ))
    })?;
    if n == 0 {
        return Err(EqgftError::InvalidParameter(
            "analysis needs at least one count".into(),
        ));
    }
    if sys_error.is_nan() || sys_error < 0.0 {
        return Err(EqgftError::InvalidParameter(format!(
            "systematic error must be non-negative, got {sys_error}"
        )));
    }

    let a = asymmetry(counts_plus, counts_minus);
    let stat_error = statistical_error(a, n);
    let total_error = combine_errors(stat_error, sys_error);

    let interval = clopper_pearson(counts_plus, n, INTERVAL_ALPHA)?;
    let band = null_band(n, INTERVAL_ALPHA)?;
    let eqgft_prediction = polarization_asymmetry(DEFAULT_KAPPA);

    Ok(AnalysisResult {
        asymmetry: a,
        stat_error,
        sys_error,
        total_error,
        confidence_interval_95: interval,
        null_band_95: band,
        eqgft_prediction,
        consistent_with_eqgft: contains(interval, eqgft_prediction),
        consistent_with_qed: contains(interval, 0.0),
        sigma_deviation_from_qed: significance(a, total_error),
    })
}
