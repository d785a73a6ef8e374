//! Rolling beta of the index on the constituent.
//!
//! `beta = Cov(y, x) / Var(x)` over a trailing window of paired observations,
//! using sample (n - 1) moments. A high beta of the index on a single
//! constituent signals that the constituent dominates index moves.

use crate::error::{AnalysisError, Result};
use crate::series::{ReturnSeries, TimeSeries};
use ndarray::{Array1, s};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default rolling window, in trading days.
pub const DEFAULT_BETA_WINDOW: usize = 60;

/// Rolling beta of `y` on `x`.
///
/// The two series are paired on their common dates and any date where either
/// value is missing is dropped before windowing. The output is indexed by the
/// remaining paired dates; the first `window - 1` of them have no value
/// (`NaN`), as does any window where `x` has zero variance.
///
/// # Errors
/// [`AnalysisError::Domain`] when `window < 2`.
pub fn rolling_beta(y: &ReturnSeries, x: &ReturnSeries, window: usize) -> Result<ReturnSeries> {
    if window < 2 {
        return Err(AnalysisError::Domain(format!(
            "rolling beta window must be at least 2, got {}",
            window
        )));
    }

    let mut dates = Vec::new();
    let mut ys = Vec::new();
    let mut xs = Vec::new();
    for (date, y_val) in y.iter() {
        if let Some(x_val) = x.get(date)
            && !y_val.is_nan()
        {
            dates.push(date);
            ys.push(y_val);
            xs.push(x_val);
        }
    }

    let ys = Array1::from_vec(ys);
    let xs = Array1::from_vec(xs);
    let n = dates.len();

    let mut betas = vec![f64::NAN; n];
    for end in (window - 1)..n {
        let start = end + 1 - window;
        let y_win = ys.slice(s![start..=end]);
        let x_win = xs.slice(s![start..=end]);

        let (Some(y_mean), Some(x_mean)) = (y_win.mean(), x_win.mean()) else {
            continue;
        };
        let cov = ((&y_win - y_mean) * (&x_win - x_mean)).sum() / (window - 1) as f64;
        let var = x_win.var(1.0);

        if var > 0.0 {
            betas[end] = cov / var;
        }
    }

    tracing::debug!(
        y = y.name(),
        x = x.name(),
        window,
        paired = n,
        "computed rolling beta"
    );

    TimeSeries::new(format!("beta_{}_on_{}", y.name(), x.name()), dates, betas)
}

/// Rolling betas for several window lengths, in the order given.
///
/// # Errors
/// [`AnalysisError::Domain`] for an empty window list or any window below 2.
pub fn rolling_betas(
    y: &ReturnSeries,
    x: &ReturnSeries,
    windows: &[usize],
) -> Result<Vec<(usize, ReturnSeries)>> {
    if windows.is_empty() {
        return Err(AnalysisError::Domain(
            "windows must be a non-empty list".to_string(),
        ));
    }
    windows
        .iter()
        .map(|w| rolling_beta(y, x, *w).map(|beta| (*w, beta)))
        .collect()
}

/// How strongly the index depends on the constituent, by beta level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaRegime {
    /// beta below 0.05
    Marginal,
    /// 0.05 <= beta < 0.10
    Influential,
    /// 0.10 <= beta < 0.15
    Strong,
    /// beta at or above 0.15
    Systemic,
}

impl BetaRegime {
    /// Classify a beta value. Negative betas are marginal.
    pub fn classify(beta: f64) -> Self {
        if beta >= 0.15 {
            Self::Systemic
        } else if beta >= 0.10 {
            Self::Strong
        } else if beta >= 0.05 {
            Self::Influential
        } else {
            Self::Marginal
        }
    }

    /// Lower bound of the regime's beta band.
    pub const fn lower_bound(&self) -> f64 {
        match self {
            Self::Marginal => 0.0,
            Self::Influential => 0.05,
            Self::Strong => 0.10,
            Self::Systemic => 0.15,
        }
    }
}

impl fmt::Display for BetaRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Marginal => "Marginal",
            Self::Influential => "Influential",
            Self::Strong => "Strong",
            Self::Systemic => "Systemic",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|day| NaiveDate::from_ymd_opt(2024, 7, day).unwrap())
            .collect()
    }

    #[test]
    fn test_exact_linear_relationship() {
        let x_vals = vec![0.01, -0.02, 0.03, 0.00, -0.01, 0.02];
        let y_vals: Vec<f64> = x_vals.iter().map(|v| 0.12 * v + 0.001).collect();
        let x = TimeSeries::new("NVDA", dates(6), x_vals).unwrap();
        let y = TimeSeries::new("SPX", dates(6), y_vals).unwrap();

        let beta = rolling_beta(&y, &x, 3).unwrap();
        assert_eq!(beta.name(), "beta_SPX_on_NVDA");
        assert_eq!(beta.len(), 6);
        assert!(beta.values()[0].is_nan());
        assert!(beta.values()[1].is_nan());
        for v in &beta.values()[2..] {
            assert_relative_eq!(*v, 0.12, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_drops_unpaired_dates() {
        let all = dates(5);
        let x = TimeSeries::new("x", all.clone(), vec![0.01, f64::NAN, 0.02, 0.03, -0.01]).unwrap();
        let y = TimeSeries::new("y", all[..4].to_vec(), vec![0.01, 0.02, 0.02, 0.03]).unwrap();

        let beta = rolling_beta(&y, &x, 2).unwrap();
        assert_eq!(beta.dates(), &[all[0], all[2], all[3]]);
    }

    #[test]
    fn test_zero_variance_window_is_missing() {
        let x = TimeSeries::new("x", dates(3), vec![0.01, 0.01, 0.01]).unwrap();
        let y = TimeSeries::new("y", dates(3), vec![0.01, 0.02, 0.03]).unwrap();
        let beta = rolling_beta(&y, &x, 3).unwrap();
        assert!(beta.values()[2].is_nan());
    }

    #[test]
    fn test_invalid_windows() {
        let x = TimeSeries::new("x", dates(3), vec![0.0; 3]).unwrap();
        assert!(rolling_beta(&x, &x, 1).is_err());
        assert!(rolling_betas(&x, &x, &[]).is_err());
    }

    #[test]
    fn test_multiple_windows() {
        let x = TimeSeries::new("x", dates(10), (0..10).map(|i| i as f64 * 0.01).collect()).unwrap();
        let betas = rolling_betas(&x, &x, &[2, 5]).unwrap();
        assert_eq!(betas.len(), 2);
        assert_eq!(betas[1].0, 5);
        assert_relative_eq!(betas[1].1.values()[9], 1.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(-0.2, BetaRegime::Marginal)]
    #[case(0.0, BetaRegime::Marginal)]
    #[case(0.05, BetaRegime::Influential)]
    #[case(0.12, BetaRegime::Strong)]
    #[case(0.15, BetaRegime::Systemic)]
    #[case(0.8, BetaRegime::Systemic)]
    fn test_regime_classification(#[case] beta: f64, #[case] expected: BetaRegime) {
        assert_eq!(BetaRegime::classify(beta), expected);
    }
}
