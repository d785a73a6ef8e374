//! Post-shock drawdown and recovery.
//!
//! The growth-of-$1 path is compounded from the first date of the series, so
//! levels on synthetic and real paths are comparable. The reference level is
//! the growth value on the trading date just before the shock; drawdown and
//! recovery are measured from the shock date onward, inclusive.

use chrono::NaiveDate;
use nadir_returns::{AnalysisError, ReturnSeries, Result, growth_path};
use serde::{Deserialize, Serialize};

/// Drawdown and recovery around a shock date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownMetrics {
    /// Date the shock is applied.
    pub shock_date: NaiveDate,
    /// Growth-of-$1 level on the trading date before `shock_date`.
    pub pre_shock_level: f64,
    /// Most negative `level / pre_shock_level - 1` from `shock_date` onward.
    pub max_drawdown: f64,
    /// First date attaining `max_drawdown`.
    pub max_drawdown_date: NaiveDate,
    /// First date from `shock_date` onward with `level >= pre_shock_level`.
    pub recovery_date: Option<NaiveDate>,
    /// Trading periods from `shock_date` to `recovery_date` (0 = shock day).
    pub days_to_recovery: Option<usize>,
}

impl DrawdownMetrics {
    /// Whether the path got back to the pre-shock level.
    pub const fn recovered(&self) -> bool {
        self.recovery_date.is_some()
    }

    /// `max_drawdown` in percent.
    pub fn max_drawdown_pct(&self) -> f64 {
        100.0 * self.max_drawdown
    }
}

/// Drawdown metrics of `returns` around `shock_date`.
///
/// # Errors
/// Checked in order:
/// - [`AnalysisError::Lookup`] if `shock_date` is not in `returns`
/// - [`AnalysisError::MissingData`] if the return on `shock_date` is missing
/// - [`AnalysisError::Domain`] if `shock_date` is the first observation, the
///   pre-shock level is not positive, or the drawdown is not finite
pub fn drawdown_metrics(returns: &ReturnSeries, shock_date: NaiveDate) -> Result<DrawdownMetrics> {
    let shock_pos = returns.require_position(shock_date)?;
    returns.require_value(shock_date, "return on shock_date is needed for drawdown metrics")?;

    let growth = growth_path(returns);

    if shock_pos == 0 {
        return Err(AnalysisError::Domain(format!(
            "shock_date {} is the first observation of '{}'; no pre-shock level exists",
            shock_date,
            returns.name()
        )));
    }

    let pre_shock_level = growth.values()[shock_pos - 1];
    if !pre_shock_level.is_finite() || pre_shock_level <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "pre-shock level {} of '{}' is not positive; drawdown is undefined",
            pre_shock_level,
            returns.name()
        )));
    }
    let post_dates = &growth.dates()[shock_pos..];
    let post_levels = &growth.values()[shock_pos..];

    let mut max_drawdown = f64::INFINITY;
    let mut max_drawdown_date = shock_date;
    for (date, level) in post_dates.iter().zip(post_levels) {
        let drawdown = level / pre_shock_level - 1.0;
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
            max_drawdown_date = *date;
        }
    }

    if !max_drawdown.is_finite() {
        return Err(AnalysisError::Domain(format!(
            "drawdown of '{}' after {} is not finite",
            returns.name(),
            shock_date
        )));
    }

    let days_to_recovery = post_levels.iter().position(|level| *level >= pre_shock_level);
    let recovery_date = days_to_recovery.map(|offset| post_dates[offset]);

    tracing::debug!(
        series = returns.name(),
        %shock_date,
        max_drawdown,
        recovered = recovery_date.is_some(),
        "computed drawdown metrics"
    );

    Ok(DrawdownMetrics {
        shock_date,
        pre_shock_level,
        max_drawdown,
        max_drawdown_date,
        recovery_date,
        days_to_recovery,
    })
}
