//! Sensitivity of shock outcomes to the assumed constituent weight.
//!
//! The true weight of a constituent drifts, so the same shock is re-run under
//! several constant weights. The result pivots into a weight x shock grid.

use crate::summary::{ScenarioSummaryRow, summarize_shock_scenarios};
use crate::synth::ScenarioSynthesizer;
use chrono::NaiveDate;
use nadir_returns::{AnalysisError, ReturnSeries, Result, Weight};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metric to pivot a [`SensitivityTable`] on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMetric {
    /// Maximum drawdown in percent.
    MaxDrawdownPct,
    /// Trading periods to recovery (missing when never recovered).
    DaysToRecovery,
    /// Growth-of-$1 level before the shock.
    PreShockLevel,
}

impl SensitivityMetric {
    /// Column name of the metric.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::MaxDrawdownPct => "max_drawdown_pct",
            Self::DaysToRecovery => "days_to_recovery",
            Self::PreShockLevel => "pre_shock_level",
        }
    }

    fn extract(&self, row: &ScenarioSummaryRow) -> Option<f64> {
        match self {
            Self::MaxDrawdownPct => Some(row.max_drawdown_pct),
            Self::DaysToRecovery => row.days_to_recovery.map(|n| n as f64),
            Self::PreShockLevel => Some(row.pre_shock_level),
        }
    }
}

impl fmt::Display for SensitivityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for SensitivityMetric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "max_drawdown_pct" => Ok(Self::MaxDrawdownPct),
            "days_to_recovery" => Ok(Self::DaysToRecovery),
            "pre_shock_level" => Ok(Self::PreShockLevel),
            other => Err(AnalysisError::Domain(format!(
                "metric '{}' not found in sensitivity table",
                other
            ))),
        }
    }
}

/// One (weight, scenario) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    /// Assumed constant weight.
    pub weight: f64,
    /// Scenario summary under that weight.
    pub summary: ScenarioSummaryRow,
}

/// Scenario summaries for every assumed weight, keyed by `(weight, scenario)`.
#[derive(Debug, Clone)]
pub struct SensitivityTable {
    rows: Vec<SensitivityRow>,
    synthesizer: ScenarioSynthesizer,
}

/// Metric values on a weight x shock-percent grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Metric shown in the cells.
    pub metric: SensitivityMetric,
    /// Row keys, ascending.
    pub weights: Vec<f64>,
    /// Column keys (whole-percent shocks), ascending.
    pub shock_pcts: Vec<i64>,
    /// `cells[i][j]` is the metric for `weights[i]` and `shock_pcts[j]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl SensitivityGrid {
    /// Cell for a weight and shock percent, if both keys exist.
    pub fn get(&self, weight: f64, shock_pct: i64) -> Option<f64> {
        let i = self.weights.iter().position(|w| *w == weight)?;
        let j = self.shock_pcts.iter().position(|p| *p == shock_pct)?;
        self.cells[i][j]
    }
}

impl SensitivityTable {
    /// All rows, grouped by weight in input order, worst scenario first
    /// within each weight.
    pub fn rows(&self) -> &[SensitivityRow] {
        &self.rows
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pivot into a weight x shock-percent grid of `metric`.
    ///
    /// # Errors
    /// [`AnalysisError::Domain`] if a label does not decode or a
    /// `(weight, shock)` pair appears twice.
    pub fn pivot(&self, metric: SensitivityMetric) -> Result<SensitivityGrid> {
        let codec = self.synthesizer.codec();

        let mut keyed = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            keyed.push((row.weight, codec.decode(&row.summary.scenario)?, row));
        }

        let mut weights: Vec<f64> = keyed.iter().map(|(w, _, _)| *w).collect();
        weights.sort_by(f64::total_cmp);
        weights.dedup_by(|a, b| a.total_cmp(b).is_eq());

        let mut shock_pcts: Vec<i64> = keyed.iter().map(|(_, p, _)| *p).collect();
        shock_pcts.sort_unstable();
        shock_pcts.dedup();

        let columns: BTreeMap<i64, usize> =
            shock_pcts.iter().enumerate().map(|(j, pct)| (*pct, j)).collect();

        let mut cells = vec![vec![None; shock_pcts.len()]; weights.len()];
        let mut filled = vec![vec![false; shock_pcts.len()]; weights.len()];

        for (weight, pct, row) in keyed {
            let i = weights
                .iter()
                .position(|w| w.total_cmp(&weight).is_eq())
                .ok_or_else(|| AnalysisError::Domain(format!("weight {} has no grid row", weight)))?;
            let j = *columns
                .get(&pct)
                .ok_or_else(|| AnalysisError::Domain(format!("shock {}% has no grid column", pct)))?;
            if filled[i][j] {
                return Err(AnalysisError::Domain(format!(
                    "duplicate entry for weight {} and shock {}%",
                    weight, pct
                )));
            }
            filled[i][j] = true;
            cells[i][j] = metric.extract(&row.summary);
        }

        Ok(SensitivityGrid {
            metric,
            weights,
            shock_pcts,
            cells,
        })
    }
}

/// Summaries of the shock family under each assumed constant weight.
///
/// # Errors
/// [`AnalysisError::Domain`] for an empty weight list; otherwise the first
/// synthesis or drawdown error encountered.
pub fn weight_sensitivity_table(
    synthesizer: &ScenarioSynthesizer,
    residual: &ReturnSeries,
    weights: &[f64],
    shock_returns: &[f64],
    shock_date: NaiveDate,
) -> Result<SensitivityTable> {
    if weights.is_empty() {
        return Err(AnalysisError::Domain(
            "weights must be a non-empty list".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(weights.len() * shock_returns.len());
    for &weight in weights {
        let shocked =
            synthesizer.shocked_returns(residual, &Weight::Constant(weight), shock_returns, shock_date)?;
        let summary = summarize_shock_scenarios(&shocked, shock_date)?;
        rows.extend(summary.rows().iter().cloned().map(|summary| SensitivityRow {
            weight,
            summary,
        }));
    }

    tracing::debug!(
        weights = weights.len(),
        shocks = shock_returns.len(),
        rows = rows.len(),
        "built weight sensitivity table"
    );

    Ok(SensitivityTable {
        rows,
        synthesizer: synthesizer.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nadir_returns::{ErrorKind, TimeSeries};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    fn residual() -> TimeSeries {
        TimeSeries::new(
            "SPX_exNVDA",
            vec![d(1), d(2), d(5), d(6)],
            vec![0.0, 0.0, 0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_grid_shape_and_values() {
        let table = weight_sensitivity_table(
            &ScenarioSynthesizer::default(),
            &residual(),
            &[0.10, 0.05],
            &[0.0, -0.30],
            d(5),
        )
        .unwrap();
        assert_eq!(table.len(), 4);

        let grid = table.pivot(SensitivityMetric::MaxDrawdownPct).unwrap();
        assert_eq!(grid.weights, vec![0.05, 0.10]);
        assert_eq!(grid.shock_pcts, vec![-30, 0]);
        assert_relative_eq!(grid.get(0.05, -30).unwrap(), -1.5, epsilon = 1e-9);
        assert_relative_eq!(grid.get(0.10, -30).unwrap(), -3.0, epsilon = 1e-9);
        assert_relative_eq!(grid.get(0.10, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_days_to_recovery_grid_has_gaps() {
        let table = weight_sensitivity_table(
            &ScenarioSynthesizer::default(),
            &residual(),
            &[0.1],
            &[0.0, -0.2],
            d(5),
        )
        .unwrap();
        let grid = table.pivot(SensitivityMetric::DaysToRecovery).unwrap();
        assert_eq!(grid.get(0.1, 0), Some(0.0));
        assert_eq!(grid.get(0.1, -20), None);
    }

    fn rebounding_residual() -> TimeSeries {
        TimeSeries::new(
            "SPX_exNVDA",
            vec![d(1), d(2), d(5), d(6), d(7)],
            vec![0.01, 0.0, 0.0, 0.05, 0.1],
        )
        .unwrap()
    }

    #[test]
    fn test_pre_shock_level_grid() {
        let table = weight_sensitivity_table(
            &ScenarioSynthesizer::default(),
            &rebounding_residual(),
            &[0.10, 0.05],
            &[-0.2, 0.0],
            d(5),
        )
        .unwrap();
        let grid = table.pivot(SensitivityMetric::PreShockLevel).unwrap();

        assert_eq!(grid.metric, SensitivityMetric::PreShockLevel);
        assert_relative_eq!(grid.get(0.05, -20).unwrap(), 1.0095, epsilon = 1e-12);
        assert_relative_eq!(grid.get(0.05, 0).unwrap(), 1.0095, epsilon = 1e-12);
        assert_relative_eq!(grid.get(0.10, -20).unwrap(), 1.009, epsilon = 1e-12);
        assert_relative_eq!(grid.get(0.10, 0).unwrap(), 1.009, epsilon = 1e-12);
    }

    #[test]
    fn test_days_to_recovery_grid_values() {
        let table = weight_sensitivity_table(
            &ScenarioSynthesizer::default(),
            &rebounding_residual(),
            &[0.10, 0.05],
            &[-0.2, 0.0],
            d(5),
        )
        .unwrap();
        let grid = table.pivot(SensitivityMetric::DaysToRecovery).unwrap();

        assert_eq!(grid.weights, vec![0.05, 0.10]);
        assert_eq!(grid.shock_pcts, vec![-20, 0]);
        assert_eq!(
            grid.cells,
            vec![vec![Some(1.0), Some(0.0)], vec![Some(1.0), Some(0.0)]]
        );
    }

    #[test]
    fn test_duplicate_weight_rejected_on_pivot() {
        let table = weight_sensitivity_table(
            &ScenarioSynthesizer::default(),
            &residual(),
            &[0.1, 0.1],
            &[-0.2],
            d(5),
        )
        .unwrap();
        let err = table.pivot(SensitivityMetric::PreShockLevel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_empty_weights() {
        let err = weight_sensitivity_table(
            &ScenarioSynthesizer::default(),
            &residual(),
            &[],
            &[-0.2],
            d(5),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!(
            "days_to_recovery".parse::<SensitivityMetric>().unwrap(),
            SensitivityMetric::DaysToRecovery
        );
        assert!("sharpe".parse::<SensitivityMetric>().is_err());
        assert_eq!(SensitivityMetric::MaxDrawdownPct.to_string(), "max_drawdown_pct");
    }
}
