//! Cross-scenario drawdown summary.

use crate::drawdown::{DrawdownMetrics, drawdown_metrics};
use chrono::NaiveDate;
use nadir_returns::{ReturnTable, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Presentation column order of a summary row, after the scenario label.
pub const SUMMARY_COLUMNS: [&str; 6] = [
    "shock_date",
    "pre_shock_level",
    "max_drawdown_pct",
    "max_drawdown_date",
    "recovery_date",
    "days_to_recovery",
];

/// One scenario's drawdown metrics, with drawdown in percent.
///
/// Field order matches [`SUMMARY_COLUMNS`] so serialized output keeps the
/// presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummaryRow {
    /// Scenario label.
    pub scenario: String,
    /// Date the shock is applied.
    pub shock_date: NaiveDate,
    /// Growth-of-$1 level just before the shock.
    pub pre_shock_level: f64,
    /// Maximum post-shock drawdown, in percent (e.g. `-2.1`).
    pub max_drawdown_pct: f64,
    /// Date of the maximum drawdown.
    pub max_drawdown_date: NaiveDate,
    /// First date back at the pre-shock level, if any.
    pub recovery_date: Option<NaiveDate>,
    /// Trading periods until recovery, if any.
    pub days_to_recovery: Option<usize>,
}

impl ScenarioSummaryRow {
    /// Build a row from a label and its metrics.
    pub fn from_metrics(scenario: impl Into<String>, metrics: &DrawdownMetrics) -> Self {
        Self {
            scenario: scenario.into(),
            shock_date: metrics.shock_date,
            pre_shock_level: metrics.pre_shock_level,
            max_drawdown_pct: metrics.max_drawdown_pct(),
            max_drawdown_date: metrics.max_drawdown_date,
            recovery_date: metrics.recovery_date,
            days_to_recovery: metrics.days_to_recovery,
        }
    }
}

/// Scenario rows sorted by severity, worst drawdown first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummaryTable {
    rows: Vec<ScenarioSummaryRow>,
}

impl ScenarioSummaryTable {
    /// Build a table from rows, sorting them ascending by drawdown.
    ///
    /// The sort is stable, so equally severe scenarios keep their input order.
    pub fn from_rows(mut rows: Vec<ScenarioSummaryRow>) -> Self {
        rows.sort_by(|a, b| a.max_drawdown_pct.total_cmp(&b.max_drawdown_pct));
        Self { rows }
    }

    /// Rows, worst first.
    pub fn rows(&self) -> &[ScenarioSummaryRow] {
        &self.rows
    }

    /// Row for a scenario label.
    pub fn get(&self, scenario: &str) -> Option<&ScenarioSummaryRow> {
        self.rows.iter().find(|r| r.scenario == scenario)
    }

    /// Scenario labels, worst first.
    pub fn scenarios(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.scenario.as_str()).collect()
    }

    /// Number of scenarios.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no scenarios.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert to a `DataFrame`: `scenario` followed by [`SUMMARY_COLUMNS`].
    pub fn to_frame(&self) -> Result<DataFrame> {
        let fmt_date = |d: &NaiveDate| d.to_string();

        let df = DataFrame::new(vec![
            Series::new(
                "scenario".into(),
                self.rows.iter().map(|r| r.scenario.clone()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "shock_date".into(),
                self.rows.iter().map(|r| fmt_date(&r.shock_date)).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "pre_shock_level".into(),
                self.rows.iter().map(|r| r.pre_shock_level).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "max_drawdown_pct".into(),
                self.rows.iter().map(|r| r.max_drawdown_pct).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "max_drawdown_date".into(),
                self.rows
                    .iter()
                    .map(|r| fmt_date(&r.max_drawdown_date))
                    .collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "recovery_date".into(),
                self.rows
                    .iter()
                    .map(|r| r.recovery_date.as_ref().map(fmt_date))
                    .collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "days_to_recovery".into(),
                self.rows
                    .iter()
                    .map(|r| r.days_to_recovery.map(|n| n as u32))
                    .collect::<Vec<_>>(),
            )
            .into(),
        ])?;

        let df = df
            .lazy()
            .with_columns([
                col("shock_date").cast(DataType::Date),
                col("max_drawdown_date").cast(DataType::Date),
                col("recovery_date").cast(DataType::Date),
            ])
            .collect()?;

        Ok(df)
    }
}

/// Drawdown metrics for every scenario column of `shocked_returns`, sorted
/// worst first.
///
/// Each column is evaluated independently with [`drawdown_metrics`]; the
/// first failing column aborts the summary.
pub fn summarize_shock_scenarios(
    shocked_returns: &ReturnTable,
    shock_date: NaiveDate,
) -> Result<ScenarioSummaryTable> {
    let rows = shocked_returns
        .columns()
        .map(|column| {
            drawdown_metrics(column, shock_date)
                .map(|metrics| ScenarioSummaryRow::from_metrics(column.name(), &metrics))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScenarioSummaryTable::from_rows(rows))
}
