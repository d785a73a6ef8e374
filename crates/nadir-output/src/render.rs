//! Terminal rendering of analysis results.

use chrono::NaiveDate;
use nadir_returns::BetaRegime;
use nadir_scenario::{DrawdownMetrics, ScenarioSummaryTable, SensitivityGrid, SensitivityMetric};
use serde::{Deserialize, Serialize};

/// Text renderings of a result.
pub trait Render {
    /// Fixed-width table for the terminal.
    fn to_ascii_table(&self) -> String;

    /// GitHub-flavored Markdown.
    fn to_markdown(&self) -> String;
}

fn opt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn opt_days(days: Option<usize>) -> String {
    days.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn grid_cell(metric: SensitivityMetric, value: Option<f64>) -> String {
    match (metric, value) {
        (_, None) => "-".to_string(),
        (SensitivityMetric::DaysToRecovery, Some(v)) => format!("{:.0}", v),
        (SensitivityMetric::MaxDrawdownPct, Some(v)) => format!("{:.2}%", v),
        (SensitivityMetric::PreShockLevel, Some(v)) => format!("{:.4}", v),
    }
}

impl Render for ScenarioSummaryTable {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nShock Scenarios (worst first)\n");
        output.push_str(&"=".repeat(96));
        output.push('\n');
        output.push_str(&format!(
            "{:<22} {:>12} {:>10} {:>12} {:>12} {:>12} {:>10}\n",
            "Scenario", "Shock Date", "Pre-Shock", "Max DD", "Trough", "Recovered", "Days"
        ));
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for row in self.rows() {
            output.push_str(&format!(
                "{:<22} {:>12} {:>10.4} {:>11.2}% {:>12} {:>12} {:>10}\n",
                row.scenario,
                row.shock_date,
                row.pre_shock_level,
                row.max_drawdown_pct,
                row.max_drawdown_date,
                opt_date(row.recovery_date),
                opt_days(row.days_to_recovery)
            ));
        }

        output.push_str(&"=".repeat(96));
        output.push('\n');
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("## Shock Scenarios\n\n");
        output.push_str(
            "| Scenario | Shock Date | Pre-Shock Level | Max Drawdown | Trough Date | Recovery Date | Days to Recovery |\n",
        );
        output.push_str(
            "|----------|------------|-----------------|--------------|-------------|---------------|------------------|\n",
        );

        for row in self.rows() {
            output.push_str(&format!(
                "| {} | {} | {:.4} | {:.2}% | {} | {} | {} |\n",
                row.scenario,
                row.shock_date,
                row.pre_shock_level,
                row.max_drawdown_pct,
                row.max_drawdown_date,
                opt_date(row.recovery_date),
                opt_days(row.days_to_recovery)
            ));
        }
        output
    }
}

impl Render for SensitivityGrid {
    fn to_ascii_table(&self) -> String {
        let width = 10 + 12 * self.shock_pcts.len();
        let mut output = String::new();

        output.push_str(&format!("\nWeight Sensitivity: {}\n", self.metric));
        output.push_str(&"=".repeat(width));
        output.push('\n');
        output.push_str(&format!("{:<10}", "Weight"));
        for pct in &self.shock_pcts {
            output.push_str(&format!("{:>12}", format!("{}%", pct)));
        }
        output.push('\n');
        output.push_str(&"-".repeat(width));
        output.push('\n');

        for (weight, row) in self.weights.iter().zip(&self.cells) {
            output.push_str(&format!("{:<10}", format!("{:.1}%", weight * 100.0)));
            for value in row {
                output.push_str(&format!("{:>12}", grid_cell(self.metric, *value)));
            }
            output.push('\n');
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("## Weight Sensitivity: {}\n\n", self.metric));
        output.push_str("| Weight |");
        for pct in &self.shock_pcts {
            output.push_str(&format!(" {}% |", pct));
        }
        output.push('\n');
        output.push_str("|--------|");
        output.push_str(&"------|".repeat(self.shock_pcts.len()));
        output.push('\n');

        for (weight, row) in self.weights.iter().zip(&self.cells) {
            output.push_str(&format!("| {:.1}% |", weight * 100.0));
            for value in row {
                output.push_str(&format!(" {} |", grid_cell(self.metric, *value)));
            }
            output.push('\n');
        }
        output
    }
}

/// Drawdown metrics with a display name, e.g. the realized index path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledMetrics {
    /// Series the metrics were computed on.
    pub label: String,
    /// The metrics.
    pub metrics: DrawdownMetrics,
}

impl LabeledMetrics {
    /// Attach a label to metrics.
    pub fn new(label: impl Into<String>, metrics: DrawdownMetrics) -> Self {
        Self {
            label: label.into(),
            metrics,
        }
    }
}

impl Render for LabeledMetrics {
    fn to_ascii_table(&self) -> String {
        let m = &self.metrics;
        let mut output = String::new();

        output.push_str(&format!("\nDrawdown: {}\n", self.label));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("  Shock Date:           {}\n", m.shock_date));
        output.push_str(&format!("  Pre-Shock Level:      {:.4}\n", m.pre_shock_level));
        output.push_str(&format!("  Max Drawdown:         {:.2}%\n", m.max_drawdown_pct()));
        output.push_str(&format!("  Trough Date:          {}\n", m.max_drawdown_date));
        output.push_str(&format!("  Recovery Date:        {}\n", opt_date(m.recovery_date)));
        output.push_str(&format!("  Days to Recovery:     {}\n", opt_days(m.days_to_recovery)));
        output
    }

    fn to_markdown(&self) -> String {
        let m = &self.metrics;
        let mut output = String::new();

        output.push_str(&format!("## Drawdown: {}\n\n", self.label));
        output.push_str(&format!("- **Shock Date:** {}\n", m.shock_date));
        output.push_str(&format!("- **Pre-Shock Level:** {:.4}\n", m.pre_shock_level));
        output.push_str(&format!("- **Max Drawdown:** {:.2}%\n", m.max_drawdown_pct()));
        output.push_str(&format!("- **Trough Date:** {}\n", m.max_drawdown_date));
        output.push_str(&format!("- **Recovery Date:** {}\n", opt_date(m.recovery_date)));
        output.push_str(&format!(
            "- **Days to Recovery:** {}\n",
            opt_days(m.days_to_recovery)
        ));
        output
    }
}

/// Latest rolling beta of the index on a constituent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaReading {
    /// Rolling window length in trading periods.
    pub window: usize,
    /// Date of the latest defined beta.
    pub date: NaiveDate,
    /// Beta value.
    pub beta: f64,
    /// Influence band of `beta`.
    pub regime: BetaRegime,
}

impl BetaReading {
    /// Reading for a beta value, classifying its regime.
    pub fn new(window: usize, date: NaiveDate, beta: f64) -> Self {
        Self {
            window,
            date,
            beta,
            regime: BetaRegime::classify(beta),
        }
    }
}

impl Render for [BetaReading] {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nRolling Beta\n");
        output.push_str(&"=".repeat(56));
        output.push('\n');
        output.push_str(&format!(
            "{:<8} {:>12} {:>10} {:>20}\n",
            "Window", "Date", "Beta", "Regime"
        ));
        output.push_str(&"-".repeat(56));
        output.push('\n');
        for reading in self {
            output.push_str(&format!(
                "{:<8} {:>12} {:>10.4} {:>20}\n",
                reading.window,
                reading.date,
                reading.beta,
                reading.regime.to_string()
            ));
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("## Rolling Beta\n\n");
        output.push_str("| Window | Date | Beta | Regime |\n");
        output.push_str("|--------|------|------|--------|\n");
        for reading in self {
            output.push_str(&format!(
                "| {} | {} | {:.4} | {} |\n",
                reading.window, reading.date, reading.beta, reading.regime
            ));
        }
        output
    }
}
