//! Analysis configuration.

use crate::error::{NadirError, Result};
use chrono::NaiveDate;
use nadir_returns::Weight;
use nadir_returns::beta::DEFAULT_BETA_WINDOW;
use nadir_scenario::DEFAULT_LABEL_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inputs of a shock analysis.
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes:
///
/// ```json
/// { "shock_date": "2024-08-05", "weight": 0.065, "shock_returns": [-0.25, 0.0] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Index ticker to fetch.
    pub index_symbol: String,
    /// Constituent ticker to fetch.
    pub constituent_symbol: String,
    /// Display name of the index, used in series names and labels.
    pub index_name: String,
    /// Display name of the constituent.
    pub constituent_name: String,
    /// First date of price history.
    pub start_date: NaiveDate,
    /// Last date of price history; today when absent.
    pub end_date: Option<NaiveDate>,
    /// Constituent weight in the index, constant or per date.
    pub weight: Weight,
    /// Date the hypothetical shock hits the constituent.
    pub shock_date: NaiveDate,
    /// One-day constituent returns to simulate.
    pub shock_returns: Vec<f64>,
    /// Prefix of scenario labels.
    pub label_prefix: String,
    /// Rolling beta windows, in trading days.
    pub beta_windows: Vec<usize>,
    /// Constant weights tried by the sensitivity sweep.
    pub sensitivity_weights: Vec<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            index_symbol: "^GSPC".to_string(),
            constituent_symbol: "NVDA".to_string(),
            index_name: "SPX".to_string(),
            constituent_name: "NVDA".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap_or_default(),
            end_date: None,
            weight: Weight::Constant(0.07),
            shock_date: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap_or_default(),
            shock_returns: vec![-0.30, -0.20, -0.10, 0.0],
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            beta_windows: vec![DEFAULT_BETA_WINDOW],
            sensitivity_weights: vec![0.03, 0.05, 0.07, 0.09],
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file and validate it.
    ///
    /// # Errors
    /// IO and JSON errors from reading the file, and anything
    /// [`AnalysisConfig::validate`] rejects.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;

        tracing::debug!(path = %path.as_ref().display(), "loaded analysis config");
        Ok(config)
    }

    /// Check the configuration before any data is touched.
    ///
    /// Weights are only range-checked here; gaps in a per-date weight can
    /// only be found once return dates are known.
    pub fn validate(&self) -> Result<()> {
        if self.shock_returns.is_empty() {
            return Err(NadirError::Config(
                "shock_returns must be a non-empty list".to_string(),
            ));
        }
        if let Some(shock) = self
            .shock_returns
            .iter()
            .find(|s| !s.is_finite() || **s <= -1.0)
        {
            return Err(NadirError::Config(format!(
                "shock return {} must be a finite number greater than -1",
                shock
            )));
        }
        if let Some(end) = self.end_date
            && end <= self.start_date
        {
            return Err(NadirError::Config(format!(
                "start_date {} must be before end_date {}",
                self.start_date, end
            )));
        }
        if self.shock_date <= self.start_date {
            return Err(NadirError::Config(format!(
                "shock_date {} must fall after start_date {}",
                self.shock_date, self.start_date
            )));
        }
        if let Some(window) = self.beta_windows.iter().find(|w| **w < 2) {
            return Err(NadirError::Config(format!(
                "beta window {} is below the minimum of 2",
                window
            )));
        }

        let weights: Vec<f64> = match &self.weight {
            Weight::Constant(w) => vec![*w],
            Weight::TimeVarying(map) => map.values().copied().collect(),
        };
        if let Some(w) = weights
            .iter()
            .chain(&self.sensitivity_weights)
            .find(|w| !(0.0..1.0).contains(*w))
        {
            return Err(NadirError::Config(format!(
                "weight {} is outside [0, 1)",
                w
            )));
        }
        if self.label_prefix.is_empty() {
            return Err(NadirError::Config("label_prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Set the tickers to fetch.
    pub fn with_symbols(mut self, index: impl Into<String>, constituent: impl Into<String>) -> Self {
        self.index_symbol = index.into();
        self.constituent_symbol = constituent.into();
        self
    }

    /// Set the display names.
    pub fn with_names(mut self, index: impl Into<String>, constituent: impl Into<String>) -> Self {
        self.index_name = index.into();
        self.constituent_name = constituent.into();
        self
    }

    /// Set the price history range.
    pub const fn with_dates(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set the constituent weight.
    pub fn with_weight(mut self, weight: impl Into<Weight>) -> Self {
        self.weight = weight.into();
        self
    }

    /// Set the shock date.
    pub const fn with_shock_date(mut self, shock_date: NaiveDate) -> Self {
        self.shock_date = shock_date;
        self
    }

    /// Set the simulated shock magnitudes.
    pub fn with_shock_returns(mut self, shock_returns: Vec<f64>) -> Self {
        self.shock_returns = shock_returns;
        self
    }

    /// Set the scenario label prefix.
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Set the rolling beta windows.
    pub fn with_beta_windows(mut self, windows: Vec<usize>) -> Self {
        self.beta_windows = windows;
        self
    }

    /// Set the sensitivity sweep weights.
    pub fn with_sensitivity_weights(mut self, weights: Vec<f64>) -> Self {
        self.sensitivity_weights = weights;
        self
    }
}
