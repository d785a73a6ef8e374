//! Counterfactual shocked index paths.
//!
//! Given the ex-constituent residual `r_ex` and weight `w`, a synthesized
//! index path is
//!
//! ```text
//! r_t     = (1 - w_t) * r_ex,t                      on every other date
//! r_shock = w * shock + (1 - w) * r_ex,shock        on the shock date
//! ```
//!
//! i.e. the constituent is assumed flat except for one hypothetical day.

use crate::label::LabelCodec;
use chrono::NaiveDate;
use nadir_returns::{AnalysisError, ReturnSeries, ReturnTable, Result, TimeSeries, Weight};
use std::collections::HashMap;

/// One synthesized index path and the shock that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockScenario {
    /// Scenario label, e.g. `SPX_shock_-30pct`.
    pub label: String,
    /// One-day constituent return imposed on the shock date.
    pub shock_return: f64,
    /// Synthesized index returns, named by `label`.
    pub returns: ReturnSeries,
}

/// Builds shocked index paths, labeling them with a [`LabelCodec`].
#[derive(Debug, Clone, Default)]
pub struct ScenarioSynthesizer {
    codec: LabelCodec,
}

impl ScenarioSynthesizer {
    /// Create a synthesizer with a custom label codec.
    pub const fn new(codec: LabelCodec) -> Self {
        Self { codec }
    }

    /// Label codec used for scenario names.
    pub const fn codec(&self) -> &LabelCodec {
        &self.codec
    }

    /// One counterfactual index path, named by the shock's label.
    ///
    /// # Errors
    /// Checked in order:
    /// - weight alignment/range errors from [`Weight::align`]
    /// - [`AnalysisError::Lookup`] if `shock_date` is not in `residual`
    /// - [`AnalysisError::Domain`] if `shock_return <= -1` (or not a number)
    /// - [`AnalysisError::MissingData`] if the residual is missing on `shock_date`
    pub fn shocked_return(
        &self,
        residual: &ReturnSeries,
        weight: &Weight,
        shock_return: f64,
        shock_date: NaiveDate,
    ) -> Result<ReturnSeries> {
        let w = weight.align(residual.dates())?;
        let shock_pos = residual.require_position(shock_date)?;

        if shock_return.is_nan() || shock_return <= -1.0 {
            return Err(AnalysisError::Domain(format!(
                "shock_return {} must be greater than -1 (cannot lose more than 100% in one day)",
                shock_return
            )));
        }

        let r_ex_shock =
            residual.require_value(shock_date, "residual needed for the shock-day return")?;

        let mut values: Vec<f64> = residual
            .values()
            .iter()
            .zip(w.values())
            .map(|(r_ex, w)| (1.0 - w) * r_ex)
            .collect();

        let w_shock = w.at(shock_pos);
        values[shock_pos] = w_shock * shock_return + (1.0 - w_shock) * r_ex_shock;

        TimeSeries::new(
            self.codec.encode(shock_return)?,
            residual.dates().to_vec(),
            values,
        )
    }

    /// One [`ShockScenario`] per magnitude, in the order given.
    ///
    /// # Errors
    /// Any error from [`ScenarioSynthesizer::shocked_return`], and
    /// [`AnalysisError::Domain`] when two magnitudes round to the same label.
    pub fn scenarios(
        &self,
        residual: &ReturnSeries,
        weight: &Weight,
        shock_returns: &[f64],
        shock_date: NaiveDate,
    ) -> Result<Vec<ShockScenario>> {
        let mut seen: HashMap<String, f64> = HashMap::with_capacity(shock_returns.len());
        let mut scenarios = Vec::with_capacity(shock_returns.len());

        for &shock in shock_returns {
            let returns = self.shocked_return(residual, weight, shock, shock_date)?;
            let label = returns.name().to_string();

            if let Some(previous) = seen.insert(label.clone(), shock) {
                tracing::warn!(%label, previous, shock, "scenario label collision");
                return Err(AnalysisError::Domain(format!(
                    "shocks {} and {} both map to label '{}'",
                    previous, shock, label
                )));
            }

            scenarios.push(ShockScenario {
                label,
                shock_return: shock,
                returns,
            });
        }

        tracing::debug!(
            residual = residual.name(),
            %shock_date,
            scenarios = scenarios.len(),
            "synthesized shock scenarios"
        );

        Ok(scenarios)
    }

    /// Shocked paths assembled into one table on the residual's dates, one
    /// column per magnitude.
    pub fn shocked_returns(
        &self,
        residual: &ReturnSeries,
        weight: &Weight,
        shock_returns: &[f64],
        shock_date: NaiveDate,
    ) -> Result<ReturnTable> {
        let mut table = ReturnTable::new(residual.dates().to_vec());
        for scenario in self.scenarios(residual, weight, shock_returns, shock_date)? {
            table.push(scenario.returns)?;
        }
        Ok(table)
    }
}

/// [`ScenarioSynthesizer::shocked_return`] with the default label codec.
pub fn shocked_return(
    residual: &ReturnSeries,
    weight: &Weight,
    shock_return: f64,
    shock_date: NaiveDate,
) -> Result<ReturnSeries> {
    ScenarioSynthesizer::default().shocked_return(residual, weight, shock_return, shock_date)
}

/// [`ScenarioSynthesizer::shocked_returns`] with the default label codec.
pub fn shocked_returns(
    residual: &ReturnSeries,
    weight: &Weight,
    shock_returns: &[f64],
    shock_date: NaiveDate,
) -> Result<ReturnTable> {
    ScenarioSynthesizer::default().shocked_returns(residual, weight, shock_returns, shock_date)
}
