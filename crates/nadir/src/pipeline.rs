//! End-to-end shock analysis.
//!
//! prices -> returns -> ex-constituent residual -> shocked paths -> drawdown
//! summary, alongside the realized index drawdown around the same date and
//! the rolling beta of the index on the constituent.

use crate::config::AnalysisConfig;
use crate::error::{NadirError, Result};
use chrono::NaiveDate;
use nadir_data::PriceTable;
use nadir_output::{BetaReading, LabeledMetrics};
use nadir_returns::{
    AnalysisError, ReturnSeries, ReturnTable, SeriesTable, compute_returns,
    ex_constituent_return, rolling_betas,
};
use nadir_scenario::{
    LabelCodec, ScenarioSummaryTable, ScenarioSynthesizer, SensitivityTable, drawdown_metrics,
    summarize_shock_scenarios, weight_sensitivity_table,
};

/// Everything one run of [`ShockAnalysis`] produces.
#[derive(Debug, Clone)]
pub struct ShockAnalysisReport {
    /// Realized index and constituent returns.
    pub returns: ReturnTable,
    /// Index returns with the constituent removed.
    pub ex_constituent: ReturnSeries,
    /// One synthesized index path per shock magnitude.
    pub scenarios: ReturnTable,
    /// Growth-of-$1 paths of `scenarios`.
    pub growth: SeriesTable,
    /// Drawdown summary of `scenarios`, worst first.
    pub summary: ScenarioSummaryTable,
    /// Drawdown of the realized index around the shock date.
    pub index_drawdown: LabeledMetrics,
    /// Rolling beta of the index on the constituent, per window.
    pub betas: Vec<(usize, ReturnSeries)>,
}

impl ShockAnalysisReport {
    /// Most recent defined beta for each window.
    pub fn latest_betas(&self) -> Vec<BetaReading> {
        latest_beta_readings(&self.betas)
    }
}

/// Most recent defined beta for each window. A window longer than the
/// history has no reading.
pub fn latest_beta_readings(betas: &[(usize, ReturnSeries)]) -> Vec<BetaReading> {
    betas
        .iter()
        .filter_map(|(window, series)| {
            let values = series.values();
            values
                .iter()
                .rposition(|beta| !beta.is_nan())
                .map(|i| BetaReading::new(*window, series.dates()[i], values[i]))
        })
        .collect()
}

/// Runs the decomposition, scenario and drawdown engines for one
/// [`AnalysisConfig`].
#[derive(Debug, Clone)]
pub struct ShockAnalysis {
    config: AnalysisConfig,
    synthesizer: ScenarioSynthesizer,
}

impl ShockAnalysis {
    /// Validate `config` and prepare an analysis.
    ///
    /// # Errors
    /// [`NadirError::Config`] for anything [`AnalysisConfig::validate`] rejects.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let synthesizer = ScenarioSynthesizer::new(LabelCodec::new(config.label_prefix.clone()));
        Ok(Self {
            config,
            synthesizer,
        })
    }

    /// The configuration this analysis runs with.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Shock date of the configuration.
    pub const fn shock_date(&self) -> NaiveDate {
        self.config.shock_date
    }

    /// Realized returns and the ex-constituent residual.
    ///
    /// # Errors
    /// [`AnalysisError::InsufficientData`] for fewer than two prices, and any
    /// decomposition error.
    pub fn decompose(&self, prices: &PriceTable) -> Result<(ReturnTable, ReturnSeries)> {
        if prices.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least two prices to compute returns, got {}",
                prices.len()
            ))
            .into());
        }

        let returns = compute_returns(prices)?;
        let index = returns.require_column(prices.index_name())?;
        let constituent = returns.require_column(prices.constituent_name())?;
        let ex = ex_constituent_return(index, constituent, &self.config.weight)?;
        Ok((returns, ex))
    }

    /// Run the full analysis on `prices`.
    ///
    /// # Errors
    /// The first failure of any stage; no partial report is produced.
    pub fn run(&self, prices: &PriceTable) -> Result<ShockAnalysisReport> {
        let shock_date = self.config.shock_date;
        let (returns, ex_constituent) = self.decompose(prices)?;

        let scenarios = self.synthesizer.shocked_returns(
            &ex_constituent,
            &self.config.weight,
            &self.config.shock_returns,
            shock_date,
        )?;
        let growth = scenarios.growth()?;
        let summary = summarize_shock_scenarios(&scenarios, shock_date)?;

        let index = returns.require_column(prices.index_name())?;
        let index_drawdown =
            LabeledMetrics::new(index.name(), drawdown_metrics(index, shock_date)?);
        let betas = self.betas_from_returns(&returns, prices)?;

        tracing::info!(
            %shock_date,
            returns = returns.len(),
            scenarios = summary.len(),
            "shock analysis complete"
        );

        Ok(ShockAnalysisReport {
            returns,
            ex_constituent,
            scenarios,
            growth,
            summary,
            index_drawdown,
            betas,
        })
    }

    /// Rolling beta of the index on the constituent for every configured
    /// window. Needs no shock date.
    pub fn betas(&self, prices: &PriceTable) -> Result<Vec<(usize, ReturnSeries)>> {
        let (returns, _) = self.decompose(prices)?;
        self.betas_from_returns(&returns, prices)
    }

    fn betas_from_returns(
        &self,
        returns: &ReturnTable,
        prices: &PriceTable,
    ) -> Result<Vec<(usize, ReturnSeries)>> {
        if self.config.beta_windows.is_empty() {
            return Ok(Vec::new());
        }
        let index = returns.require_column(prices.index_name())?;
        let constituent = returns.require_column(prices.constituent_name())?;
        Ok(rolling_betas(index, constituent, &self.config.beta_windows)?)
    }

    /// Re-run the shock family under each configured sensitivity weight.
    ///
    /// The residual is decomposed with the configured weight; only the
    /// synthesis weight varies.
    ///
    /// # Errors
    /// [`NadirError::Config`] when no sensitivity weights are configured, and
    /// any decomposition or scenario error.
    pub fn sensitivity(&self, prices: &PriceTable) -> Result<SensitivityTable> {
        if self.config.sensitivity_weights.is_empty() {
            return Err(NadirError::Config(
                "sensitivity_weights must be a non-empty list".to_string(),
            ));
        }

        let (_, ex_constituent) = self.decompose(prices)?;
        let table = weight_sensitivity_table(
            &self.synthesizer,
            &ex_constituent,
            &self.config.sensitivity_weights,
            &self.config.shock_returns,
            self.config.shock_date,
        )?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nadir_returns::ErrorKind;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    fn prices() -> PriceTable {
        PriceTable::new(
            vec![d(1), d(2), d(5), d(6), d(7)],
            vec![100.0, 101.0, 98.0, 99.0, 100.5],
            vec![50.0, 51.0, 47.0, 48.0, 49.0],
            "SPX",
            "NVDA",
        )
        .unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
            .with_dates(d(1), None)
            .with_shock_date(d(5))
            .with_weight(0.1)
            .with_beta_windows(vec![3])
    }

    #[test]
    fn test_run_report_shape() {
        let report = ShockAnalysis::new(config()).unwrap().run(&prices()).unwrap();

        assert_eq!(report.returns.len(), 4);
        assert_eq!(report.ex_constituent.name(), "SPX_exNVDA");
        assert_eq!(report.scenarios.width(), 4);
        assert_eq!(report.growth.names(), report.scenarios.names());
        assert_eq!(report.summary.len(), 4);
        assert_eq!(report.summary.scenarios()[0], "SPX_shock_-30pct");
        assert_eq!(report.index_drawdown.label, "SPX");
        assert_eq!(report.betas.len(), 1);
    }

    #[test]
    fn test_index_drawdown_is_realized() {
        let report = ShockAnalysis::new(config()).unwrap().run(&prices()).unwrap();
        let m = &report.index_drawdown.metrics;
        assert_relative_eq!(m.pre_shock_level, 1.01, epsilon = 1e-12);
        assert_relative_eq!(m.max_drawdown, 98.0 / 101.0 - 1.0, epsilon = 1e-12);
        assert_eq!(m.recovery_date, None);
    }

    #[test]
    fn test_latest_beta_reading() {
        let report = ShockAnalysis::new(config()).unwrap().run(&prices()).unwrap();
        let readings = report.latest_betas();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].window, 3);
        assert_eq!(readings[0].date, d(7));
    }

    #[test]
    fn test_betas_ignore_shock_date() {
        let config = config().with_shock_date(d(20)).with_beta_windows(vec![2, 10]);
        let betas = ShockAnalysis::new(config).unwrap().betas(&prices()).unwrap();
        let readings = latest_beta_readings(&betas);
        assert_eq!(betas.len(), 2);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].window, 2);
    }

    #[test]
    fn test_too_few_prices() {
        let prices = PriceTable::new(vec![d(1)], vec![100.0], vec![50.0], "SPX", "NVDA").unwrap();
        let err = ShockAnalysis::new(config()).unwrap().run(&prices).unwrap_err();
        assert!(matches!(
            err,
            NadirError::Analysis(ref e) if e.kind() == ErrorKind::InsufficientData
        ));
    }

    #[test]
    fn test_shock_date_outside_history() {
        let config = config().with_shock_date(d(20));
        let err = ShockAnalysis::new(config).unwrap().run(&prices()).unwrap_err();
        assert!(matches!(
            err,
            NadirError::Analysis(ref e) if e.kind() == ErrorKind::Lookup
        ));
    }

    #[test]
    fn test_sensitivity_uses_configured_weights() {
        let analysis =
            ShockAnalysis::new(config().with_sensitivity_weights(vec![0.05, 0.1])).unwrap();
        let table = analysis.sensitivity(&prices()).unwrap();
        assert_eq!(table.len(), 8);
    }
}
