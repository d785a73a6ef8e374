//! End-to-end runs of the shock analysis on synthetic prices.

use approx::assert_relative_eq;
use chrono::{Days, NaiveDate};
use nadir::data::PriceTable;
use nadir::output::{ExportFormat, Exporter, Render};
use nadir::returns::{Weight, reconstruct_index_return};
use nadir::scenario::SensitivityMetric;
use nadir::{AnalysisConfig, ShockAnalysis};
use std::fmt::Write as _;

fn day(i: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(i))
        .unwrap()
}

/// Deterministic oscillating prices for 120 days.
fn synthetic_rows() -> Vec<(NaiveDate, f64, f64)> {
    let mut spx = 4_700.0;
    let mut nvda = 480.0;
    (0..120u64)
        .map(|i| {
            let t = i as f64;
            spx *= 1.0 + 0.004 * (t * 0.7).sin() + 0.0002;
            nvda *= 1.0 + 0.02 * (t * 0.45).cos() + 0.001;
            (day(i), spx, nvda)
        })
        .collect()
}

fn synthetic_prices() -> PriceTable {
    let rows = synthetic_rows();
    PriceTable::new(
        rows.iter().map(|r| r.0).collect(),
        rows.iter().map(|r| r.1).collect(),
        rows.iter().map(|r| r.2).collect(),
        "SPX",
        "NVDA",
    )
    .unwrap()
}

fn load_prices_from_csv() -> PriceTable {
    let mut csv = String::from("date,SPX,NVDA\n");
    for (date, spx, nvda) in synthetic_rows() {
        writeln!(csv, "{},{:.4},{:.4}", date, spx, nvda).unwrap();
    }

    let path = std::env::temp_dir().join(format!("nadir_prices_{}.csv", std::process::id()));
    std::fs::write(&path, csv).unwrap();
    let prices = PriceTable::from_csv_path(&path, "SPX", "NVDA").unwrap();
    std::fs::remove_file(&path).unwrap();
    prices
}

fn config() -> AnalysisConfig {
    AnalysisConfig::default()
        .with_dates(day(0), Some(day(119)))
        .with_shock_date(day(80))
        .with_weight(0.065)
        .with_beta_windows(vec![20, 60])
}

#[test]
fn test_pipeline_from_csv() {
    let prices = load_prices_from_csv();
    assert_eq!(prices.len(), 120);

    let report = ShockAnalysis::new(config()).unwrap().run(&prices).unwrap();

    assert_eq!(report.returns.len(), 119);
    assert_eq!(report.summary.len(), 4);
    assert_eq!(report.betas.iter().map(|(w, _)| *w).collect::<Vec<_>>(), vec![20, 60]);
    assert_eq!(report.latest_betas().len(), 2);

    let worst = &report.summary.rows()[0];
    assert_eq!(worst.scenario, "SPX_shock_-30pct");
    assert_eq!(worst.shock_date, day(80));
    assert!(worst.max_drawdown_pct < -1.9);
}

#[test]
fn test_decomposition_reconstructs_index() {
    let prices = synthetic_prices();
    let report = ShockAnalysis::new(config()).unwrap().run(&prices).unwrap();

    let index = report.returns.require_column("SPX").unwrap();
    let constituent = report.returns.require_column("NVDA").unwrap();
    let rebuilt = reconstruct_index_return(
        &report.ex_constituent,
        constituent,
        &Weight::Constant(0.065),
        "SPX",
    )
    .unwrap();

    for (a, b) in index.values().iter().zip(rebuilt.values()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_zero_shock_is_baseline() {
    let prices = synthetic_prices();
    let report = ShockAnalysis::new(config()).unwrap().run(&prices).unwrap();

    let baseline = report.scenarios.require_column("SPX_shock_0pct").unwrap();
    for (r, ex) in baseline.values().iter().zip(report.ex_constituent.values()) {
        assert_relative_eq!(*r, (1.0 - 0.065) * ex, epsilon = 1e-15);
    }
}

#[test]
fn test_sensitivity_grid_is_monotone_in_weight() {
    let prices = synthetic_prices();
    let analysis = ShockAnalysis::new(
        config()
            .with_shock_returns(vec![-0.30])
            .with_sensitivity_weights(vec![0.03, 0.06, 0.09]),
    )
    .unwrap();

    let grid = analysis
        .sensitivity(&prices)
        .unwrap()
        .pivot(SensitivityMetric::MaxDrawdownPct)
        .unwrap();

    let column: Vec<f64> = grid.cells.iter().map(|row| row[0].unwrap()).collect();
    assert!(column.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_report_renders_and_exports() {
    let prices = synthetic_prices();
    let report = ShockAnalysis::new(config()).unwrap().run(&prices).unwrap();

    assert!(report.summary.to_ascii_table().contains("SPX_shock_-20pct"));
    assert!(report.index_drawdown.to_markdown().contains("## Drawdown: SPX"));

    let growth = report.growth.export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(growth.lines().count(), 120);

    let json = report.summary.export_to_string(ExportFormat::Json).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(rows.len(), 4);
}
