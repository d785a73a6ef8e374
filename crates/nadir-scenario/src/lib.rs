#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/nadir/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod drawdown;
pub mod label;
pub mod sensitivity;
pub mod summary;
pub mod synth;

pub use drawdown::{DrawdownMetrics, drawdown_metrics};
pub use label::{DEFAULT_LABEL_PREFIX, LabelCodec};
pub use sensitivity::{
    SensitivityGrid, SensitivityMetric, SensitivityRow, SensitivityTable,
    weight_sensitivity_table,
};
pub use summary::{SUMMARY_COLUMNS, ScenarioSummaryRow, ScenarioSummaryTable, summarize_shock_scenarios};
pub use synth::{ScenarioSynthesizer, ShockScenario, shocked_return, shocked_returns};

pub use nadir_returns::{AnalysisError, ErrorKind, Result};
