#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/nadir/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod render;

pub use export::{
    ExportError, ExportFormat, Exporter, SensitivityRecord, sensitivity_records,
};
pub use render::{BetaReading, LabeledMetrics, Render};
