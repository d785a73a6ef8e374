#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/nadir/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod beta;
pub mod decompose;
pub mod error;
pub mod growth;
pub mod returns;
pub mod series;
pub mod weight;

pub use beta::{BetaRegime, rolling_beta, rolling_betas};
pub use decompose::{ex_constituent_return, reconstruct_index_return};
pub use error::{AnalysisError, ErrorKind, Result};
pub use growth::growth_path;
pub use returns::compute_returns;
pub use series::{GrowthSeries, ReturnSeries, ReturnTable, SeriesTable, TimeSeries};
pub use weight::{AlignedWeights, Weight};
