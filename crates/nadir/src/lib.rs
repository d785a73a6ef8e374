#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/nadir/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use nadir_data as data;
pub use nadir_output as output;
pub use nadir_returns as returns;
pub use nadir_scenario as scenario;

pub use config::AnalysisConfig;
pub use error::{NadirError, Result};
pub use pipeline::{ShockAnalysis, ShockAnalysisReport, latest_beta_readings};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
