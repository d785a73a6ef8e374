//! Top-level error type.

use thiserror::Error;

/// Result type for the nadir pipeline.
pub type Result<T> = std::result::Result<T, NadirError>;

/// Any failure surfaced by the pipeline or its configuration.
#[derive(Debug, Error)]
pub enum NadirError {
    /// Price loading or fetching failed
    #[error(transparent)]
    Data(#[from] nadir_data::DataError),

    /// A return, scenario or drawdown computation failed
    #[error(transparent)]
    Analysis(#[from] nadir_returns::AnalysisError),

    /// Rendering or export failed
    #[error(transparent)]
    Export(#[from] nadir_output::ExportError),

    /// Configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`crate::AnalysisConfig`]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
