//! CSV and JSON export of analysis results.
//!
//! Tables are written the way plotting tools want them: return and growth
//! tables are wide (one `date` column, one column per series), scenario
//! summaries are one row per scenario, and sensitivity results are either the
//! long `(weight, scenario)` table or the pivoted weight x shock grid.

use chrono::NaiveDate;
use nadir_returns::SeriesTable;
use nadir_scenario::{
    DrawdownMetrics, ScenarioSummaryTable, SensitivityGrid, SensitivityTable,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output was not valid UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// Missing values become empty CSV fields.
fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

impl Exporter for SeriesTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let columns: Vec<_> = self.columns().collect();

        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["date"];
                header.extend(self.names());
                wtr.write_record(&header)?;

                for (i, date) in self.dates().iter().enumerate() {
                    let mut record = vec![date.to_string()];
                    record.extend(columns.iter().map(|c| cell(c.values()[i])));
                    wtr.write_record(&record)?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => {
                let records: Vec<Value> = self
                    .dates()
                    .iter()
                    .enumerate()
                    .map(|(i, date)| {
                        let mut record = Map::new();
                        record.insert("date".to_string(), Value::String(date.to_string()));
                        for column in &columns {
                            let value = column.values()[i];
                            // NaN has no JSON form
                            let value = if value.is_nan() {
                                Value::Null
                            } else {
                                Value::from(value)
                            };
                            record.insert(column.name().to_string(), value);
                        }
                        Value::Object(record)
                    })
                    .collect();
                to_json(&records, format)
            }
        }
    }
}

impl Exporter for ScenarioSummaryTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in self.rows() {
                    wtr.serialize(row)?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self.rows(), format),
        }
    }
}

impl Exporter for DrawdownMetrics {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.serialize(self)?;
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}

/// Flat record for one `(weight, scenario)` pair of a [`SensitivityTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRecord {
    /// Assumed constant weight.
    pub weight: f64,
    /// Scenario label.
    pub scenario: String,
    /// Date the shock is applied.
    pub shock_date: NaiveDate,
    /// Growth-of-$1 level before the shock.
    pub pre_shock_level: f64,
    /// Maximum drawdown in percent.
    pub max_drawdown_pct: f64,
    /// Date of the maximum drawdown.
    pub max_drawdown_date: NaiveDate,
    /// Recovery date, if recovered.
    pub recovery_date: Option<NaiveDate>,
    /// Trading periods to recovery, if recovered.
    pub days_to_recovery: Option<usize>,
}

/// Flatten a sensitivity table into records, in table order.
pub fn sensitivity_records(table: &SensitivityTable) -> Vec<SensitivityRecord> {
    table
        .rows()
        .iter()
        .map(|row| SensitivityRecord {
            weight: row.weight,
            scenario: row.summary.scenario.clone(),
            shock_date: row.summary.shock_date,
            pre_shock_level: row.summary.pre_shock_level,
            max_drawdown_pct: row.summary.max_drawdown_pct,
            max_drawdown_date: row.summary.max_drawdown_date,
            recovery_date: row.summary.recovery_date,
            days_to_recovery: row.summary.days_to_recovery,
        })
        .collect()
}

impl Exporter for SensitivityTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let records = sensitivity_records(self);
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in &records {
                    wtr.serialize(record)?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(&records, format),
        }
    }
}

impl Exporter for SensitivityGrid {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["weight".to_string()];
                header.extend(self.shock_pcts.iter().map(|p| format!("{}pct", p)));
                wtr.write_record(&header)?;

                for (weight, row) in self.weights.iter().zip(&self.cells) {
                    let mut record = vec![weight.to_string()];
                    record.extend(row.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
                    wtr.write_record(&record)?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}
