//! Two-column price table keyed by trading date.
//!
//! A [`PriceTable`] is the only shape the analytics crates accept from the
//! outside world: one index price and one constituent price per trading date,
//! sorted chronologically, no duplicate dates, and no row with a missing value
//! in either column. Adjacent rows define one trading period.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Date format used for the `date` column in frames and CSV files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Name of the date column produced by [`PriceTable::to_frame`].
pub const DATE_COLUMN: &str = "date";

/// Aligned, gap-free index and constituent prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    index: Vec<f64>,
    constituent: Vec<f64>,
    index_name: String,
    constituent_name: String,
}

impl PriceTable {
    /// Build a price table from parallel columns.
    ///
    /// Rows are sorted by date. A row whose index or constituent price is not
    /// finite is dropped; when a date appears twice the later row wins.
    /// A finite price that is zero or negative is rejected.
    ///
    /// # Errors
    /// [`DataError::LengthMismatch`] when the columns disagree in length and
    /// [`DataError::InvalidPrice`] for a non-positive price.
    pub fn new(
        dates: Vec<NaiveDate>,
        index: Vec<f64>,
        constituent: Vec<f64>,
        index_name: impl Into<String>,
        constituent_name: impl Into<String>,
    ) -> Result<Self> {
        let index_name = index_name.into();
        let constituent_name = constituent_name.into();

        if index.len() != dates.len() {
            return Err(DataError::LengthMismatch {
                column: index_name,
                dates: dates.len(),
                values: index.len(),
            });
        }
        if constituent.len() != dates.len() {
            return Err(DataError::LengthMismatch {
                column: constituent_name,
                dates: dates.len(),
                values: constituent.len(),
            });
        }

        let mut rows: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
        let mut dropped = 0usize;

        for ((date, idx), cons) in dates.into_iter().zip(index).zip(constituent) {
            if !idx.is_finite() || !cons.is_finite() {
                dropped += 1;
                continue;
            }
            for (name, value) in [(&index_name, idx), (&constituent_name, cons)] {
                if value <= 0.0 {
                    return Err(DataError::InvalidPrice {
                        symbol: name.clone(),
                        date: date.format(DATE_FORMAT).to_string(),
                        value,
                    });
                }
            }
            rows.insert(date, (idx, cons));
        }

        if dropped > 0 {
            tracing::warn!(
                dropped,
                index = %index_name,
                constituent = %constituent_name,
                "dropped price rows with a missing value"
            );
        }

        let mut table = Self {
            dates: Vec::with_capacity(rows.len()),
            index: Vec::with_capacity(rows.len()),
            constituent: Vec::with_capacity(rows.len()),
            index_name,
            constituent_name,
        };
        for (date, (idx, cons)) in rows {
            table.dates.push(date);
            table.index.push(idx);
            table.constituent.push(cons);
        }

        Ok(table)
    }

    /// Build a price table from a polars `DataFrame`.
    ///
    /// The date column may be a polars `Date`, `Datetime`, or an ISO
    /// `YYYY-MM-DD` string column. Null prices are filtered out before the
    /// rows reach [`PriceTable::new`], so the usual cleaning rules apply.
    /// The resulting table takes its column names from `index_col` and
    /// `constituent_col`.
    pub fn from_frame(
        df: &DataFrame,
        date_col: &str,
        index_col: &str,
        constituent_col: &str,
    ) -> Result<Self> {
        let cleaned = df
            .clone()
            .lazy()
            .filter(
                col(date_col)
                    .is_not_null()
                    .and(col(index_col).is_not_null())
                    .and(col(constituent_col).is_not_null()),
            )
            .select([
                col(date_col).cast(DataType::Date).cast(DataType::String).alias("date"),
                col(index_col).cast(DataType::Float64).alias("index"),
                col(constituent_col).cast(DataType::Float64).alias("constituent"),
            ])
            .collect()?;

        let raw_dates = cleaned.column("date")?.str()?;
        let index = cleaned.column("index")?.f64()?;
        let constituent = cleaned.column("constituent")?.f64()?;

        let mut dates = Vec::with_capacity(cleaned.height());
        for i in 0..cleaned.height() {
            let raw = raw_dates
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
            dates.push(parse_date(raw)?);
        }

        Self::new(
            dates,
            index.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            constituent.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            index_col,
            constituent_col,
        )
    }

    /// Read a price table from a CSV file with a `date` column.
    ///
    /// Empty cells are treated as missing and the row is dropped.
    pub fn from_csv_path<P: AsRef<Path>>(
        path: P,
        index_col: &str,
        constituent_col: &str,
    ) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DataError::Parse(format!("CSV has no '{}' column", name)))
        };
        let date_pos = position(DATE_COLUMN)?;
        let index_pos = position(index_col)?;
        let constituent_pos = position(constituent_col)?;

        let mut dates = Vec::new();
        let mut index = Vec::new();
        let mut constituent = Vec::new();

        for record in reader.records() {
            let record = record?;
            let field = |pos: usize| record.get(pos).map(str::trim).unwrap_or_default();
            dates.push(parse_date(field(date_pos))?);
            index.push(parse_price(field(index_pos))?);
            constituent.push(parse_price(field(constituent_pos))?);
        }

        Self::new(dates, index, constituent, index_col, constituent_col)
    }

    /// Convert to a `DataFrame` with columns `[date, <index>, <constituent>]`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self
            .dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();

        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN.into(), dates).into(),
            Series::new(self.index_name.as_str().into(), self.index.clone()).into(),
            Series::new(
                self.constituent_name.as_str().into(),
                self.constituent.clone(),
            )
            .into(),
        ])?;

        let df = df
            .lazy()
            .with_column(col(DATE_COLUMN).cast(DataType::Date))
            .collect()?;

        Ok(df)
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Index prices aligned with [`PriceTable::dates`].
    pub fn index_prices(&self) -> &[f64] {
        &self.index
    }

    /// Constituent prices aligned with [`PriceTable::dates`].
    pub fn constituent_prices(&self) -> &[f64] {
        &self.constituent
    }

    /// Display name of the index column.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Display name of the constituent column.
    pub fn constituent_name(&self) -> &str {
        &self.constituent_name
    }

    /// Number of trading dates.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First trading date, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last trading date, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DataError::Parse(format!("Invalid date '{}': {}", raw, e)))
}

fn parse_price(raw: &str) -> Result<f64> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|e| DataError::Parse(format!("Invalid price '{}': {}", raw, e)))
}
