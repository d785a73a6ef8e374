//! Quote data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::prices::PriceTable;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance quote provider with default rate limiting (1 req/sec).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(1000))
    }

    /// Create a new Yahoo Finance quote provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch daily adjusted closes for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "NVDA", "^GSPC")
    /// * `start` - Start date for the data
    /// * `end` - End date for the data
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, close, adjusted_close
    pub async fn fetch_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Convert chrono DateTime to time::OffsetDateTime
        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        tracing::debug!(symbol, rows = quotes.len(), "fetched quote history");

        let timestamps: Vec<i64> = quotes.iter().map(|q| q.timestamp).collect();
        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let adj_closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();

        let mut df = DataFrame::new(vec![
            Series::new("timestamp".into(), timestamps).into(),
            Series::new("close".into(), closes).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        let symbol_col: Column = Series::new("symbol".into(), vec![symbol; df.height()]).into();
        df.with_column(symbol_col)?;

        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .select(&[
                col("symbol"),
                col("date"),
                col("close"),
                col("adjusted_close"),
            ])
            .collect()?;

        sleep(self.rate_limit_delay).await;

        Ok(df)
    }

    /// Fetch an index and one constituent and align them into a [`PriceTable`].
    ///
    /// Both histories are requested concurrently, inner-joined on date, and
    /// any date missing either adjusted close is dropped. The table's columns
    /// are labeled `index_name` and `constituent_name` rather than the raw
    /// ticker symbols.
    pub async fn fetch_price_table(
        &self,
        index_symbol: &str,
        constituent_symbol: &str,
        index_name: &str,
        constituent_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceTable> {
        let (index_quotes, constituent_quotes) = futures::try_join!(
            self.fetch_quotes(index_symbol, start, end),
            self.fetch_quotes(constituent_symbol, start, end),
        )?;

        let joined = index_quotes
            .lazy()
            .select([col("date"), col("adjusted_close").alias(index_name)])
            .join(
                constituent_quotes
                    .lazy()
                    .select([col("date"), col("adjusted_close").alias(constituent_name)]),
                [col("date")],
                [col("date")],
                JoinArgs::new(JoinType::Inner),
            )
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;

        let table = PriceTable::from_frame(&joined, "date", index_name, constituent_name)?;

        if table.len() < 2 {
            return Err(DataError::MissingData {
                symbol: format!("{}/{}", index_symbol, constituent_symbol),
                reason: format!("only {} overlapping trading dates", table.len()),
            });
        }

        tracing::debug!(
            index = index_symbol,
            constituent = constituent_symbol,
            rows = table.len(),
            "aligned price table"
        );

        Ok(table)
    }
}
