//! Where the CLI gets its prices from: a local CSV or Yahoo Finance.

use chrono::{NaiveDate, NaiveTime, Utc};
use nadir::AnalysisConfig;
use nadir_data::yahoo::quotes::YahooQuoteProvider;
use nadir_data::{PriceTable, Result};
use std::path::Path;

/// Load prices for `config`, from `csv` when given, otherwise from Yahoo.
///
/// A CSV must have a `date` column plus columns named after the configured
/// index and constituent display names.
pub(crate) async fn load_prices(config: &AnalysisConfig, csv: Option<&Path>) -> Result<PriceTable> {
    match csv {
        Some(path) => {
            tracing::info!(path = %path.display(), "reading prices from CSV");
            PriceTable::from_csv_path(path, &config.index_name, &config.constituent_name)
        }
        None => fetch_prices(config).await,
    }
}

async fn fetch_prices(config: &AnalysisConfig) -> Result<PriceTable> {
    let start = at_midnight(config.start_date);
    let end = config.end_date.map_or_else(Utc::now, at_midnight);

    tracing::info!(
        index = %config.index_symbol,
        constituent = %config.constituent_symbol,
        %start,
        %end,
        "fetching prices from Yahoo Finance"
    );

    YahooQuoteProvider::new()?
        .fetch_price_table(
            &config.index_symbol,
            &config.constituent_symbol,
            &config.index_name,
            &config.constituent_name,
            start,
            end,
        )
        .await
}

fn at_midnight(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
