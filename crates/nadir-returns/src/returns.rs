//! Simple returns from a price table.

use crate::error::{AnalysisError, Result};
use crate::series::{ReturnTable, TimeSeries};
use nadir_data::PriceTable;
use nadir_data::prices::DATE_COLUMN;
use polars::prelude::*;

/// Compute one-period simple returns `r_t = P_t / P_{t-1} - 1` for both
/// columns of `prices`.
///
/// The first date has no return and is dropped, so the output has one row
/// fewer than the input. A table with fewer than two rows yields an empty
/// table. Columns keep the price table's names, index first.
pub fn compute_returns(prices: &PriceTable) -> Result<ReturnTable> {
    let index_name = prices.index_name();
    let constituent_name = prices.constituent_name();

    let returns = prices
        .to_frame()?
        .lazy()
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .with_columns([
            (col(index_name) / col(index_name).shift(lit(1)) - lit(1.0)).alias(index_name),
            (col(constituent_name) / col(constituent_name).shift(lit(1)) - lit(1.0))
                .alias(constituent_name),
        ])
        .filter(col(index_name).is_not_null())
        .select([col(index_name), col(constituent_name)])
        .collect()?;

    let dates: Vec<_> = prices.dates().iter().skip(1).copied().collect();
    if returns.height() != dates.len() {
        return Err(AnalysisError::Alignment(format!(
            "expected {} return rows, computed {}",
            dates.len(),
            returns.height()
        )));
    }

    let read = |name: &str| -> Result<TimeSeries> {
        let values = returns
            .column(name)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        TimeSeries::new(name, dates.clone(), values)
    };

    tracing::debug!(
        index = index_name,
        constituent = constituent_name,
        rows = dates.len(),
        "computed simple returns"
    );

    ReturnTable::from_series(vec![read(index_name)?, read(constituent_name)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn prices() -> PriceTable {
        PriceTable::new(
            vec![d(2), d(3), d(4), d(5)],
            vec![100.0, 101.0, 99.99, 102.0],
            vec![50.0, 55.0, 44.0, 44.0],
            "SPX",
            "NVDA",
        )
        .unwrap()
    }

    #[test]
    fn test_drops_first_row() {
        let table = compute_returns(&prices()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.dates(), &[d(3), d(4), d(5)]);
        assert_eq!(table.names(), vec!["SPX", "NVDA"]);
    }

    #[test]
    fn test_each_row_is_price_ratio_minus_one() {
        let p = prices();
        let table = compute_returns(&p).unwrap();
        let spx = table.column("SPX").unwrap();
        let nvda = table.column("NVDA").unwrap();

        for t in 1..p.len() {
            let expected_spx = p.index_prices()[t] / p.index_prices()[t - 1] - 1.0;
            let expected_nvda = p.constituent_prices()[t] / p.constituent_prices()[t - 1] - 1.0;
            assert_relative_eq!(spx.values()[t - 1], expected_spx, epsilon = 1e-12);
            assert_relative_eq!(nvda.values()[t - 1], expected_nvda, epsilon = 1e-12);
        }
        assert_relative_eq!(nvda.values()[1], -0.2, epsilon = 1e-12);
        assert_relative_eq!(nvda.values()[2], 0.0);
    }

    #[test]
    fn test_single_row_gives_empty_table() {
        let p = PriceTable::new(vec![d(2)], vec![100.0], vec![50.0], "SPX", "NVDA").unwrap();
        let table = compute_returns(&p).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let p = prices();
        let before = p.clone();
        let _ = compute_returns(&p).unwrap();
        assert_eq!(p, before);
    }
}
