//! Growth-of-$1 paths.

use crate::error::Result;
use crate::series::{GrowthSeries, ReturnSeries, ReturnTable, SeriesTable, TimeSeries};

/// Cumulative product of `(1 + r)` from the first date of `returns`.
///
/// The level on each date includes that date's return. A missing return
/// leaves the level unchanged, so the path never goes missing.
pub fn growth_path(returns: &ReturnSeries) -> GrowthSeries {
    let mut level = 1.0;
    let values = returns
        .values()
        .iter()
        .map(|r| {
            if !r.is_nan() {
                level *= 1.0 + r;
            }
            level
        })
        .collect();

    TimeSeries::from_parts(
        returns.name().to_string(),
        returns.dates().to_vec(),
        values,
    )
}

impl ReturnTable {
    /// Growth-of-$1 path for every column.
    pub fn growth(&self) -> Result<SeriesTable> {
        SeriesTable::from_series(self.columns().map(growth_path).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    #[test]
    fn test_compounds() {
        let r = TimeSeries::new("r", vec![d(1), d(2), d(5)], vec![0.1, -0.5, 1.0]).unwrap();
        let g = growth_path(&r);
        assert_relative_eq!(g.values()[0], 1.1, epsilon = 1e-12);
        assert_relative_eq!(g.values()[1], 0.55, epsilon = 1e-12);
        assert_relative_eq!(g.values()[2], 1.1, epsilon = 1e-12);
        assert_eq!(g.name(), "r");
    }

    #[test]
    fn test_missing_return_carries_level() {
        let r = TimeSeries::new("r", vec![d(1), d(2), d(5)], vec![0.1, f64::NAN, 0.1]).unwrap();
        let g = growth_path(&r);
        assert_relative_eq!(g.values()[1], 1.1, epsilon = 1e-12);
        assert_relative_eq!(g.values()[2], 1.21, epsilon = 1e-12);
        assert_eq!(g.missing_count(), 0);
    }

    #[test]
    fn test_table_growth() {
        let a = TimeSeries::new("a", vec![d(1), d(2)], vec![0.0, 0.0]).unwrap();
        let b = TimeSeries::new("b", vec![d(1), d(2)], vec![0.5, 0.0]).unwrap();
        let table = SeriesTable::from_series(vec![a, b]).unwrap();
        let growth = table.growth().unwrap();
        assert_eq!(growth.column("a").unwrap().values(), &[1.0, 1.0]);
        assert_eq!(growth.column("b").unwrap().values(), &[1.5, 1.5]);
    }
}
