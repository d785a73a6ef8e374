//! Ex-constituent decomposition.
//!
//! The index return splits into a constituent part and a residual:
//!
//! ```text
//! r_index = w * r_constituent + (1 - w) * r_ex
//! r_ex    = (r_index - w * r_constituent) / (1 - w)
//! ```
//!
//! `r_ex` is what the index would have returned without the constituent.

use crate::error::Result;
use crate::series::{ReturnSeries, TimeSeries};
use crate::weight::Weight;

/// Name given to the residual series: `<index>_ex<constituent>`.
pub fn ex_constituent_name(index_name: &str, constituent_name: &str) -> String {
    format!("{}_ex{}", index_name, constituent_name)
}

/// Solve for the ex-constituent return on every date of `index_ret`.
///
/// `constituent_ret` is reindexed onto `index_ret`'s dates; a date it lacks
/// produces a missing residual on that date. `weight` is broadcast or
/// reindexed the same way and must be gap-free and in `[0, 1)`.
///
/// # Errors
/// Alignment or domain errors from [`Weight::align`].
pub fn ex_constituent_return(
    index_ret: &ReturnSeries,
    constituent_ret: &ReturnSeries,
    weight: &Weight,
) -> Result<ReturnSeries> {
    let dates = index_ret.dates();
    let w = weight.align(dates)?;
    let constituent = constituent_ret.reindex(dates);

    let values = index_ret
        .values()
        .iter()
        .zip(&constituent)
        .zip(w.values())
        .map(|((r_index, r_cons), w)| (r_index - w * r_cons) / (1.0 - w))
        .collect();

    let ex = TimeSeries::from_parts(
        ex_constituent_name(index_ret.name(), constituent_ret.name()),
        dates.to_vec(),
        values,
    );

    tracing::debug!(
        series = ex.name(),
        rows = ex.len(),
        missing = ex.missing_count(),
        "computed ex-constituent returns"
    );

    Ok(ex)
}

/// Recombine a residual and a constituent into index returns:
/// `w * r_constituent + (1 - w) * r_ex` on the residual's dates.
///
/// Inverse of [`ex_constituent_return`] for the same weight.
pub fn reconstruct_index_return(
    ex_ret: &ReturnSeries,
    constituent_ret: &ReturnSeries,
    weight: &Weight,
    name: impl Into<String>,
) -> Result<ReturnSeries> {
    let dates = ex_ret.dates();
    let w = weight.align(dates)?;
    let constituent = constituent_ret.reindex(dates);

    let values = ex_ret
        .values()
        .iter()
        .zip(&constituent)
        .zip(w.values())
        .map(|((r_ex, r_cons), w)| w * r_cons + (1.0 - w) * r_ex)
        .collect();

    Ok(TimeSeries::from_parts(name.into(), dates.to_vec(), values))
}
