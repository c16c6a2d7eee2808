//! Interquartile-range outlier removal.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::table::Table;

/// Tukey fence multiplier.
pub const DEFAULT_FENCE: f64 = 1.5;

/// Quartiles of a column and the inclusive bounds derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Q1/Q3 of the non-null values of `column` (linear interpolation) and the
/// bounds `[Q1 - fence·IQR, Q3 + fence·IQR]`.
pub fn iqr_bounds(table: &Table, column: &str, fence: f64) -> Result<IqrBounds> {
    let values = table.numeric_values(column)?;
    let q = variantlab_stats::quartiles(&values).ok_or_else(|| AnalysisError::EmptyColumn {
        table: table.name().to_string(),
        column: column.to_string(),
    })?;
    let (lower, upper) = q.fences(fence);
    let bounds = IqrBounds {
        q1: q.q1,
        q3: q.q3,
        iqr: q.iqr(),
        lower,
        upper,
    };
    log::debug!(
        "{}.{column}: q1={} q3={} iqr={} bounds=[{}, {}]",
        table.name(),
        bounds.q1,
        bounds.q3,
        bounds.iqr,
        bounds.lower,
        bounds.upper
    );
    Ok(bounds)
}

/// Rows whose `column` value lies in `[lower, upper]`, in original order.
/// Rows with a null value are dropped.
pub fn filter_range(table: &Table, column: &str, lower: f64, upper: f64) -> Result<Table> {
    let values = table.numeric_column(column)?;
    let mut keep = values
        .into_iter()
        .map(|v| v.is_some_and(|x| lower <= x && x <= upper));
    let filtered = table.retain_rows(|_| keep.next().unwrap_or(false));
    log::info!(
        "{}: kept {} of {} rows within [{lower}, {upper}]",
        table.name(),
        filtered.len(),
        table.len()
    );
    Ok(filtered)
}

/// [`iqr_bounds`] followed by [`filter_range`] with those bounds.
pub fn remove_outliers(table: &Table, column: &str) -> Result<(Table, IqrBounds)> {
    let bounds = iqr_bounds(table, column, DEFAULT_FENCE)?;
    let cleaned = filter_range(table, column, bounds.lower, bounds.upper)?;
    Ok((cleaned, bounds))
}
