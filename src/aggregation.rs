use std::fmt;

use polars::prelude::*;

use crate::error::DashboardError;
use crate::schema::{feedback, sales, selection};

/// One filter control's value: everything, or a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Interpret a control value; the literal "All" selects everything.
    pub fn parse(value: &str) -> Self {
        if value == selection::ALL {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => selection::ALL,
            Self::Only(value) => value,
        }
    }

    /// Row predicate over `column`, or `None` when nothing is filtered out.
    pub fn predicate(&self, column: &str) -> Option<Expr> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(col(column).eq(lit(value.as_str()))),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn filtered(table: &DataFrame, column: &str, selection: &Selection) -> LazyFrame {
    let lazy = table.clone().lazy();
    match selection.predicate(column) {
        Some(predicate) => lazy.filter(predicate),
        None => lazy,
    }
}

/// Rows of `table` whose `column` matches `selection`, in original order.
pub fn filter_rows(
    table: &DataFrame,
    column: &str,
    selection: &Selection,
) -> Result<DataFrame, DashboardError> {
    Ok(filtered(table, column, selection).collect()?)
}

/// Total sales per category.
///
/// Output columns: `category`, `sales`. One row per category present after
/// filtering, sorted by category.
pub fn aggregate_by_category(
    sales_df: &DataFrame,
    selection: &Selection,
) -> Result<DataFrame, DashboardError> {
    let df = filtered(sales_df, sales::CATEGORY, selection)
        .group_by([col(sales::CATEGORY)])
        .agg([col(sales::SALES).sum()])
        .sort([sales::CATEGORY], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Total sales per (weekday, category) pair.
///
/// Output columns: `day_of_week`, `category`, `sales`. Only pairs with at
/// least one contributing row appear; missing cells are not zero-filled.
pub fn aggregate_heatmap(
    sales_df: &DataFrame,
    selection: &Selection,
) -> Result<DataFrame, DashboardError> {
    let df = filtered(sales_df, sales::CATEGORY, selection)
        .group_by([col(sales::DAY_OF_WEEK), col(sales::CATEGORY)])
        .agg([col(sales::SALES).sum()])
        .sort(
            [sales::DAY_OF_WEEK, sales::CATEGORY],
            SortMultipleOptions::default(),
        )
        .collect()?;
    Ok(df)
}

/// Mean rating per category.
///
/// Output columns: `category`, `rating`. Written as sum over count: polars
/// 0.51 panics on `mean()` in its partitioned group-by.
pub fn aggregate_ratings(
    feedback_df: &DataFrame,
    selection: &Selection,
) -> Result<DataFrame, DashboardError> {
    let mean = col(feedback::RATING).sum()
        / col(feedback::RATING).count().cast(DataType::Float64);
    let df = filtered(feedback_df, feedback::CATEGORY, selection)
        .group_by([col(feedback::CATEGORY)])
        .agg([mean.alias(feedback::RATING)])
        .sort([feedback::CATEGORY], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Lowest and highest cell total of a heatmap frame, for the color scale.
pub fn heatmap_color_range(cells: &DataFrame) -> Result<Option<(f64, f64)>, DashboardError> {
    let totals = cells.column(sales::SALES)?.f64()?;
    Ok(totals.min().zip(totals.max()))
}
