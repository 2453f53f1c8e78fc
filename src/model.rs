//! Typed row views over the dashboard frames.
//!
//! The frames stay the source of truth; these structs are read-only copies
//! for Rust callers that want records instead of columns.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use crate::error::DashboardError;
use crate::schema::{feedback, geo, sales};

fn null_in(frame: &str, column: &str) -> DashboardError {
    DashboardError::Aggregation(PolarsError::ComputeError(
        format!("unexpected null in {frame}.{column}").into(),
    ))
}

fn strings<'a>(df: &'a DataFrame, column: &str) -> Result<&'a StringChunked, DashboardError> {
    Ok(df.column(column)?.str()?)
}

fn floats<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Float64Chunked, DashboardError> {
    Ok(df.column(column)?.f64()?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub category: String,
    pub sales: f64,
    pub day_of_week: String,
}

impl SalesRecord {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let dates = df.column(sales::DATE)?.cast(&DataType::String)?;
        let dates = dates.str()?;
        let categories = strings(df, sales::CATEGORY)?;
        let totals = floats(df, sales::SALES)?;
        let days = strings(df, sales::DAY_OF_WEEK)?;

        (0..df.height())
            .map(|i| {
                let date = dates.get(i).ok_or_else(|| null_in("sales", sales::DATE))?;
                Ok(Self {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                        DashboardError::Aggregation(PolarsError::ComputeError(
                            format!("bad date '{date}': {e}").into(),
                        ))
                    })?,
                    category: categories
                        .get(i)
                        .ok_or_else(|| null_in("sales", sales::CATEGORY))?
                        .to_string(),
                    sales: totals.get(i).ok_or_else(|| null_in("sales", sales::SALES))?,
                    day_of_week: days
                        .get(i)
                        .ok_or_else(|| null_in("sales", sales::DAY_OF_WEEK))?
                        .to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoRecord {
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub x: f64,
    pub y: f64,
    pub sales: f64,
    pub market_share: f64,
}

impl GeoRecord {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let regions = strings(df, geo::REGION)?;
        let columns = [
            floats(df, geo::LATITUDE)?,
            floats(df, geo::LONGITUDE)?,
            floats(df, geo::X)?,
            floats(df, geo::Y)?,
            floats(df, geo::SALES)?,
            floats(df, geo::MARKET_SHARE)?,
        ];
        let value = |c: usize, i: usize| columns[c].get(i).ok_or_else(|| null_in("geo", "value"));

        (0..df.height())
            .map(|i| {
                Ok(Self {
                    region: regions
                        .get(i)
                        .ok_or_else(|| null_in("geo", geo::REGION))?
                        .to_string(),
                    latitude: value(0, i)?,
                    longitude: value(1, i)?,
                    x: value(2, i)?,
                    y: value(3, i)?,
                    sales: value(4, i)?,
                    market_share: value(5, i)?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub category: String,
    pub rating: f64,
}

impl FeedbackRecord {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let categories = strings(df, feedback::CATEGORY)?;
        let ratings = floats(df, feedback::RATING)?;
        categories
            .into_iter()
            .zip(ratings)
            .map(|(category, rating)| match (category, rating) {
                (Some(category), Some(rating)) => Ok(Self {
                    category: category.to_string(),
                    rating,
                }),
                _ => Err(null_in("feedback", feedback::RATING)),
            })
            .collect()
    }
}

/// Bar chart row: total sales of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total_sales: f64,
}

impl CategoryAggregate {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let categories = strings(df, sales::CATEGORY)?;
        let totals = floats(df, sales::SALES)?;
        categories
            .into_iter()
            .zip(totals)
            .map(|(category, total)| match (category, total) {
                (Some(category), Some(total_sales)) => Ok(Self {
                    category: category.to_string(),
                    total_sales,
                }),
                _ => Err(null_in("by_category", sales::SALES)),
            })
            .collect()
    }
}

/// Heatmap cell: total sales of one category on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub day_of_week: String,
    pub category: String,
    pub total_sales: f64,
}

impl HeatmapCell {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let days = strings(df, sales::DAY_OF_WEEK)?;
        let categories = strings(df, sales::CATEGORY)?;
        let totals = floats(df, sales::SALES)?;

        (0..df.height())
            .map(|i| match (days.get(i), categories.get(i), totals.get(i)) {
                (Some(day), Some(category), Some(total_sales)) => Ok(Self {
                    day_of_week: day.to_string(),
                    category: category.to_string(),
                    total_sales,
                }),
                _ => Err(null_in("heatmap", sales::SALES)),
            })
            .collect()
    }
}

/// Rating chart row: mean rating of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingAggregate {
    pub category: String,
    pub mean_rating: f64,
}

impl RatingAggregate {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, DashboardError> {
        let categories = strings(df, feedback::CATEGORY)?;
        let ratings = floats(df, feedback::RATING)?;
        categories
            .into_iter()
            .zip(ratings)
            .map(|(category, rating)| match (category, rating) {
                (Some(category), Some(mean_rating)) => Ok(Self {
                    category: category.to_string(),
                    mean_rating,
                }),
                _ => Err(null_in("ratings", feedback::RATING)),
            })
            .collect()
    }
}
