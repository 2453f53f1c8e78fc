use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime, ParseResult};
use polars::prelude::*;
use tracing::info;

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::projection;
use crate::schema::{dataset, feedback, geo, sales, selection, WEEKDAYS};

/// `num_days_from_ce` of 1970-01-01; polars stores `Date` as days since epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// The three raw tables, parsed and enriched once at startup.
///
/// Nothing here is mutated after construction. Aggregations take `&DataFrame`
/// handles and build new frames.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    sales: DataFrame,
    geo: DataFrame,
    feedback: DataFrame,
    categories: Vec<String>,
    regions: Vec<String>,
}

impl DatasetStore {
    /// Load all three CSV files named by `config`.
    pub fn load(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let sales = read_csv_as_strings(&config.sales_path(), dataset::SALES)?;
        let geo = read_csv_as_strings(&config.geo_path(), dataset::GEO)?;
        let feedback = read_csv_as_strings(&config.feedback_path(), dataset::FEEDBACK)?;

        let store = Self::from_frames(sales, geo, feedback, &config.date_format)?;
        info!(
            sales_rows = store.sales.height(),
            geo_rows = store.geo.height(),
            feedback_rows = store.feedback.height(),
            "Datasets loaded from {}",
            config.data_dir.display()
        );
        Ok(store)
    }

    /// Build a store from raw frames (string or already-typed columns).
    ///
    /// Runs the same parsing and validation as [`DatasetStore::load`].
    pub fn from_frames(
        sales: DataFrame,
        geo: DataFrame,
        feedback: DataFrame,
        date_format: &str,
    ) -> Result<Self, DashboardError> {
        let sales = prepare_sales(sales, date_format)?;
        let geo = prepare_geo(geo)?;
        let feedback = prepare_feedback(feedback)?;

        let categories = distinct_values(&sales, sales::CATEGORY, dataset::SALES)?;
        let regions = distinct_values(&geo, geo::REGION, dataset::GEO)?;

        Ok(Self {
            sales,
            geo,
            feedback,
            categories,
            regions,
        })
    }

    /// Columns: date (Date), category, sales (f64), day_of_week.
    pub fn sales(&self) -> &DataFrame {
        &self.sales
    }

    /// Columns: region, latitude, longitude, sales, market_share, x, y.
    pub fn geo(&self) -> &DataFrame {
        &self.geo
    }

    /// Columns: category, rating (f64).
    pub fn feedback(&self) -> &DataFrame {
        &self.feedback
    }

    /// Distinct sales categories in first-appearance order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Distinct regions in first-appearance order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Values offered by the category control: "All" then every category.
    pub fn category_options(&self) -> Vec<String> {
        with_all(&self.categories)
    }

    /// Values offered by the region control: "All" then every region.
    pub fn region_options(&self) -> Vec<String> {
        with_all(&self.regions)
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names.
fn read_csv_as_strings(path: &Path, name: &str) -> Result<DataFrame, DashboardError> {
    if !path.is_file() {
        return Err(DashboardError::load(
            name,
            format!("file not found: {}", path.display()),
        ));
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| DashboardError::load(name, e))?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())
        .map_err(|e| DashboardError::load(name, e))?;

    Ok(df)
}

fn require_columns(df: &DataFrame, name: &str, required: &[&str]) -> Result<(), DashboardError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(DashboardError::MissingColumn {
                dataset: name.to_string(),
                column: col_name.to_string(),
            });
        }
    }
    Ok(())
}

fn prepare_sales(raw: DataFrame, date_format: &str) -> Result<DataFrame, DashboardError> {
    require_columns(&raw, dataset::SALES, &sales::REQUIRED)?;

    let mut df = parse_floats(raw, dataset::SALES, &[sales::SALES])?;
    require_non_null(&df, dataset::SALES, &[sales::CATEGORY])?;
    let df_err = |e: PolarsError| DashboardError::load(dataset::SALES, e);

    let raw_dates = df
        .column(sales::DATE)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(df_err)?;
    let raw_dates = raw_dates.str().map_err(df_err)?;

    let mut days = Vec::with_capacity(df.height());
    let mut weekdays = Vec::with_capacity(df.height());
    for (row, value) in raw_dates.into_iter().enumerate() {
        let value = value.ok_or_else(|| {
            DashboardError::load(dataset::SALES, format!("missing date at row {row}"))
        })?;
        let date = parse_date(value.trim(), date_format).map_err(|e| {
            DashboardError::load(
                dataset::SALES,
                format!("unparseable date '{value}' at row {row}: {e}"),
            )
        })?;
        days.push(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
        weekdays.push(WEEKDAYS[date.weekday().num_days_from_monday() as usize]);
    }

    let dates = Column::new(sales::DATE.into(), days)
        .cast(&DataType::Date)
        .map_err(df_err)?;
    df.with_column(dates).map_err(df_err)?;
    df.with_column(Column::new(sales::DAY_OF_WEEK.into(), weekdays))
        .map_err(df_err)?;

    df.select([sales::DATE, sales::CATEGORY, sales::SALES, sales::DAY_OF_WEEK])
        .map_err(df_err)
}

/// Parse `value` with `date_format`, also accepting a trailing time of day
/// (`2024-01-01 00:00:00` or `2024-01-01T00:00:00`), which is dropped.
fn parse_date(value: &str, date_format: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(value, date_format).or_else(|err| {
        [" %H:%M:%S%.f", "T%H:%M:%S%.f"]
            .iter()
            .find_map(|time| {
                NaiveDateTime::parse_from_str(value, &format!("{date_format}{time}")).ok()
            })
            .map(|datetime| datetime.date())
            .ok_or(err)
    })
}

fn prepare_geo(raw: DataFrame) -> Result<DataFrame, DashboardError> {
    require_columns(&raw, dataset::GEO, &geo::REQUIRED)?;

    let mut df = parse_floats(
        raw,
        dataset::GEO,
        &[geo::LATITUDE, geo::LONGITUDE, geo::SALES, geo::MARKET_SHARE],
    )?;
    require_non_null(&df, dataset::GEO, &[geo::REGION])?;
    let df_err = |e: PolarsError| DashboardError::load(dataset::GEO, e);

    let (xs, ys) = {
        let latitudes = df.column(geo::LATITUDE).and_then(|c| c.f64()).map_err(df_err)?;
        let longitudes = df.column(geo::LONGITUDE).and_then(|c| c.f64()).map_err(df_err)?;

        let mut xs = Vec::with_capacity(df.height());
        let mut ys = Vec::with_capacity(df.height());
        for (row, (lat, lon)) in latitudes.into_iter().zip(longitudes).enumerate() {
            // Nulls were rejected by parse_floats.
            let (lat, lon) = (lat.unwrap_or(f64::NAN), lon.unwrap_or(f64::NAN));
            let (x, y) = projection::to_web_mercator(lat, lon).ok_or_else(|| {
                DashboardError::load(
                    dataset::GEO,
                    format!("coordinate ({lat}, {lon}) at row {row} cannot be projected"),
                )
            })?;
            xs.push(x);
            ys.push(y);
        }
        (xs, ys)
    };

    df.with_column(Column::new(geo::X.into(), xs)).map_err(df_err)?;
    df.with_column(Column::new(geo::Y.into(), ys)).map_err(df_err)?;

    df.select([
        geo::REGION,
        geo::LATITUDE,
        geo::LONGITUDE,
        geo::SALES,
        geo::MARKET_SHARE,
        geo::X,
        geo::Y,
    ])
    .map_err(df_err)
}

fn prepare_feedback(raw: DataFrame) -> Result<DataFrame, DashboardError> {
    require_columns(&raw, dataset::FEEDBACK, &feedback::REQUIRED)?;

    let df = parse_floats(raw, dataset::FEEDBACK, &[feedback::RATING])?;
    require_non_null(&df, dataset::FEEDBACK, &[feedback::CATEGORY])?;
    let df_err = |e: PolarsError| DashboardError::load(dataset::FEEDBACK, e);

    let ratings = df.column(feedback::RATING).and_then(|c| c.f64()).map_err(df_err)?;
    for (row, rating) in ratings.into_iter().enumerate() {
        if let Some(rating) = rating {
            if !(feedback::MIN_RATING..=feedback::MAX_RATING).contains(&rating) {
                return Err(DashboardError::load(
                    dataset::FEEDBACK,
                    format!("rating {rating} at row {row} is outside [1, 5]"),
                ));
            }
        }
    }

    df.select([feedback::CATEGORY, feedback::RATING])
        .map_err(df_err)
}

// ── Parse helpers ───────────────────────────────────────────────────────────

/// Cast the given columns to Float64, stripping whitespace from strings.
/// Any value that does not parse (or is missing) fails the load.
fn parse_floats(df: DataFrame, name: &str, columns: &[&str]) -> Result<DataFrame, DashboardError> {
    let mut exprs = Vec::with_capacity(columns.len());
    for &column in columns {
        let dtype = df
            .column(column)
            .map_err(|e| DashboardError::load(name, e))?
            .dtype()
            .clone();
        let expr = if dtype == DataType::String {
            col(column)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .cast(DataType::Float64)
        } else {
            col(column).cast(DataType::Float64)
        };
        exprs.push(expr);
    }

    let df = df
        .lazy()
        .with_columns(exprs)
        .collect()
        .map_err(|e| DashboardError::load(name, e))?;

    require_non_null(&df, name, columns)?;
    Ok(df)
}

fn require_non_null(df: &DataFrame, name: &str, columns: &[&str]) -> Result<(), DashboardError> {
    for &column in columns {
        let null_count = df
            .column(column)
            .map_err(|e| DashboardError::load(name, e))?
            .null_count();
        if null_count > 0 {
            return Err(DashboardError::load(
                name,
                format!("column '{column}' has {null_count} missing or unparseable values"),
            ));
        }
    }
    Ok(())
}

fn distinct_values(df: &DataFrame, column: &str, name: &str) -> Result<Vec<String>, DashboardError> {
    let values = df
        .column(column)
        .and_then(|c| c.str())
        .map_err(|e| DashboardError::load(name, e))?;

    let mut seen = HashSet::new();
    Ok(values
        .into_iter()
        .flatten()
        .filter(|v| seen.insert(*v))
        .map(|v| v.to_string())
        .collect())
}

fn with_all(values: &[String]) -> Vec<String> {
    std::iter::once(selection::ALL.to_string())
        .chain(values.iter().cloned())
        .collect()
}
