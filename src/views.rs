//! Chart payloads: column-oriented JSON for the rendering layer.
//!
//! Each view becomes `{"column": [values...]}`, the shape a chart data
//! source consumes directly. Dates are emitted as `YYYY-MM-DD` strings,
//! non-finite floats as `null`.

use polars::prelude::*;
use serde_json::{json, Map, Value};

use crate::error::DashboardError;
use crate::schema::WEEKDAYS;
use crate::sync::ViewSynchronizer;

/// Convert every column of `df` into a JSON array keyed by column name.
pub fn frame_to_columns(df: &DataFrame) -> Result<Map<String, Value>, DashboardError> {
    let mut out = Map::new();
    for column in df.get_columns() {
        let values: Vec<Value> = match column.dtype() {
            DataType::String => column
                .str()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, |s| Value::from(s)))
                .collect(),
            DataType::Float64 => column
                .f64()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::from))
                .collect(),
            _ => {
                // Dates and anything else go through their string form.
                let as_text = column.cast(&DataType::String)?;
                as_text
                    .str()?
                    .into_iter()
                    .map(|v| v.map_or(Value::Null, |s| Value::from(s)))
                    .collect()
            }
        };
        out.insert(column.name().to_string(), Value::Array(values));
    }
    Ok(out)
}

/// Everything the five charts and two controls need, in one document.
pub fn dashboard_payload(sync: &ViewSynchronizer) -> Result<Value, DashboardError> {
    let views = sync.views();
    let store = sync.store();
    let color_range = sync
        .heatmap_color_range()
        .map(|(low, high)| json!([low, high]));

    Ok(json!({
        "revision": sync.revision(),
        "selection": {
            "category": sync.selection().category.as_str(),
            "region": sync.selection().region.as_str(),
        },
        "options": {
            "category": store.category_options(),
            "region": store.region_options(),
        },
        "sales_trend": frame_to_columns(&views.category.trend)?,
        "sales_by_category": frame_to_columns(&views.category.by_category)?,
        "heatmap": {
            "cells": frame_to_columns(&views.category.heatmap)?,
            "days": WEEKDAYS,
            "categories": store.categories(),
            "color_range": color_range,
        },
        "geo": frame_to_columns(&views.geo.points)?,
        "ratings": frame_to_columns(&views.category.ratings)?,
    }))
}
