//! Filter state and view synchronization.
//!
//! A selection event produces a new immutable [`FilterSelection`]. The views
//! it affects are recomputed from the raw tables by pure functions, then
//! swapped into the synchronizer's output slots in one assignment.

use polars::prelude::DataFrame;
use tracing::{debug, warn};

use crate::aggregation::{
    aggregate_by_category, aggregate_heatmap, aggregate_ratings, filter_rows,
    heatmap_color_range, Selection,
};
use crate::error::DashboardError;
use crate::schema::{geo, sales};
use crate::store::DatasetStore;

/// Current value of both filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSelection {
    pub category: Selection,
    pub region: Selection,
}

impl FilterSelection {
    pub fn with_category(&self, category: Selection) -> Self {
        Self {
            category,
            region: self.region.clone(),
        }
    }

    pub fn with_region(&self, region: Selection) -> Self {
        Self {
            category: self.category.clone(),
            region,
        }
    }

    /// Apply one event. The other dimension is carried over unchanged.
    pub fn apply(&self, event: &SelectionEvent) -> Self {
        match event {
            SelectionEvent::Category(category) => self.with_category(category.clone()),
            SelectionEvent::Region(region) => self.with_region(region.clone()),
        }
    }
}

/// A user change on one of the two filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Category(Selection),
    Region(Selection),
}

/// Views driven by the category control.
#[derive(Debug, Clone)]
pub struct CategoryViews {
    /// Filtered sales rows, original order (sales trend line).
    pub trend: DataFrame,
    pub by_category: DataFrame,
    pub heatmap: DataFrame,
    pub ratings: DataFrame,
}

/// View driven by the region control.
#[derive(Debug, Clone)]
pub struct GeoView {
    /// Filtered geographic rows with projected coordinates.
    pub points: DataFrame,
}

/// Every chart-bound output slot.
#[derive(Debug, Clone)]
pub struct DashboardViews {
    pub category: CategoryViews,
    pub geo: GeoView,
}

pub fn compute_category_views(
    store: &DatasetStore,
    selection: &Selection,
) -> Result<CategoryViews, DashboardError> {
    Ok(CategoryViews {
        trend: filter_rows(store.sales(), sales::CATEGORY, selection)?,
        by_category: aggregate_by_category(store.sales(), selection)?,
        heatmap: aggregate_heatmap(store.sales(), selection)?,
        ratings: aggregate_ratings(store.feedback(), selection)?,
    })
}

pub fn compute_region_view(
    store: &DatasetStore,
    selection: &Selection,
) -> Result<GeoView, DashboardError> {
    Ok(GeoView {
        points: filter_rows(store.geo(), geo::REGION, selection)?,
    })
}

/// All views for a selection. Each dimension only feeds its own views.
pub fn compute_views(
    store: &DatasetStore,
    selection: &FilterSelection,
) -> Result<DashboardViews, DashboardError> {
    Ok(DashboardViews {
        category: compute_category_views(store, &selection.category)?,
        geo: compute_region_view(store, &selection.region)?,
    })
}

/// Owns the raw tables, the current selection and the output slots.
///
/// Constructed once at startup; every event handler runs to completion
/// before the next one is accepted (`&mut self`).
#[derive(Debug)]
pub struct ViewSynchronizer {
    store: DatasetStore,
    selection: FilterSelection,
    views: DashboardViews,
    heatmap_range: Option<(f64, f64)>,
    revision: u64,
}

impl ViewSynchronizer {
    pub fn new(store: DatasetStore) -> Result<Self, DashboardError> {
        let selection = FilterSelection::default();
        let views = compute_views(&store, &selection)?;
        // The color scale is pinned to the unfiltered heatmap.
        let heatmap_range = heatmap_color_range(&views.category.heatmap)?;

        Ok(Self {
            store,
            selection,
            views,
            heatmap_range,
            revision: 0,
        })
    }

    /// Handle one selection event.
    ///
    /// Returns the views after the event. If recomputation fails the previous
    /// selection and views are kept.
    pub fn handle(&mut self, event: SelectionEvent) -> Result<&DashboardViews, DashboardError> {
        let next = self.selection.apply(&event);
        if next == self.selection {
            return Ok(&self.views);
        }

        match &event {
            SelectionEvent::Category(category) => {
                self.warn_if_unknown("category", category, self.store.categories());
                let category_views = compute_category_views(&self.store, category)?;
                debug!(
                    category = %category,
                    rows = category_views.trend.height(),
                    "Category views recomputed"
                );
                self.views = DashboardViews {
                    category: category_views,
                    geo: self.views.geo.clone(),
                };
            }
            SelectionEvent::Region(region) => {
                self.warn_if_unknown("region", region, self.store.regions());
                let geo_view = compute_region_view(&self.store, region)?;
                debug!(region = %region, rows = geo_view.points.height(), "Geo view recomputed");
                self.views = DashboardViews {
                    category: self.views.category.clone(),
                    geo: geo_view,
                };
            }
        }

        self.selection = next;
        self.revision += 1;
        Ok(&self.views)
    }

    fn warn_if_unknown(&self, dimension: &str, selection: &Selection, known: &[String]) {
        if let Selection::Only(value) = selection {
            if !known.iter().any(|k| k == value) {
                warn!(dimension, value = %value, "Selection matches no rows");
            }
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    /// Color scale bounds of the unfiltered heatmap.
    pub fn heatmap_color_range(&self) -> Option<(f64, f64)> {
        self.heatmap_range
    }

    /// Number of events that replaced an output slot.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
