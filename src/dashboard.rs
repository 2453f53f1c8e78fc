use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};

use crate::aggregation::Selection;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::export::{self, NoopOpener, Opener, SystemOpener};
use crate::store::DatasetStore;
use crate::sync::{DashboardViews, SelectionEvent, ViewSynchronizer};
use crate::views;

/// The dashboard process: loaded data, live views, export action.
///
/// Built once at startup. Each `select_*` call is one user event.
pub struct SalesDashboard {
    config: DashboardConfig,
    sync: ViewSynchronizer,
    opener: Box<dyn Opener>,
}

impl SalesDashboard {
    /// Load the datasets named by `config` and compute the initial views.
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        let store = DatasetStore::load(&config)?;
        let opener: Box<dyn Opener> = if config.open_exports {
            Box::new(SystemOpener)
        } else {
            Box::new(NoopOpener)
        };
        Self::with_opener(config, store, opener)
    }

    pub fn with_opener(
        config: DashboardConfig,
        store: DatasetStore,
        opener: Box<dyn Opener>,
    ) -> Result<Self, DashboardError> {
        let sync = ViewSynchronizer::new(store)?;
        info!(
            categories = sync.store().categories().len(),
            regions = sync.store().regions().len(),
            "Dashboard ready"
        );
        Ok(Self {
            config,
            sync,
            opener,
        })
    }

    pub fn select_category(&mut self, value: &str) -> Result<&DashboardViews, DashboardError> {
        self.sync
            .handle(SelectionEvent::Category(Selection::parse(value)))
    }

    pub fn select_region(&mut self, value: &str) -> Result<&DashboardViews, DashboardError> {
        self.sync
            .handle(SelectionEvent::Region(Selection::parse(value)))
    }

    /// Export the full sales table, ignoring the active filters.
    ///
    /// A failure is logged and returned; the views are not affected.
    pub fn export(&self) -> Result<PathBuf, DashboardError> {
        export::export_sales(
            self.sync.store().sales(),
            &self.config.export_dir(),
            self.opener.as_ref(),
        )
        .inspect_err(|e| warn!("Export failed: {e}"))
    }

    pub fn payload(&self) -> Result<Value, DashboardError> {
        views::dashboard_payload(&self.sync)
    }

    pub fn synchronizer(&self) -> &ViewSynchronizer {
        &self.sync
    }

    pub fn views(&self) -> &DashboardViews {
        self.sync.views()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}
