pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod projection;
pub mod schema;
pub mod store;
pub mod sync;
pub mod views;

#[cfg(feature = "python")]
mod python;

pub use aggregation::Selection;
pub use config::{load_config, DashboardConfig};
pub use dashboard::SalesDashboard;
pub use error::DashboardError;
pub use export::{NoopOpener, Opener, SystemOpener};
pub use model::{
    CategoryAggregate, FeedbackRecord, GeoRecord, HeatmapCell, RatingAggregate, SalesRecord,
};
pub use store::DatasetStore;
pub use sync::{
    CategoryViews, DashboardViews, FilterSelection, GeoView, SelectionEvent, ViewSynchronizer,
};
