use std::path::{Path, PathBuf};

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::config::{self, DashboardConfig};
use crate::dashboard::SalesDashboard;
use crate::logging;
use crate::schema;

/// Dashboard handle for the chart layer.
///
/// Every getter returns a fresh `polars.DataFrame` snapshot of one output
/// slot; call them again after a `select_*` to pick up the new data.
#[pyclass(name = "Dashboard")]
pub struct PyDashboard {
    inner: SalesDashboard,
}

#[pymethods]
impl PyDashboard {
    /// Load using a TOML config file, or the embedded defaults.
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<String>) -> PyResult<Self> {
        let config = config::load_config(config_path.as_deref().map(Path::new))?;
        Ok(Self {
            inner: SalesDashboard::open(config)?,
        })
    }

    /// Load the default file names from `data_dir`.
    #[staticmethod]
    #[pyo3(signature = (data_dir, open_exports=true))]
    fn from_dir(data_dir: String, open_exports: bool) -> PyResult<Self> {
        let mut config = DashboardConfig::for_dir(PathBuf::from(data_dir));
        config.open_exports = open_exports;
        Ok(Self {
            inner: SalesDashboard::open(config)?,
        })
    }

    // ── Events ──────────────────────────────────────────────────────────────

    fn select_category(&mut self, value: &str) -> PyResult<u64> {
        self.inner.select_category(value)?;
        Ok(self.inner.synchronizer().revision())
    }

    fn select_region(&mut self, value: &str) -> PyResult<u64> {
        self.inner.select_region(value)?;
        Ok(self.inner.synchronizer().revision())
    }

    /// Export the unfiltered sales table. Returns the written file path.
    fn export(&self) -> PyResult<String> {
        let path = self.inner.export()?;
        Ok(path.display().to_string())
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn category_options(&self) -> Vec<String> {
        self.inner.synchronizer().store().category_options()
    }

    #[getter]
    fn region_options(&self) -> Vec<String> {
        self.inner.synchronizer().store().region_options()
    }

    #[getter]
    fn selection(&self) -> (String, String) {
        let selection = self.inner.synchronizer().selection();
        (
            selection.category.as_str().to_string(),
            selection.region.as_str().to_string(),
        )
    }

    #[getter]
    fn revision(&self) -> u64 {
        self.inner.synchronizer().revision()
    }

    #[getter]
    fn heatmap_color_range(&self) -> Option<(f64, f64)> {
        self.inner.synchronizer().heatmap_color_range()
    }

    #[getter]
    fn sales_trend_df(&self) -> PyDataFrame {
        PyDataFrame(self.inner.views().category.trend.clone())
    }

    #[getter]
    fn sales_by_category_df(&self) -> PyDataFrame {
        PyDataFrame(self.inner.views().category.by_category.clone())
    }

    #[getter]
    fn heatmap_df(&self) -> PyDataFrame {
        PyDataFrame(self.inner.views().category.heatmap.clone())
    }

    #[getter]
    fn ratings_df(&self) -> PyDataFrame {
        PyDataFrame(self.inner.views().category.ratings.clone())
    }

    #[getter]
    fn geo_df(&self) -> PyDataFrame {
        PyDataFrame(self.inner.views().geo.points.clone())
    }

    /// All views, options and the current selection as one JSON document.
    fn views_json(&self) -> PyResult<String> {
        let payload = self.inner.payload()?;
        serde_json::to_string(&payload)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Sales
    let sales = PyModule::new(m.py(), "sales")?;
    sales.add("DATE", schema::sales::DATE)?;
    sales.add("CATEGORY", schema::sales::CATEGORY)?;
    sales.add("SALES", schema::sales::SALES)?;
    sales.add("DAY_OF_WEEK", schema::sales::DAY_OF_WEEK)?;
    m.add_submodule(&sales)?;

    // Geographic
    let geo = PyModule::new(m.py(), "geo")?;
    geo.add("REGION", schema::geo::REGION)?;
    geo.add("LATITUDE", schema::geo::LATITUDE)?;
    geo.add("LONGITUDE", schema::geo::LONGITUDE)?;
    geo.add("SALES", schema::geo::SALES)?;
    geo.add("MARKET_SHARE", schema::geo::MARKET_SHARE)?;
    geo.add("X", schema::geo::X)?;
    geo.add("Y", schema::geo::Y)?;
    m.add_submodule(&geo)?;

    // Feedback
    let feedback = PyModule::new(m.py(), "feedback")?;
    feedback.add("CATEGORY", schema::feedback::CATEGORY)?;
    feedback.add("RATING", schema::feedback::RATING)?;
    m.add_submodule(&feedback)?;

    m.add("ALL", schema::selection::ALL)?;
    m.add("WEEKDAYS", schema::WEEKDAYS.to_vec())?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "sales_dashboard")]
fn python_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    logging::init("info");
    m.add_class::<PyDashboard>()?;
    add_schema_exports(m)?;
    Ok(())
}
