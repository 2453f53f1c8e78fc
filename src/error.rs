use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load {dataset} data: {reason}")]
    Load { dataset: String, reason: String },

    #[error("Missing column in {dataset} data: {column}")]
    MissingColumn { dataset: String, column: String },

    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] polars::error::PolarsError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub(crate) fn load(dataset: &str, reason: impl ToString) -> Self {
        Self::Load {
            dataset: dataset.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the dashboard can keep running after this error.
    ///
    /// Load and configuration errors abort startup; aggregation errors are
    /// logic defects. Only export failures are reported and then dropped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Export(_))
    }
}

#[cfg(feature = "python")]
impl From<DashboardError> for pyo3::PyErr {
    fn from(err: DashboardError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
