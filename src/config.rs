use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DashboardError;

/// Default configuration embedded in the library.
pub const DEFAULT_CONFIG: &str = r#"
data_dir = "."
sales_file = "sales_data.csv"
geo_file = "geographic_data.csv"
feedback_file = "customer_feedback.csv"
date_format = "%Y-%m-%d"
open_exports = true
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Directory that relative data file names resolve against.
    pub data_dir: PathBuf,
    pub sales_file: PathBuf,
    pub geo_file: PathBuf,
    pub feedback_file: PathBuf,
    /// chrono format string for the sales `date` column. A trailing time of
    /// day after the date is accepted and dropped.
    pub date_format: String,
    /// Where exports are written; the OS temp dir when absent.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Hand exported files to the OS "open" action.
    #[serde(default = "default_open_exports")]
    pub open_exports: bool,
}

fn default_open_exports() -> bool {
    true
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            sales_file: PathBuf::from("sales_data.csv"),
            geo_file: PathBuf::from("geographic_data.csv"),
            feedback_file: PathBuf::from("customer_feedback.csv"),
            date_format: "%Y-%m-%d".to_string(),
            export_dir: None,
            open_exports: true,
        }
    }
}

impl DashboardConfig {
    /// Default file names inside `data_dir`.
    pub fn for_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, DashboardError> {
        toml::from_str(contents).map_err(|e| DashboardError::Config(e.to_string()))
    }

    pub fn sales_path(&self) -> PathBuf {
        self.resolve(&self.sales_file)
    }

    pub fn geo_path(&self) -> PathBuf {
        self.resolve(&self.geo_file)
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.resolve(&self.feedback_file)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to the embedded default when no path is given or the file does
/// not exist. A file that exists but does not parse is an error.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, DashboardError> {
    if let Some(path) = path {
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            return DashboardConfig::from_toml_str(&contents);
        }
        tracing::warn!("Config file not found at: {}", path.display());
    }

    tracing::info!("Using default embedded configuration");
    DashboardConfig::from_toml_str(DEFAULT_CONFIG)
}
