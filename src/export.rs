//! CSV export of the sales table.
//!
//! Always the unfiltered table: the active filters do not apply here.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use polars::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DashboardError;

/// Hands a written file to something that presents it to the user.
pub trait Opener: Send + Sync {
    fn open(&self, path: &Path) -> Result<(), DashboardError>;
}

/// Uses the platform "open" command:
/// - Windows: cmd /C start
/// - macOS: open
/// - other: xdg-open
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<(), DashboardError> {
        launch(open_command(path), path).map(|_| ())
    }
}

/// Spawn `command` and reap it off-thread so it does not linger as a zombie.
fn launch(mut command: Command, path: &Path) -> Result<thread::JoinHandle<()>, DashboardError> {
    let mut child = command
        .spawn()
        .map_err(|e| DashboardError::Export(format!("cannot open {}: {e}", path.display())))?;
    Ok(thread::spawn(move || {
        if let Err(e) = child.wait() {
            debug!("Open command did not exit cleanly: {e}");
        }
    }))
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}

/// Writes the file and stops there (headless use).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOpener;

impl Opener for NoopOpener {
    fn open(&self, _path: &Path) -> Result<(), DashboardError> {
        Ok(())
    }
}

/// Write `sales` as CSV to a fresh file in `dir`.
///
/// Dates are written as `YYYY-MM-DD`. Returns the file path.
pub fn write_sales_csv(sales: &DataFrame, dir: &Path) -> Result<PathBuf, DashboardError> {
    let export_err = |e: &dyn std::fmt::Display| DashboardError::Export(e.to_string());

    std::fs::create_dir_all(dir).map_err(|e| export_err(&e))?;
    let path = dir.join(format!("sales_export_{}.csv", Uuid::new_v4()));
    let mut file = File::create(&path).map_err(|e| export_err(&e))?;

    let mut df = sales.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| export_err(&e))?;

    Ok(path)
}

/// Write the unfiltered sales table and hand it to `opener`.
pub fn export_sales(
    sales: &DataFrame,
    dir: &Path,
    opener: &dyn Opener,
) -> Result<PathBuf, DashboardError> {
    let path = write_sales_csv(sales, dir)?;
    info!(rows = sales.height(), "Sales exported to {}", path.display());
    opener.open(&path)?;
    Ok(path)
}
