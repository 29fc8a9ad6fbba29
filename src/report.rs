//! Per-day demographic CSV output.
use csv::Writer;
use serde_derive::Serialize;
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use crate::demographics::Demographics;
use crate::error::SirError;

/// Where report files go and what happens to existing ones.
#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub directory: PathBuf,
    pub overwrite: bool,
}

impl ReportOptions {
    pub fn new() -> Self {
        ReportOptions::default()
    }

    pub fn file_prefix(&mut self, file_prefix: &str) -> &mut ReportOptions {
        self.file_prefix = file_prefix.to_string();
        self
    }

    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.directory = directory;
        self
    }

    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }

    /// `directory/file_prefix + name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}{name}", self.file_prefix))
    }
}

/// One CSV row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DemographicsRow {
    pub day: u64,
    pub susceptible: usize,
    pub infectious: usize,
    pub recovered: usize,
    pub susceptible_fraction: f64,
    pub infectious_fraction: f64,
    pub recovered_fraction: f64,
}

impl DemographicsRow {
    pub fn new(day: u64, demographics: &Demographics) -> Self {
        let fractions = demographics.fractions();
        DemographicsRow {
            day,
            susceptible: demographics.susceptible,
            infectious: demographics.infectious,
            recovered: demographics.recovered,
            susceptible_fraction: fractions.susceptible,
            infectious_fraction: fractions.infectious,
            recovered_fraction: fractions.recovered,
        }
    }
}

// Checks that the path is valid. Creates all parent directories if they do not exist and
// refuses to clobber an existing file unless `overwrite` is set.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, SirError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            if !overwrite && path.exists() {
                return Err(SirError::ReportError(format!(
                    "report output file already exists: {}. Use --force-overwrite to replace it",
                    path.display()
                )));
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(SirError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes one [`DemographicsRow`] per simulated day, flushing after every row so a partial
/// run still leaves a usable file.
pub struct DemographicsReport {
    path: PathBuf,
    writer: Writer<File>,
    rows: usize,
}

impl DemographicsReport {
    /// Creates the report file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::ReportError`] if `path` is not a `.csv` file or already exists
    /// and `overwrite` is false, and [`SirError::IoError`] if it cannot be created.
    pub fn create(path: &Path, overwrite: bool) -> Result<Self, SirError> {
        let file = generate_validate_filepath(path, overwrite)?;
        Ok(DemographicsReport {
            path: path.to_path_buf(),
            writer: Writer::from_writer(file),
            rows: 0,
        })
    }

    /// Creates `name` under the directory and prefix of `options`.
    ///
    /// # Errors
    ///
    /// See [`DemographicsReport::create`].
    pub fn with_options(options: &ReportOptions, name: &str) -> Result<Self, SirError> {
        DemographicsReport::create(&options.path_for(name), options.overwrite)
    }

    /// # Errors
    ///
    /// Returns [`SirError::CsvError`] or [`SirError::IoError`] if the row cannot be written.
    pub fn record(&mut self, day: u64, demographics: &Demographics) -> Result<(), SirError> {
        self.writer
            .serialize(DemographicsRow::new(day, demographics))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}
