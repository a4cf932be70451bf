use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use csv::WriterBuilder;
use tracing::info;

use super::errors::ProventosError;
use crate::models::dividend::{DividendRecord, COLUMNS};

/// Where the finished dividend table ends up.
pub trait TableSink {
    fn write_table(&mut self, records: &[DividendRecord]) -> Result<(), ProventosError>;
}

/// Semicolon separated UTF-8 file with a header row and no index column.
pub struct CsvTableSink {
    path: PathBuf,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvTableSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[DividendRecord]) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let mut wtr = WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(file);

        wtr.write_record(COLUMNS)?;
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl TableSink for CsvTableSink {
    fn write_table(&mut self, records: &[DividendRecord]) -> Result<(), ProventosError> {
        self.write(records).map_err(|source| ProventosError::Export {
            path: self.path.clone(),
            source,
        })?;
        info!(target: "export", "Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
