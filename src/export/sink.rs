use super::{ExportResult, ExportTable};
use polars::prelude::DataFrame;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for exported sheets.
pub trait TabularSink {
    fn write_table(&mut self, table: &ExportTable) -> ExportResult<()>;
}

/// Writes each table to `<dir>/<filename>.csv`, header row first.
pub struct CsvSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    pub fn path_for(&self, table: &ExportTable) -> PathBuf {
        self.dir.join(format!("{}.csv", table.filename))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TabularSink for CsvSink {
    fn write_table(&mut self, table: &ExportTable) -> ExportResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(table);
        let file = File::create(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&table.columns)?;
        for record in &table.records {
            writer.write_record(table.row_values(record))?;
        }
        writer.flush()?;
        info!(
            path = %path.display(),
            sheet = %table.sheet_name,
            rows = table.records.len(),
            "exported table"
        );
        self.written.push(path);
        Ok(())
    }
}

/// Sheet captured in memory.
#[derive(Debug, Clone)]
pub struct CapturedSheet {
    pub filename: String,
    pub sheet_name: String,
    pub frame: DataFrame,
}

/// Keeps every written table as a polars frame.
#[derive(Debug, Clone, Default)]
pub struct DataFrameSink {
    sheets: Vec<CapturedSheet>,
}

impl DataFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[CapturedSheet] {
        &self.sheets
    }

    pub fn last(&self) -> Option<&CapturedSheet> {
        self.sheets.last()
    }

    pub fn sheet(&self, sheet_name: &str) -> Option<&CapturedSheet> {
        self.sheets.iter().rev().find(|s| s.sheet_name == sheet_name)
    }
}

impl TabularSink for DataFrameSink {
    fn write_table(&mut self, table: &ExportTable) -> ExportResult<()> {
        let frame = table.to_dataframe()?;
        self.sheets.push(CapturedSheet {
            filename: table.filename.clone(),
            sheet_name: table.sheet_name.clone(),
            frame,
        });
        Ok(())
    }
}
