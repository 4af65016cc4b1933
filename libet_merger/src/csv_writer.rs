use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use time::macros::format_description;

use super::combined::{CombinedTable, MergeSummary};
use super::constants::FORMAT_VERSION;
use super::data_set::RunPair;
use super::error::CsvWriterError;
use super::eye_sample::ColumnKind;

/// Format a sample value at the precision it was stored with. Missing values are empty cells,
/// integral floats keep their decimal point and integer columns are written without one
pub fn format_value(kind: ColumnKind, value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    match kind {
        ColumnKind::Integer => format!("{}", value as i64),
        ColumnKind::Float32 => format_float(value as f32),
        ColumnKind::Float64 => format_float(value),
    }
}

fn format_float<T: std::fmt::Display + Into<f64> + Copy>(value: T) -> String {
    let wide: f64 = value.into();
    if wide.fract() == 0.0 && wide.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Contents of the YAML file written next to each combined CSV
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    version: String,
    csv_file: String,
    csv_size: String,
    hdf5_file: String,
    hdf5_size: String,
    session_time: Option<String>,
    merge: &'a MergeSummary,
}

fn file_size(path: &Path) -> String {
    match path.metadata() {
        Ok(meta) => human_bytes::human_bytes(meta.len() as f64),
        Err(_) => String::from("unknown"),
    }
}

/// Writes a CombinedTable to a CSV file, plus an optional YAML summary with the same stem.
#[derive(Debug)]
pub struct CsvWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    summary_path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: &Path) -> Result<Self, CsvWriterError> {
        let writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .from_path(path)?;
        let summary_path = path.with_extension("yml");
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            summary_path,
        })
    }

    /// Write the header and every row of the table
    pub fn write_table(&mut self, table: &CombinedTable) -> Result<(), CsvWriterError> {
        self.writer.write_record(table.header())?;
        let n_experiment = table.n_experiment_columns();
        let mut record: Vec<String> = Vec::new();
        for row in 0..table.n_rows() {
            record.clear();
            record.extend(
                table
                    .eye_values(row)
                    .map(|(kind, value)| format_value(kind, value)),
            );
            record.push(table.message(row).unwrap_or("").to_string());
            match table.experiment_cells(row) {
                Some(cells) => record.extend(cells.iter().cloned()),
                None => record.extend(std::iter::repeat(String::new()).take(n_experiment)),
            }
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    /// Write the run bookkeeping to `<output stem>.yml`
    pub fn write_summary(
        &self,
        pair: &RunPair,
        summary: &MergeSummary,
    ) -> Result<(), CsvWriterError> {
        let session_time = match pair.session_datetime() {
            Some(dt) => Some(dt.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]"
            ))?),
            None => None,
        };
        let run_summary = RunSummary {
            version: format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION),
            csv_file: pair.csv_path.to_string_lossy().to_string(),
            csv_size: file_size(&pair.csv_path),
            hdf5_file: pair.hdf5_path.to_string_lossy().to_string(),
            hdf5_size: file_size(&pair.hdf5_path),
            session_time,
            merge: summary,
        };
        std::fs::write(&self.summary_path, serde_yaml::to_string(&run_summary)?)?;
        Ok(())
    }

    /// Flush everything to disk, consume the writer
    pub fn close(mut self) -> Result<(), CsvWriterError> {
        self.writer.flush()?;
        log::info!("Wrote combined data to {}", self.path.display());
        Ok(())
    }
}
