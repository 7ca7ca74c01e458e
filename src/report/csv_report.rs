//! Append-only CSV report.

use super::{Report, ReportRow};
use crate::error::CompressError;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "File Name")]
    file_name: &'a str,
    #[serde(rename = "Original Size (MB)")]
    original_size_mb: &'a str,
    #[serde(rename = "Compressed Size (MB)")]
    compressed_size_mb: &'a str,
    #[serde(rename = "Size Reduction (%)")]
    size_reduction: &'a str,
    #[serde(rename = "Time Taken (seconds)")]
    time_taken: &'a str,
}

impl<'a> From<&'a ReportRow> for CsvRecord<'a> {
    fn from(row: &'a ReportRow) -> Self {
        Self {
            file_name: &row.file_name,
            original_size_mb: &row.original_size_mb,
            compressed_size_mb: &row.compressed_size_mb,
            size_reduction: &row.size_reduction,
            time_taken: &row.time_taken,
        }
    }
}

impl Report {
    /// Append the rows to `path`; the header goes in only when the file is new
    pub fn write_csv(&self, path: &Path) -> Result<(), CompressError> {
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);

        if is_new && self.is_empty() {
            // serde headers are only emitted with the first record
            writer.write_record([
                "File Name",
                "Original Size (MB)",
                "Compressed Size (MB)",
                "Size Reduction (%)",
                "Time Taken (seconds)",
            ])?;
        }

        for row in &self.rows {
            writer.serialize(CsvRecord::from(row))?;
        }

        writer.flush()?;
        Ok(())
    }
}
