//! # Report Module
//!
//! Aggrega gli outcome del run in righe di report e le rende in tre formati:
//! - `csv_report`: CSV append-only (header scritto solo alla creazione)
//! - `html_report`: documento HTML autonomo, rigenerato ad ogni run
//! - `table`: tabella per il terminale
//!
//! ## Consistenza:
//! I valori numerici (MB, percentuale, secondi) vengono arrotondati a 2 decimali
//! una sola volta in `ReportRow`; tutti i formati leggono le stesse stringhe,
//! quindi nessun outcome può comparire in un report con numeri diversi dall'altro.
//! I report non rileggono mai il filesystem.

pub mod csv_report;
pub mod html_report;
pub mod table;

use crate::file_manager::FileManager;
use crate::outcome::CompressionOutcome;
use std::path::Path;

/// One outcome, with every numeric field already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub file_name: String,
    pub file_location: String,
    pub original_size_mb: String,
    pub compressed_size_mb: String,
    pub size_reduction: String,
    pub time_taken: String,
    /// `file://` URL of the resulting file
    pub link: String,
}

impl ReportRow {
    pub fn from_outcome(outcome: &CompressionOutcome) -> Self {
        let compressed_size_mb = outcome
            .compressed_size
            .map(|size| format!("{:.2}", FileManager::bytes_to_mb(size)))
            .unwrap_or_default();

        Self {
            file_name: outcome.file_name.clone(),
            file_location: outcome.location.display().to_string(),
            original_size_mb: format!("{:.2}", FileManager::bytes_to_mb(outcome.original_size)),
            compressed_size_mb,
            size_reduction: format!("{:.2}", outcome.reduction_percent),
            time_taken: format!("{:.2}", outcome.elapsed.as_secs_f64()),
            link: file_link(&outcome.location),
        }
    }
}

/// All rows of a run, in the order outcomes were collected
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn aggregate(outcomes: &[CompressionOutcome]) -> Self {
        Self {
            rows: outcomes.iter().map(ReportRow::from_outcome).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn file_link(path: &Path) -> String {
    match url::Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => format!("file://{}", path.display()),
    }
}
