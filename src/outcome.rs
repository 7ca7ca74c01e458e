//! # Job & Outcome Module
//!
//! Strutture dati che attraversano la pipeline:
//! - `Job`: un PDF da comprimere, creato dal discovery e consumato da un solo worker
//! - `CompressionOutcome`: risultato registrato di un job (mai modificato dopo la creazione)
//! - `JobOutcome`: esito completo di un tentativo, inclusi skip e cancellazione
//!
//! Solo `JobOutcome::Completed` produce un `CompressionOutcome`; regressioni di
//! dimensione, job cancellati ed errori non finiscono mai nei report.

use crate::file_manager::FileManager;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A PDF queued for compression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub path: PathBuf,
    /// Size observed during discovery
    pub discovered_size: u64,
}

impl Job {
    pub fn new(path: PathBuf, discovered_size: u64) -> Self {
        Self { path, discovered_size }
    }

    /// File name used in logs and reports
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// How an outcome was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Engine output replaced the original in place
    Succeeded,
    /// Dry run, nothing touched
    Simulated,
}

/// Recorded result of compressing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub file_name: String,
    pub location: PathBuf,
    pub original_size: u64,
    pub compressed_size: Option<u64>,
    pub reduction_percent: f64,
    pub elapsed: Duration,
    pub status: OutcomeStatus,
}

impl CompressionOutcome {
    pub fn succeeded(
        location: PathBuf,
        original_size: u64,
        compressed_size: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            file_name: file_name_of(&location),
            reduction_percent: FileManager::calculate_reduction(original_size, compressed_size),
            location,
            original_size,
            compressed_size: Some(compressed_size),
            elapsed,
            status: OutcomeStatus::Succeeded,
        }
    }

    /// Dry-run outcome: fixed 20% reduction, zero elapsed time
    pub fn simulated(location: PathBuf, original_size: u64) -> Self {
        Self {
            file_name: file_name_of(&location),
            location,
            original_size,
            compressed_size: Some((original_size as f64 * 0.8).round() as u64),
            reduction_percent: 20.0,
            elapsed: Duration::ZERO,
            status: OutcomeStatus::Simulated,
        }
    }
}

/// Everything a single `process` call can end with, short of an error
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(CompressionOutcome),
    /// Engine output was larger than the original; original kept
    SizeRegression { original_size: u64, compressed_size: u64 },
    /// Cancellation was requested before the job started
    Cancelled,
}

impl JobOutcome {
    /// The reportable outcome, if any
    pub fn into_outcome(self) -> Option<CompressionOutcome> {
        match self {
            Self::Completed(outcome) => Some(outcome),
            Self::SizeRegression { .. } | Self::Cancelled => None,
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
