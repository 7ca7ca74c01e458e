//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di compressione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche del run (compressi, simulati, skippati, errori, cancellati)
//! - Calcolo percentuali di riduzione e byte risparmiati
//!
//! ## Componenti principali:
//! - `ProgressManager`: Gestisce la progress bar principale (nascosta con `--log-file`)
//! - `CompressionStats`: Traccia statistiche cumulative
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) [OK] report.pdf: 45.20% saved
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a compression run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; `visible = false` draws nothing
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by one with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for a compression run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompressionStats {
    pub files_processed: usize,
    pub files_compressed: usize,
    pub files_simulated: usize,
    pub files_skipped: usize,
    pub files_cancelled: usize,
    pub errors: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
}

impl CompressionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compressed(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_compressed += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_simulated(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_simulated += 1;
        self.total_original_size += original_size;
    }

    pub fn add_skipped(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_size += original_size;
    }

    pub fn add_cancelled(&mut self) {
        self.files_cancelled += 1;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Processed: {} files | Compressed: {} | Skipped: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_compressed,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        );
        if self.files_simulated > 0 {
            summary.push_str(&format!(" | Simulated: {}", self.files_simulated));
        }
        if self.files_cancelled > 0 {
            summary.push_str(&format!(" | Cancelled: {}", self.files_cancelled));
        }
        summary
    }
}
