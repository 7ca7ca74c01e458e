//! # Progress Tracking Module
//!
//! Unifica progress bar e statistiche del run. Usato solo dal coordinatore
//! (fan-in dei risultati), quindi non serve sincronizzazione.

use crate::{
    error::CompressError,
    outcome::{Job, JobOutcome, OutcomeStatus},
    progress::{CompressionStats, ProgressManager},
};
use tracing::error;

/// Progress bar plus per-run counters
pub struct ProgressTracker {
    progress_manager: ProgressManager,
    stats: CompressionStats,
}

impl ProgressTracker {
    pub fn new(total_jobs: usize, visible: bool) -> Self {
        Self {
            progress_manager: ProgressManager::new(total_jobs as u64, visible),
            stats: CompressionStats::new(),
        }
    }

    /// Record one attempted job and advance the bar by one
    pub fn handle_job_completion(&mut self, job: &Job, result: &Result<JobOutcome, CompressError>) {
        let name = job.file_name();

        let message = match result {
            Ok(JobOutcome::Completed(outcome)) => match outcome.status {
                OutcomeStatus::Succeeded => {
                    self.stats.add_compressed(
                        outcome.original_size,
                        outcome.compressed_size.unwrap_or(outcome.original_size),
                    );
                    format!("[OK] {}: {:.2}% saved", name, outcome.reduction_percent)
                }
                OutcomeStatus::Simulated => {
                    self.stats.add_simulated(outcome.original_size);
                    format!("[DRY RUN] {}", name)
                }
            },
            Ok(JobOutcome::SizeRegression { original_size, .. }) => {
                self.stats.add_skipped(*original_size);
                format!("[SKIP] {}: output larger than original", name)
            }
            Ok(JobOutcome::Cancelled) => {
                self.stats.add_cancelled();
                format!("[CANCELLED] {}", name)
            }
            Err(e) => {
                self.stats.add_error();
                error!("Failed to compress {}: {}", job.path.display(), e);
                format!("[ERROR] {}", name)
            }
        };

        self.progress_manager.update(&message);
    }

    /// Jobs recorded so far
    pub fn completed(&self) -> u64 {
        self.progress_manager.position()
    }

    pub fn stats(&self) -> &CompressionStats {
        &self.stats
    }

    /// Finalize the bar and hand back the counters
    pub fn finish(self) -> CompressionStats {
        self.progress_manager.finish(&self.stats.format_summary());
        self.stats
    }
}
