//! # Compression Worker Module
//!
//! Worker per la compressione di un singolo PDF.
//!
//! ## Passi (strettamente sequenziali):
//! 1. Se la cancellazione è già richiesta, ritorna senza fare nulla
//! 2. Misura tempo di inizio e dimensione originale
//! 3. Dry run: outcome simulato (20% di riduzione, tempo zero), file intatto
//! 4. Esegue l'engine verso un file temporaneo nella stessa directory
//! 5. Errore dell'engine: il temporaneo viene rimosso, nessun outcome
//! 6. Output più grande dell'originale: warning, temporaneo rimosso, nessun outcome;
//!    altrimenti copia dei permessi dell'originale e rename atomico sopra di esso
//!
//! Nessun file temporaneo sopravvive a `process()`, qualunque sia l'esito.
//! Il nome del temporaneo non termina in `.pdf`, quindi un avanzo lasciato da un
//! processo ucciso non viene mai scoperto come job.

use crate::{
    cancellation::CancellationFlag,
    compressor::engine::CompressionEngine,
    error::CompressError,
    file_manager::FileManager,
    outcome::{CompressionOutcome, Job, JobOutcome},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Temp output suffix; must not end in `.pdf`
const TEMP_SUFFIX: &str = ".pdf.compressing";

/// Compresses one job at a time; shared by all pool tasks
pub struct CompressionWorker {
    engine: Arc<dyn CompressionEngine>,
    cancellation: CancellationFlag,
    dry_run: bool,
}

impl CompressionWorker {
    pub fn new(engine: Arc<dyn CompressionEngine>, cancellation: CancellationFlag, dry_run: bool) -> Self {
        Self {
            engine,
            cancellation,
            dry_run,
        }
    }

    /// Process a single job
    pub async fn process(&self, job: &Job) -> Result<JobOutcome, CompressError> {
        if self.cancellation.is_cancelled() {
            debug!("Cancellation requested, not starting {}", job.path.display());
            return Ok(JobOutcome::Cancelled);
        }

        let start_time = Instant::now();
        let original_size = FileManager::get_file_size(&job.path).await?;
        if original_size != job.discovered_size {
            debug!(
                "{} changed since discovery ({} -> {})",
                job.path.display(),
                FileManager::format_size(job.discovered_size),
                FileManager::format_size(original_size)
            );
        }

        if self.dry_run {
            info!("[DRY RUN] Simulating compression for: {}", job.path.display());
            let location = absolute_path(&job.path);
            return Ok(JobOutcome::Completed(CompressionOutcome::simulated(
                location,
                original_size,
            )));
        }

        let temp_path = Self::create_temp_path(&job.path)?;
        self.engine.compress(&job.path, &temp_path).await?;

        let compressed_size = FileManager::get_file_size(&temp_path).await?;

        if compressed_size > original_size {
            warn!(
                "Compression of {} increased the file size ({} -> {}), keeping original",
                job.path.display(),
                FileManager::format_size(original_size),
                FileManager::format_size(compressed_size)
            );
            // dropping temp_path removes the rejected output
            return Ok(JobOutcome::SizeRegression {
                original_size,
                compressed_size,
            });
        }

        let elapsed = start_time.elapsed();
        let permissions = tokio::fs::metadata(&job.path).await?.permissions();
        tokio::fs::set_permissions(&temp_path, permissions).await?;
        FileManager::replace_file(&job.path, &temp_path).await?;
        // already renamed over the original; just disarm the cleanup
        let _ = temp_path.keep();

        let outcome = CompressionOutcome::succeeded(
            absolute_path(&job.path),
            original_size,
            compressed_size,
            elapsed,
        );

        info!(
            "Compressed {}: {} -> {} ({:.2}% smaller, {:.2}s)",
            job.path.display(),
            FileManager::format_size(original_size),
            FileManager::format_size(compressed_size),
            outcome.reduction_percent,
            elapsed.as_secs_f64()
        );

        Ok(JobOutcome::Completed(outcome))
    }

    /// Unique temp path next to the source, removed on drop
    fn create_temp_path(source: &Path) -> Result<TempPath, CompressError> {
        let parent = match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();

        let temp_file = tempfile::Builder::new()
            .prefix(&format!(".{}.", stem))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(parent)?;

        Ok(temp_file.into_temp_path())
    }
}

fn absolute_path(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::engine::testing::{FakeBehavior, FakeEngine};
    use crate::outcome::OutcomeStatus;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup(size: usize) -> (TempDir, Job) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.pdf");
        std::fs::write(&path, vec![b'o'; size]).unwrap();
        (temp_dir, Job::new(path, size as u64))
    }

    fn worker(engine: Arc<FakeEngine>, dry_run: bool) -> CompressionWorker {
        CompressionWorker::new(engine, CancellationFlag::new(), dry_run)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_successful_compression_replaces_original() {
        let (temp_dir, job) = setup(1000);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(400)));

        let result = worker(engine.clone(), false).process(&job).await.unwrap();
        let outcome = result.into_outcome().unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Succeeded);
        assert_eq!(outcome.original_size, 1000);
        assert_eq!(outcome.compressed_size, Some(400));
        assert_eq!(outcome.reduction_percent, 60.0);
        assert_eq!(outcome.file_name, "doc.pdf");
        assert!(outcome.location.is_absolute());
        assert_eq!(std::fs::read(&job.path).unwrap(), vec![b'c'; 400]);
        assert_eq!(dir_entries(temp_dir.path()), vec!["doc.pdf"]);
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_equal_size_is_accepted() {
        let (_temp_dir, job) = setup(500);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(500)));

        let result = worker(engine, false).process(&job).await.unwrap();
        let outcome = result.into_outcome().unwrap();
        assert_eq!(outcome.reduction_percent, 0.0);
    }

    #[tokio::test]
    async fn test_size_regression_keeps_original_twice() {
        let (temp_dir, job) = setup(300);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Grow));
        let worker = worker(engine.clone(), false);

        for _ in 0..2 {
            let result = worker.process(&job).await.unwrap();
            assert!(matches!(
                result,
                JobOutcome::SizeRegression {
                    original_size: 300,
                    compressed_size: 301
                }
            ));
            assert_eq!(std::fs::read(&job.path).unwrap(), vec![b'o'; 300]);
            assert_eq!(dir_entries(temp_dir.path()), vec!["doc.pdf"]);
        }
        assert_eq!(engine.calls(), 2);
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_no_trace() {
        let (temp_dir, job) = setup(300);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Fail));

        let result = worker(engine, false).process(&job).await;

        assert!(matches!(result, Err(CompressError::Engine { .. })));
        assert_eq!(std::fs::read(&job.path).unwrap(), vec![b'o'; 300]);
        assert_eq!(dir_entries(temp_dir.path()), vec!["doc.pdf"]);
    }

    #[tokio::test]
    async fn test_dry_run_never_calls_engine() {
        let (temp_dir, job) = setup(1000);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));

        let result = worker(engine.clone(), true).process(&job).await.unwrap();
        let outcome = result.into_outcome().unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Simulated);
        assert_eq!(outcome.compressed_size, Some(800));
        assert_eq!(engine.calls(), 0);
        assert_eq!(std::fs::read(&job.path).unwrap(), vec![b'o'; 1000]);
        assert_eq!(dir_entries(temp_dir.path()), vec!["doc.pdf"]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_does_nothing() {
        let (temp_dir, job) = setup(1000);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(10)));
        let flag = CancellationFlag::new();
        flag.cancel();
        let worker = CompressionWorker::new(engine.clone(), flag, false);

        let result = worker.process(&job).await.unwrap();

        assert!(matches!(result, JobOutcome::Cancelled));
        assert_eq!(engine.calls(), 0);
        assert_eq!(dir_entries(temp_dir.path()), vec!["doc.pdf"]);
    }

    #[tokio::test]
    async fn test_temp_output_is_never_discovered() {
        let (temp_dir, job) = setup(10);

        let temp_path = CompressionWorker::create_temp_path(&job.path).unwrap();
        assert_eq!(temp_path.parent(), Some(temp_dir.path()));
        assert!(!FileManager::is_pdf(&temp_path));

        let jobs = FileManager::find_pdf_files(temp_dir.path(), 0).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].path, job.path);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_replace_keeps_original_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, job) = setup(1000);
        std::fs::set_permissions(&job.path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(400)));

        let result = worker(engine, false).process(&job).await.unwrap();

        assert!(matches!(result, JobOutcome::Completed(_)));
        assert_eq!(std::fs::read(&job.path).unwrap(), vec![b'c'; 400]);
        let mode = std::fs::metadata(&job.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_timeout_leaves_no_trace() {
        use crate::compressor::engine::testing::{fake_gs_script, script_engine};

        let (temp_dir, job) = setup(300);
        let script_dir = TempDir::new().unwrap();
        let command = fake_gs_script(
            script_dir.path(),
            "echo partial > \"$out\"\nsleep 5\necho done >> \"$out\"",
        );
        let engine = Arc::new(script_engine(command, Some(Duration::from_millis(500))));
        let worker = CompressionWorker::new(engine, CancellationFlag::new(), false);

        let result = worker.process(&job).await;

        assert!(matches!(result, Err(CompressError::EngineTimeout { .. })));
        assert_eq!(std::fs::read(&job.path).unwrap(), vec![b'o'; 300]);
        assert_eq!(dir_entries(temp_dir.path()), vec!["doc.pdf"]);
    }

    #[tokio::test]
    async fn test_missing_source_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let job = Job::new(temp_dir.path().join("gone.pdf"), 10);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));

        let result = worker(engine.clone(), false).process(&job).await;
        assert!(matches!(result, Err(CompressError::Io(_))));
        assert_eq!(engine.calls(), 0);
    }
}
