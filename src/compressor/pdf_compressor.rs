//! # PDF Compressor Main Orchestrator
//!
//! Coordinatore del run: discovery → pool di worker → report.
//! È l'unico punto che decide quando fermarsi dopo una cancellazione e
//! quando scrivere i report finali.

use crate::{
    cancellation::CancellationFlag,
    compressor::{
        engine::{CompressionEngine, GhostscriptEngine},
        pool::WorkerPool,
        progress_tracker::ProgressTracker,
        worker::CompressionWorker,
    },
    config::Config,
    error::CompressError,
    file_manager::FileManager,
    outcome::{CompressionOutcome, Job},
    progress::CompressionStats,
    report::Report,
};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// What a finished run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<CompressionOutcome>,
    pub stats: CompressionStats,
    pub jobs_found: usize,
    pub not_started: usize,
    pub cancelled: bool,
}

/// Top-level coordinator
pub struct PdfCompressor {
    config: Config,
    root: PathBuf,
    engine: Arc<dyn CompressionEngine>,
    cancellation: CancellationFlag,
}

impl PdfCompressor {
    /// Create a compressor backed by Ghostscript
    pub fn new(root: &Path, config: Config, cancellation: CancellationFlag) -> Result<Self> {
        config.validate()?;
        let engine = Arc::new(GhostscriptEngine::from_config(&config));
        Ok(Self::with_engine(root, config, engine, cancellation))
    }

    /// Create a compressor with a custom engine
    pub fn with_engine(
        root: &Path,
        config: Config,
        engine: Arc<dyn CompressionEngine>,
        cancellation: CancellationFlag,
    ) -> Self {
        Self {
            config,
            root: root.to_path_buf(),
            engine,
            cancellation,
        }
    }

    /// Run discovery, compression and reporting
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        info!("Starting PDF compression in: {}", self.root.display());

        let jobs = FileManager::find_pdf_files(&self.root, self.config.min_size_bytes())?;
        self.log_configuration(&jobs);

        if jobs.is_empty() {
            info!("No PDF files found to compress");
            return Ok(RunSummary::default());
        }

        if !self.config.dry_run {
            if let Err(e) = self.check_dependencies().await {
                warn!("{}", e);
            }
        }

        let jobs_found = jobs.len();
        let mut progress = ProgressTracker::new(jobs_found, self.shows_terminal_output());
        let worker = CompressionWorker::new(
            self.engine.clone(),
            self.cancellation.clone(),
            self.config.dry_run,
        );
        let pool = WorkerPool::new(worker, self.cancellation.clone(), self.config.workers);

        let pool_report = pool.run(jobs, &mut progress).await?;
        let stats = progress.finish();

        let cancelled = self.cancellation.is_cancelled();
        let not_started = pool_report.not_started + stats.files_cancelled;
        if cancelled {
            warn!(
                "Run cancelled: {} of {} files were not started",
                not_started, jobs_found
            );
        }

        let report = Report::aggregate(&pool_report.outcomes);
        self.write_reports(&report)?;
        self.print_results(&report, &mut io::stdout())
            .context("Failed to print results")?;

        info!("{}", stats.format_summary());
        info!("Finished in {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(RunSummary {
            outcomes: pool_report.outcomes,
            stats,
            jobs_found,
            not_started,
            cancelled,
        })
    }

    fn log_configuration(&self, jobs: &[Job]) {
        let gs = &self.config.ghostscript;
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        } else {
            info!(
                "Engine: {} (preset {}, compatibility {}, {} rendering threads)",
                self.engine.name(),
                gs.pdf_settings,
                gs.compatibility_level,
                gs.rendering_threads
            );
        }
        info!("Workers: {}", self.config.workers);
        if self.config.min_size_mb > 0 {
            info!("Minimum size: {} MB", self.config.min_size_mb);
        }
        if let Some(timeout) = self.config.engine_timeout() {
            info!("Per-file timeout: {}s", timeout.as_secs());
        }
        info!("Found {} PDF files to process", jobs.len());
    }

    /// Preflight check for the engine binary
    async fn check_dependencies(&self) -> Result<(), CompressError> {
        if self.engine.is_available().await {
            Ok(())
        } else {
            Err(CompressError::MissingDependency(format!(
                "{} was not found on PATH; every file will fail",
                self.engine.name()
            )))
        }
    }

    fn write_reports(&self, report: &Report) -> Result<()> {
        report
            .write_csv(&self.config.report_file)
            .with_context(|| format!("Failed to write {}", self.config.report_file.display()))?;
        report
            .write_html(&self.config.html_report_file)
            .with_context(|| format!("Failed to write {}", self.config.html_report_file.display()))?;

        info!(
            "Reports saved to {} and {}",
            self.config.report_file.display(),
            self.config.html_report_file.display()
        );
        Ok(())
    }

    /// Progress bar and result table go to the terminal unless a log file is set
    fn shows_terminal_output(&self) -> bool {
        self.config.log_file.is_none()
    }

    fn print_results<W: Write>(&self, report: &Report, out: &mut W) -> io::Result<()> {
        if report.is_empty() {
            info!("No files were compressed");
        }

        let table = report.render_table();
        if self.shows_terminal_output() {
            writeln!(out, "{}", table)
        } else {
            info!("\n{}", table);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::engine::testing::{FakeBehavior, FakeEngine};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const MB: usize = 1024 * 1024;

    struct Fixture {
        _temp_dir: TempDir,
        docs: PathBuf,
        config: Config,
    }

    fn fixture(files: &[(&str, usize)]) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let docs = temp_dir.path().join("docs");
        for (name, size) in files {
            let path = docs.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, vec![b'p'; *size]).unwrap();
        }

        let config = Config {
            workers: 2,
            report_file: temp_dir.path().join("report.csv"),
            html_report_file: temp_dir.path().join("report.html"),
            ..Config::default()
        };

        Fixture {
            _temp_dir: temp_dir,
            docs,
            config,
        }
    }

    fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| (e.path().to_path_buf(), std::fs::read(e.path()).unwrap()))
            .collect()
    }

    fn csv_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn compressor(fixture: &Fixture, config: Config, engine: Arc<FakeEngine>) -> PdfCompressor {
        PdfCompressor::with_engine(&fixture.docs, config, engine, CancellationFlag::new())
    }

    #[tokio::test]
    async fn test_dry_run_min_size_example() {
        let fixture = fixture(&[("a.pdf", 5 * MB), ("b.pdf", MB)]);
        let config = Config {
            dry_run: true,
            min_size_mb: 2,
            ..fixture.config.clone()
        };
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));
        let before = snapshot(&fixture.docs);

        let summary = compressor(&fixture, config.clone(), engine.clone()).run().await.unwrap();

        assert_eq!(summary.jobs_found, 1);
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(engine.calls(), 0);
        assert_eq!(snapshot(&fixture.docs), before);

        let rows = csv_rows(&config.report_file);
        assert_eq!(rows, vec![vec!["a.pdf", "5.00", "4.00", "20.00", "0.00"]]);

        let html = std::fs::read_to_string(&config.html_report_file).unwrap();
        assert!(html.contains("<td>a.pdf</td>"));
        assert!(!html.contains("b.pdf"));
    }

    #[tokio::test]
    async fn test_engine_failure_is_absent_from_reports() {
        let fixture = fixture(&[("broken.pdf", 4096)]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Fail));
        let before = snapshot(&fixture.docs);

        let summary = compressor(&fixture, fixture.config.clone(), engine.clone())
            .run()
            .await
            .unwrap();

        assert!(summary.outcomes.is_empty());
        assert_eq!(summary.stats.errors, 1);
        assert_eq!(engine.calls(), 1);
        assert_eq!(snapshot(&fixture.docs), before);
        assert!(csv_rows(&fixture.config.report_file).is_empty());
        let html = std::fs::read_to_string(&fixture.config.html_report_file).unwrap();
        assert!(!html.contains("broken.pdf"));
    }

    #[tokio::test]
    async fn test_regression_is_idempotent_across_runs() {
        let fixture = fixture(&[("grow.pdf", 2048)]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Grow));
        let before = snapshot(&fixture.docs);

        for _ in 0..2 {
            let summary = compressor(&fixture, fixture.config.clone(), engine.clone())
                .run()
                .await
                .unwrap();
            assert!(summary.outcomes.is_empty());
            assert_eq!(summary.stats.files_skipped, 1);
            assert_eq!(summary.stats.errors, 0);
            assert_eq!(snapshot(&fixture.docs), before);
        }
    }

    #[tokio::test]
    async fn test_reports_agree_on_every_outcome() {
        let fixture = fixture(&[
            ("one.pdf", 3 * MB),
            ("two.pdf", 2 * MB + 12345),
            ("sub/three.PDF", MB + 777),
        ]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(700_000)));

        let summary = compressor(&fixture, fixture.config.clone(), engine)
            .run()
            .await
            .unwrap();
        assert_eq!(summary.outcomes.len(), 3);
        assert!(summary.outcomes.len() <= summary.jobs_found);

        let rows = csv_rows(&fixture.config.report_file);
        let html = std::fs::read_to_string(&fixture.config.html_report_file).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(html.matches("Download</a>").count(), 3);

        for row in rows {
            let expected = format!(
                "<td>{}</td>\n            <td>{}</td>\n            <td>{}</td>\n            <td>{}</td>\n            <td>{}</td>",
                row[0],
                summary
                    .outcomes
                    .iter()
                    .find(|o| o.file_name == row[0])
                    .unwrap()
                    .location
                    .display(),
                row[1],
                row[2],
                row[3],
            );
            assert!(html.contains(&expected), "missing html row for {}", row[0]);
        }

        for outcome in &summary.outcomes {
            assert_eq!(std::fs::metadata(&outcome.location).unwrap().len(), 700_000);
        }
    }

    #[tokio::test]
    async fn test_empty_directory_writes_nothing() {
        let fixture = fixture(&[("notes.txt", 10)]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));

        let summary = compressor(&fixture, fixture.config.clone(), engine)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.jobs_found, 0);
        assert!(!fixture.config.report_file.exists());
        assert!(!fixture.config.html_report_file.exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let fixture = fixture(&[]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));
        let compressor = PdfCompressor::with_engine(
            &fixture.docs.join("nope"),
            fixture.config.clone(),
            engine,
            CancellationFlag::new(),
        );

        assert!(compressor.run().await.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_run_starts_nothing() {
        let fixture = fixture(&[("a.pdf", 100), ("b.pdf", 100)]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));
        let flag = CancellationFlag::new();
        flag.cancel();
        let before = snapshot(&fixture.docs);

        let summary = PdfCompressor::with_engine(&fixture.docs, fixture.config.clone(), engine.clone(), flag)
            .run()
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.not_started, 2);
        assert!(summary.outcomes.is_empty());
        assert_eq!(engine.calls(), 0);
        assert_eq!(snapshot(&fixture.docs), before);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(PdfCompressor::new(Path::new("."), config, CancellationFlag::new()).is_err());
    }

    #[test]
    fn test_results_table_goes_to_terminal_without_log_file() {
        let fixture = fixture(&[]);
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(1)));
        let report = Report::aggregate(&[CompressionOutcome::simulated(
            fixture.docs.join("a.pdf"),
            5 * MB as u64,
        )]);
        let compressor = compressor(&fixture, fixture.config.clone(), engine);

        let mut out = Vec::new();
        compressor.print_results(&report, &mut out).unwrap();

        assert!(compressor.shows_terminal_output());
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Compression Results"));
        assert!(printed.contains("a.pdf"));
    }

    #[tokio::test]
    async fn test_log_file_keeps_terminal_quiet() {
        let fixture = fixture(&[("a.pdf", 1000)]);
        let config = Config {
            log_file: Some(fixture.docs.with_file_name("run.log")),
            ..fixture.config.clone()
        };
        let engine = Arc::new(FakeEngine::new(FakeBehavior::Output(400)));
        let compressor = compressor(&fixture, config, engine);
        assert!(!compressor.shows_terminal_output());

        let summary = compressor.run().await.unwrap();
        let report = Report::aggregate(&summary.outcomes);
        let mut out = Vec::new();
        compressor.print_results(&report, &mut out).unwrap();

        assert_eq!(summary.outcomes.len(), 1);
        assert!(out.is_empty());
    }
}
