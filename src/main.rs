//! # PDF Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (terminale o `--log-file`)
//! - Validazione degli input dell'utente
//! - Installazione del listener Ctrl+C e avvio del compressore
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, dry-run, max-threads, min-size, etc.)
//! 2. Carica l'eventuale file di configurazione JSON e applica gli override CLI
//! 3. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 4. Valida che la directory esista
//! 5. Avvia `PdfCompressor` con il flag di cancellazione condiviso
//!
//! ## Esempio di utilizzo:
//! ```bash
//! pdf-compressor /path/to/docs --min-size 2 --max-threads 8 --verbose
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use pdf_batch_compressor::{logging, CancellationController, Config, PdfCompressor};

#[derive(Parser)]
#[command(name = "pdf-compressor")]
#[command(about = "Compress PDFs in a directory using Ghostscript")]
struct Args {
    /// Directory containing PDFs to compress
    directory: PathBuf,

    /// Simulate compression without modifying files
    #[arg(long)]
    dry_run: bool,

    /// Max number of concurrent workers (default: number of CPUs)
    #[arg(long)]
    max_threads: Option<usize>,

    /// Min file size (in MB) to process
    #[arg(long)]
    min_size: Option<u64>,

    /// Write all log output to this file instead of the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// CSV report (rows are appended)
    #[arg(long)]
    report_file: Option<PathBuf>,

    /// HTML report (rewritten every run)
    #[arg(long)]
    html_report: Option<PathBuf>,

    /// Per-file Ghostscript timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Ghostscript binary (default: gs, gswin64c.exe on Windows)
    #[arg(long)]
    gs_command: Option<String>,

    /// Ghostscript preset: /screen, /ebook, /printer, /prepress, /default
    #[arg(long)]
    pdf_settings: Option<String>,

    /// RAM budget for Ghostscript in GB
    #[arg(long)]
    max_ram_gb: Option<f64>,

    /// JSON configuration file; command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    async fn load_config(&self) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => {
                if !path.exists() {
                    return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
                }
                Config::from_file(path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?
            }
            None => Config::default(),
        };

        config.dry_run |= self.dry_run;
        config.verbose |= self.verbose;
        if let Some(workers) = self.max_threads {
            config.workers = workers;
        }
        if let Some(min_size) = self.min_size {
            config.min_size_mb = min_size;
        }
        if let Some(ref log_file) = self.log_file {
            config.log_file = Some(log_file.clone());
        }
        if let Some(ref report_file) = self.report_file {
            config.report_file = report_file.clone();
        }
        if let Some(ref html_report) = self.html_report {
            config.html_report_file = html_report.clone();
        }
        if let Some(timeout) = self.timeout {
            config.engine_timeout_secs = Some(timeout);
        }
        if let Some(ref command) = self.gs_command {
            config.ghostscript.command = Some(command.clone());
        }
        if let Some(ref preset) = self.pdf_settings {
            config.ghostscript.pdf_settings = preset.clone();
        }
        if let Some(max_ram_gb) = self.max_ram_gb {
            config.ghostscript.max_ram_gb = max_ram_gb;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config().await?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init(config.verbose, config.log_file.as_deref())?;

    // Validate arguments
    if !args.directory.exists() {
        return Err(anyhow::anyhow!("Directory does not exist: {}", args.directory.display()));
    }

    let controller = CancellationController::new();
    let listener = controller.install();

    let compressor = PdfCompressor::new(&args.directory, config, controller.flag())?;
    let summary = compressor.run().await?;
    listener.abort();

    if summary.cancelled {
        info!("Stopped after interrupt; {} files were left untouched", summary.not_started);
    }

    Ok(())
}
