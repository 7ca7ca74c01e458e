//! # Logging Setup
//!
//! Inizializza il subscriber `tracing` globale:
//! - Terminale (stderr) di default
//! - File con `--log-file`: tutto l'output diagnostico va nel file, senza colori
//!
//! Il livello è INFO, DEBUG con `--verbose`; `RUST_LOG` ha la precedenza se impostato.

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Errors that may occur while initializing logging
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive until exit.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_env_filter(verbose);

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| LoggingError::CreateLogFile {
                path: path.to_path_buf(),
                source,
            })?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
