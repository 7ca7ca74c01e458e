//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare gli errori della pipeline
//! - Distingue errori fatali per il run (directory radice) da errori per singolo job
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Filesystem`: Directory radice mancante o non leggibile (fatale, prima di ogni lavoro)
//! - `Engine`: Ghostscript terminato con exit code diverso da 0 (fatale solo per il job)
//! - `EngineLaunch`: Impossibile avviare il processo Ghostscript
//! - `EngineTimeout`: Ghostscript ha superato il timeout configurato
//! - `Io` / `Csv`: Errori di I/O e di scrittura report
//! - `Validation`: Configurazione non valida
//! - `MissingDependency`: Tool esterno mancante
//!
//! Una regressione di dimensione (output più grande dell'originale) NON è un errore:
//! viene gestita come skip dal worker.

use std::path::PathBuf;

/// Custom error types for PDF compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Ghostscript failed on {path} ({status}): {stderr}")]
    Engine {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Failed to execute {command}: {source}")]
    EngineLaunch {
        command: String,
        source: std::io::Error,
    },

    #[error("Ghostscript timed out after {timeout_secs}s on {path}")]
    EngineTimeout { path: PathBuf, timeout_secs: u64 },

    #[error("CSV report error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration error: {0}")]
    Validation(String),
}
