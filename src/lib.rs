//! # PDF Batch Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `outcome`: Job e risultati di compressione
//! - `file_manager`: Discovery dei PDF e sostituzione atomica
//! - `cancellation`: Flag condiviso e listener del Ctrl+C
//! - `compressor`: Engine, worker, pool e orchestratore
//! - `report`: Report CSV, HTML e tabella a terminale
//! - `progress`: Progress bar e statistiche
//! - `logging`: Setup di `tracing`
//! - `platform`: Nome del binario Ghostscript per piattaforma
//!
//! ## Utilizzo:
//! ```ignore
//! use pdf_batch_compressor::{CancellationController, Config, PdfCompressor};
//!
//! let controller = CancellationController::new();
//! let compressor = PdfCompressor::new(&path, Config::default(), controller.flag())?;
//! compressor.run().await?;
//! ```

pub mod cancellation;
pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod logging;
pub mod outcome;
pub mod platform;
pub mod progress;
pub mod report;

pub use cancellation::{CancellationController, CancellationFlag};
pub use compressor::{PdfCompressor, RunSummary};
pub use config::{Config, GhostscriptSettings};
pub use error::CompressError;
pub use outcome::{CompressionOutcome, Job, JobOutcome, OutcomeStatus};
pub use report::Report;
