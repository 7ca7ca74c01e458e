//! # Compressor Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `pdf_compressor`: Orchestratore principale
//! - `worker`: Worker per singoli file
//! - `pool`: Pool di worker a dimensione fissa
//! - `engine`: Invocazione dell'engine esterno (Ghostscript)
//! - `progress_tracker`: Gestione progress unificata

pub mod engine;
pub mod pdf_compressor;
pub mod pool;
pub mod progress_tracker;
pub mod worker;

pub use engine::{CompressionEngine, GhostscriptEngine};
pub use pdf_compressor::{PdfCompressor, RunSummary};
pub use pool::{PoolReport, WorkerPool};
pub use progress_tracker::ProgressTracker;
pub use worker::CompressionWorker;
