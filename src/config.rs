//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri del run (immutabile per tutta la durata)
//! - Definisce `GhostscriptSettings` con i parametri fissi passati all'engine
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `dry_run`: Simula la compressione senza toccare i file (default: false)
//! - `workers`: Numero di worker paralleli (default: numero di CPU)
//! - `min_size_mb`: Dimensione minima in MB dei PDF da processare (default: 0)
//! - `log_file`: Redirige il logging su file (default: None = terminale)
//! - `verbose`: Logging a livello DEBUG (default: false)
//! - `report_file` / `html_report_file`: Path dei report CSV e HTML
//! - `engine_timeout_secs`: Timeout per singola invocazione di Ghostscript (default: None)
//! - `ghostscript`: Preset, livello di compatibilità e budget di RAM
//!
//! ## Budget di memoria:
//! Il budget `max_ram_gb` viene diviso in 80% `BufferSpace` e 20% `MaxBitmap`,
//! espressi in byte. I valori sono gli stessi per ogni file del run.
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     dry_run: true,
//!     min_size_mb: 2,
//!     ..Config::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Presets accepted by Ghostscript's `-dPDFSETTINGS`
pub const PDF_PRESETS: &[&str] = &["/screen", "/ebook", "/printer", "/prepress", "/default"];

/// Fixed engine configuration applied to every file of a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GhostscriptSettings {
    /// Override for the Ghostscript binary (None = platform default)
    pub command: Option<String>,
    /// Target PDF compatibility level
    pub compatibility_level: String,
    /// Compression preset passed as `-dPDFSETTINGS`
    pub pdf_settings: String,
    /// RAM budget in GB used to derive buffer and bitmap ceilings
    pub max_ram_gb: f64,
    /// Value for `-dNumRenderingThreads`
    pub rendering_threads: u32,
}

impl Default for GhostscriptSettings {
    fn default() -> Self {
        Self {
            command: None,
            compatibility_level: "1.4".to_string(),
            pdf_settings: "/screen".to_string(),
            max_ram_gb: 15.0,
            rendering_threads: 4,
        }
    }
}

impl GhostscriptSettings {
    /// `-dBufferSpace` value: 80% of the RAM budget, in bytes
    pub fn buffer_space_bytes(&self) -> u64 {
        (self.max_ram_gb * 0.8 * BYTES_PER_GB) as u64
    }

    /// `-dMaxBitmap` value: 20% of the RAM budget, in bytes
    pub fn max_bitmap_bytes(&self) -> u64 {
        (self.max_ram_gb * 0.2 * BYTES_PER_GB) as u64
    }
}

/// Configuration for a compression run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulate compression without touching files or invoking the engine
    pub dry_run: bool,
    /// Number of parallel workers
    pub workers: usize,
    /// Minimum PDF size in MB to be processed
    pub min_size_mb: u64,
    /// Redirect all diagnostics to this file instead of the terminal
    pub log_file: Option<PathBuf>,
    /// Verbose logging
    pub verbose: bool,
    /// Append-only CSV report
    pub report_file: PathBuf,
    /// HTML report, regenerated every run
    pub html_report_file: PathBuf,
    /// Per-job engine timeout in seconds (None = wait indefinitely)
    pub engine_timeout_secs: Option<u64>,
    /// Ghostscript invocation parameters
    pub ghostscript: GhostscriptSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: false,
            workers: num_cpus::get().max(1),
            min_size_mb: 0,
            log_file: None,
            verbose: false,
            report_file: PathBuf::from("compression_report.csv"),
            html_report_file: PathBuf::from("compression_report.html"),
            engine_timeout_secs: None,
            ghostscript: GhostscriptSettings::default(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if self.engine_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("Engine timeout must be greater than 0 seconds"));
        }

        let gs = &self.ghostscript;
        if !(gs.max_ram_gb > 0.0) {
            return Err(anyhow::anyhow!("Ghostscript RAM budget must be greater than 0 GB"));
        }

        if gs.rendering_threads == 0 {
            return Err(anyhow::anyhow!("Ghostscript rendering threads must be greater than 0"));
        }

        if !PDF_PRESETS.contains(&gs.pdf_settings.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown PDF preset {} (expected one of {})",
                gs.pdf_settings,
                PDF_PRESETS.join(", ")
            ));
        }

        if gs.compatibility_level.trim().is_empty() {
            return Err(anyhow::anyhow!("PDF compatibility level must not be empty"));
        }

        Ok(())
    }

    /// Minimum size threshold in bytes
    pub fn min_size_bytes(&self) -> u64 {
        self.min_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Per-job engine timeout, if configured
    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
