//! # Compression Engine Module
//!
//! Astrazione sull'engine esterno che esegue la compressione vera e propria.
//! `GhostscriptEngine` invoca `gs` con una configurazione fissa per tutto il run;
//! i test usano engine finti tramite il trait `CompressionEngine`.

use crate::config::{Config, GhostscriptSettings};
use crate::error::CompressError;
use crate::platform::{PlatformCommands, GHOSTSCRIPT};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// External program that writes a compressed copy of `input` to `output`
#[async_trait]
pub trait CompressionEngine: Send + Sync {
    /// Command or engine name, for diagnostics
    fn name(&self) -> &str;

    /// Whether the engine can be launched on this system
    async fn is_available(&self) -> bool;

    /// Compress `input` into `output`. Must not touch `input`.
    async fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError>;
}

/// Ghostscript `pdfwrite` engine
pub struct GhostscriptEngine {
    command: String,
    settings: GhostscriptSettings,
    timeout: Option<Duration>,
}

impl GhostscriptEngine {
    pub fn new(settings: GhostscriptSettings, timeout: Option<Duration>) -> Self {
        let command = settings
            .command
            .clone()
            .unwrap_or_else(|| PlatformCommands::instance().get_command(GHOSTSCRIPT).to_string());

        Self {
            command,
            settings,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ghostscript.clone(), config.engine_timeout())
    }

    /// Full argument list for one invocation
    pub fn arguments(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut output_arg = OsString::from("-sOutputFile=");
        output_arg.push(output);

        vec![
            OsString::from("-sDEVICE=pdfwrite"),
            OsString::from(format!("-dCompatibilityLevel={}", self.settings.compatibility_level)),
            OsString::from(format!("-dPDFSETTINGS={}", self.settings.pdf_settings)),
            OsString::from("-dNOPAUSE"),
            OsString::from("-dQUIET"),
            OsString::from("-dBATCH"),
            OsString::from(format!("-dBufferSpace={}", self.settings.buffer_space_bytes())),
            OsString::from(format!("-dMaxBitmap={}", self.settings.max_bitmap_bytes())),
            OsString::from(format!("-dNumRenderingThreads={}", self.settings.rendering_threads)),
            output_arg,
            input.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait]
impl CompressionEngine for GhostscriptEngine {
    fn name(&self) -> &str {
        &self.command
    }

    async fn is_available(&self) -> bool {
        PlatformCommands::instance()
            .is_command_available(&self.command)
            .await
    }

    async fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(self.arguments(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // own process group: a terminal Ctrl+C must reach only the coordinator,
        // in-flight files are allowed to finish
        #[cfg(unix)]
        cmd.process_group(0);

        debug!("Running {} on {}", self.command, input.display());
        let start_time = std::time::Instant::now();

        let run = cmd.output();
        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, run).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(CompressError::EngineTimeout {
                        path: input.to_path_buf(),
                        timeout_secs: timeout.as_secs(),
                    })
                }
            },
            None => run.await,
        };

        let output = result.map_err(|source| CompressError::EngineLaunch {
            command: self.command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(CompressError::Engine {
                path: input.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(
            "{} finished {} in {:.1}s",
            self.command,
            input.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}
