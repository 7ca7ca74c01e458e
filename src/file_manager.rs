//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery dei PDF.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva dei PDF in una directory (estensione case-insensitive)
//! - Filtro per dimensione minima
//! - Sostituzione atomica dell'originale con l'output compresso
//! - Utilità per conversioni di dimensione e percentuali
//!
//! ## Discovery:
//! - Ordinamento per nome file, quindi stabile tra run diversi sullo stesso albero
//! - Lista materializzata prima del dispatch ai worker
//! - Errori durante il walk loggati e saltati
//!
//! ## Sostituzione:
//! `replace_file()` usa un rename nella stessa directory: o resta l'originale
//! o c'è la versione compressa, mai nessuna delle due.
//!
//! ## Esempio:
//! ```ignore
//! let jobs = FileManager::find_pdf_files(Path::new("/path/to/docs"), 2 * 1024 * 1024)?;
//! ```

use crate::error::CompressError;
use crate::outcome::Job;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all PDFs under `root` whose size is at least `min_size_bytes`
    pub fn find_pdf_files(root: &Path, min_size_bytes: u64) -> Result<Vec<Job>, CompressError> {
        if !root.is_dir() {
            return Err(CompressError::Filesystem(format!(
                "Not a directory: {}",
                root.display()
            )));
        }
        std::fs::read_dir(root).map_err(|e| {
            CompressError::Filesystem(format!("Cannot read directory {}: {}", root.display(), e))
        })?;

        let mut jobs = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !Self::is_pdf(entry.path()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Cannot read size of {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if size < min_size_bytes {
                debug!(
                    "Below size threshold, skipping {} ({})",
                    entry.path().display(),
                    Self::format_size(size)
                );
                continue;
            }

            jobs.push(Job::new(entry.into_path(), size));
        }

        Ok(jobs)
    }

    /// Check if a path has a `.pdf` extension, in any case
    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }

    /// Get the size of a file in bytes
    pub async fn get_file_size(path: &Path) -> Result<u64, CompressError> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Atomically replace `original` with `replacement` (same filesystem)
    pub async fn replace_file(original: &Path, replacement: &Path) -> Result<(), CompressError> {
        fs::rename(replacement, original).await?;
        Ok(())
    }

    /// Bytes to MB, as used in reports
    pub fn bytes_to_mb(size: u64) -> f64 {
        size as f64 / BYTES_PER_MB
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, size: usize) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, vec![b'x'; size]).unwrap();
    }

    #[test]
    fn test_find_pdf_files_filters_extension_and_size() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "big.pdf", 3000);
        write_file(root, "UPPER.PDF", 3000);
        write_file(root, "nested/deep/inner.Pdf", 5000);
        write_file(root, "small.pdf", 100);
        write_file(root, "notes.txt", 9000);
        write_file(root, "pdf", 9000);

        let jobs = FileManager::find_pdf_files(root, 1000).unwrap();
        let mut names: Vec<String> = jobs.iter().map(|j| j.file_name()).collect();
        names.sort();

        assert_eq!(names, vec!["UPPER.PDF", "big.pdf", "inner.Pdf"]);
        let inner = jobs.iter().find(|j| j.file_name() == "inner.Pdf").unwrap();
        assert_eq!(inner.discovered_size, 5000);
    }

    #[test]
    fn test_find_pdf_files_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.pdf", "a.pdf", "b/x.pdf", "b.pdf"] {
            write_file(temp_dir.path(), name, 10);
        }

        let first = FileManager::find_pdf_files(temp_dir.path(), 0).unwrap();
        let second = FileManager::find_pdf_files(temp_dir.path(), 0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_find_pdf_files_ignores_leftover_temp_output() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "report.pdf", 10);
        write_file(temp_dir.path(), ".report.a1B2c3.pdf.compressing", 10);

        let jobs = FileManager::find_pdf_files(temp_dir.path(), 0).unwrap();
        let names: Vec<String> = jobs.iter().map(|j| j.file_name()).collect();
        assert_eq!(names, vec!["report.pdf"]);
    }

    #[test]
    fn test_find_pdf_files_min_size_is_inclusive() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "exact.pdf", 2048);

        let jobs = FileManager::find_pdf_files(temp_dir.path(), 2048).unwrap();
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn test_find_pdf_files_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = FileManager::find_pdf_files(&missing, 0);
        assert!(matches!(result, Err(CompressError::Filesystem(_))));
    }

    #[test]
    fn test_find_pdf_files_root_is_file() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "file.pdf", 10);

        let result = FileManager::find_pdf_files(&temp_dir.path().join("file.pdf"), 0);
        assert!(matches!(result, Err(CompressError::Filesystem(_))));
    }

    #[tokio::test]
    async fn test_replace_file() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("doc.pdf");
        let replacement = temp_dir.path().join("doc.tmp");
        std::fs::write(&original, b"original").unwrap();
        std::fs::write(&replacement, b"new").unwrap();

        FileManager::replace_file(&original, &replacement).await.unwrap();

        assert_eq!(std::fs::read(&original).unwrap(), b"new");
        assert!(!replacement.exists());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 0), 0.0);
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
        assert!(FileManager::calculate_reduction(100, 150) < 0.0);
    }
}
