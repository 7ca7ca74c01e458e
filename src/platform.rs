//! # Platform-specific utilities
//!
//! Questo modulo centralizza la logica cross-platform per il binario di
//! Ghostscript (`gswin64c.exe` su Windows, `gs` altrove) e per la verifica
//! della sua presenza nel PATH.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Logical name of the compression engine
pub const GHOSTSCRIPT: &str = "ghostscript";

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let mut commands = HashMap::new();
        let which_command = if cfg!(windows) {
            commands.insert(GHOSTSCRIPT, "gswin64c.exe");
            "where"
        } else {
            commands.insert(GHOSTSCRIPT, "gs");
            "which"
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).copied().unwrap_or(base_name)
    }

    /// Check if a command is available on the system PATH
    pub async fn is_command_available(&self, command_name: &str) -> bool {
        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}
