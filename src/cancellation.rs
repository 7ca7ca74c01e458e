//! # Cancellation Module
//!
//! Gestione del Ctrl+C:
//! - `CancellationFlag`: booleano atomico condiviso, impostato una sola volta e mai resettato
//! - `CancellationController`: installa il listener del segnale e imposta il flag
//!
//! Il listener non termina mai il processo: i worker smettono di prendere nuovi
//! job, quelli in corso finiscono, e il coordinatore decide cosa fare dopo il drain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Shared stop request, read by workers before each job
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag {
    flag: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation; returns true only for the first request
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }
}

/// Installs the interrupt listener that flips a `CancellationFlag`
pub struct CancellationController {
    flag: CancellationFlag,
}

impl CancellationController {
    pub fn new() -> Self {
        Self {
            flag: CancellationFlag::new(),
        }
    }

    /// Handle to hand to the workers
    pub fn flag(&self) -> CancellationFlag {
        self.flag.clone()
    }

    /// Listen for Ctrl+C for the rest of the process lifetime
    pub fn install(&self) -> JoinHandle<()> {
        let flag = self.flag.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for interrupt signal: {}", e);
                    break;
                }
                Self::on_interrupt(&flag);
            }
        })
    }

    fn on_interrupt(flag: &CancellationFlag) {
        if flag.cancel() {
            warn!("Ctrl+C detected, finishing files in progress and stopping...");
        } else {
            debug!("Interrupt received again, already stopping");
        }
    }
}

impl Default for CancellationController {
    fn default() -> Self {
        Self::new()
    }
}
