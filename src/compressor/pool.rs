//! # Worker Pool Module
//!
//! Pool di dimensione fissa: `N` task tokio di lunga durata prendono i job da
//! una coda condivisa e rimandano i risultati su un canale. Il coordinatore fa
//! il fan-in, aggiorna la progress bar e raccoglie gli outcome in ordine di
//! completamento.
//!
//! Prima di prendere un nuovo job ogni task controlla il flag di cancellazione;
//! i job già in corso non vengono mai interrotti.

use crate::{
    cancellation::CancellationFlag,
    compressor::{progress_tracker::ProgressTracker, worker::CompressionWorker},
    error::CompressError,
    outcome::{CompressionOutcome, Job, JobOutcome},
};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// Result of one attempted job, sent from a pool task to the coordinator
#[derive(Debug)]
pub struct JobReport {
    pub job: Job,
    pub result: Result<JobOutcome, CompressError>,
}

/// Everything the pool produced
#[derive(Debug, Default)]
pub struct PoolReport {
    /// Outcomes in completion order
    pub outcomes: Vec<CompressionOutcome>,
    /// Jobs never taken from the queue because of cancellation
    pub not_started: usize,
}

/// Bounded set of workers sharing one `CompressionWorker`
pub struct WorkerPool {
    worker: Arc<CompressionWorker>,
    cancellation: CancellationFlag,
    concurrency: usize,
}

impl WorkerPool {
    pub fn new(worker: CompressionWorker, cancellation: CancellationFlag, concurrency: usize) -> Self {
        Self {
            worker: Arc::new(worker),
            cancellation,
            concurrency: concurrency.max(1),
        }
    }

    /// Run every job through the workers and fan the results in
    pub async fn run(&self, jobs: Vec<Job>, progress: &mut ProgressTracker) -> Result<PoolReport> {
        let mut report = PoolReport::default();
        if jobs.is_empty() {
            return Ok(report);
        }

        let worker_count = self.concurrency.min(jobs.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, mut rx) = mpsc::unbounded_channel::<JobReport>();

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let queue = queue.clone();
            let tx = tx.clone();
            let worker = self.worker.clone();
            let cancellation = self.cancellation.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if cancellation.is_cancelled() {
                        debug!("Worker {} stopping: cancellation requested", worker_id);
                        break;
                    }

                    let next = queue.lock().await.pop_front();
                    let Some(job) = next else {
                        break;
                    };

                    let result = worker.process(&job).await;
                    if tx.send(JobReport { job, result }).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        while let Some(job_report) = rx.recv().await {
            progress.handle_job_completion(&job_report.job, &job_report.result);
            if let Ok(outcome) = job_report.result {
                if let Some(outcome) = outcome.into_outcome() {
                    report.outcomes.push(outcome);
                }
            }
        }

        for handle in handles {
            handle.await?;
        }

        report.not_started = queue.lock().await.len();
        Ok(report)
    }
}
