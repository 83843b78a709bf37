//! Batch driver - sequences resolution across the whole identifier list.
//!
//! Total coverage is structural: the resolver contract has no error channel,
//! so every identifier yields exactly one Resolution and no item can abort
//! the loop.

use crate::resolver::{Resolution, ResolutionStatus, Resolve};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

pub struct BatchDriver<R: Resolve> {
    resolver: Arc<R>,
    workers: usize,
}

impl<R: Resolve + 'static> BatchDriver<R> {
    /// Sequential driver: one in-flight lookup at a time.
    pub fn new(resolver: R) -> Self {
        Self::with_workers(resolver, 1)
    }

    pub fn with_workers(resolver: R, workers: usize) -> Self {
        Self {
            resolver: Arc::new(resolver),
            workers: workers.max(1),
        }
    }

    /// Resolve every identifier, in input order.
    ///
    /// The returned batch always has exactly one entry per input identifier
    /// and `out[i].identifier == identifiers[i]`, whichever execution mode
    /// runs. An empty input yields an empty batch without touching the
    /// resolver.
    pub async fn run(&self, identifiers: &[String]) -> Vec<Resolution> {
        if identifiers.is_empty() {
            return Vec::new();
        }

        let results = if self.workers <= 1 {
            self.run_sequential(identifiers).await
        } else {
            self.run_pooled(identifiers).await
        };

        let summary = summarize(&results);
        info!(
            "Batch complete: {} resolved, {} not found, {} fetch errors",
            summary.resolved, summary.not_found, summary.fetch_errors
        );

        results
    }

    async fn run_sequential(&self, identifiers: &[String]) -> Vec<Resolution> {
        let total = identifiers.len();
        let mut results = Vec::with_capacity(total);

        for (index, identifier) in identifiers.iter().enumerate() {
            info!("Processing identifier {}/{}: {}", index + 1, total, identifier);
            results.push(self.resolver.resolve(identifier).await);
        }

        results
    }

    /// Fixed-size worker pool over a shared index cursor. Each worker writes
    /// into a pre-sized slot array at the item's input position, so input
    /// order holds regardless of completion order and no post-sort is
    /// needed.
    async fn run_pooled(&self, identifiers: &[String]) -> Vec<Resolution> {
        let total = identifiers.len();
        let identifiers = Arc::new(identifiers.to_vec());
        let cursor = Arc::new(AtomicUsize::new(0));
        let slots: Arc<Mutex<Vec<Option<Resolution>>>> = Arc::new(Mutex::new(vec![None; total]));

        let worker_count = self.workers.min(total);
        let mut handles = Vec::with_capacity(worker_count);

        for _ in 0..worker_count {
            let identifiers = Arc::clone(&identifiers);
            let cursor = Arc::clone(&cursor);
            let slots = Arc::clone(&slots);
            let resolver = Arc::clone(&self.resolver);

            handles.push(tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= identifiers.len() {
                        break;
                    }

                    info!(
                        "Processing identifier {}/{}: {}",
                        index + 1,
                        identifiers.len(),
                        identifiers[index]
                    );
                    let resolution = resolver.resolve(&identifiers[index]).await;
                    slots.lock().unwrap()[index] = Some(resolution);
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Worker task failed: {}", e);
            }
        }

        let mut slots = slots.lock().unwrap();
        slots
            .drain(..)
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(resolution) => resolution,
                // Only reachable if a worker died mid-item; keep the
                // one-row-per-identifier invariant with the sentinel.
                None => Resolution::fetch_error(&identifiers[index]),
            })
            .collect()
    }
}

/// Status counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub resolved: usize,
    pub not_found: usize,
    pub fetch_errors: usize,
}

pub fn summarize(results: &[Resolution]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for resolution in results {
        match resolution.status {
            ResolutionStatus::Resolved => summary.resolved += 1,
            ResolutionStatus::NotFound => summary.not_found += 1,
            ResolutionStatus::FetchError => summary.fetch_errors += 1,
        }
    }
    summary
}
