//! Grouping of sends into short-lived dispatch batches.
//!
//! Batches exist only in memory. A batch flushes when its item count
//! meets the size threshold, when its flush window expires, or when the
//! batcher shuts down; `Critical` items skip batching entirely. Actual
//! delivery always goes through the delivery engine, one item at a
//! time, so every per-send rule still applies.

use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use rand::RngExt;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use pulso_core::config::batching::BatchingConfig;
use pulso_delivery::DeliveryEngine;
use pulso_entity::{Batch, BatchId, BatchItem, BatchPriority};

use crate::metrics::{BatcherMetrics, BatcherSnapshot};

const ID_SUFFIX_LEN: usize = 9;
const ID_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Queues notification sends into batches and dispatches them in the
/// background.
///
/// Must be created inside a Tokio runtime; construction spawns the
/// dispatch loop. Dropping the batcher signals the loop to drain and
/// exit; [`shutdown`](Self::shutdown) does the same but waits for the
/// drain to finish.
pub struct NotificationBatcher {
    inner: Arc<BatcherInner>,
    shutdown_tx: watch::Sender<bool>,
    dispatcher: StdMutex<Option<JoinHandle<()>>>,
}

struct BatcherInner {
    engine: DeliveryEngine,
    config: BatchingConfig,
    pending: Mutex<Vec<PendingBatch>>,
    metrics: BatcherMetrics,
}

struct PendingBatch {
    batch: Batch,
    deadline: Instant,
}

impl NotificationBatcher {
    pub fn new(engine: DeliveryEngine, config: BatchingConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let inner = Arc::new(BatcherInner {
            engine,
            config,
            pending: Mutex::new(Vec::new()),
            metrics: BatcherMetrics::default(),
        });
        let dispatcher = tokio::spawn(dispatch_loop(Arc::clone(&inner), shutdown_rx));

        Self {
            inner,
            shutdown_tx,
            dispatcher: StdMutex::new(Some(dispatcher)),
        }
    }

    /// Queue items for dispatch and return the batch id.
    ///
    /// Never blocks on delivery: `Critical` items and batches already
    /// at the size threshold are handed to a spawned task, everything
    /// else waits for the flush window.
    pub async fn add_to_batch(&self, items: Vec<BatchItem>, priority: BatchPriority) -> BatchId {
        let batch_id = generate_batch_id();
        let batch = Batch::new(batch_id.clone(), items, priority);
        self.inner.metrics.record_batch_created();

        if !priority.can_batch() {
            self.inner.metrics.record_critical_bypass();
            info!(%batch_id, items = batch.items.len(), "Critical batch dispatched immediately");
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.flush(batch).await });
            return batch_id;
        }

        if batch.items.len() >= self.inner.config.max_batch_size {
            debug!(%batch_id, items = batch.items.len(), "Batch met size threshold, flushing");
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.flush(batch).await });
            return batch_id;
        }

        let deadline = Instant::now() + Duration::from_millis(self.inner.config.flush_window_ms);
        self.inner
            .pending
            .lock()
            .await
            .push(PendingBatch { batch, deadline });
        debug!(%batch_id, "Batch queued for flush window");
        batch_id
    }

    /// Number of batches still waiting on their flush window.
    pub async fn pending_batches(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    /// Counter snapshot for observability.
    pub fn metrics(&self) -> BatcherSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Stop the dispatch loop, draining all pending batches first, and
    /// wait for it to finish.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let handle = self
            .dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Batch dispatcher ended abnormally");
            }
        }
    }
}

impl BatcherInner {
    /// Hand every item in the batch to the delivery engine.
    ///
    /// A failing item never aborts the rest of the batch.
    async fn flush(&self, batch: Batch) {
        let Batch { id, items, .. } = batch;
        let item_count = items.len();

        for item in items {
            let outcome = self
                .engine
                .send_with_retry(item.user_id, item.draft, self.engine.retry_policy())
                .await;
            match outcome {
                Ok(report) if !report.success => {
                    debug!(
                        batch_id = %id,
                        notification_id = %report.notification_id,
                        error = report.error.as_deref().unwrap_or("unknown"),
                        "Batched send did not complete"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(batch_id = %id, user_id = %item.user_id, error = %e, "Batched send failed");
                }
            }
        }

        self.metrics.record_batch_flushed();
        self.metrics.record_items_dispatched(item_count as u64);
        info!(batch_id = %id, items = item_count, "Batch flushed");
    }

    /// Flush every batch whose window deadline has passed.
    async fn flush_expired(&self, now: Instant) {
        let due = {
            let mut pending = self.pending.lock().await;
            let mut due = Vec::new();
            let mut index = 0;
            while index < pending.len() {
                if pending[index].deadline <= now {
                    due.push(pending.swap_remove(index));
                } else {
                    index += 1;
                }
            }
            due
        };
        if due.is_empty() {
            return;
        }

        let mut batches: Vec<Batch> = due.into_iter().map(|p| p.batch).collect();
        order_for_flush(&mut batches);
        for batch in batches {
            self.flush(batch).await;
        }
    }

    /// Flush everything still queued, regardless of deadlines.
    async fn drain(&self) {
        let drained: Vec<PendingBatch> = {
            let mut pending = self.pending.lock().await;
            pending.drain(..).collect()
        };
        if drained.is_empty() {
            return;
        }

        info!(batches = drained.len(), "Draining pending batches before shutdown");
        let mut batches: Vec<Batch> = drained.into_iter().map(|p| p.batch).collect();
        order_for_flush(&mut batches);
        for batch in batches {
            self.flush(batch).await;
        }
    }
}

/// Higher priority first, FIFO within a priority.
fn order_for_flush(batches: &mut [Batch]) {
    batches.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

async fn dispatch_loop(inner: Arc<BatcherInner>, mut shutdown: watch::Receiver<bool>) {
    let poll_interval = Duration::from_millis(inner.config.poll_interval_ms);
    loop {
        tokio::select! {
            // Fires on an explicit shutdown signal or when the batcher
            // is dropped; either way, drain before exiting.
            _ = shutdown.changed() => {
                inner.drain().await;
                debug!("Batch dispatcher stopped");
                return;
            }
            _ = tokio::time::sleep(poll_interval) => {
                inner.flush_expired(Instant::now()).await;
            }
        }
    }
}

fn generate_batch_id() -> BatchId {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_CHARS[rng.random_range(0..ID_SUFFIX_CHARS.len())] as char)
        .collect();
    BatchId::new(format!("batch_{}_{}", Utc::now().timestamp_millis(), suffix))
}
