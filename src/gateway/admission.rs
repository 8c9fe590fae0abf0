use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, gauge};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::models::WalletAddress;

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Cap on concurrently admitted upstream-call sequences.
    pub requests_per_minute: usize,
    /// Ceiling on tracked entries (waiting + admitted).
    pub max_queue_size: usize,
    /// Admission attempts before a waiting request is dropped.
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Entries and active markers older than this are swept.
    pub queue_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 10,
            max_queue_size: 100,
            max_retries: 3,
            retry_delay: Duration::from_millis(1_000),
            queue_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub request_id: RequestId,
    pub timestamp: Instant,
    pub retry_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("admission queue is full")]
    QueueFull,

    #[error("admission retries exhausted")]
    RetriesExhausted,

    #[error("request is not queued")]
    NotQueued,
}

impl AdmissionError {
    fn label(&self) -> &'static str {
        match self {
            AdmissionError::QueueFull => "queue_full",
            AdmissionError::RetriesExhausted => "retries_exhausted",
            AdmissionError::NotQueued => "not_queued",
        }
    }
}

/// Bounds concurrent upstream work. Every request is submitted, then admitted
/// (possibly after bounded retries) or rejected, and finally released.
///
/// Clones share state; separate `new` calls give isolated gates.
#[derive(Clone)]
pub struct AdmissionGate {
    config: GateConfig,
    inner: Arc<Mutex<GateInner>>,
    seq: Arc<AtomicU64>,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

#[derive(Default)]
struct GateInner {
    queue: HashMap<RequestId, QueueEntry>,
    /// Admitted request → admission time.
    active: HashMap<RequestId, Instant>,
}

impl AdmissionGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(GateInner::default())),
            seq: Arc::new(AtomicU64::new(0)),
            sweeper: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Start the periodic stale-entry sweep. Calling twice is a no-op.
    pub async fn init(&self) {
        let mut slot = self.sweeper.lock().await;
        if slot.is_some() {
            return;
        }

        let gate = self.clone();
        let interval = self.config.sweep_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                gate.sweep_expired(Instant::now()).await;
            }
        }));

        tracing::info!(
            requests_per_minute = self.config.requests_per_minute,
            max_queue_size = self.config.max_queue_size,
            max_retries = self.config.max_retries,
            "Admission gate started"
        );
    }

    /// Stop the sweep task. Tracked entries are kept.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
            tracing::info!("Admission gate stopped");
        }
    }

    /// Register a request for `address`.
    pub async fn submit(&self, address: &WalletAddress) -> Result<RequestId, AdmissionError> {
        let mut inner = self.inner.lock().await;
        if inner.queue.len() >= self.config.max_queue_size {
            tracing::warn!(
                address = %address.short(),
                tracked = inner.queue.len(),
                "Admission gate: queue full"
            );
            counter!("admission_rejected_total", "reason" => AdmissionError::QueueFull.label()).increment(1);
            return Err(AdmissionError::QueueFull);
        }

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let request_id = RequestId(format!(
            "{}-{}-{}",
            address,
            Utc::now().timestamp_millis(),
            seq
        ));
        inner.queue.insert(
            request_id.clone(),
            QueueEntry {
                request_id: request_id.clone(),
                timestamp: Instant::now(),
                retry_count: 0,
            },
        );
        Ok(request_id)
    }

    /// Wait for a concurrency slot. Gives up after `max_retries` attempts;
    /// a request that was swept or released in the meantime gets `NotQueued`.
    pub async fn admit(&self, request_id: &RequestId) -> Result<(), AdmissionError> {
        loop {
            match self.try_admit(request_id).await {
                Ok(true) => return Ok(()),
                Ok(false) => sleep(self.config.retry_delay).await,
                Err(e) => {
                    counter!("admission_rejected_total", "reason" => e.label()).increment(1);
                    return Err(e);
                }
            }
        }
    }

    /// One admission attempt. `Ok(false)` means the caller should back off.
    async fn try_admit(&self, request_id: &RequestId) -> Result<bool, AdmissionError> {
        let mut inner = self.inner.lock().await;

        let retry_count = match inner.queue.get(request_id) {
            Some(entry) => entry.retry_count,
            None => return Err(AdmissionError::NotQueued),
        };

        if retry_count >= self.config.max_retries {
            inner.queue.remove(request_id);
            tracing::warn!(request_id = %request_id, retry_count, "Admission gate: retries exhausted");
            return Err(AdmissionError::RetriesExhausted);
        }

        if inner.active.contains_key(request_id) {
            return Ok(true);
        }

        if inner.active.len() < self.config.requests_per_minute {
            inner.active.insert(request_id.clone(), Instant::now());
            gauge!("admission_active").set(inner.active.len() as f64);
            tracing::debug!(request_id = %request_id, active = inner.active.len(), "Admission gate: admitted");
            return Ok(true);
        }

        if let Some(entry) = inner.queue.get_mut(request_id) {
            entry.retry_count += 1;
            tracing::debug!(
                request_id = %request_id,
                retry_count = entry.retry_count,
                "Admission gate: at capacity, backing off"
            );
        }
        Ok(false)
    }

    /// Drop both the active marker and the queue entry. Idempotent.
    pub async fn release(&self, request_id: &RequestId) {
        let mut inner = self.inner.lock().await;
        let was_active = inner.active.remove(request_id).is_some();
        let was_queued = inner.queue.remove(request_id).is_some();
        if was_active || was_queued {
            gauge!("admission_active").set(inner.active.len() as f64);
            tracing::debug!(request_id = %request_id, "Admission gate: released");
        }
    }

    /// Remove entries and active markers older than `queue_timeout` as of
    /// `now`. Returns how many were removed.
    pub async fn sweep_expired(&self, now: Instant) -> usize {
        let timeout = self.config.queue_timeout;
        let mut inner = self.inner.lock().await;

        let queued_before = inner.queue.len();
        inner
            .queue
            .retain(|_, entry| now.saturating_duration_since(entry.timestamp) <= timeout);
        let active_before = inner.active.len();
        inner
            .active
            .retain(|_, admitted_at| now.saturating_duration_since(*admitted_at) <= timeout);

        let removed = (queued_before - inner.queue.len()) + (active_before - inner.active.len());
        if removed > 0 {
            gauge!("admission_active").set(inner.active.len() as f64);
            tracing::info!(
                removed,
                tracked = inner.queue.len(),
                active = inner.active.len(),
                "Admission gate: swept stale entries"
            );
        }
        removed
    }

    /// Tie `request_id`'s lifetime to the returned guard.
    pub fn guard(&self, request_id: RequestId) -> SlotGuard {
        SlotGuard {
            gate: self.clone(),
            request_id: Some(request_id),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.inner.lock().await.active.len()
    }

    pub async fn tracked_count(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn entry(&self, request_id: &RequestId) -> Option<QueueEntry> {
        self.inner.lock().await.queue.get(request_id).cloned()
    }
}

/// Releases its request when dropped, so a cancelled caller cannot hold a
/// slot until the sweep. Call `release` on the normal path.
pub struct SlotGuard {
    gate: AdmissionGate,
    request_id: Option<RequestId>,
}

impl SlotGuard {
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub async fn release(mut self) {
        if let Some(id) = self.request_id.take() {
            self.gate.release(&id).await;
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let Some(id) = self.request_id.take() else {
            return;
        };
        // Release needs the async lock; hand it to the runtime.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let gate = self.gate.clone();
                tracing::debug!(request_id = %id, "Admission gate: releasing dropped request");
                handle.spawn(async move { gate.release(&id).await });
            }
            Err(_) => tracing::warn!(request_id = %id, "Admission gate: no runtime to release dropped request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> WalletAddress {
        WalletAddress::parse("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").unwrap()
    }

    fn gate(concurrency: usize, max_queue: usize, max_retries: u32) -> AdmissionGate {
        AdmissionGate::new(GateConfig {
            requests_per_minute: concurrency,
            max_queue_size: max_queue,
            max_retries,
            retry_delay: Duration::from_millis(5),
            queue_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn test_submit_and_admit_under_capacity() {
        let gate = gate(2, 10, 3);
        let id = gate.submit(&wallet()).await.unwrap();

        assert!(gate.admit(&id).await.is_ok());
        assert_eq!(gate.active_count().await, 1);

        gate.release(&id).await;
        assert_eq!(gate.active_count().await, 0);
        assert_eq!(gate.tracked_count().await, 0);
    }

    #[tokio::test]
    async fn test_same_address_gets_distinct_ids() {
        let gate = gate(2, 10, 3);
        let a = gate.submit(&wallet()).await.unwrap();
        let b = gate.submit(&wallet()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(gate.tracked_count().await, 2);
    }

    #[tokio::test]
    async fn test_queue_full_rejects_exactly_one() {
        let max_queue = 8;
        let gate = gate(2, max_queue, 3);
        let addr = wallet();

        let results = futures_util::future::join_all(
            (0..=max_queue).map(|_| gate.submit(&addr)),
        )
        .await;

        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(AdmissionError::QueueFull)))
            .count();
        assert_eq!(rejected, 1);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), max_queue);
    }

    #[tokio::test]
    async fn test_retries_exhausted_then_not_queued() {
        let gate = gate(1, 10, 3);
        let holder = gate.submit(&wallet()).await.unwrap();
        gate.admit(&holder).await.unwrap();

        let waiter = gate.submit(&wallet()).await.unwrap();
        assert_eq!(gate.admit(&waiter).await, Err(AdmissionError::RetriesExhausted));
        assert!(gate.entry(&waiter).await.is_none());
        assert_eq!(gate.admit(&waiter).await, Err(AdmissionError::NotQueued));
    }

    #[tokio::test]
    async fn test_waiter_admitted_after_release() {
        let gate = AdmissionGate::new(GateConfig {
            requests_per_minute: 1,
            max_queue_size: 10,
            max_retries: 50,
            retry_delay: Duration::from_millis(10),
            ..GateConfig::default()
        });
        let holder = gate.submit(&wallet()).await.unwrap();
        gate.admit(&holder).await.unwrap();

        let waiter = gate.submit(&wallet()).await.unwrap();
        let releaser = {
            let gate = gate.clone();
            let holder = holder.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(30)).await;
                gate.release(&holder).await;
            })
        };

        assert!(gate.admit(&waiter).await.is_ok());
        releaser.await.unwrap();
        let entry = gate.entry(&waiter).await.unwrap();
        assert!(entry.retry_count > 0);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let gate = gate(1, 10, 3);
        let id = gate.submit(&wallet()).await.unwrap();
        gate.admit(&id).await.unwrap();

        gate.release(&id).await;
        gate.release(&id).await;
        assert_eq!(gate.active_count().await, 0);

        let next = gate.submit(&wallet()).await.unwrap();
        assert!(gate.admit(&next).await.is_ok());
    }

    #[tokio::test]
    async fn test_release_of_unknown_id_is_noop() {
        let gate = gate(1, 10, 3);
        gate.release(&RequestId("nobody-0-0".into())).await;
        assert_eq!(gate.tracked_count().await, 0);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_stale_entries() {
        let gate = gate(1, 10, 3);
        let admitted = gate.submit(&wallet()).await.unwrap();
        gate.admit(&admitted).await.unwrap();
        let waiting = gate.submit(&wallet()).await.unwrap();

        assert_eq!(gate.sweep_expired(Instant::now()).await, 0);
        assert_eq!(gate.tracked_count().await, 2);

        let later = Instant::now() + Duration::from_secs(31);
        assert_eq!(gate.sweep_expired(later).await, 3);
        assert_eq!(gate.active_count().await, 0);
        assert_eq!(gate.admit(&waiting).await, Err(AdmissionError::NotQueued));
    }

    async fn wait_until_idle(gate: &AdmissionGate) {
        for _ in 0..50 {
            if gate.tracked_count().await == 0 && gate.active_count().await == 0 {
                return;
            }
            sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_dropped_guard_frees_slot() {
        let gate = gate(1, 10, 3);
        let id = gate.submit(&wallet()).await.unwrap();
        let guard = gate.guard(id.clone());
        gate.admit(&id).await.unwrap();
        assert_eq!(gate.active_count().await, 1);

        drop(guard);
        wait_until_idle(&gate).await;
        assert_eq!(gate.active_count().await, 0);
        assert_eq!(gate.tracked_count().await, 0);
    }

    #[tokio::test]
    async fn test_guard_release_then_drop_is_single_release() {
        let gate = gate(1, 10, 3);
        let id = gate.submit(&wallet()).await.unwrap();
        let guard = gate.guard(id.clone());
        assert_eq!(guard.request_id(), Some(&id));
        gate.admit(&id).await.unwrap();

        guard.release().await;
        assert_eq!(gate.active_count().await, 0);

        let next = gate.submit(&wallet()).await.unwrap();
        assert!(gate.admit(&next).await.is_ok());
        assert_eq!(gate.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_init_and_shutdown() {
        let gate = AdmissionGate::new(GateConfig {
            queue_timeout: Duration::from_millis(20),
            sweep_interval: Duration::from_millis(10),
            ..GateConfig::default()
        });
        gate.init().await;
        gate.init().await;

        gate.submit(&wallet()).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(gate.tracked_count().await, 0);

        gate.shutdown().await;
        gate.submit(&wallet()).await.unwrap();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(gate.tracked_count().await, 1);
    }
}
