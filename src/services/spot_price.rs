use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::upstream::{CoinGeckoClient, CoinGeckoError};

#[derive(Debug, Clone, Copy)]
pub struct SpotQuote {
    pub usd: f64,
    pub fetched_at: DateTime<Utc>,
}

/// SOL/USD price with a periodic refresh that is started and stopped
/// explicitly. Readers get the last successful quote.
#[derive(Clone)]
pub struct SpotPriceTicker {
    client: CoinGeckoClient,
    interval: Duration,
    latest: Arc<RwLock<Option<SpotQuote>>>,
    task: Arc<Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>>,
}

impl SpotPriceTicker {
    pub fn new(client: CoinGeckoClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            latest: Arc::new(RwLock::new(None)),
            task: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn latest(&self) -> Option<SpotQuote> {
        *self.latest.read().await
    }

    /// Fetch now and update the cached quote on success.
    pub async fn refresh(&self) -> Result<f64, CoinGeckoError> {
        let usd = self.client.get_solana_price().await?;
        *self.latest.write().await = Some(SpotQuote {
            usd,
            fetched_at: Utc::now(),
        });
        Ok(usd)
    }

    /// Cached price, falling back to a live fetch when nothing is cached yet.
    pub async fn current(&self) -> Option<f64> {
        if let Some(quote) = self.latest().await {
            return Some(quote.usd);
        }
        match self.refresh().await {
            Ok(usd) => Some(usd),
            Err(e) => {
                tracing::warn!(error = %e, "SOL spot price unavailable");
                None
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }

    /// Begin refreshing every `interval`, first fetch immediately. No-op if
    /// already running.
    pub async fn start(&self) {
        let mut slot = self.task.lock().await;
        if slot.is_some() {
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let ticker = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(ticker.interval);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match ticker.refresh().await {
                            Ok(usd) => tracing::debug!(usd, "SOL spot price refreshed"),
                            Err(e) => tracing::warn!(error = %e, "SOL spot price refresh failed"),
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });

        *slot = Some((stop_tx, handle));
        tracing::info!(interval_secs = self.interval.as_secs(), "Spot price ticker started");
    }

    /// Stop the refresh task and wait for it to exit. The cached quote stays.
    pub async fn stop(&self) {
        let Some((stop_tx, handle)) = self.task.lock().await.take() else {
            return;
        };
        let _ = stop_tx.send(true);
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Spot price ticker task ended abnormally");
        }
        tracing::info!("Spot price ticker stopped");
    }
}
