//! Background refresh loops

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::query::{QueryClient, QueryKey};

/// Refetch `key` every `interval` until `cancel` fires
pub fn spawn_refetch_loop(
    client: QueryClient,
    key: QueryKey,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move { refetch_loop(client, key, interval, cancel).await })
}

async fn refetch_loop(
    client: QueryClient,
    key: QueryKey,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Refetch loop for {} cancelled", key);
                break;
            }
        }

        match client.refetch_query(&key).await {
            Some(Ok(())) => tracing::debug!("Refreshed {}", key),
            Some(Err(e)) => tracing::warn!("Background refresh of {} failed: {}", key, e),
            None => tracing::debug!("Nothing registered to refresh {}", key),
        }
    }
}

/// Sweep expired cache entries every `interval` until `cancel` fires
pub fn spawn_gc_loop(
    client: QueryClient,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => break,
            }
            client.collect_garbage();
        }
    })
}
