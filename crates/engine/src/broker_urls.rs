//! Health-checked endpoint set shared by broker clients (spec §4.8, §5).
//!
//! A background task opportunistically probes every candidate URL on a fixed
//! interval; the request path reads the healthy subset under a read-lock and
//! mutates it only from the health-check task, which holds the write lock.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct HealthCheckedUrls {
    inner: Arc<RwLock<Vec<String>>>,
    all: Vec<String>,
}

impl HealthCheckedUrls {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(urls.clone())),
            all: urls,
        }
    }

    pub async fn healthy(&self) -> Vec<String> {
        self.inner.read().await.clone()
    }

    async fn set_healthy(&self, urls: Vec<String>) {
        *self.inner.write().await = urls;
    }

    /// Spawns the periodic health-check task; returns a stop handle. The
    /// task terminates as soon as the returned `watch::Sender` is dropped or
    /// sends `true`, and its completion can be awaited via the join handle.
    pub fn spawn_health_checker(
        &self,
        interval: Duration,
        probe: impl Fn(String) -> futures::future::BoxFuture<'static, bool> + Send + Sync + 'static,
    ) -> (watch::Sender<bool>, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = watch::channel(false);
        let state = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut healthy = Vec::new();
                        for url in &state.all {
                            if probe(url.clone()).await {
                                healthy.push(url.clone());
                            }
                        }
                        state.set_healthy(healthy).await;
                    }
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        (tx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_with_all_urls_healthy() {
        let set = HealthCheckedUrls::new(vec!["https://a".to_string(), "https://b".to_string()]);
        assert_eq!(set.healthy().await.len(), 2);
    }

    #[tokio::test]
    async fn set_healthy_replaces_the_visible_set() {
        let set = HealthCheckedUrls::new(vec!["https://a".to_string(), "https://b".to_string()]);
        set.set_healthy(vec!["https://a".to_string()]).await;
        assert_eq!(set.healthy().await, vec!["https://a".to_string()]);
    }
}
