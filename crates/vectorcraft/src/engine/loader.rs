//! Idempotent engine acquisition with ordered fallback.
//!
//! The loader walks its source list in priority order, short-circuits on the
//! first source that hands back a working engine, and caches the outcome for
//! the lifetime of the process. Concurrent callers while an attempt is in
//! flight share that single attempt instead of racing parallel loads.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;

use super::{EngineAvailability, EngineSource, EngineStatus, HttpEngineSource};
use crate::config::EngineConfig;

/// Acquires and caches the vectorization engine.
pub struct EngineLoader {
    sources: Vec<Box<dyn EngineSource>>,
    status: OnceCell<EngineStatus>,
    loading: AtomicBool,
}

impl EngineLoader {
    /// Build a loader over HTTP sources from configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let client = reqwest::Client::new();
        let sources = config
            .sources
            .iter()
            .map(|source| {
                Box::new(HttpEngineSource::new(
                    source,
                    client.clone(),
                    config.probe_timeout_ms,
                    config.trace_timeout_ms,
                )) as Box<dyn EngineSource>
            })
            .collect();
        Self::with_sources(sources)
    }

    /// Build a loader over explicit sources.
    pub fn with_sources(sources: Vec<Box<dyn EngineSource>>) -> Self {
        Self {
            sources,
            status: OnceCell::new(),
            loading: AtomicBool::new(false),
        }
    }

    /// Ensure the engine is available, acquiring it on first use.
    ///
    /// The first caller triggers the source walk; callers arriving while it
    /// is in flight await the same attempt (`OnceCell` initialization is
    /// shared). Once resolved, the status is permanent: `Failed` does not
    /// auto-retry, and `Ready` is never re-probed.
    pub async fn ensure_engine(&self) -> EngineStatus {
        self.status
            .get_or_init(|| async {
                self.loading.store(true, Ordering::SeqCst);
                let status = self.acquire_from_sources().await;
                self.loading.store(false, Ordering::SeqCst);
                status
            })
            .await
            .clone()
    }

    /// Current availability without triggering an acquisition.
    pub fn availability(&self) -> EngineAvailability {
        match self.status.get() {
            Some(EngineStatus::Ready(_)) => EngineAvailability::Ready,
            Some(EngineStatus::Failed { sources_attempted }) => EngineAvailability::Failed {
                sources_attempted: *sources_attempted,
            },
            None if self.loading.load(Ordering::SeqCst) => EngineAvailability::Loading,
            None => EngineAvailability::Unknown,
        }
    }

    async fn acquire_from_sources(&self) -> EngineStatus {
        for (position, source) in self.sources.iter().enumerate() {
            tracing::debug!(
                "Trying engine source '{}' ({}/{})",
                source.name(),
                position + 1,
                self.sources.len()
            );
            match source.acquire().await {
                Ok(engine) => {
                    tracing::info!("Vector engine ready via source '{}'", source.name());
                    return EngineStatus::Ready(engine);
                }
                Err(e) => {
                    tracing::warn!("Engine source '{}' failed: {e}", source.name());
                }
            }
        }

        tracing::error!(
            "Vector engine not loaded: all {} source(s) failed. \
             Check network access or the configured [engine] sources.",
            self.sources.len()
        );
        EngineStatus::Failed {
            sources_attempted: self.sources.len(),
        }
    }
}
