//! The vectorization engine: an external capability with a fixed contract.
//!
//! The orchestrator never implements tracing itself; it acquires an engine
//! through the [`EngineLoader`] (ordered fallback sources, cached outcome)
//! and invokes it as a black box:
//! - **mod**: `VectorEngine`/`EngineSource` traits and availability types
//! - **remote**: HTTP-backed engine and source
//! - **loader**: ordered fallback acquisition with a shared in-flight attempt

pub mod loader;
pub mod remote;

// Re-exports for convenient access
pub use loader::EngineLoader;
pub use remote::{HttpEngineSource, RemoteEngine};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::EngineError;
use crate::ingest::ImageHandle;
use crate::params::TraceOptions;

/// The vectorization capability contract.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the loader hands out `Arc<dyn VectorEngine>` for dynamic dispatch).
#[async_trait]
pub trait VectorEngine: Send + Sync {
    /// Engine name for logging (e.g., "primary").
    fn name(&self) -> &str;

    /// Convert a raster image into a self-contained SVG document.
    ///
    /// Resolves exactly once per call, with either the document text or an
    /// error.
    async fn trace(
        &self,
        image: &ImageHandle,
        options: &TraceOptions,
    ) -> Result<String, EngineError>;
}

/// One prioritized location the engine can be acquired from.
#[async_trait]
pub trait EngineSource: Send + Sync {
    /// Source name for logging and error messages.
    fn name(&self) -> &str;

    /// Attempt to produce a working engine from this source.
    async fn acquire(&self) -> Result<Arc<dyn VectorEngine>, EngineError>;
}

/// The cached, process-wide outcome of engine acquisition.
///
/// Write-once: after the loader resolves `Ready` or `Failed` it never
/// re-probes for the lifetime of the process.
#[derive(Clone)]
pub enum EngineStatus {
    Ready(Arc<dyn VectorEngine>),
    Failed { sources_attempted: usize },
}

impl std::fmt::Debug for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(engine) => f.debug_tuple("Ready").field(&engine.name()).finish(),
            Self::Failed { sources_attempted } => f
                .debug_struct("Failed")
                .field("sources_attempted", sources_attempted)
                .finish(),
        }
    }
}

/// Observable engine availability, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAvailability {
    /// No acquisition has been attempted yet
    Unknown,
    /// An acquisition attempt is in flight
    Loading,
    /// An engine is available
    Ready,
    /// Every configured source failed; no automatic retry
    Failed { sources_attempted: usize },
}
