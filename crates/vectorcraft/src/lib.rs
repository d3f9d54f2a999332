//! VectorCraft Core - Embeddable raster-to-vector workspace orchestration.
//!
//! VectorCraft is the orchestration core of an interactive tracing
//! workspace: it manages the upload → configure → trace → export lifecycle,
//! maps semantic controls onto the vectorization engine's numeric options,
//! and acquires the engine itself from ordered fallback sources. The tracing
//! algorithm is an external capability behind the [`engine::VectorEngine`]
//! contract; this crate never implements it.
//!
//! # Architecture
//!
//! ```text
//! RawFile → Ingest → WorkspaceState (Loaded) → Trace (engine + mapped
//! options) → post-process → WorkspaceState (Traced) → Export
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vectorcraft::{Config, RawFile, Workspace};
//!
//! #[tokio::main]
//! async fn main() -> vectorcraft::Result<()> {
//!     let config = Config::load()?;
//!     let workspace = Workspace::new(&config);
//!
//!     workspace
//!         .acquire_image(Some(RawFile {
//!             name: "logo.png".into(),
//!             bytes: std::fs::read("./logo.png")?,
//!         }))
//!         .await?;
//!     workspace.select_preset("logo");
//!     workspace.request_trace().await?;
//!     if let Some(artifact) = workspace.request_export() {
//!         std::fs::write(artifact.file_name, artifact.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod params;
pub mod svg;
pub mod workspace;

// Re-exports for convenient access
pub use config::Config;
pub use engine::{EngineAvailability, EngineLoader, EngineSource, EngineStatus, VectorEngine};
pub use error::{ConfigError, EngineError, IngestError, Result, TraceError, VectorcraftError};
pub use export::Artifact;
pub use ingest::{ImageAcquired, ImageHandle, RawFile};
pub use params::{Control, Preset, PresetSelection, TraceControls, TraceOptions};
pub use workspace::{Phase, TraceOutcome, TraceReport, Workspace, WorkspaceState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
