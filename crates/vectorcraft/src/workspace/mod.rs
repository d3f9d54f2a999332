//! The workspace controller: user-facing actions over the state machine.
//!
//! - **state**: the lifecycle state machine (`Empty → Loaded → Tracing → Traced`)
//! - **mod**: the `Workspace` controller wiring ingestion, controls, engine
//!   acquisition, the trace orchestration sequence, and export
//!
//! The controller owns the state behind a mutex with short critical sections
//! (never held across an await), so control edits and image acquisition stay
//! responsive while a trace call is outstanding.

pub mod state;

pub use state::{Phase, WorkspaceState};

use std::sync::{Mutex, MutexGuard};

use crate::config::Config;
use crate::engine::{EngineAvailability, EngineLoader, EngineStatus};
use crate::error::{EngineError, IngestError, TraceError};
use crate::export::{export_artifact, Artifact};
use crate::ingest::{ImageAcquired, Ingestor, RawFile};
use crate::params::{
    Control, Preset, PresetSelection, TraceControls, TraceOptions, COLOR_COUNT_RANGE, LEVEL_RANGE,
};
use crate::svg::strip_background;

/// Outcome of one trace request.
#[derive(Debug, Clone)]
pub enum TraceOutcome {
    /// The result was stored and the workspace is now `Traced`.
    Completed(TraceReport),
    /// The engine answered, but the image changed (or the workspace was
    /// reset) while the trace was outstanding; the result was discarded.
    Stale,
}

/// Details of a completed trace, for status display.
#[derive(Debug, Clone)]
pub struct TraceReport {
    /// The stored SVG document
    pub svg: String,
    /// The path-omission threshold used, reported as the "nodes optimized"
    /// proxy metric
    pub nodes_optimized: u32,
    /// Whether a background shape was stripped
    pub background_removed: bool,
    /// Name of the engine that produced the result
    pub engine: String,
}

struct Inner {
    state: WorkspaceState,
    controls: TraceControls,
}

/// The interactive tracing workspace.
///
/// Owns the `WorkspaceState` explicitly (no module-level state) and exposes
/// the input-surface-agnostic actions: acquire an image, tune controls,
/// request a trace, export, reset.
pub struct Workspace {
    inner: Mutex<Inner>,
    ingestor: Ingestor,
    loader: EngineLoader,
}

impl Workspace {
    /// Create a workspace with engine sources taken from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_loader(config, EngineLoader::from_config(&config.engine))
    }

    /// Create a workspace over an explicit engine loader.
    pub fn with_loader(config: &Config, loader: EngineLoader) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: WorkspaceState::new(),
                controls: TraceControls::default(),
            }),
            ingestor: Ingestor::new(config.limits.clone()),
            loader,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock still holds coherent state; transitions are
        // completed before the guard drops.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Acquire a raster image from any input surface.
    ///
    /// An absent file is a no-op. On success the workspace moves to
    /// `Loaded`, discarding any prior trace result, and the single
    /// "image acquired" event is returned.
    pub async fn acquire_image(
        &self,
        file: Option<RawFile>,
    ) -> Result<Option<ImageAcquired>, IngestError> {
        let Some(acquired) = self.ingestor.acquire(file).await? else {
            return Ok(None);
        };
        self.lock().state.apply_image(acquired.image.clone());
        Ok(Some(acquired))
    }

    /// Apply a named preset to the bundled knobs.
    ///
    /// Unknown names are a logged no-op. Color mode and background
    /// transparency are untouched.
    pub fn select_preset(&self, name: &str) {
        let Some(preset) = Preset::from_name(name) else {
            tracing::warn!("Ignoring unknown preset '{name}'");
            return;
        };
        let mut inner = self.lock();
        inner.controls.apply_preset(preset);
        inner
            .state
            .set_active_preset(PresetSelection::Named(preset));
    }

    /// Update one control, clamping numeric knobs to their ranges.
    ///
    /// Editing a preset-bundled knob switches the active preset to "custom".
    pub fn set_control(&self, control: Control) {
        let mut inner = self.lock();
        match control {
            Control::DetailLevel(value) => {
                inner.controls.detail_level =
                    value.clamp(*LEVEL_RANGE.start(), *LEVEL_RANGE.end());
                inner.state.set_active_preset(PresetSelection::Custom);
            }
            Control::SmoothingLevel(value) => {
                inner.controls.smoothing_level =
                    value.clamp(*LEVEL_RANGE.start(), *LEVEL_RANGE.end());
                inner.state.set_active_preset(PresetSelection::Custom);
            }
            Control::ColorCount(value) => {
                inner.controls.color_count =
                    value.clamp(*COLOR_COUNT_RANGE.start(), *COLOR_COUNT_RANGE.end());
                inner.state.set_active_preset(PresetSelection::Custom);
            }
            Control::Monochrome(value) => inner.controls.monochrome = value,
            Control::TransparentBackground(value) => {
                inner.controls.transparent_background = value
            }
        }
    }

    /// Run one trace attempt against the current image and controls.
    ///
    /// The sequence: fail fast without an image; ensure the engine (a
    /// definitive engine failure leaves the state untouched so the action
    /// stays available for retry); snapshot options; enter `Tracing`; invoke
    /// the engine; post-process; store the result unless it went stale.
    pub async fn request_trace(&self) -> Result<TraceOutcome, TraceError> {
        if self.lock().state.image().is_none() {
            return Err(TraceError::NoImage);
        }

        let engine = match self.loader.ensure_engine().await {
            EngineStatus::Ready(engine) => engine,
            EngineStatus::Failed { sources_attempted } => {
                return Err(TraceError::Engine(EngineError::Unavailable {
                    sources_attempted,
                }));
            }
        };

        let (image, options, transparent, ticket) = {
            let mut inner = self.lock();
            let Some(image) = inner.state.image().cloned() else {
                // The image was reset away while the engine loaded.
                return Err(TraceError::NoImage);
            };
            let options = TraceOptions::from_controls(&inner.controls);
            let transparent = inner.controls.transparent_background;
            let ticket = inner.state.begin_trace()?;
            (image, options, transparent, ticket)
        };

        tracing::info!(
            "Tracing {}x{} image via engine '{}'",
            image.width,
            image.height,
            engine.name()
        );

        let svg = match engine.trace(&image, &options).await {
            Ok(svg) => svg,
            Err(e) => {
                self.lock().state.fail_trace(ticket);
                return Err(TraceError::Engine(e));
            }
        };

        let (svg, background_removed) = if transparent {
            strip_background(&svg)
        } else {
            (svg, false)
        };

        let mut inner = self.lock();
        if !inner.state.complete_trace(ticket, svg.clone()) {
            tracing::debug!("Discarding stale trace result");
            return Ok(TraceOutcome::Stale);
        }
        Ok(TraceOutcome::Completed(TraceReport {
            svg,
            nodes_optimized: options.path_omission,
            background_removed,
            engine: engine.name().to_string(),
        }))
    }

    /// Export the current vector result as a named artifact.
    ///
    /// Returns `None` unless the workspace is in `Traced`.
    pub fn request_export(&self) -> Option<Artifact> {
        let inner = self.lock();
        if !inner.state.can_export() {
            return None;
        }
        export_artifact(inner.state.vector_result())
    }

    /// Return to the pristine workspace: no image, no result, logo preset,
    /// color mode, transparent background on.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state.reset();
        inner.controls = TraceControls::default();
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.lock().state.phase()
    }

    /// Whether the trace action is enabled (an image is present).
    pub fn can_trace(&self) -> bool {
        self.lock().state.can_trace()
    }

    /// Whether the export action is enabled.
    pub fn can_export(&self) -> bool {
        self.lock().state.can_export()
    }

    /// Snapshot of the current controls.
    pub fn controls(&self) -> TraceControls {
        self.lock().controls.clone()
    }

    /// The last-applied preset, or "custom".
    pub fn active_preset(&self) -> PresetSelection {
        self.lock().state.active_preset()
    }

    /// The stored vector result, if any.
    pub fn vector_result(&self) -> Option<String> {
        self.lock().state.vector_result().map(str::to_string)
    }

    /// Engine availability, without triggering an acquisition.
    pub fn engine_availability(&self) -> EngineAvailability {
        self.loader.availability()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineSource, VectorEngine};
    use crate::ingest::ImageHandle;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    const TRACED_DOC: &str = r#"<svg width="8" height="6"><path fill="rgb(255,255,255)" d="M 0 0 L 8 0 L 8 6 L 0 6 Z"/><path fill="rgb(200,40,40)" d="M 2 2 L 4 2 L 4 4 Z"/></svg>"#;

    struct FixedEngine {
        svg: String,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl VectorEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn trace(
            &self,
            _image: &ImageHandle,
            _options: &TraceOptions,
        ) -> Result<String, EngineError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(self.svg.clone())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl VectorEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        async fn trace(
            &self,
            _image: &ImageHandle,
            _options: &TraceOptions,
        ) -> Result<String, EngineError> {
            Err(EngineError::Trace {
                message: "engine exploded".to_string(),
            })
        }
    }

    struct FixedSource {
        engine: Arc<dyn VectorEngine>,
    }

    #[async_trait]
    impl EngineSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn acquire(&self) -> Result<Arc<dyn VectorEngine>, EngineError> {
            Ok(self.engine.clone())
        }
    }

    struct DeadSource;

    #[async_trait]
    impl EngineSource for DeadSource {
        fn name(&self) -> &str {
            "dead"
        }

        async fn acquire(&self) -> Result<Arc<dyn VectorEngine>, EngineError> {
            Err(EngineError::Probe {
                source_name: "dead".to_string(),
                message: "unreachable".to_string(),
            })
        }
    }

    fn workspace_with_engine(engine: Arc<dyn VectorEngine>) -> Workspace {
        let loader = EngineLoader::with_sources(vec![Box::new(FixedSource { engine })]);
        Workspace::with_loader(&Config::default(), loader)
    }

    fn workspace_without_engine() -> Workspace {
        let loader = EngineLoader::with_sources(vec![Box::new(DeadSource), Box::new(DeadSource)]);
        Workspace::with_loader(&Config::default(), loader)
    }

    fn png_file() -> RawFile {
        let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        RawFile {
            name: "input.png".to_string(),
            bytes,
        }
    }

    async fn load_image(workspace: &Workspace) {
        let acquired = workspace.acquire_image(Some(png_file())).await.unwrap();
        assert!(acquired.is_some());
    }

    #[tokio::test]
    async fn test_trace_without_image_fails_fast() {
        let workspace = workspace_without_engine();
        let result = workspace.request_trace().await;
        assert!(matches!(result, Err(TraceError::NoImage)));
        assert_eq!(workspace.phase(), Phase::Empty);
        // The engine was never consulted.
        assert_eq!(workspace.engine_availability(), EngineAvailability::Unknown);
    }

    #[tokio::test]
    async fn test_engine_unavailable_leaves_state_unchanged() {
        let workspace = workspace_without_engine();
        load_image(&workspace).await;

        let result = workspace.request_trace().await;
        assert!(matches!(
            result,
            Err(TraceError::Engine(EngineError::Unavailable {
                sources_attempted: 2
            }))
        ));
        assert_eq!(workspace.phase(), Phase::Loaded);
        // The action stays enabled for a later retry.
        assert!(workspace.can_trace());
    }

    #[tokio::test]
    async fn test_successful_trace_stores_result() {
        let workspace = workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: None,
        }));
        load_image(&workspace).await;
        workspace.set_control(Control::TransparentBackground(false));

        let outcome = workspace.request_trace().await.unwrap();
        let TraceOutcome::Completed(report) = outcome else {
            panic!("expected a completed trace");
        };
        assert_eq!(report.svg, TRACED_DOC);
        assert!(!report.background_removed);
        // pathomit = 2 + smoothing; logo preset smoothing is 7.
        assert_eq!(report.nodes_optimized, 9);
        assert_eq!(workspace.phase(), Phase::Traced);
        assert!(workspace.can_export());
    }

    #[tokio::test]
    async fn test_transparency_strips_background() {
        let workspace = workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: None,
        }));
        load_image(&workspace).await;

        let outcome = workspace.request_trace().await.unwrap();
        let TraceOutcome::Completed(report) = outcome else {
            panic!("expected a completed trace");
        };
        assert!(report.background_removed);
        assert!(!report.svg.contains("rgb(255,255,255)"));
        assert!(report.svg.contains("rgb(200,40,40)"));
        assert_eq!(workspace.vector_result(), Some(report.svg));
    }

    #[tokio::test]
    async fn test_failed_trace_restores_previous_phase() {
        let workspace = workspace_with_engine(Arc::new(FailingEngine));
        load_image(&workspace).await;

        let result = workspace.request_trace().await;
        assert!(matches!(
            result,
            Err(TraceError::Engine(EngineError::Trace { .. }))
        ));
        assert_eq!(workspace.phase(), Phase::Loaded);
        assert!(workspace.vector_result().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_trace_rejected() {
        let gate = Arc::new(Notify::new());
        let workspace = Arc::new(workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: Some(gate.clone()),
        })));
        load_image(&workspace).await;

        let background = {
            let workspace = workspace.clone();
            tokio::spawn(async move { workspace.request_trace().await })
        };
        while workspace.phase() != Phase::Tracing {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let second = workspace.request_trace().await;
        assert!(matches!(second, Err(TraceError::TraceInFlight)));

        gate.notify_one();
        let first = background.await.unwrap().unwrap();
        assert!(matches!(first, TraceOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_new_image_mid_trace_discards_result() {
        let gate = Arc::new(Notify::new());
        let workspace = Arc::new(workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: Some(gate.clone()),
        })));
        load_image(&workspace).await;

        let background = {
            let workspace = workspace.clone();
            tokio::spawn(async move { workspace.request_trace().await })
        };
        while workspace.phase() != Phase::Tracing {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        // Replacing the image supersedes the outstanding trace.
        load_image(&workspace).await;
        gate.notify_one();

        let outcome = background.await.unwrap().unwrap();
        assert!(matches!(outcome, TraceOutcome::Stale));
        assert_eq!(workspace.phase(), Phase::Loaded);
        assert!(workspace.vector_result().is_none());
    }

    #[tokio::test]
    async fn test_acquire_over_traced_clears_result() {
        let workspace = workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: None,
        }));
        load_image(&workspace).await;
        workspace.request_trace().await.unwrap();
        assert_eq!(workspace.phase(), Phase::Traced);

        load_image(&workspace).await;
        assert_eq!(workspace.phase(), Phase::Loaded);
        assert!(workspace.vector_result().is_none());
        assert!(workspace.request_export().is_none());
    }

    #[tokio::test]
    async fn test_export_gated_on_traced_phase() {
        let workspace = workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: None,
        }));
        assert!(workspace.request_export().is_none());
        load_image(&workspace).await;
        assert!(workspace.request_export().is_none());

        workspace.request_trace().await.unwrap();
        let artifact = workspace.request_export().unwrap();
        assert_eq!(artifact.file_name, "vectorcraft-output.svg");
        assert_eq!(artifact.media_type, "image/svg+xml");
    }

    #[tokio::test]
    async fn test_preset_and_control_edits() {
        let workspace = workspace_without_engine();
        workspace.select_preset("detail");
        assert_eq!(
            workspace.active_preset(),
            PresetSelection::Named(Preset::Detail)
        );
        let controls = workspace.controls();
        assert_eq!(
            (
                controls.detail_level,
                controls.smoothing_level,
                controls.color_count
            ),
            (9, 2, 12)
        );

        workspace.set_control(Control::DetailLevel(40));
        assert_eq!(workspace.controls().detail_level, 10);
        assert_eq!(workspace.active_preset(), PresetSelection::Custom);

        // Color mode edits do not invalidate a named preset.
        workspace.select_preset("logo");
        workspace.set_control(Control::Monochrome(true));
        assert_eq!(
            workspace.active_preset(),
            PresetSelection::Named(Preset::Logo)
        );

        // Unknown presets are a no-op.
        workspace.select_preset("sketch");
        assert_eq!(
            workspace.active_preset(),
            PresetSelection::Named(Preset::Logo)
        );
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let workspace = workspace_with_engine(Arc::new(FixedEngine {
            svg: TRACED_DOC.to_string(),
            gate: None,
        }));
        load_image(&workspace).await;
        workspace.request_trace().await.unwrap();
        workspace.set_control(Control::Monochrome(true));

        workspace.reset();
        assert_eq!(workspace.phase(), Phase::Empty);
        assert!(workspace.vector_result().is_none());
        assert!(!workspace.can_trace());
        assert_eq!(workspace.controls(), TraceControls::default());
        assert_eq!(
            workspace.active_preset(),
            PresetSelection::Named(Preset::Logo)
        );
    }
}
