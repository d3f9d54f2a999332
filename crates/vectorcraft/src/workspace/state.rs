//! The workspace lifecycle state machine.
//!
//! `WorkspaceState` is the sole mutable entity of the core. All transitions
//! go through its methods so the invariants hold by construction:
//! a vector result implies an acquired image, acquiring an image discards
//! any prior result, and `Tracing` is only ever left through an explicit
//! success or failure.

use crate::error::TraceError;
use crate::ingest::ImageHandle;
use crate::params::{Preset, PresetSelection};

/// The workspace's discrete lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No image acquired
    Empty,
    /// Image acquired, no trace result yet
    Loaded,
    /// A trace call is outstanding
    Tracing,
    /// A trace result is available
    Traced,
}

/// Token handed out when a trace starts.
///
/// Carries the generation the trace was started against, so results arriving
/// after the image changed (or the workspace was reset) are detected as
/// stale, and the phase to restore on failure.
#[derive(Debug, Clone, Copy)]
pub struct TraceTicket {
    generation: u64,
    prev_phase: Phase,
}

/// The mutable workspace state; owned by a single controller.
#[derive(Debug)]
pub struct WorkspaceState {
    phase: Phase,
    image: Option<ImageHandle>,
    vector_result: Option<String>,
    active_preset: PresetSelection,
    generation: u64,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Empty,
            image: None,
            vector_result: None,
            active_preset: PresetSelection::Named(Preset::Logo),
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn vector_result(&self) -> Option<&str> {
        self.vector_result.as_deref()
    }

    pub fn active_preset(&self) -> PresetSelection {
        self.active_preset
    }

    pub fn set_active_preset(&mut self, selection: PresetSelection) {
        self.active_preset = selection;
    }

    /// Monotonic marker bumped whenever the acquired image changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The trace action is enabled whenever an image is present, including
    /// while a trace is outstanding (re-entrant requests are rejected at
    /// `begin_trace`, not by disabling the action).
    pub fn can_trace(&self) -> bool {
        self.image.is_some()
    }

    /// The export action is enabled only with a stored trace result.
    pub fn can_export(&self) -> bool {
        self.phase == Phase::Traced
    }

    /// Install a newly acquired image.
    ///
    /// Unconditional from any phase: discards any prior vector result and
    /// supersedes an outstanding trace (its eventual result will be stale).
    pub fn apply_image(&mut self, image: ImageHandle) {
        self.image = Some(image);
        self.vector_result = None;
        self.phase = Phase::Loaded;
        self.generation += 1;
    }

    /// Enter `Tracing`, recording where to return to on failure.
    pub fn begin_trace(&mut self) -> Result<TraceTicket, TraceError> {
        if self.image.is_none() {
            return Err(TraceError::NoImage);
        }
        if self.phase == Phase::Tracing {
            return Err(TraceError::TraceInFlight);
        }
        let ticket = TraceTicket {
            generation: self.generation,
            prev_phase: self.phase,
        };
        self.phase = Phase::Tracing;
        Ok(ticket)
    }

    /// Store a finished trace result and enter `Traced`.
    ///
    /// Returns `false` (leaving state untouched) when the ticket is stale:
    /// the image was replaced or the workspace reset after the trace began.
    pub fn complete_trace(&mut self, ticket: TraceTicket, svg: String) -> bool {
        if !self.ticket_is_current(&ticket) {
            return false;
        }
        self.vector_result = Some(svg);
        self.phase = Phase::Traced;
        true
    }

    /// Leave `Tracing` after a failed attempt, restoring the prior phase.
    ///
    /// The stored result is unchanged. Stale tickets are ignored.
    pub fn fail_trace(&mut self, ticket: TraceTicket) -> bool {
        if !self.ticket_is_current(&ticket) {
            return false;
        }
        self.phase = ticket.prev_phase;
        true
    }

    /// Return to the pristine state, from any phase.
    pub fn reset(&mut self) {
        self.phase = Phase::Empty;
        self.image = None;
        self.vector_result = None;
        self.active_preset = PresetSelection::Named(Preset::Logo);
        self.generation += 1;
    }

    fn ticket_is_current(&self, ticket: &TraceTicket) -> bool {
        ticket.generation == self.generation && self.phase == Phase::Tracing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state() -> WorkspaceState {
        let mut state = WorkspaceState::new();
        state.apply_image(ImageHandle::for_tests());
        state
    }

    fn traced_state() -> WorkspaceState {
        let mut state = loaded_state();
        let ticket = state.begin_trace().unwrap();
        assert!(state.complete_trace(ticket, "<svg/>".to_string()));
        state
    }

    #[test]
    fn test_initial_state() {
        let state = WorkspaceState::new();
        assert_eq!(state.phase(), Phase::Empty);
        assert!(state.image().is_none());
        assert!(state.vector_result().is_none());
        assert_eq!(state.active_preset(), PresetSelection::Named(Preset::Logo));
        assert!(!state.can_trace());
        assert!(!state.can_export());
    }

    #[test]
    fn test_image_acquisition_enables_trace() {
        let state = loaded_state();
        assert_eq!(state.phase(), Phase::Loaded);
        assert!(state.can_trace());
        assert!(!state.can_export());
    }

    #[test]
    fn test_successful_trace_round_trip() {
        let state = traced_state();
        assert_eq!(state.phase(), Phase::Traced);
        assert_eq!(state.vector_result(), Some("<svg/>"));
        assert!(state.can_export());
    }

    #[test]
    fn test_trace_without_image_rejected() {
        let mut state = WorkspaceState::new();
        assert!(matches!(state.begin_trace(), Err(TraceError::NoImage)));
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn test_reentrant_trace_rejected() {
        let mut state = loaded_state();
        let _ticket = state.begin_trace().unwrap();
        assert!(matches!(
            state.begin_trace(),
            Err(TraceError::TraceInFlight)
        ));
        assert_eq!(state.phase(), Phase::Tracing);
    }

    #[test]
    fn test_failure_restores_loaded_phase() {
        let mut state = loaded_state();
        let ticket = state.begin_trace().unwrap();
        assert!(state.fail_trace(ticket));
        assert_eq!(state.phase(), Phase::Loaded);
        assert!(state.vector_result().is_none());
    }

    #[test]
    fn test_failure_restores_traced_phase_and_result() {
        let mut state = traced_state();
        let ticket = state.begin_trace().unwrap();
        assert!(state.fail_trace(ticket));
        assert_eq!(state.phase(), Phase::Traced);
        // The previous result survives a failed re-trace.
        assert_eq!(state.vector_result(), Some("<svg/>"));
    }

    #[test]
    fn test_new_image_clears_prior_result() {
        let mut state = traced_state();
        state.apply_image(ImageHandle::for_tests());
        assert_eq!(state.phase(), Phase::Loaded);
        assert!(state.vector_result().is_none());
        assert!(state.image().is_some());
    }

    #[test]
    fn test_stale_completion_discarded_after_new_image() {
        let mut state = loaded_state();
        let ticket = state.begin_trace().unwrap();
        state.apply_image(ImageHandle::for_tests());
        assert!(!state.complete_trace(ticket, "<svg>stale</svg>".to_string()));
        assert_eq!(state.phase(), Phase::Loaded);
        assert!(state.vector_result().is_none());
    }

    #[test]
    fn test_stale_completion_discarded_after_reset() {
        let mut state = loaded_state();
        let ticket = state.begin_trace().unwrap();
        state.reset();
        assert!(!state.complete_trace(ticket, "<svg/>".to_string()));
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn test_stale_failure_ignored() {
        let mut state = loaded_state();
        let ticket = state.begin_trace().unwrap();
        state.apply_image(ImageHandle::for_tests());
        assert!(!state.fail_trace(ticket));
        // The new image's phase wins, not the old ticket's prev phase.
        assert_eq!(state.phase(), Phase::Loaded);
    }

    #[test]
    fn test_reset_from_every_phase() {
        for mut state in [
            WorkspaceState::new(),
            loaded_state(),
            traced_state(),
            {
                let mut tracing = loaded_state();
                tracing.begin_trace().unwrap();
                tracing
            },
        ] {
            state.reset();
            assert_eq!(state.phase(), Phase::Empty);
            assert!(state.image().is_none());
            assert!(state.vector_result().is_none());
        }
    }

    #[test]
    fn test_generation_bumps_on_acquire_and_reset() {
        let mut state = WorkspaceState::new();
        let initial = state.generation();
        state.apply_image(ImageHandle::for_tests());
        assert_eq!(state.generation(), initial + 1);
        state.reset();
        assert_eq!(state.generation(), initial + 2);
    }
}
