//! Pipeline phases and the progress-callback trait.
//!
//! The orchestrator's progress is modelled as an explicit finite state
//! machine rather than an opaque percentage: each [`GuidePhase`] names what
//! the pipeline is doing right now, and [`GuidePhase::percent`] derives the
//! advisory number a UI can show. The percentage is monotonically
//! non-decreasing across the phase order — a guarantee a progress bar can
//! rely on without clamping.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a Tokio broadcast channel, a WebSocket, or a
//! terminal progress bar without the library knowing anything about how the
//! host application communicates. The trait is `Send + Sync` with no-op
//! defaults so callers only override what they care about.

use std::fmt;
use std::sync::Arc;

/// The pipeline state machine.
///
/// Transitions occur strictly forward: `Idle → Resolving →
/// FetchingTranscript → Synthesizing → Enriching → Ready`, with `Failed`
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidePhase {
    Idle,
    Resolving,
    FetchingTranscript,
    Synthesizing,
    Enriching,
    Ready,
    Failed,
}

impl GuidePhase {
    /// Advisory progress percentage in `[0, 100]`.
    ///
    /// Both terminal states report 100 so the sequence of values a callback
    /// observes never decreases, whatever the outcome.
    pub fn percent(self) -> u8 {
        match self {
            GuidePhase::Idle => 0,
            GuidePhase::Resolving => 5,
            GuidePhase::FetchingTranscript => 25,
            GuidePhase::Synthesizing => 55,
            GuidePhase::Enriching => 90,
            GuidePhase::Ready | GuidePhase::Failed => 100,
        }
    }

    /// Short human-readable label for UI display.
    pub fn label(self) -> &'static str {
        match self {
            GuidePhase::Idle => "Idle",
            GuidePhase::Resolving => "Analyzing video link",
            GuidePhase::FetchingTranscript => "Fetching transcript",
            GuidePhase::Synthesizing => "Generating guide",
            GuidePhase::Enriching => "Adding media",
            GuidePhase::Ready => "Complete",
            GuidePhase::Failed => "Failed",
        }
    }

    /// Whether the pipeline has finished (successfully or not).
    pub fn is_terminal(self) -> bool {
        matches!(self, GuidePhase::Ready | GuidePhase::Failed)
    }
}

impl fmt::Display for GuidePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the pipeline as it moves through its phases.
///
/// Implementations must be `Send + Sync`; the pipeline may fire callbacks
/// from whichever task drives the current stage. All methods have default
/// no-op implementations.
pub trait GuideProgressCallback: Send + Sync {
    /// Called at every phase transition, including the terminal ones.
    fn on_phase(&self, phase: GuidePhase) {
        let _ = phase;
    }

    /// Called once after a successful run.
    fn on_complete(&self, step_count: usize) {
        let _ = step_count;
    }

    /// Called once when the run fails, with the single user-facing message
    /// for the failure kind.
    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GuideProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GuideConfig`].
pub type ProgressCallback = Arc<dyn GuideProgressCallback>;
