//! Progress & Error Model (spec §3, §4.5): the typed events a
//! `loadGraphData` call reports through, plus elapsed/ETA bookkeeping.

use std::time::Instant;

use crate::error::{AppError, ErrorKind};

/// Which stage of a `loadGraphData` call a [`LoadProgress`] event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validation,
    Vertices,
    Edges,
    Cleanup,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validation => "validation",
            Phase::Vertices => "vertices",
            Phase::Edges => "edges",
            Phase::Cleanup => "cleanup",
        }
    }
}

/// The error context embedded in a [`LoadProgress`] event when a batch hits
/// a fatal or recoverable condition mid-phase.
#[derive(Debug, Clone)]
pub struct ProgressError {
    pub message: String,
    pub kind: ErrorKind,
    pub recoverable: bool,
}

/// One progress event, emitted at least once per `(phase, type)` pair whose
/// `total > 0`; the last event for that pair has `processed == total` and
/// `percentage == 100`.
#[derive(Debug, Clone)]
pub struct LoadProgress {
    pub phase: Phase,
    pub type_name: String,
    pub processed: u64,
    pub total: u64,
    pub percentage: u8,
    pub elapsed_ms: u64,
    pub estimated_remaining_ms: Option<u64>,
    pub error: Option<ProgressError>,
}

/// Tracks elapsed time and per-`(phase, type)` samples for one
/// `loadGraphData` call, so the Orchestrator can emit well-formed
/// [`LoadProgress`] events without re-deriving elapsed/ETA math at every
/// call site.
pub struct ProgressTracker {
    started: Instant,
}

impl ProgressTracker {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Builds the event for one batch within a `(phase, type)` pair.
    /// `processed`/`total` are counts of *elements*, not batches, so the
    /// final event of a type always lands on exactly `processed == total`.
    /// `has_prior_sample` should be false only for the very first batch of
    /// this `(phase, type)` pair - the spec requires at least one prior
    /// sample before an ETA is offered.
    pub fn event(
        &self,
        phase: Phase,
        type_name: impl Into<String>,
        processed: u64,
        total: u64,
        has_prior_sample: bool,
    ) -> LoadProgress {
        let elapsed_ms = self.elapsed_ms();
        let percentage = if total == 0 {
            100
        } else {
            ((processed as f64 / total as f64) * 100.0).round() as u8
        };

        let estimated_remaining_ms = if has_prior_sample && processed > 0 && processed < total && elapsed_ms > 0 {
            let rate = elapsed_ms as f64 / processed as f64;
            Some((rate * (total - processed) as f64).round() as u64)
        } else {
            None
        };

        LoadProgress {
            phase,
            type_name: type_name.into(),
            processed,
            total,
            percentage,
            elapsed_ms,
            estimated_remaining_ms,
            error: None,
        }
    }

    pub fn error_event(
        &self,
        phase: Phase,
        type_name: impl Into<String>,
        processed: u64,
        total: u64,
        error: ProgressError,
    ) -> LoadProgress {
        let mut event = self.event(phase, type_name, processed, total, false);
        event.error = Some(error);
        event
    }
}

/// Callback signature for [`crate::loader::LoadOptions::on_progress`].
pub type ProgressCallback = std::sync::Arc<dyn Fn(LoadProgress) + Send + Sync>;

/// The outcome of one `loadGraphData` call (spec §3).
///
/// `success=false` iff the transaction did not commit, in which case
/// `vertex_count`/`edge_count` are zero. On a permissive (`continueOnError`)
/// run that still commits, the counts reflect what the engine actually
/// created, not the size of the input payload.
#[derive(Debug)]
pub struct LoadResult {
    pub success: bool,
    pub vertex_count: u64,
    pub edge_count: u64,
    pub duration_ms: u64,
    pub warnings: Vec<String>,
    pub errors: Vec<AppError>,
}

impl LoadResult {
    pub fn success(vertex_count: u64, edge_count: u64, duration_ms: u64, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            vertex_count,
            edge_count,
            duration_ms,
            warnings,
            errors: Vec::new(),
        }
    }

    pub fn failure(duration_ms: u64, warnings: Vec<String>, errors: Vec<AppError>) -> Self {
        Self {
            success: false,
            vertex_count: 0,
            edge_count: 0,
            duration_ms,
            warnings,
            errors,
        }
    }
}
