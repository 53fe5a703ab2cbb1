//! Batch Generation Orchestrator
//!
//! Fans an ordered list of prompt slots out to independent generation calls,
//! waits for every call to settle, and maps the dense list of settled results
//! back onto the sparse slot index space.
//!
//! ```text
//!  slots:    ["a",  "",   "b",  "c"]
//!  active:   ["a",        "b",  "c"]      → join_all(generate(..))
//!  settled:  [Ok(X),      Err,  Ok(Z)]
//!  output:   [X,    None, None, Z]
//! ```
//!
//! Per-item failures never cross the fan-out boundary: each call is wrapped
//! into a [`SlotOutcome`] before the join, so one bad prompt cannot cancel or
//! corrupt its siblings.

use std::future::Future;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StudioError, StudioResult};

/// Lifecycle of a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Dispatching,
    AwaitingAll,
    Reconciling,
    /// Terminal: possibly with partial `None`s.
    Settled,
    /// Terminal: every active item failed.
    BatchFailed,
}

impl BatchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchPhase::Settled | BatchPhase::BatchFailed)
    }

    fn can_advance_to(self, next: BatchPhase) -> bool {
        use BatchPhase::*;
        matches!(
            (self, next),
            (Idle, Dispatching)
                | (Dispatching, AwaitingAll)
                | (AwaitingAll, Reconciling)
                | (Reconciling, Settled)
                | (Reconciling, BatchFailed)
        )
    }
}

/// Settled result of one active slot.
#[derive(Debug)]
pub enum SlotOutcome<T> {
    Produced(T),
    Failed(StudioError),
}

impl<T> SlotOutcome<T> {
    async fn settle<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = StudioResult<T>>,
    {
        match fut.await {
            Ok(v) => SlotOutcome::Produced(v),
            Err(e) => SlotOutcome::Failed(e),
        }
    }
}

/// Why slot `index` ended up `None` despite being active.
#[derive(Debug, Clone, Serialize)]
pub struct SlotFailure {
    pub index: usize,
    pub message: String,
}

/// Outcome of a settled batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<T> {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phase: BatchPhase,
    /// Same length as the input slots.
    pub outputs: Vec<Option<T>>,
    pub failures: Vec<SlotFailure>,
}

impl<T> BatchReport<T> {
    pub fn produced(&self) -> usize {
        self.outputs.iter().filter(|o| o.is_some()).count()
    }

    pub fn into_outputs(self) -> Vec<Option<T>> {
        self.outputs
    }
}

/// Tracks the phase of one batch and logs every transition.
struct PhaseTracker {
    batch_id: Uuid,
    phase: BatchPhase,
}

impl PhaseTracker {
    fn new(batch_id: Uuid) -> Self {
        Self {
            batch_id,
            phase: BatchPhase::Idle,
        }
    }

    fn advance(&mut self, next: BatchPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal batch transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!(batch = %self.batch_id, from = ?self.phase, to = ?next, "batch phase");
        self.phase = next;
    }
}

/// Blank (empty or whitespace-only) slots are inactive and never generate a request.
pub fn is_blank(slot: &str) -> bool {
    slot.trim().is_empty()
}

/// Reconcile a batch: one concurrent `generate` call per active slot, results
/// re-aligned onto the original indices.
///
/// Returns `StudioError::BatchFailed` when at least one slot was active and
/// every one of them failed. An all-blank input is not a fault: it yields an
/// all-`None` sequence and `generate` is never called.
pub async fn reconcile<S, T, F, Fut>(slots: &[S], generate: F) -> StudioResult<Vec<Option<T>>>
where
    S: AsRef<str>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = StudioResult<T>>,
{
    reconcile_with_report(Uuid::new_v4(), slots, generate)
        .await
        .map(BatchReport::into_outputs)
}

/// Like [`reconcile`], but keeps batch metadata and per-slot failure reasons.
pub async fn reconcile_with_report<S, T, F, Fut>(
    batch_id: Uuid,
    slots: &[S],
    generate: F,
) -> StudioResult<BatchReport<T>>
where
    S: AsRef<str>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = StudioResult<T>>,
{
    let started_at = Utc::now();
    let mut tracker = PhaseTracker::new(batch_id);

    tracker.advance(BatchPhase::Dispatching);
    let pending: Vec<_> = slots
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !is_blank(s))
        .map(|prompt| SlotOutcome::settle(generate(prompt.to_string())))
        .collect();
    let attempted = pending.len();
    info!(
        batch = %batch_id,
        slots = slots.len(),
        active = attempted,
        "🚀 Dispatching generation batch"
    );

    tracker.advance(BatchPhase::AwaitingAll);
    let settled = join_all(pending).await;

    tracker.advance(BatchPhase::Reconciling);
    let mut cursor = settled.into_iter();
    let mut outputs = Vec::with_capacity(slots.len());
    let mut failures = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        if is_blank(slot.as_ref()) {
            outputs.push(None);
            continue;
        }
        match cursor.next() {
            Some(SlotOutcome::Produced(artifact)) => outputs.push(Some(artifact)),
            Some(SlotOutcome::Failed(err)) => {
                warn!(batch = %batch_id, slot = index, error = %err, "Slot failed to generate");
                failures.push(SlotFailure {
                    index,
                    message: err.to_string(),
                });
                outputs.push(None);
            }
            // join_all yields exactly one outcome per active slot.
            None => outputs.push(None),
        }
    }

    if attempted > 0 && failures.len() == attempted {
        tracker.advance(BatchPhase::BatchFailed);
        warn!(batch = %batch_id, attempted, "❌ Batch produced no artifacts");
        return Err(StudioError::BatchFailed { attempted });
    }

    tracker.advance(BatchPhase::Settled);
    let report = BatchReport {
        batch_id,
        started_at,
        finished_at: Utc::now(),
        phase: tracker.phase,
        outputs,
        failures,
    };
    info!(
        batch = %batch_id,
        produced = report.produced(),
        failed = report.failures.len(),
        "✅ Batch settled"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn phase_transitions() {
        assert!(BatchPhase::Idle.can_advance_to(BatchPhase::Dispatching));
        assert!(BatchPhase::Reconciling.can_advance_to(BatchPhase::BatchFailed));
        assert!(!BatchPhase::Idle.can_advance_to(BatchPhase::Settled));
        assert!(!BatchPhase::Settled.can_advance_to(BatchPhase::Dispatching));
        assert!(BatchPhase::Settled.is_terminal());
        assert!(!BatchPhase::AwaitingAll.is_terminal());
    }

    #[tokio::test]
    async fn report_records_failure_indices() {
        let slots = ["ok", "", "bad", "ok too"];
        let report = reconcile_with_report(Uuid::new_v4(), &slots, |p| async move {
            if p == "bad" {
                Err(StudioError::NoArtifact)
            } else {
                Ok(p.len())
            }
        })
        .await
        .unwrap();

        assert_eq!(report.phase, BatchPhase::Settled);
        assert_eq!(report.outputs, vec![Some(2), None, None, Some(6)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.produced(), 2);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn prompt_passed_untrimmed() {
        let seen = AtomicUsize::new(0);
        let out = reconcile(&["  padded  "], |p| {
            seen.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, StudioError>(p) }
        })
        .await
        .unwrap();
        assert_eq!(out, vec![Some("  padded  ".to_string())]);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let slots: [&str; 0] = [];
        let out = reconcile(&slots, |p| async move { Ok::<_, StudioError>(p) })
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
