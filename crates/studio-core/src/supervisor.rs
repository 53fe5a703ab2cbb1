//! Stale-result discard, keyed by batch identity.
//!
//! Batches cannot be cancelled mid-flight. When the user starts a new batch on
//! the same lane, the old one keeps running; its results are simply dropped
//! once they arrive because its ticket is no longer current.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Independent generation lanes; a new batch only supersedes its own lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Carousel,
    Videos,
    SinglePost,
}

/// Identity of one batch on one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTicket {
    pub lane: Lane,
    pub batch_id: Uuid,
}

/// Remembers the latest batch per lane.
#[derive(Debug, Clone, Default)]
pub struct BatchSupervisor {
    latest: Arc<DashMap<Lane, Uuid>>,
}

impl BatchSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new batch on `lane`, superseding whatever ran there before.
    pub fn begin(&self, lane: Lane) -> BatchTicket {
        let batch_id = Uuid::new_v4();
        if let Some(previous) = self.latest.insert(lane, batch_id) {
            tracing::debug!(?lane, %previous, current = %batch_id, "batch superseded");
        }
        BatchTicket { lane, batch_id }
    }

    /// Whether results for `ticket` should still be shown.
    pub fn is_current(&self, ticket: &BatchTicket) -> bool {
        self.latest
            .get(&ticket.lane)
            .map(|id| *id == ticket.batch_id)
            .unwrap_or(false)
    }

    /// Keep `result` only if its batch is still current.
    pub fn accept<T>(&self, ticket: &BatchTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            tracing::info!(lane = ?ticket.lane, batch = %ticket.batch_id, "Discarding stale batch result");
            None
        }
    }
}
