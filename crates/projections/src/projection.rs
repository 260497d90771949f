//! Projection trait and log position tracking.

use async_trait::async_trait;
use event_store::EventEnvelope;

use crate::Result;

/// Number of log events a projection has consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectionPosition {
    pub events_processed: u64,
}

impl ProjectionPosition {
    pub fn zero() -> Self {
        Self::at(0)
    }

    pub fn at(events_processed: u64) -> Self {
        Self { events_processed }
    }

    pub fn advance(&self) -> Self {
        Self::at(self.events_processed + 1)
    }

    /// Whether the event at 1-based log `index` has already been consumed.
    pub fn has_seen(&self, index: u64) -> bool {
        index <= self.events_processed
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.events_processed)
    }
}

/// Consumes the event log, in order, into a read model.
///
/// `handle` is called once per log event, including events the projection
/// does not care about; it must advance the position either way.
#[async_trait]
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    async fn position(&self) -> ProjectionPosition;

    /// Drops all projected state and rewinds to position zero.
    async fn reset(&self) -> Result<()>;
}
