//! Projection processor for feeding events to projections.

use event_store::{EventEnvelope, EventQuery, EventStore};
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::Projection;

/// Delivers events from an event store to registered projections in log
/// order.
///
/// Each projection's [`position`](Projection::position) counts the log
/// events it has seen, so catch-up only has to read the log past the
/// slowest projection. Catch-up and rebuild are serialized so the same
/// event is never delivered twice.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    delivery: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            delivery: Mutex::new(()),
        }
    }

    pub fn register(&mut self, projection: Box<dyn Projection>) {
        tracing::debug!(projection = projection.name(), "projection registered");
        self.projections.push(projection);
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Reads the log past the least advanced projection and delivers each
    /// event to every projection that has not seen it yet.
    ///
    /// Returns the number of deliveries made.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<u64> {
        let _guard = self.delivery.lock().await;

        if self.projections.is_empty() {
            return Ok(0);
        }

        let mut start = u64::MAX;
        for projection in &self.projections {
            start = start.min(projection.position().await.events_processed);
        }

        let events = self
            .store
            .query_events(EventQuery::new().offset(start as usize))
            .await?;

        let mut delivered = 0;
        for (i, event) in events.iter().enumerate() {
            delivered += self.deliver(start + i as u64 + 1, event).await?;
        }

        if delivered > 0 {
            tracing::info!(
                from = start,
                events_read = events.len(),
                delivered,
                "catch-up complete"
            );
        }

        Ok(delivered)
    }

    /// Resets all projections and replays the whole log.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<u64> {
        let _guard = self.delivery.lock().await;

        for projection in &self.projections {
            projection.reset().await?;
        }

        let mut stream = self.store.stream_all_events().await?;
        let mut index: u64 = 0;
        let mut delivered = 0;

        while let Some(result) = stream.next().await {
            let event = result?;
            index += 1;
            delivered += self.deliver(index, &event).await?;
        }

        tracing::info!(events_processed = index, "rebuild complete");

        Ok(delivered)
    }

    /// Hands the event at 1-based log `index` to projections still behind it.
    async fn deliver(&self, index: u64, event: &EventEnvelope) -> Result<u64> {
        let mut delivered = 0;
        for projection in &self.projections {
            if !projection.position().await.has_seen(index) {
                projection.handle(event).await?;
                metrics::counter!("projections_events_processed", "projection" => projection.name())
                    .increment(1);
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}
