//! Core aggregate and domain event traits.

use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// A fact recorded in the event log.
///
/// Events are immutable and named in the past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Wire name of the event, stored as the envelope's `event_type`.
    fn event_type(&self) -> &'static str;
}

/// An event-sourced aggregate.
///
/// Aggregates are rebuilt by replaying their events through [`apply`],
/// which must be pure and infallible: events are facts that already
/// happened.
///
/// [`apply`]: Aggregate::apply
pub trait Aggregate: Default + Send + Sync + Sized {
    type Event: DomainEvent;

    /// Rejection raised when a command cannot be turned into events.
    type Error: std::error::Error + Send + Sync;

    /// Whether loading replays the event history through [`apply`].
    ///
    /// Aggregates whose `apply` keeps no state set this to `false`; they
    /// are loaded from the stored version alone and never decode history.
    ///
    /// [`apply`]: Aggregate::apply
    const REPLAYS_EVENTS: bool = true;

    /// Name stored as the envelope's `aggregate_type`.
    fn aggregate_type() -> &'static str;

    /// Version of the last applied event, `0` for a fresh aggregate.
    fn version(&self) -> Version;

    fn set_version(&mut self, version: Version);

    fn apply(&mut self, event: Self::Event);

    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum CounterEvent {
        Incremented,
        Reset,
    }

    impl DomainEvent for CounterEvent {
        fn event_type(&self) -> &'static str {
            match self {
                CounterEvent::Incremented => "INCREMENTED",
                CounterEvent::Reset => "RESET",
            }
        }
    }

    #[derive(Debug, Default)]
    struct Counter {
        value: u32,
        version: Version,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("counter error")]
    struct CounterError;

    impl Aggregate for Counter {
        type Event = CounterEvent;
        type Error = CounterError;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                CounterEvent::Incremented => self.value += 1,
                CounterEvent::Reset => self.value = 0,
            }
        }
    }

    #[test]
    fn apply_events_folds_in_order() {
        let mut counter = Counter::default();
        counter.apply_events(vec![
            CounterEvent::Incremented,
            CounterEvent::Incremented,
            CounterEvent::Reset,
            CounterEvent::Incremented,
        ]);
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn event_type_names() {
        assert_eq!(CounterEvent::Incremented.event_type(), "INCREMENTED");
        assert_eq!(CounterEvent::Reset.event_type(), "RESET");
    }
}
