//! View models: pure folds of one aggregate's events into serializable state.

use event_store::EventEnvelope;
use serde::de::DeserializeOwned;

use crate::Result;

/// A read model computed per aggregate by folding its events.
///
/// `project` must be pure: the same state and event always produce the
/// same next state. State crosses process boundaries only through
/// [`serialize_state`](ViewModel::serialize_state) and
/// [`deserialize_state`](ViewModel::deserialize_state), which must
/// round-trip every reachable state.
pub trait ViewModel: Send + Sync {
    type State: Clone + Send + Sync;
    type Event: DeserializeOwned;

    /// Name used to key snapshots.
    fn name(&self) -> &'static str;

    /// Event types this view model reacts to. Other events are skipped.
    fn event_types(&self) -> &'static [&'static str];

    /// State before any event.
    fn init(&self) -> Self::State;

    fn project(&self, state: Self::State, event: &Self::Event) -> Self::State;

    fn serialize_state(&self, state: &Self::State) -> Result<String>;

    fn deserialize_state(&self, text: &str) -> Result<Self::State>;

    fn handles(&self, event_type: &str) -> bool {
        self.event_types().contains(&event_type)
    }

    /// Decodes `envelope` and projects it, or returns `state` untouched
    /// when the event type is not handled.
    fn apply_envelope(&self, state: Self::State, envelope: &EventEnvelope) -> Result<Self::State> {
        if !self.handles(&envelope.event_type) {
            return Ok(state);
        }
        let event: Self::Event = envelope.decode()?;
        Ok(self.project(state, &event))
    }

    /// Folds `envelopes` over [`init`](ViewModel::init).
    fn replay<'a>(&self, envelopes: impl IntoIterator<Item = &'a EventEnvelope>) -> Result<Self::State> {
        envelopes
            .into_iter()
            .try_fold(self.init(), |state, envelope| self.apply_envelope(state, envelope))
    }
}
