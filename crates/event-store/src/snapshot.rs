use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AggregateId, Version};

/// Serialized state of a view model for one aggregate.
///
/// The state is kept as the exact text the view model produced, so the
/// store never needs to understand it. `version` is the last aggregate
/// version folded into that state; loading resumes from `version + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name of the view model that produced the state (e.g. `Todos`).
    pub view_model: String,

    pub aggregate_id: AggregateId,

    pub version: Version,

    pub timestamp: DateTime<Utc>,

    pub state: String,
}

impl Snapshot {
    pub fn new(
        view_model: impl Into<String>,
        aggregate_id: AggregateId,
        version: Version,
        state: impl Into<String>,
    ) -> Self {
        Self {
            view_model: view_model.into(),
            aggregate_id,
            version,
            timestamp: Utc::now(),
            state: state.into(),
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_keeps_state_text_verbatim() {
        let id = AggregateId::new();
        let text = r#"{"1":{"text":"Buy milk","checked":false}}"#;

        let snapshot = Snapshot::new("Todos", id, Version::new(3), text);

        assert_eq!(snapshot.view_model, "Todos");
        assert_eq!(snapshot.aggregate_id, id);
        assert_eq!(snapshot.version, Version::new(3));
        assert_eq!(snapshot.state(), text);
    }
}
