use crate::{AggregateId, Version};

/// Filter over the event log.
///
/// Unset fields match everything. Results come back in log order and
/// `offset`/`limit` are applied after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub aggregate_id: Option<AggregateId>,

    pub aggregate_type: Option<String>,

    /// Matches any of these event types.
    pub event_types: Option<Vec<String>>,

    /// Inclusive lower version bound.
    pub from_version: Option<Version>,

    /// Inclusive upper version bound.
    pub to_version: Option<Version>,

    pub limit: Option<usize>,

    pub offset: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events of one todo list.
    pub fn for_aggregate(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id: Some(aggregate_id),
            ..Default::default()
        }
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types = Some(vec![event_type.into()]);
        self
    }

    pub fn event_types(mut self, event_types: Vec<String>) -> Self {
        self.event_types = Some(event_types);
        self
    }

    pub fn from_version(mut self, version: Version) -> Self {
        self.from_version = Some(version);
        self
    }

    pub fn to_version(mut self, version: Version) -> Self {
        self.to_version = Some(version);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if `event` passes every filter of this query.
    ///
    /// Paging is not part of matching.
    pub fn matches(&self, event: &crate::EventEnvelope) -> bool {
        if self.aggregate_id.is_some_and(|id| id != event.aggregate_id) {
            return false;
        }
        if self
            .aggregate_type
            .as_ref()
            .is_some_and(|t| *t != event.aggregate_type)
        {
            return false;
        }
        if self
            .event_types
            .as_ref()
            .is_some_and(|types| !types.contains(&event.event_type))
        {
            return false;
        }
        if self.from_version.is_some_and(|v| event.version < v) {
            return false;
        }
        if self.to_version.is_some_and(|v| event.version > v) {
            return false;
        }
        true
    }
}
