//! Todo aggregate implementation.

use event_store::Version;

use crate::aggregate::Aggregate;

use super::{TodoCommand, TodoError, TodoEvent};

/// A todo list.
///
/// The list keeps no business state: every well-formed command is accepted
/// and maps one-to-one onto an event carrying the same payload. Only the
/// stream version is tracked, for optimistic concurrency on append.
#[derive(Debug, Clone, Default)]
pub struct Todo {
    version: Version,
}

impl Todo {
    /// Turns a command into the event it records.
    ///
    /// Never rejects: the payload is not validated and state is not
    /// consulted, so checking twice or removing an unknown item still
    /// produces an event.
    pub fn handle(&self, command: &TodoCommand) -> Result<TodoEvent, TodoError> {
        let event = match command {
            TodoCommand::CreateItem(c) => TodoEvent::item_created(c.id.clone(), c.text.clone()),
            TodoCommand::CheckItem(c) => TodoEvent::item_checked(c.id.clone()),
            TodoCommand::UncheckItem(c) => TodoEvent::item_unchecked(c.id.clone()),
            TodoCommand::RemoveItem(c) => TodoEvent::item_removed(c.id.clone()),
        };
        Ok(event)
    }
}

impl Aggregate for Todo {
    type Event = TodoEvent;
    type Error = TodoError;

    const REPLAYS_EVENTS: bool = false;

    fn aggregate_type() -> &'static str {
        "Todo"
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, _event: Self::Event) {}
}
