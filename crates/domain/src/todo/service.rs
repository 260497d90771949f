//! Todo service wrapping the command handler.

use common::{AggregateId, ItemId};
use event_store::{EventEnvelope, EventStore};

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{DispatchCommand, Todo, TodoCommand, TodoError};

impl From<TodoError> for DomainError {
    fn from(e: TodoError) -> Self {
        DomainError::Todo(e)
    }
}

/// Entry point for writing to todo lists.
pub struct TodoService<S: EventStore> {
    handler: CommandHandler<S, Todo>,
}

impl<S: EventStore> TodoService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S, Todo> {
        &self.handler
    }

    #[tracing::instrument(skip(self, text))]
    pub async fn create_item(
        &self,
        list_id: AggregateId,
        id: ItemId,
        text: String,
    ) -> Result<CommandResult<Todo>, DomainError> {
        self.execute(list_id, TodoCommand::create_item(id, text))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn check_item(
        &self,
        list_id: AggregateId,
        id: ItemId,
    ) -> Result<CommandResult<Todo>, DomainError> {
        self.execute(list_id, TodoCommand::check_item(id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn uncheck_item(
        &self,
        list_id: AggregateId,
        id: ItemId,
    ) -> Result<CommandResult<Todo>, DomainError> {
        self.execute(list_id, TodoCommand::uncheck_item(id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        list_id: AggregateId,
        id: ItemId,
    ) -> Result<CommandResult<Todo>, DomainError> {
        self.execute(list_id, TodoCommand::remove_item(id)).await
    }

    /// Executes an already decoded command against its list.
    #[tracing::instrument(skip(self), fields(list_id = %cmd.aggregate_id, command = cmd.command.command_type()))]
    pub async fn dispatch(&self, cmd: DispatchCommand) -> Result<CommandResult<Todo>, DomainError> {
        self.execute(cmd.aggregate_id, cmd.command).await
    }

    /// The event log of one list, oldest first.
    pub async fn events(&self, list_id: AggregateId) -> Result<Vec<EventEnvelope>, DomainError> {
        Ok(self.handler.store().get_events_for_aggregate(list_id).await?)
    }

    async fn execute(
        &self,
        list_id: AggregateId,
        command: TodoCommand,
    ) -> Result<CommandResult<Todo>, DomainError> {
        let command_type = command.command_type();
        let result = self
            .handler
            .execute(list_id, |todo| todo.handle(&command).map(|event| vec![event]))
            .await;

        let outcome = if result.is_ok() { "accepted" } else { "failed" };
        metrics::counter!("todo_commands_total", "command" => command_type, "outcome" => outcome)
            .increment(1);

        match &result {
            Ok(r) => tracing::debug!(version = %r.new_version, "command accepted"),
            Err(e) => tracing::warn!(error = %e, "command failed"),
        }

        result
    }
}
