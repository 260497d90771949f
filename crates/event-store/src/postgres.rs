use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AggregateId, EventEnvelope, EventId, EventQuery, EventStoreError, Result, Snapshot, Version,
    store::{AppendOptions, EventStore, EventStream, validate_events_for_append},
};

const EVENT_COLUMNS: &str =
    "id, event_type, aggregate_id, aggregate_type, version, timestamp, payload, metadata";

/// PostgreSQL-backed event store.
///
/// Log order is the `sequence` column, assigned on insert. Appends hold a
/// transaction-level advisory lock from before the first insert until
/// commit, so sequences become visible in increasing order and readers
/// paging the log by offset never see a gap fill in behind them.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Advisory lock key taken by every append transaction.
    pub const APPEND_LOCK_KEY: i64 = 0x746f_646f_5f6c_6f67;

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<EventEnvelope> {
        let metadata: HashMap<String, serde_json::Value> =
            serde_json::from_value(row.try_get("metadata")?)?;

        Ok(EventEnvelope {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            aggregate_type: row.try_get("aggregate_type")?,
            version: Version::new(row.try_get("version")?),
            timestamp: row.try_get("timestamp")?,
            payload: row.try_get("payload")?,
            metadata,
        })
    }

    fn select_events() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE TRUE"))
    }

    async fn fetch_events(&self, mut builder: QueryBuilder<'_, Postgres>) -> Result<Vec<EventEnvelope>> {
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(Self::APPEND_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        if let Some(expected) = options.expected_version {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT MAX(version) FROM events WHERE aggregate_id = $1")
                    .bind(aggregate_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await?;
            let actual = Version::new(current.unwrap_or(0));

            if actual != expected {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id,
                    expected,
                    actual,
                });
            }
        }

        let mut last_version = Version::initial();
        for event in &events {
            sqlx::query(
                "INSERT INTO events (id, event_type, aggregate_id, aggregate_type, version, timestamp, payload, metadata) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id.as_uuid())
            .bind(&event.event_type)
            .bind(event.aggregate_id.as_uuid())
            .bind(&event.aggregate_type)
            .bind(event.version.as_i64())
            .bind(event.timestamp)
            .bind(&event.payload)
            .bind(serde_json::to_value(&event.metadata)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("unique_aggregate_version") =>
                {
                    EventStoreError::ConcurrencyConflict {
                        aggregate_id,
                        expected: options.expected_version.unwrap_or_default(),
                        actual: event.version,
                    }
                }
                other => EventStoreError::Database(other),
            })?;

            last_version = event.version;
        }

        tx.commit().await?;
        tracing::trace!(%aggregate_id, version = %last_version, "events appended");
        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        self.get_events_for_aggregate_from_version(aggregate_id, Version::initial())
            .await
    }

    async fn get_events_for_aggregate_from_version(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<EventEnvelope>> {
        let mut builder = Self::select_events();
        builder
            .push(" AND aggregate_id = ")
            .push_bind(aggregate_id.as_uuid())
            .push(" AND version >= ")
            .push_bind(from_version.as_i64())
            .push(" ORDER BY version ASC");
        self.fetch_events(builder).await
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let mut builder = Self::select_events();

        if let Some(id) = query.aggregate_id {
            builder.push(" AND aggregate_id = ").push_bind(id.as_uuid());
        }
        if let Some(aggregate_type) = query.aggregate_type {
            builder.push(" AND aggregate_type = ").push_bind(aggregate_type);
        }
        if let Some(event_types) = query.event_types {
            builder
                .push(" AND event_type = ANY(")
                .push_bind(event_types)
                .push(")");
        }
        if let Some(from) = query.from_version {
            builder.push(" AND version >= ").push_bind(from.as_i64());
        }
        if let Some(to) = query.to_version {
            builder.push(" AND version <= ").push_bind(to.as_i64());
        }

        builder.push(" ORDER BY sequence ASC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ").push_bind(offset as i64);
        }

        self.fetch_events(builder).await
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let mut builder = Self::select_events();
        builder.push(" ORDER BY sequence ASC");
        let events = self.fetch_events(builder).await?;

        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM events WHERE aggregate_id = $1")
                .bind(aggregate_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(version.map(Version::new))
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (view_model, aggregate_id, version, timestamp, state)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (view_model, aggregate_id) DO UPDATE SET
                version = EXCLUDED.version,
                timestamp = EXCLUDED.timestamp,
                state = EXCLUDED.state
            "#,
        )
        .bind(&snapshot.view_model)
        .bind(snapshot.aggregate_id.as_uuid())
        .bind(snapshot.version.as_i64())
        .bind(snapshot.timestamp)
        .bind(&snapshot.state)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_snapshot(
        &self,
        view_model: &str,
        aggregate_id: AggregateId,
    ) -> Result<Option<Snapshot>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT view_model, aggregate_id, version, timestamp, state
            FROM snapshots
            WHERE view_model = $1 AND aggregate_id = $2
            "#,
        )
        .bind(view_model)
        .bind(aggregate_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Snapshot {
            view_model: row.try_get("view_model")?,
            aggregate_id: AggregateId::from_uuid(row.try_get::<Uuid, _>("aggregate_id")?),
            version: Version::new(row.try_get("version")?),
            timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
            state: row.try_get("state")?,
        }))
    }
}
