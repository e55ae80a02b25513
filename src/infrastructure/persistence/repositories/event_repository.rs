use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::domain::models::{Event, EventStats, EventType, InsertOutcome};
use crate::infrastructure::persistence::entities::events;
use crate::infrastructure::persistence::error::DbError;

/// Default page size for recent events
pub const DEFAULT_RECENT_LIMIT: u64 = 50;
const MAX_RECENT_LIMIT: u64 = 500;

/// Repository for event persistence. Uniqueness on `signature` is enforced
/// by the table itself, so every write here is safe to race.
#[derive(Clone, Debug)]
pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert the event unless its signature is already stored.
    /// A lost race is reported as `AlreadyExists`, never as an error.
    pub async fn insert_if_absent(&self, event: &Event) -> Result<InsertOutcome, DbError> {
        let model = events::ActiveModel {
            signature: Set(event.signature.clone()),
            event_type: Set(event.event_type.as_str().to_string()),
            user: Set(event.user.clone()),
            amount: Set(event.amount.map(to_column_amount)),
            block_time: Set(event.block_time),
            timestamp: Set(event.timestamp.into()),
        };

        let inserted = events::Entity::insert(model)
            .on_conflict(
                OnConflict::column(events::Column::Signature)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        if inserted > 0 {
            return Ok(InsertOutcome::Inserted);
        }

        match self.find_by_signature(&event.signature).await? {
            Some(existing) => Ok(InsertOutcome::AlreadyExists(existing)),
            None => Err(DbError::QueryError(format!(
                "Insert of {} was skipped but no row exists",
                event.signature
            ))),
        }
    }

    /// Get an event by its transaction signature
    pub async fn find_by_signature(&self, signature: &str) -> Result<Option<Event>, DbError> {
        let result = events::Entity::find_by_id(signature.to_string())
            .one(&self.conn)
            .await?;

        result.map(|model| self.to_domain_model(model)).transpose()
    }

    /// Fill in the amount of a stored event that has none.
    /// Returns whether a row changed; unknown signatures and rows that
    /// already carry an amount are left alone.
    pub async fn backfill_amount(&self, signature: &str, amount: u64) -> Result<bool, DbError> {
        let result = events::Entity::update_many()
            .col_expr(events::Column::Amount, Expr::value(to_column_amount(amount)))
            .filter(events::Column::Signature.eq(signature))
            .filter(events::Column::Amount.is_null())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Number of stored events of the given type
    pub async fn count_by_type(&self, event_type: EventType) -> Result<u64, DbError> {
        let count = events::Entity::find()
            .filter(events::Column::EventType.eq(event_type.as_str()))
            .count(&self.conn)
            .await?;

        Ok(count)
    }

    /// Most recently recorded events, newest first
    pub async fn find_recent(&self, limit: u64) -> Result<Vec<Event>, DbError> {
        let limit = limit.clamp(1, MAX_RECENT_LIMIT);

        let results = events::Entity::find()
            .order_by_desc(events::Column::Timestamp)
            .limit(limit)
            .all(&self.conn)
            .await?;

        results
            .into_iter()
            .map(|model| self.to_domain_model(model))
            .collect()
    }

    /// Stake and unstake totals for the dashboard
    pub async fn stats(&self) -> Result<EventStats, DbError> {
        Ok(EventStats {
            total_staked_events: self.count_by_type(EventType::Stake).await?,
            total_unstaked_events: self.count_by_type(EventType::Unstake).await?,
        })
    }

    /// Convert a database entity to a domain model
    fn to_domain_model(&self, entity: events::Model) -> Result<Event, DbError> {
        let event_type = entity
            .event_type
            .parse::<EventType>()
            .map_err(DbError::QueryError)?;

        Ok(Event {
            signature: entity.signature,
            event_type,
            user: entity.user,
            amount: entity.amount.map(from_column_amount),
            block_time: entity.block_time,
            timestamp: entity.timestamp.with_timezone(&Utc),
        })
    }
}

/// `amount` is a BIGINT holding the u64 bit pattern unchanged, so amounts
/// above `i64::MAX` read back negative in raw SQL but round-trip exactly here
fn to_column_amount(amount: u64) -> i64 {
    amount as i64
}

fn from_column_amount(stored: i64) -> u64 {
    stored as u64
}
