use async_trait::async_trait;
use basecamp_core::repository::{EventRepository, RepoResult};
use basecamp_core::Event;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_err;

pub struct StoreEventRepository {
    pool: PgPool,
}

impl StoreEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EVENT_COLUMNS: &str =
    "id, title, description, location, starts_at, price_cents, capacity, created_at";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    starts_at: DateTime<Utc>,
    price_cents: i64,
    capacity: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            starts_at: row.starts_at,
            price_cents: row.price_cents,
            capacity: row.capacity,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl EventRepository for StoreEventRepository {
    async fn create_event(&self, event: &Event) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, location, starts_at, price_cents, capacity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.price_cents)
        .bind(event.capacity)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Event::from))
    }

    async fn list_events(&self) -> RepoResult<Vec<Event>> {
        let sql = format!("SELECT {} FROM events ORDER BY starts_at", EVENT_COLUMNS);
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
