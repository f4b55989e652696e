use async_trait::async_trait;
use basecamp_core::repository::{RepoResult, TourRepository};
use basecamp_core::Tour;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_err;

pub struct StoreTourRepository {
    pool: PgPool,
}

impl StoreTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TOUR_COLUMNS: &str = "id, title, description, location, price_cents, duration_days, \
     max_group_size, image_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    price_cents: i64,
    duration_days: i32,
    max_group_size: Option<i32>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            price_cents: row.price_cents,
            duration_days: row.duration_days,
            max_group_size: row.max_group_size,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TourRepository for StoreTourRepository {
    async fn create_tour(&self, tour: &Tour) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tours (id, title, description, location, price_cents, duration_days,
                               max_group_size, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(tour.id)
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(&tour.location)
        .bind(tour.price_cents)
        .bind(tour.duration_days)
        .bind(tour.max_group_size)
        .bind(&tour.image_url)
        .bind(tour.created_at)
        .bind(tour.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_tour(&self, id: Uuid) -> RepoResult<Option<Tour>> {
        let sql = format!("SELECT {} FROM tours WHERE id = $1", TOUR_COLUMNS);
        let row = sqlx::query_as::<_, TourRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Tour::from))
    }

    async fn list_tours(&self) -> RepoResult<Vec<Tour>> {
        let sql = format!("SELECT {} FROM tours ORDER BY created_at DESC", TOUR_COLUMNS);
        let rows = sqlx::query_as::<_, TourRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Tour::from).collect())
    }

    async fn update_tour(&self, tour: &Tour) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tours
            SET title = $1, description = $2, location = $3, price_cents = $4,
                duration_days = $5, max_group_size = $6, image_url = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(&tour.location)
        .bind(tour.price_cents)
        .bind(tour.duration_days)
        .bind(tour.max_group_size)
        .bind(&tour.image_url)
        .bind(tour.updated_at)
        .bind(tour.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_tour(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
