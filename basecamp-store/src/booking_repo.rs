use async_trait::async_trait;
use basecamp_core::repository::{BookingRepository, RepoResult, RepositoryError};
use basecamp_core::{Booking, BookingStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{db_err, decode};

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, id: Uuid) -> RepoResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE {} = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS, clause
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

const BOOKING_COLUMNS: &str =
    "id, user_id, tour_id, travel_date, participants, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    tour_id: Uuid,
    travel_date: NaiveDate,
    participants: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            tour_id: row.tour_id,
            travel_date: row.travel_date,
            participants: row.participants,
            status: decode::<BookingStatus>(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, tour_id, travel_date, participants, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.tour_id)
        .bind(booking.travel_date)
        .bind(booking.participants)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self) -> RepoResult<Vec<Booking>> {
        let sql = format!("SELECT {} FROM bookings ORDER BY created_at DESC", BOOKING_COLUMNS);
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Booking>> {
        self.fetch_where("user_id", user_id).await
    }

    async fn list_by_tour(&self, tour_id: Uuid) -> RepoResult<Vec<Booking>> {
        self.fetch_where("tour_id", tour_id).await
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> RepoResult<Option<Booking>> {
        let sql = format!(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(Booking::try_from).transpose()
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
