use async_trait::async_trait;
use basecamp_core::repository::{PaymentRepository, RepoResult, RepositoryError, ReviewUpdate};
use basecamp_core::{Payment, PaymentKind, PaymentLine, PaymentStatus};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{db_err, decode};

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PAYMENT_COLUMNS: &str = "id, user_id, kind, reference_id, lines, amount_cents, card_holder, \
     card_last4, status, created_at, reviewed_at";

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    reference_id: Option<Uuid>,
    lines: Json<Vec<PaymentLine>>,
    amount_cents: i64,
    card_holder: String,
    card_last4: String,
    status: String,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            user_id: row.user_id,
            kind: decode::<PaymentKind>(&row.kind)?,
            reference_id: row.reference_id,
            lines: row.lines.0,
            amount_cents: row.amount_cents,
            card_holder: row.card_holder,
            card_last4: row.card_last4,
            status: decode::<PaymentStatus>(&row.status)?,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
        })
    }
}

async fn insert_payment<'e, E>(executor: E, payment: &Payment) -> RepoResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO payments (id, user_id, kind, reference_id, lines, amount_cents, card_holder,
                              card_last4, status, created_at, reviewed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(payment.id)
    .bind(payment.user_id)
    .bind(payment.kind.as_str())
    .bind(payment.reference_id)
    .bind(Json(&payment.lines))
    .bind(payment.amount_cents)
    .bind(&payment.card_holder)
    .bind(&payment.card_last4)
    .bind(payment.status.as_str())
    .bind(payment.created_at)
    .bind(payment.reviewed_at)
    .execute(executor)
    .await
    .map_err(db_err)?;

    Ok(())
}

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn create_payment(&self, payment: &Payment) -> RepoResult<()> {
        insert_payment(&self.pool, payment).await
    }

    async fn get_payment(&self, id: Uuid) -> RepoResult<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(Payment::try_from).transpose()
    }

    async fn list_payments(&self) -> RepoResult<Vec<Payment>> {
        let sql = format!("SELECT {} FROM payments ORDER BY created_at DESC", PAYMENT_COLUMNS);
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn update_review(&self, payment: &Payment) -> RepoResult<ReviewUpdate> {
        let result = sqlx::query(
            "UPDATE payments SET status = $1, reviewed_at = $2 WHERE id = $3 AND status = 'PENDING'",
        )
        .bind(payment.status.as_str())
        .bind(payment.reviewed_at)
        .bind(payment.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() > 0 {
            return Ok(ReviewUpdate::Applied);
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM payments WHERE id = $1")
            .bind(payment.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match current {
            Some(status) => Ok(ReviewUpdate::AlreadyReviewed(decode::<PaymentStatus>(&status)?)),
            None => Ok(ReviewUpdate::NotFound),
        }
    }

    async fn checkout_cart(&self, payment: &Payment, line_ids: &[Uuid]) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Row locks make a concurrent checkout of the same lines wait here and
        // then see them gone.
        let removed = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
            .bind(payment.user_id)
            .bind(line_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if removed.rows_affected() != line_ids.len() as u64 {
            tx.rollback().await.map_err(db_err)?;
            return Ok(false);
        }

        insert_payment(&mut *tx, payment).await?;
        tx.commit().await.map_err(db_err)?;

        Ok(true)
    }
}
