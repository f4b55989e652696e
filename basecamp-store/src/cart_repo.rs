use async_trait::async_trait;
use basecamp_core::repository::{CartRepository, RepoResult};
use basecamp_core::CartItem;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_err;

pub struct StoreCartRepository {
    pool: PgPool,
}

impl StoreCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CART_COLUMNS: &str = "id, user_id, equipment_id, name, unit_price_cents, quantity, \
     is_rental, rental_start, rental_end, created_at";

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    user_id: Uuid,
    equipment_id: Uuid,
    name: String,
    unit_price_cents: i64,
    quantity: i32,
    is_rental: bool,
    rental_start: Option<DateTime<Utc>>,
    rental_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            user_id: row.user_id,
            equipment_id: row.equipment_id,
            name: row.name,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
            is_rental: row.is_rental,
            rental_start: row.rental_start,
            rental_end: row.rental_end,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CartRepository for StoreCartRepository {
    async fn list_items(&self, user_id: Uuid) -> RepoResult<Vec<CartItem>> {
        let sql = format!(
            "SELECT {} FROM cart_items WHERE user_id = $1 ORDER BY created_at",
            CART_COLUMNS
        );
        let rows = sqlx::query_as::<_, CartItemRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    async fn get_item(&self, id: Uuid) -> RepoResult<Option<CartItem>> {
        let sql = format!("SELECT {} FROM cart_items WHERE id = $1", CART_COLUMNS);
        let row = sqlx::query_as::<_, CartItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(CartItem::from))
    }

    async fn insert_item(&self, item: &CartItem) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, equipment_id, name, unit_price_cents, quantity,
                                    is_rental, rental_start, rental_end, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(item.equipment_id)
        .bind(&item.name)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.is_rental)
        .bind(item.rental_start)
        .bind(item.rental_end)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_quantity(&self, id: Uuid, quantity: i32) -> RepoResult<Option<CartItem>> {
        let sql = format!(
            "UPDATE cart_items SET quantity = $1 WHERE id = $2 RETURNING {}",
            CART_COLUMNS
        );
        let row = sqlx::query_as::<_, CartItemRow>(&sql)
            .bind(quantity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(CartItem::from))
    }

    async fn remove_item(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}
