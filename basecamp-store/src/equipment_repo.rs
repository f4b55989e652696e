use async_trait::async_trait;
use basecamp_core::repository::{EquipmentRepository, RepoResult};
use basecamp_core::{Equipment, EquipmentFilter};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::db_err;

pub struct StoreEquipmentRepository {
    pool: PgPool,
}

impl StoreEquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EQUIPMENT_COLUMNS: &str = "id, name, description, category, price_cents, rental_price_cents, \
     quantity, available, image_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EquipmentRow {
    id: Uuid,
    name: String,
    description: String,
    category: String,
    price_cents: i64,
    rental_price_cents: i64,
    quantity: i32,
    available: bool,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Equipment {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price_cents: row.price_cents,
            rental_price_cents: row.rental_price_cents,
            quantity: row.quantity,
            available: row.available,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl EquipmentRepository for StoreEquipmentRepository {
    async fn create_equipment(&self, equipment: &Equipment) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment (id, name, description, category, price_cents, rental_price_cents,
                                   quantity, available, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(&equipment.description)
        .bind(&equipment.category)
        .bind(equipment.price_cents)
        .bind(equipment.rental_price_cents)
        .bind(equipment.quantity)
        .bind(equipment.available)
        .bind(&equipment.image_url)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_equipment(&self, id: Uuid) -> RepoResult<Option<Equipment>> {
        let sql = format!("SELECT {} FROM equipment WHERE id = $1", EQUIPMENT_COLUMNS);
        let row = sqlx::query_as::<_, EquipmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Equipment::from))
    }

    async fn list_equipment(&self, filter: &EquipmentFilter) -> RepoResult<Vec<Equipment>> {
        // NULL parameters disable their condition
        let sql = format!(
            r#"
            SELECT {} FROM equipment
            WHERE ($1::TEXT IS NULL OR LOWER(category) = LOWER($1))
              AND ($2::BOOLEAN IS NULL OR available = $2)
            ORDER BY name
            "#,
            EQUIPMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, EquipmentRow>(&sql)
            .bind(&filter.category)
            .bind(filter.available)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn update_equipment(&self, equipment: &Equipment) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET name = $1, description = $2, category = $3, price_cents = $4, rental_price_cents = $5,
                quantity = $6, available = $7, image_url = $8, updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&equipment.name)
        .bind(&equipment.description)
        .bind(&equipment.category)
        .bind(equipment.price_cents)
        .bind(equipment.rental_price_cents)
        .bind(equipment.quantity)
        .bind(equipment.available)
        .bind(&equipment.image_url)
        .bind(equipment.updated_at)
        .bind(equipment.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_equipment(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
