use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use crate::{
    db::{
        DbPool, begin_write,
        purchase_store::{purchased_quantities, validate_quantities},
    },
    error::{AppError, Result},
    models::{
        shipping::{Shipping, ShippingPayload, ShippingStatus, ShippingUpdate},
        totals_by_item,
    },
};

/// Shipment store. Shipments are checked against the lines of the purchase
/// they belong to and never touch inventory stock.
#[derive(Clone)]
pub struct ShippingStore {
    pool: DbPool,
}

impl ShippingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a shipment for (part of) a purchase
    pub async fn create_shipment(&self, payload: ShippingPayload) -> Result<i64> {
        let (purchase_id, items) = match (payload.purchase_id, payload.items) {
            (Some(purchase_id), Some(items)) if !items.is_empty() => (purchase_id, items),
            _ => {
                return Err(AppError::BadRequest(
                    "purchase_id and at least one item are required".into(),
                ));
            }
        };
        validate_quantities(&items)?;
        let status = match payload.status.as_deref() {
            Some(status) => ShippingStatus::parse(status)?,
            None => ShippingStatus::default(),
        };
        let shipping_date = payload.shipping_date.unwrap_or_else(Utc::now);

        let mut tx = begin_write(&self.pool).await?;

        let purchased = purchased_quantities(&mut *tx, purchase_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Purchase {purchase_id} not found")))?;

        for (item_id, requested) in totals_by_item(&items) {
            match purchased.get(&item_id) {
                None => {
                    return Err(AppError::BadRequest(format!(
                        "Item with ID {item_id} is not part of purchase {purchase_id}"
                    )));
                }
                Some(&bought) if requested > bought => {
                    return Err(AppError::BadRequest(format!(
                        "Cannot ship {requested} of item with ID {item_id}, only {bought} purchased"
                    )));
                }
                Some(_) => {}
            }
        }

        let shipping_id = sqlx::query(
            r#"
            INSERT INTO shipping
                (purchase_id, shipping_date, shipping_address, status, tracking_number, shipping_provider)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(purchase_id)
        .bind(shipping_date)
        .bind(&payload.shipping_address)
        .bind(status)
        .bind(&payload.tracking_number)
        .bind(&payload.shipping_provider)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for line in &items {
            sqlx::query(
                "INSERT INTO shipping_items (shipping_id, item_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(shipping_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(shipping_id, purchase_id, %status, "Shipment recorded");
        Ok(shipping_id)
    }

    /// All shipments, newest first
    pub async fn get_all_shipments(&self) -> Result<Vec<Shipping>> {
        let shipments = sqlx::query_as::<_, Shipping>(
            r#"
            SELECT id, purchase_id, shipping_date, shipping_address, status,
                   tracking_number, shipping_provider
            FROM shipping
            ORDER BY shipping_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(shipments)
    }

    /// Delete a shipment and its lines
    pub async fn delete_shipment(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shipping_items WHERE shipping_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM shipping WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shipment not found".into()));
        }

        tx.commit().await?;

        tracing::info!(shipping_id = id, "Shipment deleted");
        Ok(())
    }

    /// Update only the supplied status, tracking number and provider
    pub async fn update_shipment(&self, id: i64, update: ShippingUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }
        let status = update.status.as_deref().map(ShippingStatus::parse).transpose()?;

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE shipping SET ");
        let mut fields = builder.separated(", ");
        if let Some(status) = status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(tracking_number) = update.tracking_number {
            fields
                .push("tracking_number = ")
                .push_bind_unseparated(tracking_number);
        }
        if let Some(shipping_provider) = update.shipping_provider {
            fields
                .push("shipping_provider = ")
                .push_bind_unseparated(shipping_provider);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shipment not found".into()));
        }

        Ok(())
    }
}
