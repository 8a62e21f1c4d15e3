use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db::{DbPool, begin_write},
    error::{AppError, Result},
    models::{
        LineItem,
        purchase::{Purchase, PurchaseDetail, PurchasePayload},
        totals_by_item,
    },
};

/// Purchase store; every mutation runs in a single transaction
#[derive(Clone)]
pub struct PurchaseStore {
    pool: DbPool,
}

impl PurchaseStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a purchase and take its quantities out of stock.
    ///
    /// All lines are checked against current stock before anything is
    /// written. The decrement itself is guarded by `stock >= quantity`, so a
    /// concurrent purchase that drained stock after the check still fails
    /// with `InsufficientStock` and the whole purchase is rolled back.
    pub async fn create_purchase(&self, payload: PurchasePayload) -> Result<i64> {
        let customer_name = payload
            .customer_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("customer_name is required".into()))?;
        let items = payload
            .items
            .filter(|items| !items.is_empty())
            .ok_or_else(|| AppError::BadRequest("At least one item is required".into()))?;
        validate_quantities(&items)?;
        let total_amount = payload.total_amount.unwrap_or(0.0);

        let mut tx = begin_write(&self.pool).await?;

        for (item_id, requested) in totals_by_item(&items) {
            let row: Option<(String, i64)> = sqlx::query_as(
                r#"
                SELECT items.name, inventory.stock
                FROM inventory
                JOIN items ON items.id = inventory.item_id
                WHERE inventory.item_id = ?
                "#,
            )
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;

            let (name, stock) = row.ok_or_else(|| {
                AppError::NotFound(format!("Item with ID {item_id} not found in inventory"))
            })?;

            if stock < requested {
                tracing::warn!(item_id, stock, requested, "Purchase rejected");
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock for item: {name} (available {stock}, requested {requested})"
                )));
            }
        }

        let purchase_id = sqlx::query(
            r#"
            INSERT INTO purchases (customer_name, total_amount, purchase_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&customer_name)
        .bind(total_amount)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for line in &items {
            sqlx::query(
                "INSERT INTO purchase_items (purchase_id, item_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(purchase_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            let decremented = sqlx::query(
                "UPDATE inventory SET stock = stock - ? WHERE item_id = ? AND stock >= ?",
            )
            .bind(line.quantity)
            .bind(line.item_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if decremented == 0 {
                tracing::warn!(item_id = line.item_id, "Stock changed during purchase");
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock for item with ID {}",
                    line.item_id
                )));
            }
        }

        tx.commit().await?;

        tracing::info!(purchase_id, %customer_name, lines = items.len(), "Purchase created");
        Ok(purchase_id)
    }

    /// All purchases, newest first
    pub async fn get_all_purchases(&self) -> Result<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, customer_name, total_amount, purchase_date
            FROM purchases
            ORDER BY purchase_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Delete a purchase and put its quantities back into stock.
    ///
    /// Returns the number of purchase lines that were restored.
    pub async fn delete_purchase(&self, id: i64) -> Result<usize> {
        let mut tx = begin_write(&self.pool).await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM purchases WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Purchase not found".into()));
        }

        let lines = sqlx::query_as::<_, (i64, i64)>(
            "SELECT item_id, quantity FROM purchase_items WHERE purchase_id = ?",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for &(item_id, quantity) in &lines {
            let restored = sqlx::query(
                "UPDATE inventory SET stock = stock + ? WHERE item_id = ? AND stock <= ?",
            )
            .bind(quantity)
            .bind(item_id)
            .bind(i64::MAX - quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            // No row means the item was deleted since; only a present row can overflow
            if restored == 0 && stock_row_exists(&mut *tx, item_id).await? {
                return Err(AppError::BadRequest(format!(
                    "Restoring {quantity} of item with ID {item_id} would exceed the maximum stock"
                )));
            }
        }

        sqlx::query("DELETE FROM purchase_items WHERE purchase_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM purchases WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(purchase_id = id, restored = lines.len(), "Purchase deleted, stock restored");
        Ok(lines.len())
    }

    /// Line items of a purchase joined with item name and price
    pub async fn get_purchase_details(&self, purchase_id: i64) -> Result<Vec<PurchaseDetail>> {
        let details = sqlx::query_as::<_, PurchaseDetail>(
            r#"
            SELECT purchases.id AS purchase_id,
                   purchases.customer_name,
                   purchases.total_amount,
                   purchases.purchase_date,
                   items.name AS item_name,
                   purchase_items.quantity,
                   items.price
            FROM purchases
            JOIN purchase_items ON purchase_items.purchase_id = purchases.id
            JOIN items ON items.id = purchase_items.item_id
            WHERE purchases.id = ?
            ORDER BY purchases.purchase_date DESC, purchase_items.id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }
}

/// Total purchased quantity per item for a purchase, or `None` if the
/// purchase does not exist.
pub(crate) async fn purchased_quantities(
    conn: &mut SqliteConnection,
    purchase_id: i64,
) -> Result<Option<HashMap<i64, i64>>> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM purchases WHERE id = ?")
        .bind(purchase_id)
        .fetch_optional(&mut *conn)
        .await?;
    if exists.is_none() {
        return Ok(None);
    }

    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT item_id, SUM(quantity)
        FROM purchase_items
        WHERE purchase_id = ?
        GROUP BY item_id
        "#,
    )
    .bind(purchase_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(rows.into_iter().collect()))
}

async fn stock_row_exists(conn: &mut SqliteConnection, item_id: i64) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT item_id FROM inventory WHERE item_id = ?")
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

pub(crate) fn validate_quantities(lines: &[LineItem]) -> Result<()> {
    match lines.iter().find(|line| line.quantity <= 0) {
        Some(line) => Err(AppError::BadRequest(format!(
            "Quantity for item with ID {} must be positive",
            line.item_id
        ))),
        None => Ok(()),
    }
}
