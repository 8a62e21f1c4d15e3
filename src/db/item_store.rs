use chrono::Utc;

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::item::{InventoryPayload, Item, ItemPayload, ItemWithStock},
};

/// Stock given to the inventory row created alongside a new item
pub const INITIAL_STOCK: i64 = 0;

/// Item and inventory store for database operations
#[derive(Clone)]
pub struct ItemStore {
    pool: DbPool,
}

impl ItemStore {
    /// Create a new ItemStore with the provided database pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an item together with its inventory row
    pub async fn create_item(&self, payload: ItemPayload) -> Result<i64> {
        let (name, price) = match (payload.name, payload.price) {
            (Some(name), Some(price)) if !name.trim().is_empty() => (name, price),
            _ => return Err(AppError::BadRequest("Name and price are required".into())),
        };
        validate_price(price)?;

        let mut tx = self.pool.begin().await?;

        let item_id = sqlx::query(
            r#"
            INSERT INTO items (name, description, price, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&name)
        .bind(&payload.description)
        .bind(price)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO inventory (item_id, stock) VALUES (?, ?)")
            .bind(item_id)
            .bind(INITIAL_STOCK)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(item_id, %name, "Item created");
        Ok(item_id)
    }

    /// Get a list of all items
    pub async fn get_all_items(&self) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, price, created_at FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Overwrite name, description and price of an item
    pub async fn update_item(&self, id: i64, payload: ItemPayload) -> Result<()> {
        let (name, description, price) = match (payload.name, payload.description, payload.price)
        {
            (Some(name), Some(description), Some(price))
                if !name.trim().is_empty() && !description.trim().is_empty() =>
            {
                (name, description, price)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Name, description, and price are required".into(),
                ));
            }
        };
        validate_price(price)?;

        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?, description = ?, price = ?
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(price)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".into()));
        }

        Ok(())
    }

    /// Delete an item and its inventory row
    pub async fn delete_item(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM inventory WHERE item_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".into()));
        }

        tx.commit().await?;

        tracing::info!(item_id = id, "Item deleted");
        Ok(())
    }

    /// Add stock to an item, creating its inventory row if missing
    pub async fn set_inventory(&self, payload: InventoryPayload) -> Result<()> {
        let (item_id, stock) = match (payload.item_id, payload.stock) {
            (Some(item_id), Some(stock)) => (item_id, stock),
            _ => return Err(AppError::BadRequest("item_id and stock are required".into())),
        };
        if stock < 0 {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Item {item_id} not found")));
        }

        // SQLite promotes an overflowing integer sum to REAL; refuse the add instead
        let written = sqlx::query(
            r#"
            INSERT INTO inventory (item_id, stock)
            VALUES (?, ?)
            ON CONFLICT (item_id) DO UPDATE SET stock = stock + excluded.stock
            WHERE stock <= ? - excluded.stock
            "#,
        )
        .bind(item_id)
        .bind(stock)
        .bind(i64::MAX)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if written == 0 {
            return Err(AppError::BadRequest(format!(
                "Adding {stock} to item {item_id} would exceed the maximum stock"
            )));
        }

        tracing::debug!(item_id, added = stock, "Inventory updated");
        Ok(())
    }

    /// Reset an item's stock to zero without removing the row
    pub async fn zero_inventory(&self, item_id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE inventory SET stock = 0 WHERE item_id = ?")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inventory not found".into()));
        }

        Ok(())
    }

    /// Items that have an inventory row, with their current stock
    pub async fn list_items_with_inventory(&self) -> Result<Vec<ItemWithStock>> {
        let rows = sqlx::query_as::<_, ItemWithStock>(
            r#"
            SELECT items.id, items.name, items.description, items.price,
                   items.created_at, inventory.stock
            FROM items
            JOIN inventory ON items.id = inventory.item_id
            ORDER BY items.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Current stock of an item, if it has an inventory row
    pub async fn get_stock(&self, item_id: i64) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT stock FROM inventory WHERE item_id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(stock,)| stock))
    }
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest("Price must be a non-negative amount".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn widget() -> ItemPayload {
        ItemPayload {
            name: Some("Widget".into()),
            description: Some("desc".into()),
            price: Some(10.0),
        }
    }

    #[tokio::test]
    async fn created_item_is_listed_with_initial_stock() {
        let store = ItemStore::new(test_pool().await);

        let id = store.create_item(widget()).await.unwrap();
        let listed = store.list_items_with_inventory().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].name, "Widget");
        assert_eq!(listed[0].stock, INITIAL_STOCK);
    }

    #[tokio::test]
    async fn create_requires_name_and_price() {
        let store = ItemStore::new(test_pool().await);

        let missing_price = ItemPayload {
            price: None,
            ..widget()
        };
        let blank_name = ItemPayload {
            name: Some("  ".into()),
            ..widget()
        };
        let negative = ItemPayload {
            price: Some(-1.0),
            ..widget()
        };

        for payload in [missing_price, blank_name, negative] {
            let err = store.create_item(payload).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert!(store.get_all_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_allows_missing_description() {
        let store = ItemStore::new(test_pool().await);

        let id = store
            .create_item(ItemPayload {
                description: None,
                ..widget()
            })
            .await
            .unwrap();

        let items = store.get_all_items().await.unwrap();
        assert_eq!(items[0].id, id);
        assert!(items[0].description.is_none());
    }

    #[tokio::test]
    async fn set_inventory_is_additive() {
        let store = ItemStore::new(test_pool().await);
        let id = store.create_item(widget()).await.unwrap();

        for stock in [4, 7] {
            store
                .set_inventory(InventoryPayload {
                    item_id: Some(id),
                    stock: Some(stock),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.get_stock(id).await.unwrap(), Some(INITIAL_STOCK + 11));
    }

    #[tokio::test]
    async fn set_inventory_rejects_overflowing_add() {
        let store = ItemStore::new(test_pool().await);
        let id = store.create_item(widget()).await.unwrap();
        let other = store.create_item(widget()).await.unwrap();
        store
            .set_inventory(InventoryPayload {
                item_id: Some(id),
                stock: Some(i64::MAX),
            })
            .await
            .unwrap();

        let err = store
            .set_inventory(InventoryPayload {
                item_id: Some(id),
                stock: Some(1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.get_stock(id).await.unwrap(), Some(i64::MAX));
        let listed = store.list_items_with_inventory().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|row| row.id == other && row.stock == 0));
    }

    #[tokio::test]
    async fn set_inventory_recreates_missing_row() {
        let pool = test_pool().await;
        let store = ItemStore::new(pool.clone());
        let id = store.create_item(widget()).await.unwrap();

        sqlx::query("DELETE FROM inventory WHERE item_id = ?")
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(store.list_items_with_inventory().await.unwrap().is_empty());

        store
            .set_inventory(InventoryPayload {
                item_id: Some(id),
                stock: Some(3),
            })
            .await
            .unwrap();

        assert_eq!(store.get_stock(id).await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn set_inventory_validates_input() {
        let store = ItemStore::new(test_pool().await);

        let err = store
            .set_inventory(InventoryPayload {
                item_id: Some(1),
                stock: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = store
            .set_inventory(InventoryPayload {
                item_id: Some(42),
                stock: Some(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn zero_inventory_keeps_row() {
        let store = ItemStore::new(test_pool().await);
        let id = store.create_item(widget()).await.unwrap();
        store
            .set_inventory(InventoryPayload {
                item_id: Some(id),
                stock: Some(9),
            })
            .await
            .unwrap();

        store.zero_inventory(id).await.unwrap();
        assert_eq!(store.get_stock(id).await.unwrap(), Some(0));

        let err = store.zero_inventory(id + 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let store = ItemStore::new(test_pool().await);
        let id = store.create_item(widget()).await.unwrap();

        store
            .update_item(
                id,
                ItemPayload {
                    name: Some("Gadget".into()),
                    description: Some("shiny".into()),
                    price: Some(12.5),
                },
            )
            .await
            .unwrap();

        let item = &store.get_all_items().await.unwrap()[0];
        assert_eq!(item.name, "Gadget");
        assert_eq!(item.description.as_deref(), Some("shiny"));
        assert_eq!(item.price, 12.5);

        let err = store.update_item(id + 1, widget()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = store
            .update_item(
                id,
                ItemPayload {
                    description: None,
                    ..widget()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_removes_item_and_inventory() {
        let store = ItemStore::new(test_pool().await);
        let id = store.create_item(widget()).await.unwrap();

        store.delete_item(id).await.unwrap();

        assert!(store.get_all_items().await.unwrap().is_empty());
        assert_eq!(store.get_stock(id).await.unwrap(), None);

        let err = store.delete_item(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
