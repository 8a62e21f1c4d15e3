use anyhow::Result;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, Transaction,
};
use std::{str::FromStr, time::Duration};

pub mod item_store;
pub mod purchase_store;
pub mod shipping_store;

pub type DbPool = Pool<Sqlite>;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema statements, applied in order on every start
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        price REAL NOT NULL CHECK (price >= 0),
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        item_id INTEGER PRIMARY KEY NOT NULL REFERENCES items(id) ON DELETE CASCADE,
        stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_name TEXT NOT NULL,
        total_amount REAL NOT NULL DEFAULT 0,
        purchase_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    "#,
    // item_id has no foreign key; lines outlive the items they reference
    r#"
    CREATE TABLE IF NOT EXISTS purchase_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        purchase_id INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
        item_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity > 0)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shipping (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        purchase_id INTEGER NOT NULL,
        shipping_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        shipping_address TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        tracking_number TEXT,
        shipping_provider TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shipping_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shipping_id INTEGER NOT NULL REFERENCES shipping(id) ON DELETE CASCADE,
        item_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity > 0)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_purchase_items_purchase ON purchase_items (purchase_id);",
    "CREATE INDEX IF NOT EXISTS idx_shipping_items_shipping ON shipping_items (shipping_id);",
];

/// Initialize the database connection pool
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        tracing::info!("Creating database at {}", database_url);
        Sqlite::create_database(database_url).await?;
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    // Create connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    // Run migrations
    setup_database(&pool).await?;

    Ok(pool)
}

/// Set up the database schema
pub async fn setup_database(pool: &DbPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }

    tracing::debug!("Database schema ready");
    Ok(())
}

/// Start a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads and then writes has to upgrade its
/// lock, and SQLite fails that upgrade with `SQLITE_BUSY` instead of waiting
/// when another connection is writing.
pub async fn begin_write(pool: &DbPool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Fresh in-memory database with the schema applied.
///
/// Pinned to a single connection because every SQLite memory connection
/// is its own database.
#[cfg(test)]
pub async fn test_pool() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid memory url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    setup_database(&pool)
        .await
        .expect("Failed to create schema");

    pool
}
