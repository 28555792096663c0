pub mod reconciler;
pub mod repository;
pub mod rows;
pub mod teachers;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Open the database at `database_url` and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Fresh migrated in-memory database. A single connection is kept alive for
/// the pool's lifetime since every SQLite memory connection is its own
/// database.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
