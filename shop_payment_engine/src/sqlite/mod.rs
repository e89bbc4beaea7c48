//! SQLite database module for the Shop Payment Engine.

mod sqlite_impl;

pub mod db;
use sqlx::SqlitePool;
pub use sqlite_impl::SqliteDatabase;

/// Bring the schema up to date. The server runs this at startup, so a fresh
/// deployment only needs a writable data directory.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await
}
