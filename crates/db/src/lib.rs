//! Postgres persistence: entity models and repositories.
//!
//! Repositories are stateless structs over a shared [`sqlx::PgPool`];
//! all queries use runtime strings with bind parameters. Status columns
//! reference seeded lookup tables and are matched against the enums in
//! `reelforge_core`.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

pub type DbPool = PgPool;

/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connect to Postgres and run pending migrations.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
