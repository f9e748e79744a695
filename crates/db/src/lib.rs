//! Storage layer for murmur.
//!
//! The services in `murmur-core` only see the traits in [`store`]. Two
//! backends implement them:
//!
//! - [`repositories`]: `PostgreSQL` through sea-orm, one table per document kind
//! - [`memory`]: an in-process document store for tests and `memory://` runs

pub mod entities;
pub mod memory;
pub mod migrations;
pub mod records;
pub mod repositories;
pub mod store;
pub mod test_utils;

pub use memory::MemoryStore;
pub use records::{CommentRecord, CommentRef, PostRecord, UserRecord};
pub use store::{
    CommentStore, NewComment, NewPost, NewUser, PostSetField, PostStore, SharedCommentStore,
    SharedPostStore, SharedUserStore, UserSetField, UserStore,
};

use murmur_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
