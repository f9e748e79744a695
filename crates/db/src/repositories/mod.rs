//! `PostgreSQL` repositories implementing the store traits.

mod comment;
mod post;
mod user;

pub use comment::CommentRepository;
pub use post::PostRepository;
pub use user::UserRepository;

use murmur_common::AppError;
use sea_orm::{DbErr, SqlErr};
use serde::de::DeserializeOwned;

/// Map a sea-orm error, surfacing unique violations as conflicts.
pub(crate) fn db_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(err.to_string()),
    }
}

/// Decode a JSON column into its domain type.
pub(crate) fn decode_json<T: DeserializeOwned>(
    column: &str,
    value: &serde_json::Value,
) -> Result<T, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Database(format!("Malformed {column} column: {e}")))
}
