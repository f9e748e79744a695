//! User repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use murmur_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use serde_json::json;

use super::{db_error, decode_json};
use crate::entities::{User, user};
use crate::records::UserRecord;
use crate::store::{NewUser, UserSetField, UserStore};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    const fn column(field: UserSetField) -> user::Column {
        match field {
            UserSetField::Followers => user::Column::Followers,
            UserSetField::Following => user::Column::Following,
        }
    }
}

impl TryFrom<user::Model> for UserRecord {
    type Error = AppError;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            followers: decode_json("followers", &model.followers)?,
            following: decode_json("following", &model.following)?,
            id: model.id,
            username: model.username,
            email: model.email,
            credential_hash: model.password_hash,
            created_at: model.created_at.into(),
        })
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<UserRecord>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.credential_hash),
            followers: Set(json!([])),
            following: Set(json!([])),
            created_at: Set(Utc::now().into()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(db_error)?
            .try_into()
    }

    /// Single conditional UPDATE; the `jsonb_exists` guard keeps the array a set.
    async fn add_to_set(&self, id: &str, field: UserSetField, value: &str) -> AppResult<bool> {
        let name = field.as_str();
        let result = User::update_many()
            .col_expr(
                Self::column(field),
                Expr::cust_with_values(format!("\"{name}\" || jsonb_build_array($1::text)"), [
                    value,
                ]),
            )
            .filter(user::Column::Id.eq(id))
            .filter(Expr::cust_with_values(
                format!("NOT jsonb_exists(\"{name}\", $1)"),
                [value],
            ))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn remove_from_set(
        &self,
        id: &str,
        field: UserSetField,
        value: &str,
    ) -> AppResult<bool> {
        let name = field.as_str();
        let result = User::update_many()
            .col_expr(
                Self::column(field),
                Expr::cust_with_values(format!("\"{name}\" - $1::text"), [value]),
            )
            .filter(user::Column::Id.eq(id))
            .filter(Expr::cust_with_values(
                format!("jsonb_exists(\"{name}\", $1)"),
                [value],
            ))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }
}
