//! User repository: the storage port and its Postgres implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use tracing::warn;
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{NewUser, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Message returned when an email is already taken
pub const DUPLICATE_EMAIL: &str = "user with this email already exists";

/// User repository trait for dependency injection.
///
/// Lookups that match no row fail with [`AppError::NotFound`]. A duplicate
/// email fails with [`AppError::BadRequest`]. Every other failure is internal.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the identifier storage assigned to it
    async fn create(&self, user: NewUser) -> AppResult<Uuid>;

    /// List every user
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<User>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<User>;

    /// Persist name, email and digest of `user`.
    ///
    /// The write only applies while the stored version still equals
    /// `user.version`; otherwise nothing is written and an internal error
    /// is returned.
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Delete user by ID; zero affected rows is an internal error
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Postgres implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
    query_timeout: Duration,
}

impl UserStore {
    /// Create new repository instance; every query is bounded by `query_timeout`
    pub fn new(db: DatabaseConnection, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// Run one storage call under the per-query timeout.
    async fn bounded<T, F>(&self, query: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, DbErr>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(map_db_err),
            Err(_) => {
                warn!(query, timeout = ?self.query_timeout, "Query timed out");
                Err(AppError::internal(format!(
                    "{} timed out after {:?}",
                    query, self.query_timeout
                )))
            }
        }
    }
}

/// Translate driver errors into the shared taxonomy.
fn map_db_err(err: DbErr) -> AppError {
    err.sql_err()
        .and_then(map_sql_err)
        .unwrap_or_else(|| AppError::from(err))
}

/// Constraint violations callers can act on; `None` for everything else.
fn map_sql_err(err: SqlErr) -> Option<AppError> {
    match err {
        SqlErr::UniqueConstraintViolation(detail) => {
            warn!("Unique constraint violation: {}", detail);
            Some(AppError::bad_request(DUPLICATE_EMAIL))
        }
        _ => None,
    }
}

/// A guarded write that touched no row lost its race.
fn ensure_affected(rows_affected: u64, message: &'static str) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::internal(message));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<Uuid> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = self
            .bounded("insert user", active_model.insert(&self.db))
            .await?;
        Ok(model.id)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = self
            .bounded(
                "select users",
                UserEntity::find()
                    .order_by_asc(user::Column::CreatedAt)
                    .all(&self.db),
            )
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        self.bounded("select user by id", UserEntity::find_by_id(id).one(&self.db))
            .await?
            .map(User::from)
            .ok_or(AppError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.bounded(
            "select user by email",
            UserEntity::find()
                .filter(user::Column::Email.eq(email))
                .one(&self.db),
        )
        .await?
        .map(User::from)
        .ok_or(AppError::NotFound)
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let result = self
            .bounded(
                "update user",
                UserEntity::update_many()
                    .col_expr(user::Column::Name, Expr::value(user.name.clone()))
                    .col_expr(user::Column::Email, Expr::value(user.email.clone()))
                    .col_expr(
                        user::Column::PasswordHash,
                        Expr::value(user.password_hash.clone()),
                    )
                    .col_expr(user::Column::Version, Expr::value(user.version + 1))
                    .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(user::Column::Id.eq(user.id))
                    .filter(user::Column::Version.eq(user.version))
                    .exec(&self.db),
            )
            .await?;

        ensure_affected(result.rows_affected, "no rows were updated")
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = self
            .bounded("delete user", UserEntity::delete_by_id(id).exec(&self.db))
            .await?;

        ensure_affected(result.rows_affected, "no rows were deleted")
    }
}
