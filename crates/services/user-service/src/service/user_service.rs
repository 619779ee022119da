//! User service - Handles user-related business logic.
//!
//! Stateless facade over the storage port and the credential codec. Both
//! transport adapters call into the same instance.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{CreateUser, DomainError, NewUser, PasswordCodec, UpdateUser, User, INCORRECT_PASSWORD};

use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a user and return the identifier assigned by storage
    async fn create(&self, dto: CreateUser) -> AppResult<Uuid>;

    /// List every user
    async fn get_all(&self) -> AppResult<Vec<User>>;

    /// Get user by ID
    async fn get_by_uuid(&self, id: Uuid) -> AppResult<User>;

    /// Look a user up by email and check the password against the stored digest
    async fn get_by_email_and_password(&self, email: &str, password: &str) -> AppResult<User>;

    /// Apply a partial update authorized by the current password
    async fn update(&self, dto: UpdateUser) -> AppResult<()>;

    /// Delete user by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using repository and codec.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordCodec>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(repo: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordCodec>) -> Self {
        Self { repo, passwords }
    }

    /// Hash off the async executor; Argon2 is deliberately slow.
    async fn hash(&self, plain_text: &str) -> AppResult<String> {
        let passwords = Arc::clone(&self.passwords);
        let plain_text = plain_text.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    async fn verify(&self, digest: &str, plain_text: &str) -> AppResult<bool> {
        let passwords = Arc::clone(&self.passwords);
        let digest = digest.to_string();
        let plain_text = plain_text.to_string();
        tokio::task::spawn_blocking(move || passwords.verify(&digest, &plain_text))
            .await
            .map_err(|e| AppError::internal(format!("verification task failed: {}", e)))
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create(&self, dto: CreateUser) -> AppResult<Uuid> {
        dto.check()?;

        let password_hash = self
            .hash(&dto.password)
            .await
            .map_err(|e| e.context("create user"))?;

        self.repo
            .create(NewUser {
                name: dto.name,
                email: dto.email,
                password_hash,
            })
            .await
            .map_err(|e| e.context("create user"))
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        self.repo
            .find_all()
            .await
            .map_err(|e| e.context("find all users"))
    }

    async fn get_by_uuid(&self, id: Uuid) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| e.context("find user by uuid"))
    }

    async fn get_by_email_and_password(&self, email: &str, password: &str) -> AppResult<User> {
        if email.is_empty() {
            return Err(AppError::validation("email must not be empty"));
        }
        if password.is_empty() {
            return Err(AppError::validation("password must not be empty"));
        }

        let user = self
            .repo
            .find_by_email(email)
            .await
            .map_err(|e| e.context("find user by email"))?;

        if !self.verify(&user.password_hash, password).await? {
            return Err(DomainError::password(INCORRECT_PASSWORD).into());
        }

        Ok(user)
    }

    async fn update(&self, dto: UpdateUser) -> AppResult<()> {
        dto.check()?;

        let user = self
            .repo
            .find_by_id(dto.id)
            .await
            .map_err(|e| e.context("update user"))?;

        if !self.verify(&user.password_hash, &dto.password).await? {
            return Err(DomainError::password(INCORRECT_PASSWORD).into());
        }

        let password_hash = match dto.password_change()? {
            Some(new_password) => Some(
                self.hash(new_password)
                    .await
                    .map_err(|e| e.context("update user"))?,
            ),
            None => None,
        };

        let merged = user.merge(dto.name, dto.email, password_hash);
        self.repo
            .update(&merged)
            .await
            .map_err(|e| e.context("update user"))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        // Load first so a missing user surfaces as NotFound. The row can
        // still vanish before the delete; that race reports an internal error.
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| e.context("delete user"))?;

        self.repo
            .delete(id)
            .await
            .map_err(|e| e.context("delete user"))
    }
}
