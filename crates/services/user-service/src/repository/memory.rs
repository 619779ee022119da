//! In-memory implementation of the storage port.
//!
//! Mirrors the Postgres store: unique emails, storage-assigned ids,
//! version-checked updates. Used for tests and local experiments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{NewUser, User};

use super::user_repository::{UserRepository, DUPLICATE_EMAIL};

/// User repository backed by a map guarded by an async lock.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<Uuid> {
        let mut users = self.users.write().await;
        if email_taken(&users, &new_user.email, None) {
            return Err(AppError::bad_request(DUPLICATE_EMAIL));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        // Same order as the guarded SQL write: no matching row means nothing to check
        let current = users
            .get(&user.id)
            .is_some_and(|stored| stored.version == user.version);
        if !current {
            return Err(AppError::internal("no rows were updated"));
        }
        if email_taken(&users, &user.email, Some(user.id)) {
            return Err(AppError::bad_request(DUPLICATE_EMAIL));
        }

        let Some(stored) = users.get_mut(&user.id) else {
            return Err(AppError::internal("no rows were updated"));
        };
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::internal("no rows were deleted")),
        }
    }
}
