//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{NEW_PASSWORD_CONFIRMATION_REQUIRED, PASSWORDS_DO_NOT_MATCH};
use crate::error::{DomainError, DomainResult};

/// User domain entity.
///
/// `password_hash` always holds a codec digest, never plaintext.
/// `version` is the optimistic concurrency token bumped by every write.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Don't expose the digest in debug output
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("version", &self.version)
            .finish()
    }
}

impl User {
    /// Apply the sparse changes of an update: `None` keeps the stored value.
    pub fn merge(
        mut self,
        name: Option<String>,
        email: Option<String>,
        password_hash: Option<String>,
    ) -> Self {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(password_hash) = password_hash {
            self.password_hash = password_hash;
        }
        self
    }
}

/// A user about to be persisted; storage assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUser {
    /// User display name
    #[validate(length(min = 1, message = "name must not be empty"))]
    #[cfg_attr(feature = "openapi", schema(example = "Ann"))]
    pub name: String,
    /// User email address, unique across users
    #[validate(length(min = 1, message = "email must not be empty"))]
    #[cfg_attr(feature = "openapi", schema(example = "ann@example.com"))]
    pub email: String,
    /// Plaintext password
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    /// Must repeat `password` exactly
    #[validate(
        length(min = 1, message = "password confirmation must not be empty"),
        must_match(other = "password", message = "password does not match password confirmation")
    )]
    pub password_confirmation: String,
}

impl CreateUser {
    /// Check required fields and password confirmation.
    pub fn check(&self) -> DomainResult<()> {
        self.validate().map_err(DomainError::from)
    }
}

/// Partial user update.
///
/// `password` is the current password and authorizes the change. Every
/// `Option` field left as `None` means "no change"; an explicitly empty
/// value is rejected rather than treated as absent.
#[derive(Debug, Clone, Validate)]
pub struct UpdateUser {
    pub id: Uuid,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "new password must not be empty"))]
    pub new_password: Option<String>,
    pub new_password_confirmation: Option<String>,
}

impl UpdateUser {
    /// Check required and present fields.
    pub fn check(&self) -> DomainResult<()> {
        self.validate().map_err(DomainError::from)
    }

    /// The confirmed new password, if a password change was requested.
    ///
    /// # Errors
    /// Fails when the confirmation is missing or differs from the new password.
    pub fn password_change(&self) -> DomainResult<Option<&str>> {
        let Some(new_password) = self.new_password.as_deref() else {
            return Ok(None);
        };

        match self.new_password_confirmation.as_deref() {
            None => Err(DomainError::password(NEW_PASSWORD_CONFIRMATION_REQUIRED)),
            Some(confirmation) if confirmation != new_password => {
                Err(DomainError::password(PASSWORDS_DO_NOT_MATCH))
            }
            Some(_) => Ok(Some(new_password)),
        }
    }
}

/// User representation returned by both transports.
///
/// `password` carries the stored digest, never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub uuid: Uuid,
    /// User display name
    pub name: String,
    /// User email address
    pub email: String,
    /// Password digest
    pub password: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uuid: user.id,
            name: user.name,
            email: user.email,
            password: user.password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(password: &str, confirmation: &str) -> CreateUser {
        CreateUser {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    fn update() -> UpdateUser {
        UpdateUser {
            id: Uuid::new_v4(),
            password: "current".to_string(),
            name: None,
            email: None,
            new_password: None,
            new_password_confirmation: None,
        }
    }

    fn stored_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "digest".to_string(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_accepts_matching_passwords() {
        assert!(create("p1", "p1").check().is_ok());
    }

    #[test]
    fn test_create_rejects_mismatched_passwords() {
        for (password, confirmation) in [("p1", "p2"), ("abc", "ABC"), ("x", "x ")] {
            let err = create(password, confirmation).check().unwrap_err();
            assert_eq!(
                err,
                DomainError::validation("password does not match password confirmation")
            );
        }
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let mut dto = create("p1", "p1");
        dto.name.clear();
        assert_eq!(
            dto.check().unwrap_err(),
            DomainError::validation("name must not be empty")
        );

        let mut dto = create("p1", "p1");
        dto.email.clear();
        assert_eq!(
            dto.check().unwrap_err(),
            DomainError::validation("email must not be empty")
        );
    }

    #[test]
    fn test_update_rejects_explicitly_empty_name() {
        let mut dto = update();
        dto.name = Some(String::new());
        assert!(matches!(dto.check(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_update_requires_current_password() {
        let mut dto = update();
        dto.password.clear();
        assert_eq!(
            dto.check().unwrap_err(),
            DomainError::validation("password must not be empty")
        );
    }

    #[test]
    fn test_password_change_requires_confirmation() {
        let mut dto = update();
        dto.new_password = Some("next".to_string());
        assert_eq!(
            dto.password_change().unwrap_err(),
            DomainError::password(NEW_PASSWORD_CONFIRMATION_REQUIRED)
        );

        dto.new_password_confirmation = Some("other".to_string());
        assert_eq!(
            dto.password_change().unwrap_err(),
            DomainError::password(PASSWORDS_DO_NOT_MATCH)
        );

        dto.new_password_confirmation = Some("next".to_string());
        assert_eq!(dto.password_change().unwrap(), Some("next"));
    }

    #[test]
    fn test_password_change_absent() {
        let mut dto = update();
        dto.new_password_confirmation = Some("ignored".to_string());
        assert_eq!(dto.password_change().unwrap(), None);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let user = stored_user();
        let merged = user
            .clone()
            .merge(None, Some("new@x.com".to_string()), None);

        assert_eq!(merged.name, user.name);
        assert_eq!(merged.email, "new@x.com");
        assert_eq!(merged.password_hash, user.password_hash);
        assert_eq!(merged.version, user.version);
    }

    #[test]
    fn test_response_carries_digest() {
        let user = stored_user();
        let response = UserResponse::from(user.clone());
        assert_eq!(response.uuid, user.id);
        assert_eq!(response.password, "digest");
    }
}
