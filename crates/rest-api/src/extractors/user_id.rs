//! User identifier path extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use common::{parse_user_id, AppError};

/// The `{id}` path segment parsed as a user UUID.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        parse_user_id(raw.trim()).map(UserId)
    }
}
