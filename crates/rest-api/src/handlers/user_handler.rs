//! User handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use common::{AppError, AppResult, EMPTY_USER_ID};
use domain::{CreateUser, UpdateUser, UserResponse};

use crate::extractors::{JsonBody, UserId};
use crate::state::AppState;

/// Partial update body; omitted fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Current password, required to authorize the change
    #[serde(default)]
    pub password: String,
    /// New display name
    #[schema(example = "Annie")]
    pub name: Option<String>,
    /// New email address
    #[schema(example = "annie@example.com")]
    pub email: Option<String>,
    /// New password
    pub new_password: Option<String>,
    /// Must repeat `new_password`
    pub new_password_confirmation: Option<String>,
}

/// Credentials for looking a user up instead of listing all users.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CredentialsQuery {
    /// Email of the user to look up
    pub email: Option<String>,
    /// Plaintext password checked against the stored digest
    pub password: Option<String>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/", any(missing_user_id))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

/// `/users/` with an empty id segment
pub async fn missing_user_id() -> AppError {
    AppError::validation(EMPTY_USER_ID)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created; `Location` points at it"),
        (status = 400, description = "Invalid user data or email taken", body = ErrorResponse),
        (status = 418, description = "Internal system error", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUser>,
) -> AppResult<Response> {
    let id = state.user_service.create(payload).await?;
    debug!(%id, "User created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", id))],
    )
        .into_response())
}

/// List all users, or look one up by email and password
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(CredentialsQuery),
    responses(
        (status = 200, description = "All users, or the single user matching the credentials", body = Vec<UserResponse>),
        (status = 400, description = "Incomplete credentials or incorrect password", body = ErrorResponse),
        (status = 404, description = "No user with this email", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<CredentialsQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(credentials) = query.map_err(|e| AppError::validation(e.body_text()))?;

    if credentials.email.is_none() && credentials.password.is_none() {
        let users = state.user_service.get_all().await?;
        let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        return Ok(Json(body).into_response());
    }

    let user = state
        .user_service
        .get_by_email_and_password(
            credentials.email.as_deref().unwrap_or_default(),
            credentials.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(UserResponse::from(user)).into_response())
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User UUID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_by_uuid(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Partially update a user
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User UUID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Invalid data or incorrect password", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 418, description = "Internal system error", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .update(UpdateUser {
            id,
            password: payload.password,
            name: payload.name,
            email: payload.email,
            new_password: payload.new_password,
            new_password_confirmation: payload.new_password_confirmation,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User UUID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<StatusCode> {
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
