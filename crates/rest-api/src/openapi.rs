//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::user_handler::UpdateUserRequest;
use common::{ErrorBody, ErrorResponse};
use domain::{CreateUser, UserResponse};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::heartbeat,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
    ),
    components(
        schemas(
            CreateUser,
            UpdateUserRequest,
            UserResponse,
            ErrorResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Users", description = "User account management"),
        (name = "Health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;
