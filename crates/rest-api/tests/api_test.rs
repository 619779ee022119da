//! Integration tests for the REST endpoints.
//!
//! The router runs against the real domain service over in-memory storage,
//! or against a stub service when a failure has to be injected.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{AppError, AppResult, CorsConfig};
use domain::{Argon2Codec, CreateUser, UpdateUser, User};
use rest_api_lib::routes::create_router;
use rest_api_lib::state::AppState;
use user_service_lib::repository::InMemoryUserStore;
use user_service_lib::service::{UserManager, UserService};

// =============================================================================
// Test Setup
// =============================================================================

fn app() -> Router {
    let codec = Argon2Codec::new(1024, 1, 1).unwrap();
    let service = UserManager::new(Arc::new(InMemoryUserStore::new()), Arc::new(codec));
    create_router(AppState::new(Arc::new(service)), &CorsConfig::default())
}

/// Service whose storage is always down
struct BrokenUserService;

#[async_trait]
impl UserService for BrokenUserService {
    async fn create(&self, _dto: CreateUser) -> AppResult<Uuid> {
        Err(AppError::internal("connection refused").context("create user"))
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        Err(AppError::internal("connection refused").context("find all users"))
    }

    async fn get_by_uuid(&self, _id: Uuid) -> AppResult<User> {
        Err(AppError::internal("connection refused").context("find user by uuid"))
    }

    async fn get_by_email_and_password(&self, _email: &str, _password: &str) -> AppResult<User> {
        Err(AppError::internal("connection refused").context("find user by email"))
    }

    async fn update(&self, _dto: UpdateUser) -> AppResult<()> {
        Err(AppError::internal("no rows were updated").context("update user"))
    }

    async fn delete(&self, _id: Uuid) -> AppResult<()> {
        Err(AppError::internal("no rows were deleted").context("delete user"))
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create Ann and return the `Location` header value.
async fn create_ann(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/users",
            json!({
                "name": "Ann",
                "email": "ann@x.com",
                "password": "p1",
                "password_confirmation": "p1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

fn assert_envelope(body: &Value, code: &str) {
    assert_eq!(body["error"]["code"], code);
    assert!(body["error"]["message"].is_string());
    assert!(body["error"]["developer_message"].is_string());
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_heartbeat() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/api/heartbeat"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app();
    let location = create_ann(&app).await;
    assert!(location.starts_with("/users/"));

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, &location))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(format!("/users/{}", body["uuid"].as_str().unwrap()), location);
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["email"], "ann@x.com");
    assert_ne!(body["password"], "p1");
}

#[tokio::test]
async fn test_create_with_mismatched_confirmation() {
    let response = app()
        .oneshot(json_request(
            Method::POST,
            "/users",
            json!({
                "name": "Ann",
                "email": "ann@x.com",
                "password": "p1",
                "password_confirmation": "p2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_envelope(&body, "US-000400");
    assert_eq!(body["error"]["developer_message"], "something wrong with user data");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_envelope(&body_json(response).await, "US-000400");
}

#[tokio::test]
async fn test_duplicate_email_is_bad_request() {
    let app = app();
    create_ann(&app).await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/users",
            json!({
                "name": "Ann Again",
                "email": "ann@x.com",
                "password": "p2",
                "password_confirmation": "p2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_and_credential_lookup() {
    let app = app();
    let location = create_ann(&app).await;

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/users"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            "/users?email=ann%40x.com&password=p1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(format!("/users/{}", body["uuid"].as_str().unwrap()), location);

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            "/users?email=ann%40x.com&password=wrong",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "incorrect password");

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/users?email=ann%40x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/users?email=nobody%40x.com&password=p1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = app();

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/users/{}", Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_envelope(&body, "US-000404");
    assert_eq!(body["error"]["message"], "not found");

    let response = app
        .oneshot(empty_request(Method::DELETE, "/users/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_envelope(&body_json(response).await, "US-000400");
}

#[tokio::test]
async fn test_empty_id_is_validation_error() {
    let app = app();

    for method in [Method::GET, Method::PATCH, Method::DELETE] {
        let response = app
            .clone()
            .oneshot(json_request(method.clone(), "/users/", json!({ "password": "p1" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", method);
        let body = body_json(response).await;
        assert_envelope(&body, "US-000400");
        assert_eq!(body["error"]["message"], "user uuid must not be empty");
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found_envelope() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/accounts"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_envelope(&body_json(response).await, "US-000404");
}

#[tokio::test]
async fn test_patch_updates_present_fields_only() {
    let app = app();
    let location = create_ann(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &location,
            json!({ "password": "p1", "email": "new@x.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = body_json(
        app.clone()
            .oneshot(empty_request(Method::GET, &location))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["email"], "new@x.com");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &location,
            json!({ "password": "wrong", "name": "Mallory" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &location,
            json!({ "password": "p1", "new_password": "p2", "new_password_confirmation": "p3" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = app();
    let location = create_ann(&app).await;

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &location))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request(Method::GET, &location))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_internal_failure_is_hidden() {
    let app = create_router(
        AppState::new(Arc::new(BrokenUserService)),
        &CorsConfig::default(),
    );

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/users/{}", Uuid::new_v4()),
            json!({ "password": "p1", "name": "Annie" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 418);
    let body = body_json(response).await;
    assert_envelope(&body, "US-000418");
    assert_eq!(body["error"]["message"], "internal system error");
    assert!(!body.to_string().contains("no rows"));
}

#[tokio::test]
async fn test_cors_exposes_location() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/heartbeat")
                .header(header::ORIGIN, "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let exposed = response
        .headers()
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("location"));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/api-docs/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/users/{id}"].is_object());
    assert_eq!(
        body["components"]["schemas"]["CreateUser"]["properties"]["name"]["example"],
        "Ann"
    );
    assert_eq!(
        body["components"]["schemas"]["UpdateUserRequest"]["properties"]["name"]["example"],
        "Annie"
    );
}
