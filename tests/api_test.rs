//! Integration tests for the HTTP-facing contract.
//!
//! These tests use mock services against the public crate API, without
//! requiring actual database or Redis connections.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use uuid::Uuid;

use helpdesk::domain::{Role, User, UserResponse};
use helpdesk::errors::{AppError, AppResult};
use helpdesk::services::{AuthService, Claims, TokenResponse};

// =============================================================================
// Mock Services for Testing
// =============================================================================

/// Mock auth service that returns predefined responses
struct MockAuthService;

#[async_trait]
impl AuthService for MockAuthService {
    async fn register(&self, email: String, _password: String, name: String) -> AppResult<User> {
        // New accounts always start as Employee, never anything elevated.
        Ok(User::new(Uuid::new_v4(), email, "hashed".to_string(), name))
    }

    async fn login(&self, _email: String, _password: String) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: "mock-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token == "valid-test-token" {
            Ok(Claims {
                sub: Uuid::new_v4(),
                email: "test@example.com".to_string(),
                role: "employee".to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

// =============================================================================
// Authentication Contract Tests
// =============================================================================

#[tokio::test]
async fn registration_always_yields_an_employee_account() {
    let auth = MockAuthService;
    let user = auth
        .register(
            "new@example.com".to_string(),
            "password123".to_string(),
            "New User".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(user.role, Role::Employee);
    assert!(user.department_id.is_none());

    let response = UserResponse::from(user);
    assert_eq!(response.role, "employee");
}

#[tokio::test]
async fn token_verification_rejects_unknown_tokens() {
    let auth = MockAuthService;
    assert!(auth.verify_token("valid-test-token").is_ok());
    assert!(matches!(
        auth.verify_token("garbage"),
        Err(AppError::Unauthorized)
    ));
}

#[test]
fn user_serialization_never_exposes_the_password_hash() {
    let user = User::new(
        Uuid::new_v4(),
        "dana@example.com".to_string(),
        "secret-hash".to_string(),
        "Dana".to_string(),
    );
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("secret-hash"));
    assert!(!json.contains("password_hash"));
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[test]
fn authorization_denials_map_to_forbidden() {
    let response = AppError::forbidden("Managers only.").into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn validation_failures_map_to_bad_request() {
    let response = AppError::validation("Each file must be <= 10MB.").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn missing_resources_map_to_not_found() {
    let response = AppError::NotFound.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn protected_deletions_map_to_conflict() {
    let response = AppError::referenced("Department still has members assigned to it.")
        .into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[test]
fn credential_failures_map_to_unauthorized() {
    let response = AppError::InvalidCredentials.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn error_bodies_carry_code_and_message() {
    let response = AppError::forbidden("Not your ticket.").into_response();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["message"], "Not your ticket.");
}

#[tokio::test]
async fn internal_errors_hide_their_details() {
    let response = AppError::internal("connection pool exhausted").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["message"], "An internal error occurred");
}

// =============================================================================
// Response Type Tests
// =============================================================================

#[test]
fn api_response_wraps_data() {
    use helpdesk::types::ApiResponse;

    let response: ApiResponse<String> = ApiResponse::success("test data".to_string());
    assert!(response.success);
    assert_eq!(response.data.unwrap(), "test data");
}

#[test]
fn roles_and_statuses_serialize_in_wire_format() {
    use helpdesk::domain::TicketStatus;

    assert_eq!(serde_json::to_string(&Role::Support).unwrap(), "\"support\"");
    assert_eq!(
        serde_json::to_string(&TicketStatus::WaitingEmployee).unwrap(),
        "\"waiting_employee\""
    );
    assert_eq!(
        serde_json::from_str::<TicketStatus>("\"in_progress\"").unwrap(),
        TicketStatus::InProgress
    );
}
