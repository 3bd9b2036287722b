//! Role administration handlers (managers only).

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Role, User, UserResponse};
use crate::errors::AppResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetRoleRequest {
    #[schema(example = "support")]
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetDepartmentRequest {
    /// Null clears the membership
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Narrow the listing to a single account
    pub user_id: Option<Uuid>,
}

/// Create role administration routes
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/support", get(list_support))
        .route("/users/:id/role", put(set_role))
        .route("/users/:id/department", put(set_department))
}

/// List all accounts, optionally narrowed to one user id
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Administration",
    params(UserListQuery),
    responses(
        (status = 200, description = "All accounts", body = [UserResponse]),
        (status = 403, description = "Managers only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.role_service.list_users(&current_user.actor()).await?;
    let users = filter_by_user_id(users, query.user_id);
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

fn filter_by_user_id(users: Vec<User>, user_id: Option<Uuid>) -> Vec<User> {
    match user_id {
        Some(id) => users.into_iter().filter(|u| u.id == id).collect(),
        None => users,
    }
}

/// List support accounts (assignment candidates)
#[utoipa::path(
    get,
    path = "/admin/support",
    tag = "Administration",
    responses(
        (status = 200, description = "Support accounts", body = [UserResponse]),
        (status = 403, description = "Managers only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_support(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state
        .role_service
        .list_support(&current_user.actor())
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Replace an account's role
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    tag = "Administration",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 403, description = "Managers only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_role(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .role_service
        .set_role(&current_user.actor(), id, payload.role)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Set or clear an account's department membership
#[utoipa::path(
    put,
    path = "/admin/users/{id}/department",
    tag = "Administration",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetDepartmentRequest,
    responses(
        (status = 200, description = "Membership updated", body = UserResponse),
        (status = 403, description = "Managers only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_department(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SetDepartmentRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .role_service
        .set_department(&current_user.actor(), id, payload.department_id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}
