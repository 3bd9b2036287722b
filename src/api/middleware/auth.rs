//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{Actor, Role};
use crate::errors::AppError;

/// Authenticated user attached to the request.
///
/// Built from the database row, not from the token claims: a role or
/// department change takes effect on the holder's very next request.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub department_id: Option<Uuid>,
}

impl CurrentUser {
    /// The policy-layer identity of this user.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role, self.department_id)
    }
}

/// JWT authentication middleware.
///
/// Validates the bearer token, loads the account it names, and injects a
/// CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let current_user = CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
        department_id: user.department_id,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
