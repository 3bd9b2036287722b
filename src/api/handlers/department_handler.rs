//! Department handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Department;
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: Uuid,
    #[schema(example = "IT")]
    pub name: String,
}

impl From<Department> for DepartmentResponse {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, message = "Department name cannot be empty."))]
    #[schema(example = "IT")]
    pub name: String,
}

/// Create department routes
pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/:id", delete(delete_department))
}

/// List all departments
#[utoipa::path(
    get,
    path = "/departments",
    tag = "Departments",
    responses(
        (status = 200, description = "All departments", body = [DepartmentResponse]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_departments(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DepartmentResponse>>> {
    let departments = state.department_service.list_departments().await?;
    Ok(Json(
        departments.into_iter().map(DepartmentResponse::from).collect(),
    ))
}

/// Create a department (managers only)
#[utoipa::path(
    post,
    path = "/departments",
    tag = "Departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 403, description = "Managers only"),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_department(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateDepartmentRequest>,
) -> AppResult<Created<DepartmentResponse>> {
    let department = state
        .department_service
        .create_department(&current_user.actor(), payload.name)
        .await?;

    Ok(Created(DepartmentResponse::from(department)))
}

/// Delete a department (managers only, refused while referenced)
#[utoipa::path(
    delete,
    path = "/departments/{id}",
    tag = "Departments",
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still referenced by users or tickets")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .department_service
        .delete_department(&current_user.actor(), id)
        .await?;

    Ok(NoContent)
}
