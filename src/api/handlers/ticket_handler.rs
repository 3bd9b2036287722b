//! Ticket handlers: creation, listing, detail, triage, status, comments,
//! assignment, duplication and attachment download.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{MAX_SUBJECT_LENGTH, MAX_UPLOAD_BODY_BYTES};
use crate::domain::{AttachmentUpload, Ticket, TicketAttachment, TicketComment, TicketStatus};
use crate::errors::{AppError, AppResult};
use crate::services::{TicketDetail, TicketListing, TriageUpdate};
use crate::types::{Created, Paginated};

/// Ticket as returned to clients. Internal notes are never part of this
/// shape; the detail response carries them separately for managers.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketResponse {
    pub id: Uuid,
    /// Human-readable code, e.g. "TCK3F9A01BC"
    #[schema(example = "TCK3F9A01BC")]
    pub ticket_code: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub department_id: Uuid,
    pub employee_id: Uuid,
    pub assigned_support_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            ticket_code: t.ticket_code,
            subject: t.subject,
            description: t.description,
            status: t.status,
            department_id: t.department_id,
            employee_id: t.employee_id,
            assigned_support_id: t.assigned_support_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub message: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TicketComment> for CommentResponse {
    fn from(c: TicketComment) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            message: c.message,
            is_internal: c.is_internal,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentResponse {
    pub id: Uuid,
    /// Original filename, as stored
    pub filename: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<TicketAttachment> for AttachmentResponse {
    fn from(a: TicketAttachment) -> Self {
        Self {
            id: a.id,
            filename: display_filename(&a.file_path),
            uploaded_by: a.uploaded_by,
            uploaded_at: a.uploaded_at,
        }
    }
}

/// Strip the storage prefix (`<ticket_code>/<tag>_`) back to the uploaded
/// name.
fn display_filename(file_path: &str) -> String {
    let component = file_path.rsplit('/').next().unwrap_or(file_path);
    match component.split_once('_') {
        Some((_, name)) if !name.is_empty() => name.to_string(),
        _ => component.to_string(),
    }
}

/// Ticket with everything its viewer may see.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketDetailResponse {
    pub ticket: TicketResponse,
    /// Present for managers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
    pub comments: Vec<CommentResponse>,
    pub attachments: Vec<AttachmentResponse>,
}

impl From<TicketDetail> for TicketDetailResponse {
    fn from(d: TicketDetail) -> Self {
        Self {
            ticket: TicketResponse::from(d.ticket),
            internal_notes: d.internal_notes,
            comments: d.comments.into_iter().map(CommentResponse::from).collect(),
            attachments: d
                .attachments
                .into_iter()
                .map(AttachmentResponse::from)
                .collect(),
        }
    }
}

/// Role-shaped listing payload.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TicketListResponse {
    All(Paginated<TicketResponse>),
    Queue {
        assigned: Vec<TicketResponse>,
        pool: Vec<TicketResponse>,
    },
    Own {
        tickets: Vec<TicketResponse>,
    },
}

impl From<TicketListing> for TicketListResponse {
    fn from(listing: TicketListing) -> Self {
        match listing {
            TicketListing::All(page) => {
                let meta = page.meta;
                TicketListResponse::All(Paginated {
                    data: page.data.into_iter().map(TicketResponse::from).collect(),
                    meta,
                })
            }
            TicketListing::Queue { assigned, pool } => TicketListResponse::Queue {
                assigned: assigned.into_iter().map(TicketResponse::from).collect(),
                pool: pool.into_iter().map(TicketResponse::from).collect(),
            },
            TicketListing::Own(tickets) => TicketListResponse::Own {
                tickets: tickets.into_iter().map(TicketResponse::from).collect(),
            },
        }
    }
}

/// Manager triage request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TriageRequest {
    pub status: TicketStatus,
    #[serde(default)]
    pub internal_notes: String,
    pub assigned_support_id: Option<Uuid>,
}

/// Status-only update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatusRequest {
    pub status: TicketStatus,
}

/// New comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "Comment message cannot be empty."))]
    pub message: String,
    /// Ignored for employees; their comments are always public
    #[serde(default)]
    pub is_internal: bool,
}

/// Assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignRequest {
    pub support_id: Uuid,
}

/// Create ticket routes
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_ticket).get(list_tickets))
        .route("/:id", get(ticket_detail))
        .route("/:id/triage", put(update_triage))
        .route("/:id/status", put(update_status))
        .route("/:id/comments", post(add_comment))
        .route("/:id/assign", post(assign_ticket))
        .route("/:id/duplicate", post(duplicate_ticket))
        .route("/:id/attachments/:attachment_id", get(download_attachment))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}

/// Parsed multipart form for ticket creation.
struct CreateTicketForm {
    department_id: Uuid,
    subject: String,
    description: String,
    files: Vec<AttachmentUpload>,
}

async fn parse_create_form(mut multipart: Multipart) -> AppResult<CreateTicketForm> {
    let mut department_id = None;
    let mut subject = None;
    let mut description = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("department_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::validation("Unknown department."))?;
                department_id = Some(id);
            }
            Some("subject") => {
                subject = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("description") => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("files") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                files.push(AttachmentUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let department_id =
        department_id.ok_or_else(|| AppError::validation("Department is required."))?;
    let subject = subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Subject is required."))?;
    if subject.len() as u64 > MAX_SUBJECT_LENGTH {
        return Err(AppError::validation("Subject is too long."));
    }
    let description = description
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Description is required."))?;

    Ok(CreateTicketForm {
        department_id,
        subject,
        description,
        files,
    })
}

/// Create a ticket with optional file attachments (multipart form)
#[utoipa::path(
    post,
    path = "/tickets",
    tag = "Tickets",
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Created<TicketResponse>> {
    let form = parse_create_form(multipart).await?;

    let ticket = state
        .ticket_service
        .create_ticket(
            &current_user.actor(),
            form.department_id,
            form.subject,
            form.description,
            form.files,
        )
        .await?;

    Ok(Created(TicketResponse::from(ticket)))
}

/// List tickets visible to the caller, shaped by role
#[utoipa::path(
    get,
    path = "/tickets",
    tag = "Tickets",
    params(crate::types::PaginationParams),
    responses(
        (status = 200, description = "Tickets the caller may see"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<crate::types::PaginationParams>,
) -> AppResult<Json<TicketListResponse>> {
    let listing = state
        .ticket_service
        .list_tickets(&current_user.actor(), &params)
        .await?;

    Ok(Json(TicketListResponse::from(listing)))
}

/// Get a ticket with its comments and attachments
#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket detail", body = TicketDetailResponse),
        (status = 403, description = "Not allowed to view this ticket"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn ticket_detail(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TicketDetailResponse>> {
    let detail = state
        .ticket_service
        .ticket_detail(&current_user.actor(), id)
        .await?;

    Ok(Json(TicketDetailResponse::from(detail)))
}

/// Manager triage: status, internal notes and assignment in one update
#[utoipa::path(
    put,
    path = "/tickets/{id}/triage",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = TriageRequest,
    responses(
        (status = 200, description = "Ticket updated", body = TicketResponse),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_triage(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<TriageRequest>,
) -> AppResult<Json<TicketResponse>> {
    let ticket = state
        .ticket_service
        .update_triage(
            &current_user.actor(),
            id,
            TriageUpdate {
                status: payload.status,
                internal_notes: payload.internal_notes,
                assigned_support_id: payload.assigned_support_id,
            },
        )
        .await?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Update a ticket's status
#[utoipa::path(
    put,
    path = "/tickets/{id}/status",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status updated", body = TicketResponse),
        (status = 403, description = "Not allowed to update this ticket"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<StatusRequest>,
) -> AppResult<Json<TicketResponse>> {
    let ticket = state
        .ticket_service
        .update_status(&current_user.actor(), id, payload.status)
        .await?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Comment on a ticket
#[utoipa::path(
    post,
    path = "/tickets/{id}/comments",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 403, description = "Not allowed to comment on this ticket"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CommentRequest>,
) -> AppResult<Created<CommentResponse>> {
    let comment = state
        .ticket_service
        .add_comment(
            &current_user.actor(),
            id,
            payload.message,
            payload.is_internal,
        )
        .await?;

    Ok(Created(CommentResponse::from(comment)))
}

/// Assign a support user to a ticket (moves it to in_progress)
#[utoipa::path(
    post,
    path = "/tickets/{id}/assign",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Ticket assigned", body = TicketResponse),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_ticket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AssignRequest>,
) -> AppResult<Json<TicketResponse>> {
    let ticket = state
        .ticket_service
        .assign(&current_user.actor(), id, payload.support_id)
        .await?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Duplicate a ticket (fresh copy, attachments shared, source referenced)
#[utoipa::path(
    post,
    path = "/tickets/{id}/duplicate",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 201, description = "Duplicate created", body = TicketResponse),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn duplicate_ticket(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Created<TicketResponse>> {
    let ticket = state
        .ticket_service
        .duplicate(&current_user.actor(), id)
        .await?;

    Ok(Created(TicketResponse::from(ticket)))
}

/// Download an attachment
#[utoipa::path(
    get,
    path = "/tickets/{id}/attachments/{attachment_id}",
    tag = "Tickets",
    params(
        ("id" = Uuid, Path, description = "Ticket id"),
        ("attachment_id" = Uuid, Path, description = "Attachment id")
    ),
    responses(
        (status = 200, description = "Attachment bytes"),
        (status = 403, description = "Not allowed to view this ticket"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_attachment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let (attachment, data) = state
        .ticket_service
        .download_attachment(&current_user.actor(), id, attachment_id)
        .await?;

    let filename = display_filename(&attachment.file_path);
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((StatusCode::OK, headers, data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_filename_strips_the_storage_tag() {
        assert_eq!(
            display_filename("TCK3F9A01BC/a1b2c3d4_report.pdf"),
            "report.pdf"
        );
        assert_eq!(display_filename("TCK3F9A01BC/plain"), "plain");
        assert_eq!(display_filename("loose.png"), "loose.png");
    }
}
