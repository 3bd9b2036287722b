//! Ticket aggregate: the ticket entity, its status machine, comments,
//! attachments, and attachment upload validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    ALLOWED_ATTACHMENT_TYPES, DUPLICATE_SUBJECT_PREFIX, MAX_ATTACHMENT_BYTES, TICKET_CODE_HEX_LEN,
    TICKET_CODE_PREFIX,
};
use crate::errors::{AppError, AppResult};

/// Ticket lifecycle states.
///
/// A closed enumeration with no enforced transition graph: any role allowed
/// to edit status may set any value, including reopening Resolved/Closed
/// tickets. The one forced transition is assignment, which always puts the
/// ticket InProgress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    InProgress,
    WaitingEmployee,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::WaitingEmployee => "waiting_employee",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "new" => Ok(TicketStatus::New),
            "in_progress" => Ok(TicketStatus::InProgress),
            "waiting_employee" => Ok(TicketStatus::WaitingEmployee),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(AppError::validation(format!("Unknown status: {}", other))),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TicketStatus {
    fn from(s: &str) -> Self {
        TicketStatus::parse(s).unwrap_or(TicketStatus::New)
    }
}

/// Generate a human-readable ticket code, e.g. `TCK3F9A01BC`.
///
/// Distinct from the storage primary key; generated once at creation and
/// never changed by any update.
pub fn generate_ticket_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}",
        TICKET_CODE_PREFIX,
        hex[..TICKET_CODE_HEX_LEN].to_uppercase()
    )
}

/// Ticket domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    /// Immutable human-readable code, unique across the system.
    pub ticket_code: String,
    /// The creating employee. Immutable after creation.
    pub employee_id: Uuid,
    pub department_id: Uuid,
    /// Assigned support actor, if any.
    pub assigned_support_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    /// Manager-visible/writable free text.
    pub internal_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a new ticket: creator becomes the employee, status starts New,
    /// no support assigned, fresh ticket code.
    pub fn new(employee_id: Uuid, department_id: Uuid, subject: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ticket_code: generate_ticket_code(),
            employee_id,
            department_id,
            assigned_support_id: None,
            subject,
            description,
            status: TicketStatus::New,
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the duplicate of this ticket: same employee, department and
    /// description, subject prefixed, status reset to New, unassigned,
    /// internal notes cleared, fresh code.
    pub fn duplicate(&self) -> Ticket {
        Ticket::new(
            self.employee_id,
            self.department_id,
            format!("{}{}", DUPLICATE_SUBJECT_PREFIX, self.subject),
            self.description.clone(),
        )
    }

    /// Message of the system comment appended to a duplicate.
    pub fn duplication_notice(&self) -> String {
        format!("Duplicated from {}.", self.ticket_code)
    }
}

/// A comment on a ticket. Immutable once created; displayed oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketComment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    /// None when the author account was later removed.
    pub author_id: Option<Uuid>,
    pub message: String,
    /// Internal comments are hidden from the ticket's employee.
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

/// An attachment record pointing at a stored blob. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAttachment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    /// Blob path of the form `<ticket_code>/<filename>`. Duplicated tickets
    /// share the original blob path (shallow copy).
    pub file_path: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

/// An uploaded file, not yet validated or stored.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Validate uploads against the attachment policy: allow-listed content
/// types and a 10 MiB per-file cap. Fails fast on the first violation so
/// that no partial ticket is ever persisted.
pub fn validate_attachments(files: &[AttachmentUpload]) -> AppResult<()> {
    for file in files {
        if !ALLOWED_ATTACHMENT_TYPES.contains(&file.content_type.as_str()) {
            return Err(AppError::validation(
                "Only PDF and image files are allowed.",
            ));
        }
        if file.data.len() > MAX_ATTACHMENT_BYTES {
            return Err(AppError::validation("Each file must be <= 10MB."));
        }
    }
    Ok(())
}
