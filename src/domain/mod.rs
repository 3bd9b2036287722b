//! Domain layer - core business entities and the policy engine.
//!
//! Everything here is infrastructure-free: entities, value objects, and the
//! pure authorization/lifecycle rules the services compose with storage.

pub mod department;
pub mod password;
pub mod policy;
pub mod ticket;
pub mod user;

pub use department::Department;
pub use password::Password;
pub use policy::{
    can_comment, can_view, can_view_internal_notes, check_assignment_candidate, check_comment,
    check_update_status, check_view, comment_visible, effective_internal_flag, require_manager,
    visible_comments, Actor,
};
pub use ticket::{
    generate_ticket_code, validate_attachments, AttachmentUpload, Ticket, TicketAttachment,
    TicketComment, TicketStatus,
};
pub use user::{Role, User, UserResponse};
