//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod department;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_comment;
pub mod user;
