//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Attachment blob storage
//! - Caching systems (Redis)
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    DepartmentRepository, DepartmentStore, TicketRepository, TicketStore, UserRepository,
    UserStore,
};
pub use storage::{AttachmentStore, FsAttachmentStore};
pub use unit_of_work::{Persistence, TransactionContext, TxTicketRepository, UnitOfWork};

#[cfg(test)]
pub use repositories::{MockDepartmentRepository, MockTicketRepository, MockUserRepository};
#[cfg(test)]
pub use storage::MockAttachmentStore;
