//! Repository layer
//!
//! Trait-based repositories over SeaORM entities. Services depend on the
//! traits; tests swap in the generated mocks.

pub mod department_repository;
pub mod entities;
pub mod ticket_repository;
pub mod user_repository;

pub use department_repository::{DepartmentRepository, DepartmentStore};
pub use ticket_repository::{TicketRepository, TicketStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use department_repository::MockDepartmentRepository;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
