//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain policy and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
pub mod container;
mod department_service;
mod role_service;
mod ticket_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use department_service::{DepartmentManager, DepartmentService};
pub use role_service::{RoleAdmin, RoleService};
pub use ticket_service::{
    TicketDesk, TicketDetail, TicketListing, TicketService, TriageUpdate,
};

#[cfg(test)]
pub use container::MockServiceContainer;
