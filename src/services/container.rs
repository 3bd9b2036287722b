//! Service container - centralized service access.
//!
//! Handlers depend on the container trait, not on concrete services, so
//! tests can swap in mocks wholesale.

use std::sync::Arc;

use super::{AuthService, DepartmentService, RoleService, TicketService};
use crate::config::Config;
use crate::infra::{FsAttachmentStore, Persistence};

#[cfg(test)]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(test, automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get ticket service
    fn tickets(&self) -> Arc<dyn TicketService>;

    /// Get role administration service
    fn roles(&self) -> Arc<dyn RoleService>;

    /// Get department service
    fn departments(&self) -> Arc<dyn DepartmentService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    ticket_service: Arc<dyn TicketService>,
    role_service: Arc<dyn RoleService>,
    department_service: Arc<dyn DepartmentService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        ticket_service: Arc<dyn TicketService>,
        role_service: Arc<dyn RoleService>,
        department_service: Arc<dyn DepartmentService>,
    ) -> Self {
        Self {
            auth_service,
            ticket_service,
            role_service,
            department_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: Arc<sea_orm::DatabaseConnection>, config: Config) -> Self {
        use super::{Authenticator, DepartmentManager, RoleAdmin, TicketDesk};

        let uow = Arc::new(Persistence::new(db));
        let store = Arc::new(FsAttachmentStore::new(config.attachment_dir.clone()));
        let restrict = config.restrict_assignment_to_department;

        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let ticket_service = Arc::new(TicketDesk::new(uow.clone(), store, restrict));
        let role_service = Arc::new(RoleAdmin::new(uow.clone()));
        let department_service = Arc::new(DepartmentManager::new(uow));

        Self {
            auth_service,
            ticket_service,
            role_service,
            department_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn tickets(&self) -> Arc<dyn TicketService> {
        self.ticket_service.clone()
    }

    fn roles(&self) -> Arc<dyn RoleService> {
        self.role_service.clone()
    }

    fn departments(&self) -> Arc<dyn DepartmentService> {
        self.department_service.clone()
    }
}
