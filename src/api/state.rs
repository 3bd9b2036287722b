//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::{Cache, Database, UserRepository, UserStore};
use crate::services::{
    AuthService, DepartmentService, RoleService, ServiceContainer, Services, TicketService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Ticket lifecycle service
    pub ticket_service: Arc<dyn TicketService>,
    /// Role administration service
    pub role_service: Arc<dyn RoleService>,
    /// Department service
    pub department_service: Arc<dyn DepartmentService>,
    /// User lookup for the auth middleware (current role is read per
    /// request, so role changes apply immediately)
    pub users: Arc<dyn UserRepository>,
    /// Redis cache
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: crate::config::Config,
    ) -> Self {
        let container = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));
        let users = Arc::new(UserStore::new(database.get_connection()));

        Self {
            auth_service: container.auth(),
            ticket_service: container.tickets(),
            role_service: container.roles(),
            department_service: container.departments(),
            users,
            cache,
            database,
        }
    }
}
