//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, department_handler, role_handler, ticket_handler};
use crate::domain::{Role, TicketStatus, UserResponse};
use crate::services::TokenResponse;

/// OpenAPI documentation for the Helpdesk API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Helpdesk API",
        version = "0.1.0",
        description = "Role-based helpdesk ticketing API with Axum, SeaORM, and clean architecture"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Ticket endpoints
        ticket_handler::create_ticket,
        ticket_handler::list_tickets,
        ticket_handler::ticket_detail,
        ticket_handler::update_triage,
        ticket_handler::update_status,
        ticket_handler::add_comment,
        ticket_handler::assign_ticket,
        ticket_handler::duplicate_ticket,
        ticket_handler::download_attachment,
        // Department endpoints
        department_handler::list_departments,
        department_handler::create_department,
        department_handler::delete_department,
        // Administration endpoints
        role_handler::list_users,
        role_handler::list_support,
        role_handler::set_role,
        role_handler::set_department,
    ),
    components(
        schemas(
            // Domain types
            Role,
            TicketStatus,
            UserResponse,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Ticket types
            ticket_handler::TicketResponse,
            ticket_handler::TicketDetailResponse,
            ticket_handler::CommentResponse,
            ticket_handler::AttachmentResponse,
            ticket_handler::TriageRequest,
            ticket_handler::StatusRequest,
            ticket_handler::CommentRequest,
            ticket_handler::AssignRequest,
            // Department types
            department_handler::DepartmentResponse,
            department_handler::CreateDepartmentRequest,
            // Administration types
            role_handler::SetRoleRequest,
            role_handler::SetDepartmentRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Tickets", description = "Ticket lifecycle operations"),
        (name = "Departments", description = "Department management"),
        (name = "Administration", description = "Role administration (managers only)")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
