//! HTTP request handlers.

pub mod auth_handler;
pub mod department_handler;
pub mod role_handler;
pub mod ticket_handler;

pub use auth_handler::auth_routes;
pub use department_handler::department_routes;
pub use role_handler::role_routes;
pub use ticket_handler::ticket_routes;
