//! Helpdesk - Role-based ticketing API
//!
//! A REST API for internal helpdesk ticketing built on Axum with a
//! clean architecture layout. Employees file tickets, support staff
//! work them, and managers triage, assign, and administer roles.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and access policy
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, cache, blob storage)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Role, Ticket, TicketStatus, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
