//! Department service - manager-only department management.
//!
//! Deletion is protected: a department referenced by any user or ticket
//! cannot be removed.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{require_manager, Actor, Department};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Department service trait for dependency injection.
#[async_trait]
pub trait DepartmentService: Send + Sync {
    /// All departments, visible to any authenticated user (the ticket form
    /// needs them).
    async fn list_departments(&self) -> AppResult<Vec<Department>>;

    async fn get_department(&self, id: Uuid) -> AppResult<Department>;

    /// Create a department with a unique name.
    async fn create_department(&self, actor: &Actor, name: String) -> AppResult<Department>;

    /// Delete a department, refused while users or tickets reference it.
    async fn delete_department(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of DepartmentService using Unit of Work.
pub struct DepartmentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DepartmentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DepartmentService for DepartmentManager<U> {
    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        self.uow.departments().list().await
    }

    async fn get_department(&self, id: Uuid) -> AppResult<Department> {
        self.uow.departments().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create_department(&self, actor: &Actor, name: String) -> AppResult<Department> {
        require_manager(actor)?;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Department name cannot be empty."));
        }
        if self.uow.departments().find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("Department"));
        }

        self.uow.departments().create(name).await
    }

    async fn delete_department(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        require_manager(actor)?;

        // Make sure it exists before reporting reference counts.
        self.uow.departments().find_by_id(id).await?.ok_or_not_found()?;

        let member_count = self.uow.users().count_in_department(id).await?;
        if member_count > 0 {
            return Err(AppError::referenced(
                "Department still has members assigned to it.",
            ));
        }

        let ticket_count = self.uow.tickets().count_in_department(id).await?;
        if ticket_count > 0 {
            return Err(AppError::referenced(
                "Department still has tickets filed against it.",
            ));
        }

        self.uow.departments().delete(id).await
    }
}
