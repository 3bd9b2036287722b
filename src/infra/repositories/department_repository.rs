//! Department repository - data access for departments.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::department::{self, Entity as DepartmentEntity};
use crate::domain::Department;
use crate::errors::{AppError, AppResult};

/// Department repository trait for dependency injection.
///
/// Deletion here is unconditional; the protect-on-delete rule (no delete
/// while users or tickets reference the department) lives in the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>>;

    /// All departments, ordered by name.
    async fn list(&self) -> AppResult<Vec<Department>>;

    async fn create(&self, name: String) -> AppResult<Department>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation of DepartmentRepository.
pub struct DepartmentStore {
    db: std::sync::Arc<DatabaseConnection>,
}

impl DepartmentStore {
    pub fn new(db: std::sync::Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DepartmentRepository for DepartmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>> {
        let model = DepartmentEntity::find_by_id(id).one(&*self.db).await?;
        Ok(model.map(Department::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>> {
        let model = DepartmentEntity::find()
            .filter(department::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(model.map(Department::from))
    }

    async fn list(&self) -> AppResult<Vec<Department>> {
        let models = DepartmentEntity::find()
            .order_by_asc(department::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(Department::from).collect())
    }

    async fn create(&self, name: String) -> AppResult<Department> {
        let active = department::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
        };

        let model = active.insert(&*self.db).await?;
        Ok(Department::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = DepartmentEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        model.delete(&*self.db).await?;
        Ok(())
    }
}
