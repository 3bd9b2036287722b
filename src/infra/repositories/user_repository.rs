//! User repository - data access for accounts and roles.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, Entity as UserEntity};
use crate::domain::{Role, User};
use crate::errors::{AppError, AppResult};

/// User repository trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new account. New accounts always get the Employee role.
    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User>;

    /// All users, ordered by name (role administration screen).
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Users holding a given role (assignment candidate list).
    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>>;

    /// Number of users belonging to a department (protect-on-delete check).
    async fn count_in_department(&self, department_id: Uuid) -> AppResult<u64>;

    /// Overwrite the user's single role.
    async fn update_role(&self, id: Uuid, role: Role) -> AppResult<User>;

    /// Set or clear the user's department membership.
    async fn set_department(&self, id: Uuid, department_id: Option<Uuid>) -> AppResult<User>;
}

/// SeaORM-backed implementation of UserRepository.
pub struct UserStore {
    db: std::sync::Arc<DatabaseConnection>,
}

impl UserStore {
    pub fn new(db: std::sync::Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id).one(&*self.db).await?;
        Ok(model.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn create(&self, email: String, password_hash: String, name: String) -> AppResult<User> {
        let now = Utc::now();
        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(name),
            role: Set(Role::Employee.to_string()),
            department_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&*self.db).await?;
        Ok(User::from(model))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .order_by_asc(user::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count_in_department(&self, department_id: Uuid) -> AppResult<u64> {
        let count = UserEntity::find()
            .filter(user::Column::DepartmentId.eq(department_id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        let mut active: user::ActiveModel = self.fetch(id).await?.into();
        active.role = Set(role.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        Ok(User::from(model))
    }

    async fn set_department(&self, id: Uuid, department_id: Option<Uuid>) -> AppResult<User> {
        let mut active: user::ActiveModel = self.fetch(id).await?.into();
        active.department_id = Set(department_id);
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        Ok(User::from(model))
    }
}
