//! Role administration service - manager-only user and role management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{require_manager, Actor, Role, User};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Role administration trait for dependency injection.
///
/// Every operation is gated on the Manager role. Role changes take effect
/// on the target's next request; no session invalidation happens here.
#[async_trait]
pub trait RoleService: Send + Sync {
    /// List all accounts (the role administration screen).
    async fn list_users(&self, actor: &Actor) -> AppResult<Vec<User>>;

    /// List accounts holding the Support role (assignment candidates).
    async fn list_support(&self, actor: &Actor) -> AppResult<Vec<User>>;

    /// Replace the target's role. Idempotent when the role is unchanged.
    async fn set_role(&self, actor: &Actor, target: Uuid, role: Role) -> AppResult<User>;

    /// Set or clear the target's department membership.
    async fn set_department(
        &self,
        actor: &Actor,
        target: Uuid,
        department_id: Option<Uuid>,
    ) -> AppResult<User>;
}

/// Concrete implementation of RoleService using Unit of Work.
pub struct RoleAdmin<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RoleAdmin<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> RoleService for RoleAdmin<U> {
    async fn list_users(&self, actor: &Actor) -> AppResult<Vec<User>> {
        require_manager(actor)?;
        self.uow.users().list().await
    }

    async fn list_support(&self, actor: &Actor) -> AppResult<Vec<User>> {
        require_manager(actor)?;
        self.uow.users().list_by_role(Role::Support).await
    }

    async fn set_role(&self, actor: &Actor, target: Uuid, role: Role) -> AppResult<User> {
        require_manager(actor)?;
        self.uow.users().update_role(target, role).await
    }

    async fn set_department(
        &self,
        actor: &Actor,
        target: Uuid,
        department_id: Option<Uuid>,
    ) -> AppResult<User> {
        require_manager(actor)?;

        if let Some(id) = department_id {
            // Reject dangling memberships up front.
            self.uow
                .departments()
                .find_by_id(id)
                .await?
                .ok_or_else(|| crate::errors::AppError::validation("Unknown department."))?;
        }

        self.uow.users().set_department(target, department_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::infra::MockUserRepository;
    use crate::services::test_support::TestUow;

    fn actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role, None)
    }

    #[tokio::test]
    async fn non_managers_are_denied() {
        let admin = RoleAdmin::new(Arc::new(TestUow::new()));

        for role in [Role::Employee, Role::Support] {
            let err = admin.list_users(&actor(role)).await.unwrap_err();
            assert!(matches!(err, AppError::Forbidden(ref m) if m == "Managers only."));

            let err = admin
                .set_role(&actor(role), Uuid::new_v4(), Role::Manager)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn manager_sets_a_role() {
        let target = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users
            .expect_update_role()
            .withf(move |id, role| *id == target && *role == Role::Support)
            .returning(|id, role| {
                let mut u =
                    User::new(id, "u@example.com".into(), "h".into(), "U".into());
                u.role = role;
                Ok(u)
            });

        let admin = RoleAdmin::new(Arc::new(TestUow::with_users(users)));
        let updated = admin
            .set_role(&actor(Role::Manager), target, Role::Support)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Support);
    }

    #[tokio::test]
    async fn department_membership_requires_existing_department() {
        let mut departments = crate::infra::MockDepartmentRepository::new();
        departments.expect_find_by_id().returning(|_| Ok(None));

        let admin = RoleAdmin::new(Arc::new(TestUow::with_departments(departments)));
        let err = admin
            .set_department(&actor(Role::Manager), Uuid::new_v4(), Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
