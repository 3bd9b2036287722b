//! Shared service test scaffolding: a Unit of Work over mocked
//! repositories. Transactional flows are exercised through the domain
//! layer instead, so `transaction` here is unreachable.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::infra::{
    DepartmentRepository, MockDepartmentRepository, MockTicketRepository, MockUserRepository,
    TicketRepository, TransactionContext, UnitOfWork, UserRepository,
};

pub struct TestUow {
    pub users: Arc<MockUserRepository>,
    pub tickets: Arc<MockTicketRepository>,
    pub departments: Arc<MockDepartmentRepository>,
}

impl TestUow {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            tickets: Arc::new(MockTicketRepository::new()),
            departments: Arc::new(MockDepartmentRepository::new()),
        }
    }

    pub fn with_users(users: MockUserRepository) -> Self {
        let mut uow = Self::new();
        uow.users = Arc::new(users);
        uow
    }

    pub fn with_tickets(tickets: MockTicketRepository) -> Self {
        let mut uow = Self::new();
        uow.tickets = Arc::new(tickets);
        uow
    }

    pub fn with_departments(departments: MockDepartmentRepository) -> Self {
        let mut uow = Self::new();
        uow.departments = Arc::new(departments);
        uow
    }
}

#[async_trait]
impl UnitOfWork for TestUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn tickets(&self) -> Arc<dyn TicketRepository> {
        self.tickets.clone()
    }

    fn departments(&self) -> Arc<dyn DepartmentRepository> {
        self.departments.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        unreachable!("mock-backed tests never reach the transaction boundary")
    }
}
