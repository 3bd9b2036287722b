//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-aggregate operations
//! (ticket creation with attachments, duplication with its notice comment)
//! inside a single database transaction.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, DatabaseConnection, DatabaseTransaction, IsolationLevel, Set,
    TransactionTrait,
};
use std::sync::Arc;

use super::repositories::entities::{ticket, ticket_attachment, ticket_comment};
use super::repositories::{
    DepartmentRepository, DepartmentStore, TicketRepository, TicketStore, UserRepository,
    UserStore,
};
use crate::domain::{Ticket, TicketAttachment, TicketComment};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, mock the repositories and stub the accessors.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn tickets(&self) -> Arc<dyn TicketRepository>;

    fn departments(&self) -> Arc<dyn DepartmentRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back
    /// on error. Uses ReadCommitted isolation; mutating operations are
    /// last-write-wins.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All operations performed through this context are part of the same
/// database transaction. The context borrows the transaction to ensure
/// proper lifetime management.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get ticket repository for this transaction
    pub fn tickets(&self) -> TxTicketRepository<'_> {
        TxTicketRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    user_repo: Arc<UserStore>,
    ticket_repo: Arc<TicketStore>,
    department_repo: Arc<DepartmentStore>,
}

impl Persistence {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let ticket_repo = Arc::new(TicketStore::new(db.clone()));
        let department_repo = Arc::new(DepartmentStore::new(db.clone()));
        Self {
            db,
            user_repo,
            ticket_repo,
            department_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn tickets(&self) -> Arc<dyn TicketRepository> {
        self.ticket_repo.clone()
    }

    fn departments(&self) -> Arc<dyn DepartmentRepository> {
        self.department_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware ticket repository.
///
/// Covers only the inserts that must land together: a ticket with its
/// attachment records, or a duplicate with its notice comment.
pub struct TxTicketRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxTicketRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn insert_ticket(&self, t: &Ticket) -> AppResult<Ticket> {
        let active = ticket::ActiveModel {
            id: Set(t.id),
            ticket_code: Set(t.ticket_code.clone()),
            employee_id: Set(t.employee_id),
            department_id: Set(t.department_id),
            assigned_support_id: Set(t.assigned_support_id),
            subject: Set(t.subject.clone()),
            description: Set(t.description.clone()),
            status: Set(t.status.to_string()),
            internal_notes: Set(t.internal_notes.clone()),
            created_at: Set(t.created_at),
            updated_at: Set(t.updated_at),
        };

        let model = active.insert(self.txn).await.map_err(AppError::from)?;
        Ok(Ticket::from(model))
    }

    pub async fn insert_attachment(
        &self,
        ticket_id: uuid::Uuid,
        file_path: String,
        uploaded_by: Option<uuid::Uuid>,
    ) -> AppResult<TicketAttachment> {
        let active = ticket_attachment::ActiveModel {
            id: Set(uuid::Uuid::new_v4()),
            ticket_id: Set(ticket_id),
            file_path: Set(file_path),
            uploaded_by: Set(uploaded_by),
            uploaded_at: Set(chrono::Utc::now()),
        };

        let model = active.insert(self.txn).await.map_err(AppError::from)?;
        Ok(TicketAttachment::from(model))
    }

    pub async fn insert_comment(
        &self,
        ticket_id: uuid::Uuid,
        author_id: Option<uuid::Uuid>,
        message: String,
        is_internal: bool,
    ) -> AppResult<TicketComment> {
        let active = ticket_comment::ActiveModel {
            id: Set(uuid::Uuid::new_v4()),
            ticket_id: Set(ticket_id),
            author_id: Set(author_id),
            message: Set(message),
            is_internal: Set(is_internal),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active.insert(self.txn).await.map_err(AppError::from)?;
        Ok(TicketComment::from(model))
    }
}
