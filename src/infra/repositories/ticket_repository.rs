//! Ticket repository - data access for tickets, comments, and attachment
//! records.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{
    ticket::{self, Entity as TicketEntity},
    ticket_attachment::{self, Entity as AttachmentEntity},
    ticket_comment::{self, Entity as CommentEntity},
};
use crate::domain::{Ticket, TicketAttachment, TicketComment, TicketStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Ticket repository trait for dependency injection.
///
/// Single-row mutations refresh `updated_at`; multi-statement mutations run
/// inside their own transaction. Ticket inserts (create, duplicate) go
/// through the Unit of Work instead, because they span aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Ticket>>;

    /// All tickets, newest first, paginated (manager overview).
    async fn list_all(&self, params: &PaginationParams) -> AppResult<(Vec<Ticket>, u64)>;

    /// Tickets created by an employee, newest first.
    async fn list_by_employee(&self, employee_id: Uuid) -> AppResult<Vec<Ticket>>;

    /// Tickets assigned to a support actor, newest first.
    async fn list_assigned(&self, support_id: Uuid) -> AppResult<Vec<Ticket>>;

    /// Unassigned tickets of a department, newest first (the pool).
    async fn list_unassigned_in_department(&self, department_id: Uuid) -> AppResult<Vec<Ticket>>;

    /// Number of tickets filed against a department (protect-on-delete).
    async fn count_in_department(&self, department_id: Uuid) -> AppResult<u64>;

    /// Manager triage update: status, internal notes, and assignment in one
    /// write.
    async fn update_triage(
        &self,
        id: Uuid,
        status: TicketStatus,
        internal_notes: String,
        assigned_support_id: Option<Uuid>,
    ) -> AppResult<Ticket>;

    /// Status-only update (support path).
    async fn update_status(&self, id: Uuid, status: TicketStatus) -> AppResult<Ticket>;

    /// Set the assignee together with the status the operation forces.
    async fn set_assignment(
        &self,
        id: Uuid,
        assigned_support_id: Option<Uuid>,
        status: TicketStatus,
    ) -> AppResult<Ticket>;

    /// Comments of a ticket, oldest first.
    async fn comments(&self, ticket_id: Uuid) -> AppResult<Vec<TicketComment>>;

    /// Append a comment and refresh the ticket's `updated_at`, atomically.
    async fn add_comment(
        &self,
        ticket_id: Uuid,
        author_id: Uuid,
        message: String,
        is_internal: bool,
    ) -> AppResult<TicketComment>;

    /// Attachment records of a ticket, oldest first.
    async fn attachments(&self, ticket_id: Uuid) -> AppResult<Vec<TicketAttachment>>;

    async fn find_attachment(
        &self,
        ticket_id: Uuid,
        attachment_id: Uuid,
    ) -> AppResult<Option<TicketAttachment>>;
}

/// SeaORM-backed implementation of TicketRepository.
pub struct TicketStore {
    db: std::sync::Arc<DatabaseConnection>,
}

impl TicketStore {
    pub fn new(db: std::sync::Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> AppResult<ticket::Model> {
        TicketEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl TicketRepository for TicketStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Ticket>> {
        let model = TicketEntity::find_by_id(id).one(&*self.db).await?;
        Ok(model.map(Ticket::from))
    }

    async fn list_all(&self, params: &PaginationParams) -> AppResult<(Vec<Ticket>, u64)> {
        let paginator = TicketEntity::find()
            .order_by_desc(ticket::Column::CreatedAt)
            .paginate(&*self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;
        Ok((models.into_iter().map(Ticket::from).collect(), total))
    }

    async fn list_by_employee(&self, employee_id: Uuid) -> AppResult<Vec<Ticket>> {
        let models = TicketEntity::find()
            .filter(ticket::Column::EmployeeId.eq(employee_id))
            .order_by_desc(ticket::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(Ticket::from).collect())
    }

    async fn list_assigned(&self, support_id: Uuid) -> AppResult<Vec<Ticket>> {
        let models = TicketEntity::find()
            .filter(ticket::Column::AssignedSupportId.eq(support_id))
            .order_by_desc(ticket::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(Ticket::from).collect())
    }

    async fn list_unassigned_in_department(&self, department_id: Uuid) -> AppResult<Vec<Ticket>> {
        let models = TicketEntity::find()
            .filter(ticket::Column::DepartmentId.eq(department_id))
            .filter(ticket::Column::AssignedSupportId.is_null())
            .order_by_desc(ticket::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(Ticket::from).collect())
    }

    async fn count_in_department(&self, department_id: Uuid) -> AppResult<u64> {
        let count = TicketEntity::find()
            .filter(ticket::Column::DepartmentId.eq(department_id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn update_triage(
        &self,
        id: Uuid,
        status: TicketStatus,
        internal_notes: String,
        assigned_support_id: Option<Uuid>,
    ) -> AppResult<Ticket> {
        let mut active: ticket::ActiveModel = self.fetch(id).await?.into();
        active.status = Set(status.to_string());
        active.internal_notes = Set(internal_notes);
        active.assigned_support_id = Set(assigned_support_id);
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        Ok(Ticket::from(model))
    }

    async fn update_status(&self, id: Uuid, status: TicketStatus) -> AppResult<Ticket> {
        let mut active: ticket::ActiveModel = self.fetch(id).await?.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        Ok(Ticket::from(model))
    }

    async fn set_assignment(
        &self,
        id: Uuid,
        assigned_support_id: Option<Uuid>,
        status: TicketStatus,
    ) -> AppResult<Ticket> {
        let mut active: ticket::ActiveModel = self.fetch(id).await?.into();
        active.assigned_support_id = Set(assigned_support_id);
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        Ok(Ticket::from(model))
    }

    async fn comments(&self, ticket_id: Uuid) -> AppResult<Vec<TicketComment>> {
        let models = CommentEntity::find()
            .filter(ticket_comment::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_comment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(TicketComment::from).collect())
    }

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        author_id: Uuid,
        message: String,
        is_internal: bool,
    ) -> AppResult<TicketComment> {
        let txn = self.db.begin().await?;

        let now = Utc::now();
        let active = ticket_comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            ticket_id: Set(ticket_id),
            author_id: Set(Some(author_id)),
            message: Set(message),
            is_internal: Set(is_internal),
            created_at: Set(now),
        };
        let model = active.insert(&txn).await?;

        let ticket_model = TicketEntity::find_by_id(ticket_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: ticket::ActiveModel = ticket_model.into();
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(TicketComment::from(model))
    }

    async fn attachments(&self, ticket_id: Uuid) -> AppResult<Vec<TicketAttachment>> {
        let models = AttachmentEntity::find()
            .filter(ticket_attachment::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_attachment::Column::UploadedAt)
            .all(&*self.db)
            .await?;
        Ok(models.into_iter().map(TicketAttachment::from).collect())
    }

    async fn find_attachment(
        &self,
        ticket_id: Uuid,
        attachment_id: Uuid,
    ) -> AppResult<Option<TicketAttachment>> {
        let model = AttachmentEntity::find_by_id(attachment_id)
            .filter(ticket_attachment::Column::TicketId.eq(ticket_id))
            .one(&*self.db)
            .await?;
        Ok(model.map(TicketAttachment::from))
    }
}
