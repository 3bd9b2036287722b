//! Ticket service - the lifecycle operations behind every ticket endpoint.
//!
//! Each operation loads the ticket, evaluates the domain policy for the
//! acting user, and only then mutates. Multi-row writes (creation with
//! attachments, duplication) run inside one Unit of Work transaction.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    check_assignment_candidate, check_comment, check_update_status, check_view,
    can_view_internal_notes, effective_internal_flag, require_manager, validate_attachments,
    visible_comments, Actor, AttachmentUpload, Ticket, TicketAttachment, TicketComment,
    TicketStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{storage::blob_path, AttachmentStore, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// A ticket with everything its viewer may see.
///
/// Comments are pre-filtered for the viewer and `internal_notes` is `None`
/// for anyone who may not read it; the embedded ticket always carries the
/// notes field blanked.
#[derive(Debug)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub comments: Vec<TicketComment>,
    pub attachments: Vec<TicketAttachment>,
    pub internal_notes: Option<String>,
}

/// Role-shaped listing result.
pub enum TicketListing {
    /// Manager overview: every ticket, paginated.
    All(Paginated<Ticket>),
    /// Support view: own queue plus the unassigned pool of their department.
    Queue {
        assigned: Vec<Ticket>,
        pool: Vec<Ticket>,
    },
    /// Employee view: own tickets.
    Own(Vec<Ticket>),
}

/// Manager triage payload: status, internal notes and assignment together.
#[derive(Debug, Clone)]
pub struct TriageUpdate {
    pub status: TicketStatus,
    pub internal_notes: String,
    pub assigned_support_id: Option<Uuid>,
}

/// Ticket service trait for dependency injection.
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Create a ticket with optional attachments. The actor becomes the
    /// ticket's employee; attachments are validated before anything is
    /// persisted.
    async fn create_ticket(
        &self,
        actor: &Actor,
        department_id: Uuid,
        subject: String,
        description: String,
        files: Vec<AttachmentUpload>,
    ) -> AppResult<Ticket>;

    /// Load a ticket with its comments and attachments, redacted for the
    /// actor.
    async fn ticket_detail(&self, actor: &Actor, id: Uuid) -> AppResult<TicketDetail>;

    /// List tickets the actor may see, shaped by their role.
    async fn list_tickets(
        &self,
        actor: &Actor,
        params: &PaginationParams,
    ) -> AppResult<TicketListing>;

    /// Manager triage: status, internal notes and assignment in one update.
    async fn update_triage(&self, actor: &Actor, id: Uuid, update: TriageUpdate)
        -> AppResult<Ticket>;

    /// Status-only update (managers, or support with access to the ticket).
    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: TicketStatus,
    ) -> AppResult<Ticket>;

    /// Append a comment. Employees can never author internal comments.
    async fn add_comment(
        &self,
        actor: &Actor,
        id: Uuid,
        message: String,
        is_internal: bool,
    ) -> AppResult<TicketComment>;

    /// Assign a support user; the ticket always moves to InProgress.
    async fn assign(&self, actor: &Actor, id: Uuid, support_id: Uuid) -> AppResult<Ticket>;

    /// Duplicate a ticket: fresh code, status New, unassigned, attachments
    /// shared, plus an internal comment naming the source.
    async fn duplicate(&self, actor: &Actor, id: Uuid) -> AppResult<Ticket>;

    /// Fetch an attachment's record and bytes, view policy applied.
    async fn download_attachment(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        attachment_id: Uuid,
    ) -> AppResult<(TicketAttachment, Vec<u8>)>;
}

/// Concrete implementation of TicketService using Unit of Work.
pub struct TicketDesk<U: UnitOfWork> {
    uow: Arc<U>,
    store: Arc<dyn AttachmentStore>,
    restrict_assignment_to_department: bool,
}

impl<U: UnitOfWork> TicketDesk<U> {
    pub fn new(
        uow: Arc<U>,
        store: Arc<dyn AttachmentStore>,
        restrict_assignment_to_department: bool,
    ) -> Self {
        Self {
            uow,
            store,
            restrict_assignment_to_department,
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<Ticket> {
        self.uow.tickets().find_by_id(id).await?.ok_or_not_found()
    }

    async fn assignment_candidate(
        &self,
        candidate_id: Uuid,
        ticket: &Ticket,
    ) -> AppResult<()> {
        let candidate = self
            .uow
            .users()
            .find_by_id(candidate_id)
            .await?
            .ok_or_else(|| AppError::validation("Unknown assignee."))?;
        check_assignment_candidate(&candidate, ticket, self.restrict_assignment_to_department)
    }
}

#[async_trait]
impl<U: UnitOfWork> TicketService for TicketDesk<U> {
    async fn create_ticket(
        &self,
        actor: &Actor,
        department_id: Uuid,
        subject: String,
        description: String,
        files: Vec<AttachmentUpload>,
    ) -> AppResult<Ticket> {
        if self
            .uow
            .departments()
            .find_by_id(department_id)
            .await?
            .is_none()
        {
            return Err(AppError::validation("Unknown department."));
        }

        // Reject the whole batch before any blob or row is written.
        validate_attachments(&files)?;

        let ticket = Ticket::new(actor.user_id, department_id, subject, description);

        let mut stored: Vec<(String, Option<Uuid>)> = Vec::with_capacity(files.len());
        for file in &files {
            let path = blob_path(&ticket.ticket_code, &file.filename);
            self.store.put(&path, &file.data).await?;
            stored.push((path, Some(actor.user_id)));
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let created = ctx.tickets().insert_ticket(&ticket).await?;
                    for (path, uploader) in stored {
                        ctx.tickets()
                            .insert_attachment(created.id, path, uploader)
                            .await?;
                    }
                    Ok(created)
                })
            })
            .await
    }

    async fn ticket_detail(&self, actor: &Actor, id: Uuid) -> AppResult<TicketDetail> {
        let mut ticket = self.load(id).await?;
        check_view(actor, &ticket)?;

        let comments = visible_comments(actor.role, self.uow.tickets().comments(id).await?);
        let attachments = self.uow.tickets().attachments(id).await?;

        let internal_notes = if can_view_internal_notes(actor.role) {
            Some(std::mem::take(&mut ticket.internal_notes))
        } else {
            ticket.internal_notes.clear();
            None
        };

        Ok(TicketDetail {
            ticket,
            comments,
            attachments,
            internal_notes,
        })
    }

    async fn list_tickets(
        &self,
        actor: &Actor,
        params: &PaginationParams,
    ) -> AppResult<TicketListing> {
        if actor.is_manager() {
            let (tickets, total) = self.uow.tickets().list_all(params).await?;
            return Ok(TicketListing::All(Paginated::new(
                tickets,
                params.page,
                params.limit(),
                total,
            )));
        }

        if actor.role.is_support() {
            let assigned = self.uow.tickets().list_assigned(actor.user_id).await?;
            let pool = match actor.department_id {
                Some(dept) => {
                    self.uow
                        .tickets()
                        .list_unassigned_in_department(dept)
                        .await?
                }
                None => Vec::new(),
            };
            return Ok(TicketListing::Queue { assigned, pool });
        }

        let own = self.uow.tickets().list_by_employee(actor.user_id).await?;
        Ok(TicketListing::Own(own))
    }

    async fn update_triage(
        &self,
        actor: &Actor,
        id: Uuid,
        update: TriageUpdate,
    ) -> AppResult<Ticket> {
        require_manager(actor)?;
        let ticket = self.load(id).await?;

        if let Some(candidate_id) = update.assigned_support_id {
            self.assignment_candidate(candidate_id, &ticket).await?;
        }

        self.uow
            .tickets()
            .update_triage(
                id,
                update.status,
                update.internal_notes,
                update.assigned_support_id,
            )
            .await
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: TicketStatus,
    ) -> AppResult<Ticket> {
        let ticket = self.load(id).await?;
        check_update_status(actor, &ticket)?;
        self.uow.tickets().update_status(id, status).await
    }

    async fn add_comment(
        &self,
        actor: &Actor,
        id: Uuid,
        message: String,
        is_internal: bool,
    ) -> AppResult<TicketComment> {
        if message.trim().is_empty() {
            return Err(AppError::validation("Comment message cannot be empty."));
        }

        let ticket = self.load(id).await?;
        check_comment(actor, &ticket)?;

        let flag = effective_internal_flag(actor.role, is_internal);
        self.uow
            .tickets()
            .add_comment(id, actor.user_id, message, flag)
            .await
    }

    async fn assign(&self, actor: &Actor, id: Uuid, support_id: Uuid) -> AppResult<Ticket> {
        require_manager(actor)?;
        let ticket = self.load(id).await?;
        self.assignment_candidate(support_id, &ticket).await?;

        self.uow
            .tickets()
            .set_assignment(id, Some(support_id), TicketStatus::InProgress)
            .await
    }

    async fn duplicate(&self, actor: &Actor, id: Uuid) -> AppResult<Ticket> {
        require_manager(actor)?;
        let source = self.load(id).await?;

        let copy = source.duplicate();
        let notice = source.duplication_notice();
        let attachments = self.uow.tickets().attachments(source.id).await?;
        let author = actor.user_id;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let created = ctx.tickets().insert_ticket(&copy).await?;
                    // Shallow copy: new records pointing at the same blobs,
                    // attributed to the duplicating manager.
                    for attachment in attachments {
                        ctx.tickets()
                            .insert_attachment(created.id, attachment.file_path, Some(author))
                            .await?;
                    }
                    ctx.tickets()
                        .insert_comment(created.id, Some(author), notice, true)
                        .await?;
                    Ok(created)
                })
            })
            .await
    }

    async fn download_attachment(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        attachment_id: Uuid,
    ) -> AppResult<(TicketAttachment, Vec<u8>)> {
        let ticket = self.load(ticket_id).await?;
        check_view(actor, &ticket)?;

        let attachment = self
            .uow
            .tickets()
            .find_attachment(ticket_id, attachment_id)
            .await?
            .ok_or_not_found()?;

        let data = self.store.get(&attachment.file_path).await?;
        Ok((attachment, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::infra::{MockAttachmentStore, MockTicketRepository, MockUserRepository};
    use crate::services::test_support::TestUow;
    use chrono::Utc;

    fn desk(uow: TestUow) -> TicketDesk<TestUow> {
        TicketDesk::new(Arc::new(uow), Arc::new(MockAttachmentStore::new()), false)
    }

    fn actor(role: Role, department_id: Option<Uuid>) -> Actor {
        Actor::new(Uuid::new_v4(), role, department_id)
    }

    fn ticket(employee: Uuid, department: Uuid, assignee: Option<Uuid>) -> Ticket {
        let mut t = Ticket::new(employee, department, "Printer".into(), "Broken".into());
        t.assigned_support_id = assignee;
        t
    }

    fn support_user(id: Uuid, department_id: Option<Uuid>) -> crate::domain::User {
        let mut u = crate::domain::User::new(id, "s@example.com".into(), "h".into(), "S".into());
        u.role = Role::Support;
        u.department_id = department_id;
        u
    }

    #[tokio::test]
    async fn duplicate_requires_manager() {
        let desk = desk(TestUow::new());
        let err = desk
            .duplicate(&actor(Role::Support, None), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Managers only."));
    }

    #[tokio::test]
    async fn triage_requires_manager() {
        let desk = desk(TestUow::new());
        let update = TriageUpdate {
            status: TicketStatus::Closed,
            internal_notes: String::new(),
            assigned_support_id: None,
        };
        let err = desk
            .update_triage(&actor(Role::Employee, None), Uuid::new_v4(), update)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Managers only."));
    }

    #[tokio::test]
    async fn assign_forces_in_progress() {
        let manager = actor(Role::Manager, None);
        let dept = Uuid::new_v4();
        let support_id = Uuid::new_v4();
        let t = ticket(Uuid::new_v4(), dept, None);
        let ticket_id = t.id;

        let mut tickets = MockTicketRepository::new();
        let t2 = t.clone();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t2.clone())));
        tickets
            .expect_set_assignment()
            .withf(move |id, assignee, status| {
                *id == ticket_id
                    && *assignee == Some(support_id)
                    && *status == TicketStatus::InProgress
            })
            .returning(move |_, assignee, status| {
                let mut updated = t.clone();
                updated.assigned_support_id = assignee;
                updated.status = status;
                Ok(updated)
            });

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id| Ok(Some(support_user(id, Some(dept)))));

        let mut uow = TestUow::new();
        uow.tickets = Arc::new(tickets);
        uow.users = Arc::new(users);

        let updated = desk(uow).assign(&manager, ticket_id, support_id).await.unwrap();
        assert_eq!(updated.status, TicketStatus::InProgress);
        assert_eq!(updated.assigned_support_id, Some(support_id));
    }

    #[tokio::test]
    async fn assign_rejects_non_support_candidate() {
        let manager = actor(Role::Manager, None);
        let t = ticket(Uuid::new_v4(), Uuid::new_v4(), None);

        let mut tickets = MockTicketRepository::new();
        let t2 = t.clone();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t2.clone())));

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(Some(crate::domain::User::new(
                id,
                "e@example.com".into(),
                "h".into(),
                "E".into(),
            )))
        });

        let mut uow = TestUow::new();
        uow.tickets = Arc::new(tickets);
        uow.users = Arc::new(users);

        let err = desk(uow)
            .assign(&manager, t.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn support_cannot_update_status_of_foreign_ticket() {
        let support = actor(Role::Support, Some(Uuid::new_v4()));
        let t = ticket(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()));

        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t.clone())));

        let err = desk(TestUow::with_tickets(tickets))
            .update_status(&support, Uuid::new_v4(), TicketStatus::Resolved)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn support_cannot_comment_on_pool_ticket() {
        let dept = Uuid::new_v4();
        let support = actor(Role::Support, Some(dept));
        let t = ticket(Uuid::new_v4(), dept, None);

        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t.clone())));

        let err = desk(TestUow::with_tickets(tickets))
            .add_comment(&support, Uuid::new_v4(), "hello".into(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Not your ticket."));
    }

    #[tokio::test]
    async fn employee_comments_are_stored_as_public() {
        let employee_id = Uuid::new_v4();
        let employee = Actor::new(employee_id, Role::Employee, None);
        let t = ticket(employee_id, Uuid::new_v4(), None);
        let ticket_id = t.id;

        let mut tickets = MockTicketRepository::new();
        let t2 = t.clone();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t2.clone())));
        tickets
            .expect_add_comment()
            .withf(move |id, author, _message, is_internal| {
                *id == ticket_id && *author == employee_id && !is_internal
            })
            .returning(|id, author, message, is_internal| {
                Ok(TicketComment {
                    id: Uuid::new_v4(),
                    ticket_id: id,
                    author_id: Some(author),
                    message,
                    is_internal,
                    created_at: Utc::now(),
                })
            });

        let comment = desk(TestUow::with_tickets(tickets))
            .add_comment(&employee, ticket_id, "help".into(), true)
            .await
            .unwrap();
        assert!(!comment.is_internal);
    }

    #[tokio::test]
    async fn empty_comment_is_rejected() {
        let err = desk(TestUow::new())
            .add_comment(&actor(Role::Manager, None), Uuid::new_v4(), "  ".into(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn detail_redacts_internal_material_for_the_employee() {
        let employee_id = Uuid::new_v4();
        let employee = Actor::new(employee_id, Role::Employee, None);
        let mut t = ticket(employee_id, Uuid::new_v4(), None);
        t.internal_notes = "escalate quietly".into();
        let ticket_id = t.id;

        let mut tickets = MockTicketRepository::new();
        let t2 = t.clone();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t2.clone())));
        tickets.expect_comments().returning(move |_| {
            Ok(vec![
                TicketComment {
                    id: Uuid::new_v4(),
                    ticket_id,
                    author_id: None,
                    message: "public".into(),
                    is_internal: false,
                    created_at: Utc::now(),
                },
                TicketComment {
                    id: Uuid::new_v4(),
                    ticket_id,
                    author_id: None,
                    message: "internal".into(),
                    is_internal: true,
                    created_at: Utc::now(),
                },
            ])
        });
        tickets.expect_attachments().returning(|_| Ok(vec![]));

        let detail = desk(TestUow::with_tickets(tickets))
            .ticket_detail(&employee, ticket_id)
            .await
            .unwrap();

        assert!(detail.internal_notes.is_none());
        assert!(detail.ticket.internal_notes.is_empty());
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].message, "public");
    }

    #[tokio::test]
    async fn detail_exposes_internal_material_to_managers() {
        let manager = actor(Role::Manager, None);
        let mut t = ticket(Uuid::new_v4(), Uuid::new_v4(), None);
        t.internal_notes = "escalate quietly".into();
        let ticket_id = t.id;

        let mut tickets = MockTicketRepository::new();
        let t2 = t.clone();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t2.clone())));
        tickets.expect_comments().returning(move |_| {
            Ok(vec![TicketComment {
                id: Uuid::new_v4(),
                ticket_id,
                author_id: None,
                message: "internal".into(),
                is_internal: true,
                created_at: Utc::now(),
            }])
        });
        tickets.expect_attachments().returning(|_| Ok(vec![]));

        let detail = desk(TestUow::with_tickets(tickets))
            .ticket_detail(&manager, ticket_id)
            .await
            .unwrap();

        assert_eq!(detail.internal_notes.as_deref(), Some("escalate quietly"));
        assert_eq!(detail.comments.len(), 1);
    }

    #[tokio::test]
    async fn listing_shapes_follow_the_role() {
        let dept = Uuid::new_v4();
        let support = actor(Role::Support, Some(dept));
        let assigned = ticket(Uuid::new_v4(), Uuid::new_v4(), Some(support.user_id));
        let pooled = ticket(Uuid::new_v4(), dept, None);

        let mut tickets = MockTicketRepository::new();
        let a = assigned.clone();
        tickets
            .expect_list_assigned()
            .returning(move |_| Ok(vec![a.clone()]));
        let p = pooled.clone();
        tickets
            .expect_list_unassigned_in_department()
            .returning(move |_| Ok(vec![p.clone()]));

        let listing = desk(TestUow::with_tickets(tickets))
            .list_tickets(&support, &PaginationParams::default())
            .await
            .unwrap();

        match listing {
            TicketListing::Queue { assigned, pool } => {
                assert_eq!(assigned.len(), 1);
                assert_eq!(pool.len(), 1);
            }
            _ => panic!("support listing must be a queue"),
        }
    }

    #[tokio::test]
    async fn support_without_department_gets_empty_pool() {
        let support = actor(Role::Support, None);

        let mut tickets = MockTicketRepository::new();
        tickets.expect_list_assigned().returning(|_| Ok(vec![]));

        let listing = desk(TestUow::with_tickets(tickets))
            .list_tickets(&support, &PaginationParams::default())
            .await
            .unwrap();

        match listing {
            TicketListing::Queue { pool, .. } => assert!(pool.is_empty()),
            _ => panic!("support listing must be a queue"),
        }
    }

    #[tokio::test]
    async fn create_rejects_bad_attachments_before_any_write() {
        let employee = actor(Role::Employee, None);
        let dept = crate::domain::Department {
            id: Uuid::new_v4(),
            name: "IT".into(),
        };
        let dept_id = dept.id;

        let mut departments = crate::infra::MockDepartmentRepository::new();
        departments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(dept.clone())));

        let files = vec![AttachmentUpload {
            filename: "notes.txt".into(),
            content_type: "text/plain".into(),
            data: vec![0u8; 16],
        }];

        // The mock store has no expectations: any put() would panic.
        let err = desk(TestUow::with_departments(departments))
            .create_ticket(&employee, dept_id, "S".into(), "D".into(), files)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_unknown_department() {
        let employee = actor(Role::Employee, None);

        let mut departments = crate::infra::MockDepartmentRepository::new();
        departments.expect_find_by_id().returning(|_| Ok(None));

        let err = desk(TestUow::with_departments(departments))
            .create_ticket(&employee, Uuid::new_v4(), "S".into(), "D".into(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_copies_attachments_attributed_to_the_manager() {
        use crate::infra::repositories::entities::{ticket, ticket_attachment, ticket_comment};
        use crate::infra::Persistence;
        use sea_orm::{DatabaseBackend, MockDatabase};

        let manager_id = Uuid::new_v4();
        let manager = Actor::new(manager_id, Role::Manager, None);
        let original_uploader = Uuid::new_v4();
        let now = Utc::now();

        let source = ticket::Model {
            id: Uuid::new_v4(),
            ticket_code: "TCK11111111".into(),
            employee_id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            assigned_support_id: None,
            subject: "Printer".into(),
            description: "Broken".into(),
            status: "closed".into(),
            internal_notes: "escalated".into(),
            created_at: now,
            updated_at: now,
        };
        let blob = |name: &str| ticket_attachment::Model {
            id: Uuid::new_v4(),
            ticket_id: source.id,
            file_path: format!("TCK11111111/{}", name),
            uploaded_by: Some(original_uploader),
            uploaded_at: now,
        };
        let copy_row = ticket::Model {
            id: Uuid::new_v4(),
            ticket_code: "TCK22222222".into(),
            subject: "[Duplicate] Printer".into(),
            status: "new".into(),
            internal_notes: String::new(),
            ..source.clone()
        };
        let copied_blob = |name: &str| ticket_attachment::Model {
            id: Uuid::new_v4(),
            ticket_id: copy_row.id,
            file_path: format!("TCK11111111/{}", name),
            uploaded_by: Some(manager_id),
            uploaded_at: now,
        };
        let notice_row = ticket_comment::Model {
            id: Uuid::new_v4(),
            ticket_id: copy_row.id,
            author_id: Some(manager_id),
            message: "Duplicated from TCK11111111.".into(),
            is_internal: true,
            created_at: now,
        };

        // Result sets in execution order: load source, load attachments,
        // then the transaction's three inserts (Postgres RETURNING).
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![source.clone()]])
                .append_query_results([vec![blob("aa_one.pdf"), blob("bb_two.png")]])
                .append_query_results([vec![copy_row.clone()]])
                .append_query_results([vec![copied_blob("aa_one.pdf")]])
                .append_query_results([vec![copied_blob("bb_two.png")]])
                .append_query_results([vec![notice_row]])
                .into_connection(),
        );

        let desk = TicketDesk::new(
            Arc::new(Persistence::new(db.clone())),
            Arc::new(MockAttachmentStore::new()),
            false,
        );

        let created = desk.duplicate(&manager, source.id).await.unwrap();
        assert_eq!(created.status, TicketStatus::New);
        assert!(created.assigned_support_id.is_none());

        drop(desk);
        let log = format!("{:?}", Arc::into_inner(db).unwrap().into_transaction_log());
        // One ticket, both attachment records, one notice comment.
        assert_eq!(log.matches("INSERT INTO").count(), 4);
        assert_eq!(log.matches("Duplicated from TCK11111111.").count(), 1);
        // Copied records belong to the acting manager, never the
        // original uploader.
        assert!(log.contains(&manager_id.to_string()));
        assert!(!log.contains(&original_uploader.to_string()));
    }

    #[tokio::test]
    async fn create_persists_ticket_and_attachment_rows_together() {
        use crate::infra::repositories::entities::{department, ticket, ticket_attachment};
        use crate::infra::Persistence;
        use sea_orm::{DatabaseBackend, MockDatabase};

        let employee_id = Uuid::new_v4();
        let employee = Actor::new(employee_id, Role::Employee, None);
        let now = Utc::now();

        let dept = department::Model {
            id: Uuid::new_v4(),
            name: "IT".into(),
        };
        let ticket_row = ticket::Model {
            id: Uuid::new_v4(),
            ticket_code: "TCK33333333".into(),
            employee_id,
            department_id: dept.id,
            assigned_support_id: None,
            subject: "Printer".into(),
            description: "Broken".into(),
            status: "new".into(),
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        let attachment_row = ticket_attachment::Model {
            id: Uuid::new_v4(),
            ticket_id: ticket_row.id,
            file_path: "TCK33333333/aa_scan.pdf".into(),
            uploaded_by: Some(employee_id),
            uploaded_at: now,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![dept.clone()]])
                .append_query_results([vec![ticket_row]])
                .append_query_results([vec![attachment_row]])
                .into_connection(),
        );

        let mut store = MockAttachmentStore::new();
        store
            .expect_put()
            .withf(|path, data| path.ends_with("_scan.pdf") && data == &b"bytes"[..])
            .times(1)
            .returning(|_, _| Ok(()));

        let desk = TicketDesk::new(
            Arc::new(Persistence::new(db.clone())),
            Arc::new(store),
            false,
        );

        let files = vec![AttachmentUpload {
            filename: "scan.pdf".into(),
            content_type: "application/pdf".into(),
            data: b"bytes".to_vec(),
        }];
        let created = desk
            .create_ticket(&employee, dept.id, "Printer".into(), "Broken".into(), files)
            .await
            .unwrap();
        assert_eq!(created.status, TicketStatus::New);

        drop(desk);
        let log = format!("{:?}", Arc::into_inner(db).unwrap().into_transaction_log());
        // Ticket row plus its attachment record in the same transaction,
        // attributed to the creator.
        assert_eq!(log.matches("INSERT INTO").count(), 2);
        assert!(log.contains(&employee_id.to_string()));
    }

    #[tokio::test]
    async fn download_applies_the_view_policy() {
        let stranger = actor(Role::Employee, None);
        let t = ticket(Uuid::new_v4(), Uuid::new_v4(), None);

        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(t.clone())));

        let err = desk(TestUow::with_tickets(tickets))
            .download_attachment(&stranger, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
