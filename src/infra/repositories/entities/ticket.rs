//! SeaORM entity for the `tickets` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::domain;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ticket_code: String,
    pub employee_id: Uuid,
    pub department_id: Uuid,
    #[sea_orm(nullable)]
    pub assigned_support_id: Option<Uuid>,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub internal_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::EmployeeId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedSupportId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    AssignedSupport,
    #[sea_orm(has_many = "super::ticket_comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::ticket_attachment::Entity")]
    Attachment,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::ticket_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::ticket_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Ticket {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            ticket_code: model.ticket_code,
            employee_id: model.employee_id,
            department_id: model.department_id,
            assigned_support_id: model.assigned_support_id,
            subject: model.subject,
            description: model.description,
            status: domain::TicketStatus::from(model.status.as_str()),
            internal_notes: model.internal_notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
