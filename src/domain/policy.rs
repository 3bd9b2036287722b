//! Authorization policy: pure decision functions over (actor, ticket,
//! operation). No I/O here; services evaluate these before any mutation.

use uuid::Uuid;

use super::ticket::{Ticket, TicketComment};
use super::user::{Role, User};
use crate::errors::{AppError, AppResult};

/// The acting identity as seen by the policy: id, single role, and the
/// department membership that scopes Support visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub department_id: Option<Uuid>,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role, department_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role,
            department_id,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor::new(user.id, user.role, user.department_id)
    }
}

/// Whether the actor may view the ticket.
///
/// Manager: always. Support: assigned to them, or unassigned in their own
/// department (no department profile means no unassigned pool). Employee:
/// own tickets only.
pub fn can_view(actor: &Actor, ticket: &Ticket) -> bool {
    match actor.role {
        Role::Manager => true,
        Role::Support => {
            let assigned_to_me = ticket.assigned_support_id == Some(actor.user_id);
            let in_my_unassigned_pool = ticket.assigned_support_id.is_none()
                && actor.department_id == Some(ticket.department_id);
            assigned_to_me || in_my_unassigned_pool
        }
        Role::Employee => ticket.employee_id == actor.user_id,
    }
}

/// View check returning the denial reason on failure.
pub fn check_view(actor: &Actor, ticket: &Ticket) -> AppResult<()> {
    if can_view(actor, ticket) {
        return Ok(());
    }
    Err(match actor.role {
        Role::Support => AppError::forbidden(
            "You can only view your assigned tickets or unassigned tickets in your department.",
        ),
        _ => AppError::forbidden("You can only view your own tickets."),
    })
}

/// Whether the actor may comment on the ticket.
///
/// Stricter than viewing for Support: unassigned-department tickets are
/// viewable but not commentable; only the assignee may comment.
pub fn can_comment(actor: &Actor, ticket: &Ticket) -> bool {
    match actor.role {
        Role::Manager => true,
        Role::Support => ticket.assigned_support_id == Some(actor.user_id),
        Role::Employee => ticket.employee_id == actor.user_id,
    }
}

pub fn check_comment(actor: &Actor, ticket: &Ticket) -> AppResult<()> {
    if can_comment(actor, ticket) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not your ticket."))
    }
}

/// Whether the actor may change the ticket's status.
///
/// Managers always; Support for any ticket the view policy grants them
/// (re-checked here, not only at render time); Employees never.
pub fn check_update_status(actor: &Actor, ticket: &Ticket) -> AppResult<()> {
    match actor.role {
        Role::Manager => Ok(()),
        Role::Support => check_view(actor, ticket),
        Role::Employee => Err(AppError::forbidden("Support staff only.")),
    }
}

/// Manager-only gate with the original denial message.
pub fn require_manager(actor: &Actor) -> AppResult<()> {
    if actor.is_manager() {
        Ok(())
    } else {
        Err(AppError::forbidden("Managers only."))
    }
}

/// The `is_internal` flag a comment actually gets: employees can never
/// author internal comments, whatever the payload said.
pub fn effective_internal_flag(role: Role, requested: bool) -> bool {
    match role {
        Role::Employee => false,
        Role::Support | Role::Manager => requested,
    }
}

/// Whether a comment is visible to the given role. Internal comments are
/// never shown to the ticket's employee.
pub fn comment_visible(role: Role, comment: &TicketComment) -> bool {
    !comment.is_internal || !role.is_employee()
}

/// Filter a ticket's comments down to what the role may see.
pub fn visible_comments(role: Role, comments: Vec<TicketComment>) -> Vec<TicketComment> {
    comments
        .into_iter()
        .filter(|c| comment_visible(role, c))
        .collect()
}

/// Whether the role may read the ticket's internal notes.
pub fn can_view_internal_notes(role: Role) -> bool {
    role.is_manager()
}

/// Validate an assignment candidate: must hold the Support role, and when
/// department scoping is enabled, must belong to the ticket's department.
pub fn check_assignment_candidate(
    candidate: &User,
    ticket: &Ticket,
    restrict_to_department: bool,
) -> AppResult<()> {
    if !candidate.is_support() {
        return Err(AppError::validation(
            "Assignee must have the support role.",
        ));
    }
    if restrict_to_department && candidate.department_id != Some(ticket.department_id) {
        return Err(AppError::validation(
            "Assignee must belong to the ticket's department.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ticket(employee: Uuid, department: Uuid, assignee: Option<Uuid>) -> Ticket {
        let mut t = Ticket::new(employee, department, "subject".into(), "desc".into());
        t.assigned_support_id = assignee;
        t
    }

    fn comment(is_internal: bool) -> TicketComment {
        TicketComment {
            id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            author_id: Some(Uuid::new_v4()),
            message: "m".into(),
            is_internal,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn manager_views_everything() {
        let manager = Actor::new(Uuid::new_v4(), Role::Manager, None);
        let t = ticket(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()));
        assert!(can_view(&manager, &t));
    }

    #[test]
    fn employee_views_only_own_tickets() {
        let me = Uuid::new_v4();
        let actor = Actor::new(me, Role::Employee, None);
        assert!(can_view(&actor, &ticket(me, Uuid::new_v4(), None)));
        assert!(!can_view(&actor, &ticket(Uuid::new_v4(), Uuid::new_v4(), None)));
    }

    #[test]
    fn support_views_assigned_or_unassigned_in_own_department() {
        let me = Uuid::new_v4();
        let my_dept = Uuid::new_v4();
        let other_dept = Uuid::new_v4();
        let actor = Actor::new(me, Role::Support, Some(my_dept));

        // Assigned to me: visible regardless of department.
        assert!(can_view(&actor, &ticket(Uuid::new_v4(), other_dept, Some(me))));
        // Unassigned in my department: visible.
        assert!(can_view(&actor, &ticket(Uuid::new_v4(), my_dept, None)));
        // Unassigned elsewhere: hidden.
        assert!(!can_view(&actor, &ticket(Uuid::new_v4(), other_dept, None)));
        // Assigned to someone else, even in my department: hidden.
        assert!(!can_view(
            &actor,
            &ticket(Uuid::new_v4(), my_dept, Some(Uuid::new_v4()))
        ));
    }

    #[test]
    fn support_without_department_sees_no_unassigned_pool() {
        let me = Uuid::new_v4();
        let actor = Actor::new(me, Role::Support, None);
        assert!(!can_view(&actor, &ticket(Uuid::new_v4(), Uuid::new_v4(), None)));
        assert!(can_view(&actor, &ticket(Uuid::new_v4(), Uuid::new_v4(), Some(me))));
    }

    #[test]
    fn support_comments_only_on_assigned_tickets() {
        let me = Uuid::new_v4();
        let my_dept = Uuid::new_v4();
        let actor = Actor::new(me, Role::Support, Some(my_dept));

        // Viewable unassigned pool ticket is not commentable.
        let pool_ticket = ticket(Uuid::new_v4(), my_dept, None);
        assert!(can_view(&actor, &pool_ticket));
        assert!(!can_comment(&actor, &pool_ticket));

        assert!(can_comment(&actor, &ticket(Uuid::new_v4(), my_dept, Some(me))));
    }

    #[test]
    fn employee_cannot_update_status() {
        let me = Uuid::new_v4();
        let actor = Actor::new(me, Role::Employee, None);
        let own = ticket(me, Uuid::new_v4(), None);
        assert!(check_update_status(&actor, &own).is_err());
    }

    #[test]
    fn support_status_update_requires_view_eligibility() {
        let me = Uuid::new_v4();
        let actor = Actor::new(me, Role::Support, Some(Uuid::new_v4()));
        let foreign = ticket(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()));
        assert!(check_update_status(&actor, &foreign).is_err());

        let mine = ticket(Uuid::new_v4(), Uuid::new_v4(), Some(me));
        assert!(check_update_status(&actor, &mine).is_ok());
    }

    #[test]
    fn employee_comments_are_never_internal() {
        assert!(!effective_internal_flag(Role::Employee, true));
        assert!(!effective_internal_flag(Role::Employee, false));
        assert!(effective_internal_flag(Role::Support, true));
        assert!(effective_internal_flag(Role::Manager, true));
        assert!(!effective_internal_flag(Role::Manager, false));
    }

    #[test]
    fn internal_comments_hidden_from_employees() {
        let internal = comment(true);
        let public = comment(false);
        assert!(!comment_visible(Role::Employee, &internal));
        assert!(comment_visible(Role::Employee, &public));
        assert!(comment_visible(Role::Support, &internal));
        assert!(comment_visible(Role::Manager, &internal));

        let filtered = visible_comments(Role::Employee, vec![comment(true), comment(false)]);
        assert_eq!(filtered.len(), 1);
        assert!(!filtered[0].is_internal);
    }

    #[test]
    fn internal_notes_are_manager_only() {
        assert!(can_view_internal_notes(Role::Manager));
        assert!(!can_view_internal_notes(Role::Support));
        assert!(!can_view_internal_notes(Role::Employee));
    }

    #[test]
    fn require_manager_denies_others() {
        assert!(require_manager(&Actor::new(Uuid::new_v4(), Role::Manager, None)).is_ok());
        assert!(require_manager(&Actor::new(Uuid::new_v4(), Role::Support, None)).is_err());
        assert!(require_manager(&Actor::new(Uuid::new_v4(), Role::Employee, None)).is_err());
    }

    #[test]
    fn assignment_candidate_must_be_support() {
        let dept = Uuid::new_v4();
        let t = ticket(Uuid::new_v4(), dept, None);

        let mut candidate = crate::domain::User::new(
            Uuid::new_v4(),
            "s@example.com".into(),
            "hash".into(),
            "S".into(),
        );
        assert!(check_assignment_candidate(&candidate, &t, false).is_err());

        candidate.role = Role::Support;
        candidate.department_id = None;
        // Permissive default: department mismatch allowed.
        assert!(check_assignment_candidate(&candidate, &t, false).is_ok());
        // Restricted mode: must match the ticket's department.
        assert!(check_assignment_candidate(&candidate, &t, true).is_err());
        candidate.department_id = Some(dept);
        assert!(check_assignment_candidate(&candidate, &t, true).is_ok());
    }
}
