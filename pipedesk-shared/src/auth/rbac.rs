/// Role-based access control table
///
/// A pure lookup from role to allowed actions: no I/O, no runtime mutation.
/// The action namespace is closed and flat; the dot-separated names are a
/// readability convention, not a hierarchy.
///
/// This table is the authoritative capability check. Route wiring gates on
/// coarse role allow-lists (see [`super::middleware::require_roles`]); the
/// fine-grained table is exposed through the API for UI affordance and is
/// the reference for any per-field enforcement.
///
/// # Permission table
///
/// | Role | Permissions |
/// |---|---|
/// | OWNER | all ten actions |
/// | ADMIN | all ten actions (identical to OWNER) |
/// | MANAGER | all except `client.delete`, `deal.delete`, `task.delete` |
/// | AGENT | `client.update.name`, `deal.update.stage`, `deal.update.amount`, `checklist.update`, `task.update.all` |
/// | VIEWER | none |
///
/// Unknown roles or actions fail closed: the check returns `false`, never an
/// error.

use serde::{Deserialize, Serialize};

use crate::models::member::MemberRole;

/// Gated capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Rename a client
    ClientUpdateName,

    /// Edit every client field
    ClientUpdateAll,

    /// Delete a client
    ClientDelete,

    /// Move a deal between stages
    DealUpdateStage,

    /// Change a deal's amount
    DealUpdateAmount,

    /// Edit every deal field
    DealUpdateAll,

    /// Delete a deal
    DealDelete,

    /// Toggle checklist items
    ChecklistUpdate,

    /// Edit every task field
    TaskUpdateAll,

    /// Delete a task
    TaskDelete,
}

/// All actions, in table order
pub const ALL_ACTIONS: [Action; 10] = [
    Action::ClientUpdateName,
    Action::ClientUpdateAll,
    Action::ClientDelete,
    Action::DealUpdateStage,
    Action::DealUpdateAmount,
    Action::DealUpdateAll,
    Action::DealDelete,
    Action::ChecklistUpdate,
    Action::TaskUpdateAll,
    Action::TaskDelete,
];

impl Action {
    /// Dot-separated action identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ClientUpdateName => "client.update.name",
            Action::ClientUpdateAll => "client.update.all",
            Action::ClientDelete => "client.delete",
            Action::DealUpdateStage => "deal.update.stage",
            Action::DealUpdateAmount => "deal.update.amount",
            Action::DealUpdateAll => "deal.update.all",
            Action::DealDelete => "deal.delete",
            Action::ChecklistUpdate => "checklist.update",
            Action::TaskUpdateAll => "task.update.all",
            Action::TaskDelete => "task.delete",
        }
    }

    /// Parses an action identifier; unknown identifiers yield None
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "client.update.name" => Some(Action::ClientUpdateName),
            "client.update.all" => Some(Action::ClientUpdateAll),
            "client.delete" => Some(Action::ClientDelete),
            "deal.update.stage" => Some(Action::DealUpdateStage),
            "deal.update.amount" => Some(Action::DealUpdateAmount),
            "deal.update.all" => Some(Action::DealUpdateAll),
            "deal.delete" => Some(Action::DealDelete),
            "checklist.update" => Some(Action::ChecklistUpdate),
            "task.update.all" => Some(Action::TaskUpdateAll),
            "task.delete" => Some(Action::TaskDelete),
            _ => None,
        }
    }
}

/// Actions permitted to a role
///
/// OWNER and ADMIN intentionally share the same set; the distinction between
/// them is the last-owner removal invariant, not capabilities.
pub fn permitted_actions(role: MemberRole) -> &'static [Action] {
    match role {
        MemberRole::Owner | MemberRole::Admin => &ALL_ACTIONS,
        MemberRole::Manager => &[
            Action::ClientUpdateName,
            Action::ClientUpdateAll,
            Action::DealUpdateStage,
            Action::DealUpdateAmount,
            Action::DealUpdateAll,
            Action::ChecklistUpdate,
            Action::TaskUpdateAll,
        ],
        MemberRole::Agent => &[
            Action::ClientUpdateName,
            Action::DealUpdateStage,
            Action::DealUpdateAmount,
            Action::ChecklistUpdate,
            Action::TaskUpdateAll,
        ],
        MemberRole::Viewer => &[],
    }
}

/// Checks whether a role may perform an action
///
/// Pure lookup; fails closed.
pub fn can_perform_action(role: MemberRole, action: Action) -> bool {
    permitted_actions(role).contains(&action)
}

/// Checks a role against a raw action identifier
///
/// Unknown identifiers are denied, never an error.
pub fn can_perform_action_str(role: MemberRole, action: &str) -> bool {
    match Action::from_str(action) {
        Some(action) => can_perform_action(role, action),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_and_admin_identical() {
        for action in ALL_ACTIONS {
            assert_eq!(
                can_perform_action(MemberRole::Owner, action),
                can_perform_action(MemberRole::Admin, action),
                "OWNER and ADMIN must agree on {}",
                action.as_str()
            );
            assert!(can_perform_action(MemberRole::Owner, action));
        }
    }

    #[test]
    fn test_viewer_denied_everything() {
        for action in ALL_ACTIONS {
            assert!(
                !can_perform_action(MemberRole::Viewer, action),
                "VIEWER must be denied {}",
                action.as_str()
            );
        }
    }

    #[test]
    fn test_manager_denied_deletes_only() {
        let denied = [Action::ClientDelete, Action::DealDelete, Action::TaskDelete];

        for action in ALL_ACTIONS {
            let expected = !denied.contains(&action);
            assert_eq!(
                can_perform_action(MemberRole::Manager, action),
                expected,
                "MANAGER mismatch on {}",
                action.as_str()
            );
        }
    }

    #[test]
    fn test_agent_subset() {
        let allowed = [
            Action::ClientUpdateName,
            Action::DealUpdateStage,
            Action::DealUpdateAmount,
            Action::ChecklistUpdate,
            Action::TaskUpdateAll,
        ];

        for action in ALL_ACTIONS {
            let expected = allowed.contains(&action);
            assert_eq!(
                can_perform_action(MemberRole::Agent, action),
                expected,
                "AGENT mismatch on {}",
                action.as_str()
            );
        }
    }

    #[test]
    fn test_action_identifier_round_trip() {
        for action in ALL_ACTIONS {
            assert_eq!(Action::from_str(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_unknown_action_fails_closed() {
        assert!(!can_perform_action_str(MemberRole::Owner, "client.export"));
        assert!(!can_perform_action_str(MemberRole::Owner, ""));
        assert!(!can_perform_action_str(MemberRole::Owner, "CLIENT.DELETE"));
    }

    #[test]
    fn test_every_role_returns_a_boolean_for_every_action() {
        // The check is total: no role/action pair may panic.
        for role in [
            MemberRole::Owner,
            MemberRole::Admin,
            MemberRole::Manager,
            MemberRole::Agent,
            MemberRole::Viewer,
        ] {
            for action in ALL_ACTIONS {
                let _ = can_perform_action(role, action);
            }
        }
    }
}
