//! Role → UI affordance mapping.

use crate::contract::model::{Affordances, Role, RosterRow, User};

/// Affordances for a session role; `None` (signed out) sees nothing.
pub fn affordances(role: Option<Role>) -> Affordances {
    match role {
        None | Some(Role::Staff) => Affordances::default(),
        Some(Role::Admin) => Affordances {
            admin_panel: true,
            history_clear: true,
            founder_inbox: false,
            pending_counter: false,
            delete_users: true,
        },
        Some(Role::Founder) => Affordances {
            admin_panel: true,
            history_clear: true,
            founder_inbox: true,
            pending_counter: true,
            delete_users: true,
        },
    }
}

/// Roster table for privileged viewers; empty for everyone else.
/// Founder rows are never deletable.
pub fn roster_rows(users: &[User], viewer: Option<Role>) -> Vec<RosterRow> {
    if !affordances(viewer).admin_panel {
        return Vec::new();
    }
    users
        .iter()
        .map(|u| RosterRow {
            id: u.id.clone(),
            username: u.username.clone(),
            display_name: u.display_name().to_string(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            role: u.role,
            deletable: u.role != Role::Founder,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            username: id.to_string(),
            full_name: String::new(),
            email: format!("{id}@otel.com"),
            phone: String::new(),
            dob: String::new(),
            password: "secret1".into(),
            role,
            created_at: None,
        }
    }

    #[test]
    fn staff_sees_no_privileged_controls() {
        let a = affordances(Some(Role::Staff));
        assert!(!a.admin_panel && !a.history_clear && !a.founder_inbox && !a.delete_users);
        assert_eq!(affordances(None), Affordances::default());
    }

    #[test]
    fn admin_has_panel_but_no_inbox() {
        let a = affordances(Some(Role::Admin));
        assert!(a.admin_panel && a.history_clear && a.delete_users);
        assert!(!a.founder_inbox && !a.pending_counter);
    }

    #[test]
    fn founder_has_everything() {
        let a = affordances(Some(Role::Founder));
        assert!(a.admin_panel && a.history_clear && a.founder_inbox && a.pending_counter);
    }

    #[test]
    fn founder_rows_are_protected() {
        let users = vec![user("kurucu", Role::Founder), user("ali", Role::Admin)];
        let rows = roster_rows(&users, Some(Role::Admin));
        assert!(!rows[0].deletable);
        assert!(rows[1].deletable);
        assert_eq!(rows[1].display_name, "ali");
        assert!(roster_rows(&users, Some(Role::Staff)).is_empty());
    }
}
