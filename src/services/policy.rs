//! The single authorization rule set used by every handler.

use crate::db::User;
use crate::domain::{Role, UserStatus};

/// What an operation demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Moderator,
    Admin,
    /// The caller is the given user, or an admin.
    SelfOrAdmin(i32),
    /// The caller owns the resource (is the given user), or is a moderator.
    OwnerOrModerator(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Insufficient permissions")]
pub struct Forbidden;

pub fn authorize(caller: &User, requirement: Requirement) -> Result<(), Forbidden> {
    if caller.status != UserStatus::Active {
        return Err(Forbidden);
    }

    let allowed = match requirement {
        Requirement::Authenticated => true,
        Requirement::Moderator => caller.role.at_least(Role::Moderator),
        Requirement::Admin => caller.role == Role::Admin,
        Requirement::SelfOrAdmin(id) => caller.id == id || caller.role == Role::Admin,
        Requirement::OwnerOrModerator(id) => {
            caller.id == id || caller.role.at_least(Role::Moderator)
        }
    };

    if allowed { Ok(()) } else { Err(Forbidden) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            display_name: None,
            avatar_url: None,
            bio: None,
            role,
            status: UserStatus::Active,
            points: 0,
            wins: 0,
            losses: 0,
            xp: 0,
            level: 1,
            must_change_password: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_role_requirements() {
        let member = user(1, Role::User);
        let moderator = user(2, Role::Moderator);
        let admin = user(3, Role::Admin);

        assert!(authorize(&member, Requirement::Authenticated).is_ok());
        assert_eq!(authorize(&member, Requirement::Moderator), Err(Forbidden));
        assert!(authorize(&moderator, Requirement::Moderator).is_ok());
        assert_eq!(authorize(&moderator, Requirement::Admin), Err(Forbidden));
        assert!(authorize(&admin, Requirement::Admin).is_ok());
        assert!(authorize(&admin, Requirement::Moderator).is_ok());
    }

    #[test]
    fn test_ownership_requirements() {
        let member = user(1, Role::User);
        let moderator = user(2, Role::Moderator);
        let admin = user(3, Role::Admin);

        assert!(authorize(&member, Requirement::SelfOrAdmin(1)).is_ok());
        assert!(authorize(&member, Requirement::SelfOrAdmin(9)).is_err());
        assert!(authorize(&moderator, Requirement::SelfOrAdmin(9)).is_err());
        assert!(authorize(&admin, Requirement::SelfOrAdmin(9)).is_ok());

        assert!(authorize(&member, Requirement::OwnerOrModerator(1)).is_ok());
        assert!(authorize(&member, Requirement::OwnerOrModerator(9)).is_err());
        assert!(authorize(&moderator, Requirement::OwnerOrModerator(9)).is_ok());
    }

    #[test]
    fn test_inactive_accounts_are_refused() {
        let mut admin = user(3, Role::Admin);
        admin.status = UserStatus::Suspended;
        assert_eq!(authorize(&admin, Requirement::Authenticated), Err(Forbidden));
    }
}
