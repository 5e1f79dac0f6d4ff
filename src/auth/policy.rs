use serde::Serialize;

use crate::{app::AppError, database::models::user::User};

/// Who is calling: nobody, or a user whose row was found for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Anonymous,
    User(User),
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Anonymous,
    Authenticated,
    Admin,
    SuperAdmin,
}

/// Derives roles and guards the use cases. The super-admin is whoever
/// registered with the configured email, the `is_admin` flag plays no part.
#[derive(Debug, Clone)]
pub struct Policy {
    super_admin_email: String,
}

impl Policy {
    pub fn new(super_admin_email: &str) -> Policy {
        Policy {
            super_admin_email: super_admin_email.to_string(),
        }
    }

    pub fn is_super_admin(&self, user: &User) -> bool {
        self.is_super_admin_email(&user.email)
    }

    pub fn is_super_admin_email(&self, email: &str) -> bool {
        email == self.super_admin_email
    }

    pub fn role(&self, identity: &Identity) -> Role {
        match identity {
            Identity::Anonymous => Role::Anonymous,
            Identity::User(user) => self.role_of(user),
        }
    }

    pub fn role_of(&self, user: &User) -> Role {
        if self.is_super_admin(user) {
            Role::SuperAdmin
        } else if user.is_admin {
            Role::Admin
        } else {
            Role::Authenticated
        }
    }

    pub fn require_authenticated<'a>(&self, identity: &'a Identity) -> Result<&'a User, AppError> {
        identity.user().ok_or(AppError::Unauthenticated)
    }

    pub fn require_admin<'a>(&self, identity: &'a Identity) -> Result<&'a User, AppError> {
        match (self.role(identity), identity.user()) {
            (Role::Admin | Role::SuperAdmin, Some(user)) => Ok(user),
            _ => {
                log::debug!("admin role required, caller is {:?}", self.role(identity));
                Err(AppError::Forbidden)
            }
        }
    }

    pub fn require_super_admin<'a>(&self, identity: &'a Identity) -> Result<&'a User, AppError> {
        match (self.role(identity), identity.user()) {
            (Role::SuperAdmin, Some(user)) => Ok(user),
            _ => {
                log::debug!("super-admin role required, caller is {:?}", self.role(identity));
                Err(AppError::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i32, email: &str, is_admin: bool) -> Identity {
        Identity::User(User {
            id,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Member".to_string(),
            is_admin,
        })
    }

    #[test]
    fn test_roles() {
        let policy = Policy::new("admin@example.com");

        pretty_assertions::assert_eq!(policy.role(&Identity::Anonymous), Role::Anonymous);
        pretty_assertions::assert_eq!(policy.role(&member(2, "alice@example.com", false)), Role::Authenticated);
        pretty_assertions::assert_eq!(policy.role(&member(3, "bob@example.com", true)), Role::Admin);
        // the configured email wins regardless of id or flag
        pretty_assertions::assert_eq!(policy.role(&member(7, "admin@example.com", false)), Role::SuperAdmin);
        pretty_assertions::assert_eq!(policy.role(&member(1, "first@example.com", true)), Role::Admin);
    }

    #[test]
    fn test_guards() {
        let policy = Policy::new("admin@example.com");
        let anonymous = Identity::Anonymous;
        let reader = member(2, "alice@example.com", false);
        let admin = member(3, "bob@example.com", true);
        let super_admin = member(1, "admin@example.com", true);

        pretty_assertions::assert_eq!(policy.require_authenticated(&anonymous), Err(AppError::Unauthenticated));
        assert!(policy.require_authenticated(&reader).is_ok());

        pretty_assertions::assert_eq!(policy.require_admin(&anonymous), Err(AppError::Forbidden));
        pretty_assertions::assert_eq!(policy.require_admin(&reader), Err(AppError::Forbidden));
        pretty_assertions::assert_eq!(policy.require_admin(&admin).map(|u| u.id), Ok(3));
        pretty_assertions::assert_eq!(policy.require_admin(&super_admin).map(|u| u.id), Ok(1));

        pretty_assertions::assert_eq!(policy.require_super_admin(&admin), Err(AppError::Forbidden));
        pretty_assertions::assert_eq!(policy.require_super_admin(&super_admin).map(|u| u.id), Ok(1));
    }
}
