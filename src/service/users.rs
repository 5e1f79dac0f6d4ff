use diesel::Connection;
use serde::{Deserialize, Serialize};

use super::{require_text, BlogService, SHORT_TEXT_MAX};
use crate::{
    app::AppError,
    auth::{
        password,
        policy::{Identity, Policy, Role},
    },
    database::models::user::User,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A user as shown to other users, without the password hash
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub role: Role,
}

impl UserView {
    pub fn of(user: &User, policy: &Policy) -> UserView {
        UserView {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            role: policy.role_of(user),
        }
    }
}

impl BlogService {
    /// Creates an account and logs it in, returning the new session token.
    /// Only the configured super-admin email starts out as admin.
    pub fn register(&self, form: &Registration) -> Result<(UserView, String), AppError> {
        let email = form.email.trim();
        let name = form.name.trim();
        require_text("Email", email, Some(SHORT_TEXT_MAX))?;
        require_text("Name", name, Some(SHORT_TEXT_MAX))?;
        if form.password.is_empty() {
            return Err(AppError::ValidationError("Password is required".to_string()));
        }

        let password_hash = password::hash(&form.password)?;
        let mut conn = self.conn()?;

        // the unique index has the final word when two registrations race
        if User::find_by_email(&mut conn, email)?.is_some() {
            log::debug!("registration rejected, email already in use");
            return Err(AppError::Conflict(
                "Account already exists. Please login instead.".to_string(),
            ));
        }

        let admin = self.policy.is_super_admin_email(email);
        // no account is kept when its first session cannot be opened
        let (user, token) = conn.transaction::<_, AppError, _>(|conn| {
            let user = User::new(conn, email, &password_hash, name, admin)?;
            let token = self.sessions.login(&user).map_err(|err| {
                log::error!("could not open a session for new account, registration rolled back");
                err
            })?;
            Ok((user, token))
        })?;
        log::info!("registered user {} (admin: {})", user.id, user.is_admin);

        Ok((UserView::of(&user, &self.policy), token))
    }

    pub fn login(&self, credentials: &Credentials) -> Result<(UserView, String), AppError> {
        let user = User::find_by_email(&mut *self.conn()?, credentials.email.trim())?
            .ok_or(AppError::NotFound)?;

        if !password::verify(&credentials.password, &user.password_hash) {
            log::debug!("wrong password for user {}", user.id);
            return Err(AppError::InvalidCredential);
        }

        let token = self.sessions.login(&user)?;
        log::info!("user {} logged in", user.id);

        Ok((UserView::of(&user, &self.policy), token))
    }

    pub fn logout(&self, identity: &Identity, token: Option<&str>) -> Result<(), AppError> {
        let user = self.policy.require_authenticated(identity)?;
        if let Some(token) = token {
            self.sessions.logout(token)?;
        }
        log::info!("user {} logged out", user.id);
        Ok(())
    }

    /// Extends the life of the caller's session
    pub fn refresh_session(&self, identity: &Identity, token: Option<&str>) -> Result<(), AppError> {
        self.policy.require_authenticated(identity)?;
        self.sessions
            .refresh(token.ok_or(AppError::Unauthenticated)?)
    }

    pub fn promote_to_admin(&self, identity: &Identity, target_email: &str) -> Result<UserView, AppError> {
        self.policy.require_super_admin(identity)?;
        let mut conn = self.conn()?;

        let target = User::find_by_email(&mut conn, target_email.trim())?.ok_or(AppError::NotFound)?;
        if target.is_admin {
            return Err(AppError::AlreadyAdmin);
        }

        let promoted = User::set_admin(&mut conn, target.id, true)?;
        log::info!("user {} promoted to admin", promoted.id);

        Ok(UserView::of(&promoted, &self.policy))
    }

    pub fn demote_from_admin(&self, identity: &Identity, target_id: i32) -> Result<UserView, AppError> {
        let caller = self.policy.require_super_admin(identity)?;
        let mut conn = self.conn()?;

        let target = User::find_by_id(&mut conn, target_id)?.ok_or(AppError::NotFound)?;
        if self.policy.is_super_admin(&target) {
            log::warn!("user {} tried to demote the super-admin", caller.id);
            return Err(AppError::Forbidden);
        }

        let demoted = User::set_admin(&mut conn, target.id, false)?;
        log::info!("user {} is no longer an admin", demoted.id);

        Ok(UserView::of(&demoted, &self.policy))
    }

    pub fn list_admins(&self, identity: &Identity) -> Result<Vec<UserView>, AppError> {
        self.policy.require_admin(identity)?;
        self.list_users(Some(true))
    }

    pub fn list_all_users(&self, identity: &Identity) -> Result<Vec<UserView>, AppError> {
        self.policy.require_admin(identity)?;
        self.list_users(None)
    }

    fn list_users(&self, admin: Option<bool>) -> Result<Vec<UserView>, AppError> {
        Ok(User::list(&mut *self.conn()?, admin)?
            .iter()
            .map(|user| UserView::of(user, &self.policy))
            .collect())
    }

    /// Removes an account and its comments. Authors of posts are refused
    /// with a conflict, and the super-admin account cannot be removed.
    pub fn remove_user(&self, identity: &Identity, target_id: i32) -> Result<(), AppError> {
        let caller = self.policy.require_admin(identity)?;
        let mut conn = self.conn()?;

        let target = User::find_by_id(&mut conn, target_id)?.ok_or(AppError::NotFound)?;
        if self.policy.is_super_admin(&target) {
            log::warn!("user {} tried to remove the super-admin", caller.id);
            return Err(AppError::Forbidden);
        }

        User::delete(&mut conn, target.id)?;
        log::info!("user {} removed by {}", target.id, caller.id);
        Ok(())
    }
}
