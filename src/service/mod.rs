//! The use cases of the blog. Every call takes the caller's [`Identity`]
//! explicitly and checks it against the [`Policy`] before touching the
//! database, so a rejected call has no side effects.
//!
//! Calls are blocking (diesel), HTTP handlers run them through `web::block`.

pub mod posts;
pub mod users;

use crate::{
    app::AppError,
    auth::{
        policy::{Identity, Policy},
        token::Sessions,
    },
    database::db_utils::{DbConnection, DbPool},
};

#[derive(Clone)]
pub struct BlogService {
    pool: DbPool,
    sessions: Sessions,
    policy: Policy,
}

impl BlogService {
    pub fn new(pool: DbPool, sessions: Sessions, policy: Policy) -> BlogService {
        BlogService {
            pool,
            sessions,
            policy,
        }
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    fn conn(&self) -> Result<DbConnection, AppError> {
        Ok(self.pool.get()?)
    }

    /// Resolves the login token a request carried into the caller's identity
    pub fn current_identity(&self, token: Option<&str>) -> Result<Identity, AppError> {
        self.sessions.current_identity(&mut *self.conn()?, token)
    }
}

/// Rejects blank values and values longer than the column allows.
fn require_text(field: &str, value: &str, max_len: Option<usize>) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    if let Some(max_len) = max_len {
        if value.chars().count() > max_len {
            return Err(AppError::ValidationError(format!(
                "{} must be at most {} characters",
                field, max_len
            )));
        }
    }
    Ok(())
}

/// Longest value the short string columns take
const SHORT_TEXT_MAX: usize = 250;
