pub mod config;

use std::sync::Arc;

use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use diesel::result::DatabaseErrorKind;
use r2d2_redis::RedisConnectionManager;
use r2d2_redis::redis::RedisError;
use serde_json::json;
use thiserror::Error;

use crate::{
    auth::{
        policy::Policy,
        token::{MemoryStore, RedisStore, SessionStore, Sessions},
    },
    database::db_utils::{connect_to_db, DbPool},
    service::BlogService,
};
use config::Config;

/** Used for sharing the service (and through it the connection pools) between request handlers */
#[derive(Clone)]
pub struct AppState {
    pub service: BlogService,
}

impl AppState {
    /// Builds the state from the process configuration: opens the SQLite pool,
    /// creates the schema and picks the session backend.
    pub fn new(config: &Config) -> Result<AppState, AppError> {
        let pool = connect_to_db(&config.database_url, config.pool_size)?;

        let store: Arc<dyn SessionStore> = match &config.redis_url {
            Some(url) => {
                let manager = RedisConnectionManager::new(url.as_str())?;
                let redis_pool = r2d2_redis::r2d2::Pool::builder().build(manager)?;
                log::info!("storing sessions in redis");
                Arc::new(RedisStore::new(redis_pool))
            }
            None => {
                log::info!("REDIS_URL not set, storing sessions in process memory");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_parts(
            pool,
            Sessions::new(store, config.session_ttl),
            Policy::new(&config.super_admin_email),
        ))
    }

    pub fn with_parts(pool: DbPool, sessions: Sessions, policy: Policy) -> AppState {
        AppState {
            service: BlogService::new(pool, sessions, policy),
        }
    }

    /// State backed by a private in-memory database and session map.
    #[cfg(test)]
    pub fn in_memory(super_admin_email: &str) -> AppState {
        let pool = crate::database::db_utils::in_memory_db().unwrap();
        Self::with_parts(
            pool,
            Sessions::new(Arc::new(MemoryStore::new()), 3600),
            Policy::new(super_admin_email),
        )
    }
}

/** Holds the errors the use cases can end with */
#[derive(Debug, Error, PartialEq)]
pub enum AppError {
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not found")]
    NotFound,
    #[error("Referenced record does not exist")]
    InvalidReference,
    #[error("Password is incorrect")]
    InvalidCredential,
    #[error("Login required")]
    Unauthenticated,
    #[error("Forbidden")]
    Forbidden,
    #[error("Invalid input: {0}")]
    ValidationError(String),
    #[error("Account is already an admin")]
    AlreadyAdmin,
    #[error("Session refers to an account that no longer exists")]
    StaleSession,
    #[error("Internal server error")]
    Internal,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) | AppError::AlreadyAdmin => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidReference => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredential
            | AppError::Unauthenticated
            | AppError::StaleSession => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                log::debug!("unique violation: {}", info.message());
                AppError::Conflict(conflict_message(info.message()).to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                AppError::InvalidReference
            }
            other => {
                log::error!("database error: {}", other);
                AppError::Internal
            }
        }
    }
}

/// Client facing text for a unique constraint failure, SQLite names the
/// column as `table.column`
fn conflict_message(db_message: &str) -> &'static str {
    if db_message.contains("blog_posts.title") {
        "A post with this title already exists"
    } else if db_message.contains("users.email") {
        "Account already exists. Please login instead."
    } else {
        "Record already exists"
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        log::error!("connection pool error: {}", err);
        AppError::Internal
    }
}

impl From<RedisError> for AppError {
    fn from(err: RedisError) -> Self {
        log::error!("redis error: {}", err);
        AppError::Internal
    }
}

impl From<BlockingError> for AppError {
    fn from(_: BlockingError) -> Self {
        log::error!("blocking task was cancelled");
        AppError::Internal
    }
}
