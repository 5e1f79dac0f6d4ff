use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};
use diesel::sqlite::SqliteConnection;
use r2d2_redis::{r2d2::Pool, RedisConnectionManager};
use rand::distributions::{Alphanumeric, DistString};
use r2d2_redis::redis::Commands;

use crate::{
    app::AppError,
    auth::policy::Identity,
    database::models::user::User,
};

pub const TOKEN_LENGTH: usize = 32;
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Where login tokens live. Each token maps to the id of the user it was
/// issued to until it expires or is deleted.
pub trait SessionStore: Send + Sync {
    fn insert(&self, token: &str, user_id: i32, ttl_secs: u64) -> Result<(), AppError>;
    fn find(&self, token: &str) -> Result<Option<i32>, AppError>;
    /// Pushes the expiry back, `false` when the token is unknown or expired
    fn refresh(&self, token: &str, ttl_secs: u64) -> Result<bool, AppError>;
    fn delete(&self, token: &str) -> Result<(), AppError>;
}

pub struct Token {}

impl Token {
    pub fn generate() -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LENGTH)
    }
}

/** Sessions kept in process memory, used when no redis is configured */
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (i32, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, (i32, DateTime<Utc>)>>, AppError> {
        self.entries.lock().map_err(|_| {
            log::error!("session map lock is poisoned");
            AppError::Internal
        })
    }
}

fn expiry(ttl_secs: u64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64)
}

impl SessionStore for MemoryStore {
    fn insert(&self, token: &str, user_id: i32, ttl_secs: u64) -> Result<(), AppError> {
        let mut entries = self.entries()?;
        let now = Utc::now();
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert(token.to_string(), (user_id, expiry(ttl_secs)));
        Ok(())
    }

    fn find(&self, token: &str) -> Result<Option<i32>, AppError> {
        let entries = self.entries()?;
        Ok(entries
            .get(token)
            .filter(|(_, expires)| *expires > Utc::now())
            .map(|(user_id, _)| *user_id))
    }

    fn refresh(&self, token: &str, ttl_secs: u64) -> Result<bool, AppError> {
        let mut entries = self.entries()?;
        match entries.get_mut(token) {
            Some((_, expires)) if *expires > Utc::now() => {
                *expires = expiry(ttl_secs);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(&self, token: &str) -> Result<(), AppError> {
        self.entries()?.remove(token);
        Ok(())
    }
}

/** Sessions kept in redis, expiry is left to redis itself */
pub struct RedisStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisStore {
    pub fn new(pool: Pool<RedisConnectionManager>) -> RedisStore {
        RedisStore { pool }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

impl SessionStore for RedisStore {
    fn insert(&self, token: &str, user_id: i32, ttl_secs: u64) -> Result<(), AppError> {
        let mut redis_conn = self.pool.get()?;
        redis_conn.set_ex::<String, i32, ()>(Self::key(token), user_id, ttl_secs as usize)?;
        Ok(())
    }

    fn find(&self, token: &str) -> Result<Option<i32>, AppError> {
        let mut redis_conn = self.pool.get()?;
        Ok(redis_conn.get::<String, Option<i32>>(Self::key(token))?)
    }

    fn refresh(&self, token: &str, ttl_secs: u64) -> Result<bool, AppError> {
        let mut redis_conn = self.pool.get()?;
        Ok(redis_conn.expire::<String, bool>(Self::key(token), ttl_secs as usize)?)
    }

    fn delete(&self, token: &str) -> Result<(), AppError> {
        let mut redis_conn = self.pool.get()?;
        redis_conn.del::<String, ()>(Self::key(token))?;
        Ok(())
    }
}

/// Login lifecycle on top of a [`SessionStore`]: issuing, refreshing and
/// dropping tokens, and turning a token back into an [`Identity`].
#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
    ttl_secs: u64,
}

impl Sessions {
    pub fn new(store: Arc<dyn SessionStore>, ttl_secs: u64) -> Sessions {
        Sessions { store, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Binds a fresh token to the user and returns it
    pub fn login(&self, user: &User) -> Result<String, AppError> {
        let token = Token::generate();
        self.store.insert(&token, user.id, self.ttl_secs)?;
        Ok(token)
    }

    pub fn logout(&self, token: &str) -> Result<(), AppError> {
        self.store.delete(token)
    }

    pub fn refresh(&self, token: &str) -> Result<(), AppError> {
        if self.store.refresh(token, self.ttl_secs)? {
            Ok(())
        } else {
            Err(AppError::Unauthenticated)
        }
    }

    /// No token, or one that is unknown or expired, is an anonymous caller.
    /// A live token whose user was deleted is an error, never anonymous.
    pub fn current_identity(&self, conn: &mut SqliteConnection, token: Option<&str>) -> Result<Identity, AppError> {
        let user_id = match token {
            Some(token) => self.store.find(token)?,
            None => None,
        };

        match user_id {
            None => Ok(Identity::Anonymous),
            Some(user_id) => match User::find_by_id(conn, user_id)? {
                Some(user) => Ok(Identity::User(user)),
                None => {
                    log::warn!("session points at deleted user {}", user_id);
                    Err(AppError::StaleSession)
                }
            },
        }
    }
}
