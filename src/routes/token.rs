use actix_web::{
    cookie::{time::Duration, Cookie},
    put,
    web::{self, Data},
    HttpResponse,
};

use super::caller::Caller;
use crate::{
    app::{AppError, AppState},
    auth::token::MAX_TTL_SECS,
};

pub const TOKEN_COOKIE: &str = "token";

/// Cookie carrying a login token, living as long as the session does
pub fn session_cookie(token: String, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64))
        .finish()
}

/// Cookie telling the browser to forget its login token
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Pipe for extending the life of the current session
/// - url: `{domain}/session/refresh`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
///
/// # Response
/// ## Ok
/// - set cookie header with the renewed expiry
/// ## Error
/// - Unauthorized
#[put("/session/refresh")]
pub async fn refresh_session(caller: Caller, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let ttl_secs = service.sessions().ttl_secs();
    let token = caller.token.clone();

    web::block(move || service.refresh_session(&caller.identity, caller.token.as_deref())).await??;

    let token = token.ok_or(AppError::Unauthenticated)?;
    Ok(HttpResponse::Ok().cookie(session_cookie(token, ttl_secs)).finish())
}
