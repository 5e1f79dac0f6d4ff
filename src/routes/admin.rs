use actix_web::{
    delete, get, post,
    web::{self, Data, Json, Path},
    HttpResponse,
};
use serde::Deserialize;

use super::caller::Caller;
use crate::app::{AppError, AppState};

#[derive(Deserialize)]
pub struct PromoteForm {
    pub email: String,
}

/// Pipe for granting admin rights, super-admin only
/// - url: `{domain}/admins`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
/// ## body
/// - json object with the `email` of the account to promote
///
/// # Response
/// ## Ok
/// - json of the promoted user
/// ## Error
/// - Forbidden
/// - Not found
/// - Conflict, when the account already is an admin
#[post("/admins")]
pub async fn promote_to_admin(
    caller: Caller,
    form: Json<PromoteForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();

    let user = web::block(move || service.promote_to_admin(&caller.identity, &form.email)).await??;

    Ok(HttpResponse::Ok().json(user))
}

#[delete("/admins/{user_id}")]
pub async fn demote_from_admin(
    caller: Caller,
    user_id: Path<i32>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let user_id = user_id.into_inner();

    let user = web::block(move || service.demote_from_admin(&caller.identity, user_id)).await??;

    Ok(HttpResponse::Ok().json(user))
}

#[get("/admins")]
pub async fn list_admins(caller: Caller, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let admins = web::block(move || service.list_admins(&caller.identity)).await??;

    Ok(HttpResponse::Ok().json(admins))
}

#[get("/users")]
pub async fn list_all_users(caller: Caller, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let users = web::block(move || service.list_all_users(&caller.identity)).await??;

    Ok(HttpResponse::Ok().json(users))
}

/// Pipe for removing an account together with its comments
/// - url: `{domain}/users/{user_id}`
///
/// # Response
/// ## No content
/// ## Error
/// - Forbidden
/// - Not found
/// - Conflict, when the account authored posts
#[delete("/users/{user_id}")]
pub async fn remove_user(
    caller: Caller,
    user_id: Path<i32>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let user_id = user_id.into_inner();

    web::block(move || service.remove_user(&caller.identity, user_id)).await??;

    Ok(HttpResponse::NoContent().finish())
}
