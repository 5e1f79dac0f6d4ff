pub mod admin;
pub mod blog;
pub mod caller;
pub mod comment;
pub mod token;
pub mod user;

use actix_web::web::{self, ServiceConfig};

use crate::app::AppError;

/// Mounts every route of the blog. Malformed JSON bodies and path ids are
/// answered with the same JSON errors the use cases produce.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|_err, _req| AppError::NotFound.into()))
    //User routes
    .service(user::register)
    .service(user::login)
    .service(user::logout)
    .service(token::refresh_session)
    //Blog routes
    .service(blog::index)
    .service(blog::list_posts)
    .service(blog::get_post)
    .service(blog::create_post)
    .service(blog::edit_post)
    .service(blog::delete_post)
    //Comment routes
    .service(comment::add_comment)
    //Admin routes
    .service(admin::promote_to_admin)
    .service(admin::demote_from_admin)
    .service(admin::list_admins)
    .service(admin::list_all_users)
    .service(admin::remove_user);
}
