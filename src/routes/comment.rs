use actix_web::{
    post,
    web::{self, Data, Json, Path},
    HttpResponse,
};
use serde::Deserialize;

use super::caller::Caller;
use crate::app::{AppError, AppState};

#[derive(Deserialize)]
pub struct CommentForm {
    pub text: String,
}

/// Pipe for commenting on a post
/// - url: `{domain}/posts/{post_id}/comments`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
/// ## body
/// - json object with a `text` key
///
/// # Example
/// ```
/// let cookie = CookieBuilder::new("token", "test_token").finish();
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/posts/1/comments")
///     .insert_header(("content-type", "application/json"))
///     .set_payload("{ \"text\": \"Nice\" }")
///     .cookie(cookie)
///     .to_request();
/// ```
///
/// # Response
/// ## Created
/// - json of the comment with its author's name and avatar
/// ## Error
/// - Unauthorized
/// - Not found
/// - Bad request
#[post("/posts/{post_id}/comments")]
pub async fn add_comment(
    caller: Caller,
    post_id: Path<i32>,
    form: Json<CommentForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let post_id = post_id.into_inner();

    let comment = web::block(move || service.add_comment(&caller.identity, post_id, &form.text)).await??;

    Ok(HttpResponse::Created().json(comment))
}
