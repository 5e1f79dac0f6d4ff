use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    HttpResponse,
};

use super::caller::Caller;
use crate::{
    app::{AppError, AppState},
    database::models::post::PostFields,
};

async fn all_posts(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let posts = web::block(move || service.list_posts()).await??;

    Ok(HttpResponse::Ok().json(posts))
}

/// Home page, the same listing as `/posts`
#[get("/")]
pub async fn index(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    all_posts(app_state).await
}

/// Pipe for listing every post with its author's name, oldest first
/// - url: `{domain}/posts`
///
/// # Response
/// ## Ok
/// ```
/// [
///     {
///         "id": 1,
///         "author_id": 1,
///         "title": "Hello",
///         "subtitle": "A first post",
///         "date": "October 19, 2026",
///         "body": "<p>Some words</p>",
///         "img_url": "https://images.example.com/cover.jpg",
///         "author": "Admin"
///     }
/// ]
/// ```
#[get("/posts")]
pub async fn list_posts(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    all_posts(app_state).await
}

/// Pipe for reading one post with its comments
/// - url: `{domain}/posts/{post_id}`
///
/// # Response
/// ## Ok
/// - json of the post, its author's name and a `comments` array
/// ## Error
/// - Not found
#[get("/posts/{post_id}")]
pub async fn get_post(post_id: Path<i32>, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let post_id = post_id.into_inner();

    let post = web::block(move || service.get_post(post_id)).await??;

    Ok(HttpResponse::Ok().json(post))
}

/// Pipe for publishing a post, admins only
/// - url: `{domain}/posts`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
/// ## body
/// - json object with `title`, `subtitle`, `body` and `img_url` keys
///
/// # Response
/// ## Created
/// - json of the new post
/// ## Error
/// - Bad request
/// - Forbidden
/// - Conflict
#[post("/posts")]
pub async fn create_post(
    caller: Caller,
    fields: Json<PostFields>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();

    let post = web::block(move || service.create_post(&caller.identity, &fields)).await??;

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{post_id}")]
pub async fn edit_post(
    caller: Caller,
    post_id: Path<i32>,
    fields: Json<PostFields>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let post_id = post_id.into_inner();

    let post = web::block(move || service.edit_post(&caller.identity, post_id, &fields)).await??;

    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts/{post_id}")]
pub async fn delete_post(
    caller: Caller,
    post_id: Path<i32>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let post_id = post_id.into_inner();

    web::block(move || service.delete_post(&caller.identity, post_id)).await??;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::{routes::configure, routes::testing::register, service::testing::SUPER_ADMIN};

    fn payload(title: &str) -> Value {
        json!({
            "title": title,
            "subtitle": "A subtitle",
            "body": "<p>Some words</p>",
            "img_url": "https://images.example.com/cover.jpg"
        })
    }

    #[actix_rt::test]
    async fn test_post_lifecycle() {
        let app_state = AppState::in_memory(SUPER_ADMIN);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .configure(configure),
        )
        .await;
        let admin = register(&app_state, SUPER_ADMIN, "Admin");

        let req = test::TestRequest::post()
            .uri("/posts")
            .cookie(admin.clone())
            .set_json(payload("Hello"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_i64().unwrap();

        for uri in ["/", "/posts"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let listed: Value = test::call_and_read_body_json(&app, req).await;
            pretty_assertions::assert_eq!(listed[0]["title"], "Hello");
            pretty_assertions::assert_eq!(listed[0]["author"], "Admin");
        }

        let mut edited = payload("Hello again");
        edited["body"] = json!("<p>More words</p>");
        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", id))
            .cookie(admin.clone())
            .set_json(edited)
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri(&format!("/posts/{}", id)).to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(detail["title"], "Hello again");
        pretty_assertions::assert_eq!(detail["date"], created["date"]);
        pretty_assertions::assert_eq!(detail["comments"], json!([]));

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", id))
            .cookie(admin.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&format!("/posts/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_writes_need_admin() {
        let app_state = AppState::in_memory(SUPER_ADMIN);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .configure(configure),
        )
        .await;
        let reader = register(&app_state, "alice@example.com", "Alice");

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(payload("Hello"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/posts")
            .cookie(reader.clone())
            .set_json(payload("Hello"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete().uri("/posts/1").cookie(reader).to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/posts").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(listed, json!([]));
    }

    #[actix_rt::test]
    async fn test_bad_post_id() {
        let app_state = AppState::in_memory(SUPER_ADMIN);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/posts/abc").to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
