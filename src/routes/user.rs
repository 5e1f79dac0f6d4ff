use actix_web::{
    delete, post,
    web::{self, Data, Json},
    HttpResponse,
};

use super::{
    caller::Caller,
    token::{removal_cookie, session_cookie},
};
use crate::{
    app::{AppError, AppState},
    service::users::{Credentials, Registration},
};

/// Pipe for creating an account
/// - url: `{domain}/register`
///
/// # HTTP request requirements
/// ## body
/// - json object with `email`, `password` and `name` keys
///
/// # Example
/// ```
/// let data = "{ \"email\": \"bob@x.com\", \"password\": \"pw1\", \"name\": \"Bob\" }";
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/register")
///     .insert_header(("content-type", "application/json"))
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Created
/// - json of the new user, set cookie header containing login token
/// ## Error
/// - Bad request
/// - Conflict
#[post("/register")]
pub async fn register(form: Json<Registration>, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let ttl_secs = service.sessions().ttl_secs();

    let (user, token) = web::block(move || service.register(&form)).await??;

    Ok(HttpResponse::Created()
        .cookie(session_cookie(token, ttl_secs))
        .json(user))
}

/// Pipe for logging in
/// - url: `{domain}/login`
///
/// # HTTP request requirements
/// ## body
/// - json object with `email` and `password` keys
///
/// # Response
/// ## Ok
/// - json of the user, set cookie header containing login token
/// ## Error
/// - Not found
/// - Unauthorized
#[post("/login")]
pub async fn login(credentials: Json<Credentials>, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();
    let ttl_secs = service.sessions().ttl_secs();

    let (user, token) = web::block(move || service.login(&credentials)).await??;

    Ok(HttpResponse::Ok().cookie(session_cookie(token, ttl_secs)).json(user))
}

#[delete("/logout")]
pub async fn logout(caller: Caller, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = app_state.service.clone();

    web::block(move || service.logout(&caller.identity, caller.token.as_deref())).await??;

    Ok(HttpResponse::Ok().cookie(removal_cookie()).finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        routes::{configure, testing::register, token::TOKEN_COOKIE},
        service::testing::SUPER_ADMIN,
    };

    #[actix_rt::test]
    async fn test_register_and_login() {
        let app_state = AppState::in_memory(SUPER_ADMIN);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": "bob@x.com", "password": "pw1", "name": "Bob" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(resp.response().cookies().any(|c| c.name() == TOKEN_COOKIE));
        let user: Value = test::read_body_json(resp).await;
        pretty_assertions::assert_eq!(user["name"], "Bob");
        pretty_assertions::assert_eq!(user["role"], "authenticated");
        assert!(user.get("password_hash").is_none());

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": "bob@x.com", "password": "other", "name": "Bobby" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "bob@x.com", "password": "wrong" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        pretty_assertions::assert_eq!(body, json!({ "error": "Password is incorrect" }));

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "nobody@x.com", "password": "pw1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "bob@x.com", "password": "pw1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().any(|c| c.name() == TOKEN_COOKIE));
    }

    #[actix_rt::test]
    async fn test_malformed_body() {
        let app_state = AppState::in_memory(SUPER_ADMIN);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": "bob@x.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_rt::test]
    async fn test_logout() {
        let app_state = AppState::in_memory(SUPER_ADMIN);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .configure(configure),
        )
        .await;
        let cookie = register(&app_state, "alice@example.com", "Alice");

        let req = test::TestRequest::delete().uri("/logout").to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri("/logout")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::OK);
        let removed = resp
            .response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .unwrap();
        pretty_assertions::assert_eq!(removed.value(), "");

        pretty_assertions::assert_eq!(
            app_state.service.current_identity(Some(cookie.value())),
            Ok(crate::auth::policy::Identity::Anonymous)
        );
    }
}
