use actix_web::{
    dev::Payload,
    web::{self, Data},
    FromRequest, HttpRequest,
};
use futures::future::LocalBoxFuture;

use super::token::TOKEN_COOKIE;
use crate::{
    app::{AppError, AppState},
    auth::policy::Identity,
};

/// The identity behind a request, resolved from its `token` cookie.
/// Requests without a live session extract as [`Identity::Anonymous`].
pub struct Caller {
    pub identity: Identity,
    pub token: Option<String>,
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req.cookie(TOKEN_COOKIE).map(|cookie| cookie.value().to_string());
        let app_state = req.app_data::<Data<AppState>>().cloned();

        Box::pin(async move {
            let app_state = app_state.ok_or_else(|| {
                log::error!("application state is not registered");
                AppError::Internal
            })?;
            let lookup = token.clone();
            let identity =
                web::block(move || app_state.service.current_identity(lookup.as_deref())).await??;

            Ok(Caller { identity, token })
        })
    }
}
