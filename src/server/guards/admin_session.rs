use crate::server::router::FolioState;
use crate::server::session::SharedController;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use std::convert::Infallible;

/// The admin page session of the request, created on first contact.
pub struct AdminSession {
    pub controller: SharedController,
    jar: PrivateCookieJar,
}

impl AdminSession {
    /// Attaches the session cookie (new or refreshed) to `resp`.
    pub fn respond(self, resp: impl IntoResponse) -> Response {
        (self.jar, resp).into_response()
    }
}

impl FromRequestParts<FolioState> for AdminSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FolioState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_request_parts(parts, state).await?;
        let (jar, controller) = state
            .sessions
            .resolve(jar, !state.insecure_cookie)
            .await;
        Ok(Self { controller, jar })
    }
}
