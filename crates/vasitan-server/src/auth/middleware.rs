use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::auth::session;
use crate::error::AppError;
use crate::models::User;
use crate::routes::{paths, AppState};
use crate::services::users;

/// Id of the signed-in user, inserted by the auth middlewares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUserId(pub i64);

/// Gate for form actions: without a valid session the request is sent to
/// the login page and the handler never runs.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match session::session_user_id(&jar, &state.keys) {
        Some(user_id) => {
            request.extensions_mut().insert(AuthUserId(user_id));
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
            Redirect::to(paths::LOGIN).into_response()
        }
    }
}

/// Gate for JSON endpoints: answers 401 instead of redirecting.
pub async fn require_api_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session::session_user_id(&jar, &state.keys).ok_or(AppError::Unauthorized)?;
    request.extensions_mut().insert(AuthUserId(user_id));
    Ok(next.run(request).await)
}

/// The signed-in user, or `None` when the session is missing, invalid or
/// points at a user that no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(user_id) = session::session_user_id(&jar, &state.keys) else {
            return Ok(CurrentUser(None));
        };

        let conn = state.db.get()?;
        Ok(CurrentUser(users::find_by_id(&conn, user_id)?))
    }
}
