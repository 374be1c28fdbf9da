use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::{CookieJar, Form};

use crate::auth::middleware::CurrentUser;
use crate::auth::session;
use crate::error::{AppError, AppResult};
use crate::models::UserPublic;
use crate::routes::forms::{LoginForm, RegisterForm};
use crate::routes::{paths, AppState};
use crate::services::users;

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let new_user = match users::NewUser::prepare(form.into_command()) {
        Ok(new_user) => new_user,
        Err(e) => return e.redirect_to(paths::REGISTER),
    };

    let conn = state.db.get()?;
    let user = match users::register(&conn, new_user) {
        Ok(user) => user,
        Err(e) => return e.redirect_to(paths::REGISTER),
    };

    let cookie = session::session_cookie(state.keys.issue(user.id), state.config.secure_cookies);
    Ok((jar.add(cookie), Redirect::to(paths::DASHBOARD)).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let user = match users::authenticate(&conn, form.into_command()) {
        Ok(user) => user,
        Err(e) => return e.redirect_to(paths::LOGIN),
    };

    tracing::info!(user_id = user.id, "User logged in");
    let cookie = session::session_cookie(state.keys.issue(user.id), state.config.secure_cookies);
    Ok((jar.add(cookie), Redirect::to(paths::DASHBOARD)).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(session::removal_cookie()), Redirect::to(paths::HOME))
}

pub async fn me(CurrentUser(user): CurrentUser) -> AppResult<Json<UserPublic>> {
    let user = user.ok_or(AppError::Unauthorized)?;
    Ok(Json(user.into()))
}
