// Users, registration and token auth

use super::{ApiError, ApiResult, AppState, CurrentUser, MaybeUser};
use crate::auth;
use crate::entities::user::{self as store, NewUser, User};
use crate::pagination::{Page, PageRequest};
use crate::query::QueryParams;
use crate::views::{user_view, UserView};
use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    viewer: MaybeUser,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Page<UserView>>> {
    let params = QueryParams::parse(raw.as_deref());
    let request = PageRequest::from_query(&params, state.page_size)?;

    let conn = state.conn()?;
    let count = store::count_users(&conn)?;
    let users = store::list_users(&conn, request.limit, request.offset()?)?;
    let results = users
        .into_iter()
        .map(|user| user_view(&conn, user, viewer.id()))
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(Json(Page::new(request, count, results, uri.path(), &params)?))
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(new_user) = payload?;
    let conn = state.conn()?;
    let user = store::create_user(&conn, &new_user, false)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<Json<UserView>> {
    let conn = state.conn()?;
    let viewer = user.id;
    Ok(Json(user_view(&conn, user, Some(viewer))?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserView>> {
    let conn = state.conn()?;
    let user = store::get_user(&conn, id)?;
    Ok(Json(user_view(&conn, user, viewer.id())?))
}

/// POST /api/users/set_password
pub async fn set_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload?;
    let conn = state.conn()?;
    store::set_password(&conn, user.id, &request.current_password, &request.new_password)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/token/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(request) = payload?;
    let conn = state.conn()?;
    let auth_token = auth::login(&conn, &request.email, &request.password)?;
    Ok(Json(TokenResponse { auth_token }))
}

/// POST /api/auth/token/logout
pub async fn logout(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<StatusCode, ApiError> {
    let conn = state.conn()?;
    auth::logout(&conn, user.id)?;
    info!(user_id = user.id, "logged out");
    Ok(StatusCode::NO_CONTENT)
}
